// SPDX-License-Identifier: Apache-2.0

//! Order placement: validate the submission, enrich it, and hand the finished
//! order to the store's transactional insert-plus-debit.

use stray_paws_api::{require_str, ApiError, ApiErrorCode, PlaceOrderRequest};
use stray_paws_model::{unix_millis, Order, OrderId, ShippingInfo, UserId};
use stray_paws_store::{RetryPolicy, Store, StoreError};
use tracing::{error, info, warn};

use crate::services::enrichment::enrich_items;

#[derive(Debug)]
pub(crate) struct PlacedOrder {
    pub order: Order,
    pub new_balance: i64,
}

pub(crate) async fn place_order(
    store: &dyn Store,
    retry: &RetryPolicy,
    order_id: OrderId,
    user_id: UserId,
    req: &PlaceOrderRequest,
) -> Result<PlacedOrder, ApiError> {
    let items = match req.items.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(ApiError::missing_field("items")),
    };
    let shipping = ShippingInfo::new(
        require_str(&req.name, "name")?.to_string(),
        require_str(&req.phone, "phone")?.to_string(),
        require_str(&req.address, "address")?.to_string(),
        req.promo.clone(),
        require_str(&req.shipping, "shipping")?.to_string(),
    );
    let donation = req.donation.unwrap_or(0);
    if donation < 0 {
        return Err(ApiError::validation("donation must not be negative"));
    }

    // The caller's account is resolved before any catalog work so an unknown
    // user is reported as such even when the cart is also broken.
    let account = match store.account_by_id(&user_id).await {
        Ok(account) => account,
        Err(StoreError::NotFound) => {
            return Err(ApiError::not_found(ApiErrorCode::UserNotFound, "user"));
        }
        Err(err) => {
            warn!(user_id = %user_id, error = %err, "account lookup failed");
            return Err(ApiError::store_unavailable());
        }
    };

    let products = enrich_items(store, retry, items).await?;
    let order = Order::placed(order_id, user_id, products, shipping, donation, unix_millis())
        .ok_or_else(|| ApiError::validation("order total overflows the point ledger"))?;

    // Fast rejection against the balance just read; the conditional debit in
    // the store stays authoritative under concurrent spends.
    if !account.can_afford(order.total_points) {
        return Err(ApiError::insufficient_funds(account.balance, order.total_points));
    }

    match store.place_order(&order).await {
        Ok(new_balance) => {
            info!(
                order_id = %order.id,
                user_id = %order.user_id,
                total_points = order.total_points,
                new_balance,
                "order placed"
            );
            Ok(PlacedOrder { order, new_balance })
        }
        Err(StoreError::NotFound) => Err(ApiError::not_found(ApiErrorCode::UserNotFound, "user")),
        Err(StoreError::InsufficientFunds { balance, required }) => {
            Err(ApiError::insufficient_funds(balance, required))
        }
        Err(err) => {
            error!(order_id = %order.id, error = %err, "order placement failed");
            Err(ApiError::store_unavailable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stray_paws_api::CartItemDto;
    use stray_paws_model::{sha256_hex, OrderStatus, Points, Product, ProductId, Role, UserAccount};
    use stray_paws_store::MemoryStore;

    async fn seeded_store(balance: Points) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::default());
        let mut account = UserAccount::registered(
            UserId::parse("usr-1").expect("id"),
            "Sam".to_string(),
            "sam@straypaws.org".to_string(),
            sha256_hex(b"hunter2"),
            Role::Donor,
            unix_millis(),
        );
        account.balance = balance;
        store.create_account(&account).await.expect("seed account");
        store
            .create_product(&Product::new(
                ProductId::parse("prd-leash").expect("id"),
                "Reflective leash".to_string(),
                String::new(),
                12,
                30,
                5,
                "gear".to_string(),
                vec![],
                unix_millis(),
            ))
            .await
            .expect("seed product");
        store
    }

    fn request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            items: Some(vec![CartItemDto {
                product_id: Some("prd-leash".to_string()),
                name: None,
                image_url: None,
                selling_price: Some(1),
                quantity: Some(2),
            }]),
            name: Some("Sam".to_string()),
            phone: Some("555-0100".to_string()),
            address: Some("1 Shelter Way".to_string()),
            shipping: Some("standard".to_string()),
            promo: None,
            donation: Some(10),
        }
    }

    #[tokio::test]
    async fn places_and_debits_the_catalog_total() {
        let store = seeded_store(100).await;
        let placed = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            &request(),
        )
        .await
        .expect("place");
        // 30 x 2 + 10 donation, regardless of the claimed sellingPrice of 1.
        assert_eq!(placed.order.total_points, 70);
        assert_eq!(placed.new_balance, 30);
        assert_eq!(placed.order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn insufficient_balance_persists_nothing() {
        let store = seeded_store(50).await;
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            &request(),
        )
        .await
        .expect_err("70 > 50");
        assert_eq!(err.code, ApiErrorCode::InsufficientFunds);
        assert_eq!(err.details["balance"], 50);
        assert_eq!(err.details["required"], 70);
        let balance = store
            .balance_of(&UserId::parse("usr-1").expect("id"))
            .await
            .expect("balance");
        assert_eq!(balance, 50);
        assert!(store.list_orders().await.expect("orders").is_empty());
    }

    #[tokio::test]
    async fn missing_shipping_field_rejects_before_enrichment() {
        let store = seeded_store(100).await;
        let mut req = request();
        req.phone = Some("   ".to_string());
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            &req,
        )
        .await
        .expect_err("blank phone");
        assert_eq!(err.code, ApiErrorCode::MissingField);
        assert_eq!(err.details["field"], "phone");
    }

    #[tokio::test]
    async fn negative_donation_rejected() {
        let store = seeded_store(100).await;
        let mut req = request();
        req.donation = Some(-5);
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            &req,
        )
        .await
        .expect_err("negative donation");
        assert_eq!(err.code, ApiErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_user_maps_to_user_not_found() {
        let store = seeded_store(100).await;
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-ghost").expect("id"),
            &request(),
        )
        .await
        .expect_err("unknown user");
        assert_eq!(err.code, ApiErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn unknown_user_reported_even_with_a_broken_cart() {
        let store = seeded_store(100).await;
        let mut req = request();
        req.items = Some(vec![CartItemDto {
            product_id: Some("prd-ghost".to_string()),
            name: None,
            image_url: None,
            selling_price: None,
            quantity: Some(1),
        }]);
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-ghost").expect("id"),
            &req,
        )
        .await
        .expect_err("unknown user");
        assert_eq!(err.code, ApiErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn overflowing_donation_is_rejected_not_minted() {
        let store = seeded_store(100).await;
        let mut req = request();
        req.donation = Some(i64::MAX);
        let err = place_order(
            store.as_ref(),
            &RetryPolicy::default(),
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            &req,
        )
        .await
        .expect_err("total cannot be represented");
        assert_eq!(err.code, ApiErrorCode::ValidationFailed);
        let balance = store
            .balance_of(&UserId::parse("usr-1").expect("id"))
            .await
            .expect("balance");
        assert_eq!(balance, 100);
        assert!(store.list_orders().await.expect("orders").is_empty());
    }
}
