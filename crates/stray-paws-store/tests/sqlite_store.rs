// SPDX-License-Identifier: Apache-2.0

use stray_paws_model::{
    LineItem, Order, OrderId, OrderStatus, Product, ProductId, Role, ShippingInfo, UserAccount,
    UserId,
};
use stray_paws_store::{SqliteStore, Store, StoreError};
use tempfile::tempdir;

fn account(id: &str, email: &str, balance: i64) -> UserAccount {
    let mut account = UserAccount::registered(
        UserId::parse(id).expect("user id"),
        "Test User".to_string(),
        email.to_string(),
        "feed".repeat(16),
        Role::Donor,
        1_000,
    );
    account.balance = balance;
    account
}

fn order(id: &str, user: &str, price: i64, quantity: u32, created_at_ms: i64) -> Order {
    Order::placed(
        OrderId::parse(id).expect("order id"),
        UserId::parse(user).expect("user id"),
        vec![LineItem::new(
            ProductId::parse("prd-kibble").expect("product id"),
            "Kibble".to_string(),
            None,
            price,
            quantity,
            10,
        )],
        ShippingInfo::new(
            "Sam".to_string(),
            "555-0100".to_string(),
            "1 Shelter Way".to_string(),
            None,
            "standard".to_string(),
        ),
        0,
        created_at_ms,
    )
    .expect("fixture total fits")
}

#[tokio::test]
async fn placement_debits_exactly_the_total() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 100))
        .await
        .expect("create account");

    let placed = order("ord-1", "usr-1", 30, 2, 1);
    let balance = store.place_order(&placed).await.expect("place");
    assert_eq!(balance, 40);

    let reloaded = store
        .account_by_id(&UserId::parse("usr-1").expect("id"))
        .await
        .expect("reload account");
    assert_eq!(reloaded.balance, 40);
    let stored = store
        .order_by_id(&OrderId::parse("ord-1").expect("id"))
        .await
        .expect("order persisted");
    assert_eq!(stored.total_points, 60);
    assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
async fn insufficient_funds_persists_nothing() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 10))
        .await
        .expect("create account");

    let err = store
        .place_order(&order("ord-1", "usr-1", 15, 1, 1))
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        StoreError::InsufficientFunds {
            balance: 10,
            required: 15
        }
    );
    let reloaded = store
        .account_by_id(&UserId::parse("usr-1").expect("id"))
        .await
        .expect("reload");
    assert_eq!(reloaded.balance, 10);
    assert!(store.list_orders().await.expect("list").is_empty());
}

#[tokio::test]
async fn placement_for_unknown_user_is_not_found() {
    let store = SqliteStore::open_in_memory().expect("open store");
    let err = store
        .place_order(&order("ord-1", "usr-missing", 5, 1, 1))
        .await
        .expect_err("must fail");
    assert_eq!(err, StoreError::NotFound);
}

#[tokio::test]
async fn orders_list_newest_first() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 1_000))
        .await
        .expect("create account");
    for (id, at) in [("ord-1", 10), ("ord-2", 30), ("ord-3", 20)] {
        store
            .place_order(&order(id, "usr-1", 1, 1, at))
            .await
            .expect("place");
    }
    let listed = store.list_orders().await.expect("list");
    let ids: Vec<&str> = listed.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["ord-2", "ord-3", "ord-1"]);
}

#[tokio::test]
async fn credit_points_records_audit_row_and_new_balance() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 5))
        .await
        .expect("create account");
    let user = UserId::parse("usr-1").expect("id");
    let balance = store
        .credit_points(&user, 95, Some("pay-ref-1"))
        .await
        .expect("credit");
    assert_eq!(balance, 100);
    let err = store
        .credit_points(&UserId::parse("usr-missing").expect("id"), 5, None)
        .await
        .expect_err("unknown user");
    assert_eq!(err, StoreError::NotFound);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "same@example.org", 0))
        .await
        .expect("first");
    let err = store
        .create_account(&account("usr-2", "same@example.org", 0))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, StoreError::DuplicateKey(_)));
}

#[tokio::test]
async fn status_update_touches_doc_and_column() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 100))
        .await
        .expect("create account");
    store
        .place_order(&order("ord-1", "usr-1", 10, 1, 1))
        .await
        .expect("place");

    let id = OrderId::parse("ord-1").expect("id");
    let updated = store
        .update_order_status(&id, OrderStatus::Delivered, 99)
        .await
        .expect("update");
    assert_eq!(updated.status, OrderStatus::Delivered);
    assert_eq!(updated.updated_at_ms, 99);

    let reloaded = store.order_by_id(&id).await.expect("reload");
    assert_eq!(reloaded.status, OrderStatus::Delivered);

    let missing = OrderId::parse("ord-missing").expect("id");
    assert_eq!(
        store
            .update_order_status(&missing, OrderStatus::Pending, 1)
            .await
            .expect_err("missing order"),
        StoreError::NotFound
    );
}

#[tokio::test]
async fn deleting_an_order_does_not_refund() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 100))
        .await
        .expect("create account");
    store
        .place_order(&order("ord-1", "usr-1", 40, 1, 1))
        .await
        .expect("place");

    store
        .delete_order(&OrderId::parse("ord-1").expect("id"))
        .await
        .expect("delete");
    let reloaded = store
        .account_by_id(&UserId::parse("usr-1").expect("id"))
        .await
        .expect("reload");
    assert_eq!(reloaded.balance, 60, "deletion must not refund the ledger");
    assert_eq!(
        store
            .delete_order(&OrderId::parse("ord-1").expect("id"))
            .await
            .expect_err("already gone"),
        StoreError::NotFound
    );
}

#[tokio::test]
async fn documents_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("straypaws.sqlite");
    {
        let store = SqliteStore::open(&path).expect("open store");
        store
            .create_account(&account("usr-1", "a@example.org", 70))
            .await
            .expect("create account");
        store
            .create_product(&Product::new(
                ProductId::parse("prd-bed").expect("id"),
                "Dog bed".to_string(),
                "Washable cover".to_string(),
                20,
                55,
                3,
                "comfort".to_string(),
                vec![],
                7,
            ))
            .await
            .expect("create product");
        store
            .place_order(&order("ord-1", "usr-1", 30, 2, 9))
            .await
            .expect("place");
    }
    let store = SqliteStore::open(&path).expect("reopen store");
    let account = store
        .account_by_id(&UserId::parse("usr-1").expect("id"))
        .await
        .expect("account survives");
    assert_eq!(account.balance, 10);
    let product = store
        .product_by_id(&ProductId::parse("prd-bed").expect("id"))
        .await
        .expect("product survives");
    assert_eq!(product.selling_price, 55);
    assert_eq!(store.list_orders().await.expect("orders").len(), 1);
}

#[tokio::test]
async fn session_round_trip() {
    let store = SqliteStore::open_in_memory().expect("open store");
    store
        .create_account(&account("usr-1", "a@example.org", 0))
        .await
        .expect("create account");
    let user = UserId::parse("usr-1").expect("id");
    store
        .insert_session("tok-abc", &user)
        .await
        .expect("insert session");
    assert_eq!(
        store.resolve_session("tok-abc").await.expect("resolve"),
        user
    );
    assert_eq!(
        store
            .resolve_session("tok-unknown")
            .await
            .expect_err("unknown token"),
        StoreError::NotFound
    );
}
