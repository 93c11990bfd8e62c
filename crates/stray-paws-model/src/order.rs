// SPDX-License-Identifier: Apache-2.0

use crate::ids::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// PetPoints amount. Whole points only; the ledger never holds fractions.
pub type Points = i64;

/// Order workflow status. The wire strings are fixed; any member of the set is a
/// legal target for an admin transition regardless of the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::OutForDelivery, Self::Delivered];

    pub fn parse(input: &str) -> Result<Self, crate::ParseError> {
        match input {
            "Pending" => Ok(Self::Pending),
            "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            _ => Err(crate::ParseError::InvalidFormat(
                "status must be one of Pending, Out for Delivery, Delivered",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-trusted line item. `selling_price` is resolved from the catalog at order
/// time; the client-submitted price is a display hint only and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub selling_price: Points,
    pub quantity: u32,
    pub purchase_cost_at_order_time: Points,
}

impl LineItem {
    #[must_use]
    pub fn new(
        product_id: ProductId,
        name: String,
        image_url: Option<String>,
        selling_price: Points,
        quantity: u32,
        purchase_cost_at_order_time: Points,
    ) -> Self {
        Self {
            product_id,
            name,
            image_url,
            selling_price,
            quantity,
            purchase_cost_at_order_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ShippingInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub promo: Option<String>,
    pub shipping: String,
}

impl ShippingInfo {
    #[must_use]
    pub fn new(
        name: String,
        phone: String,
        address: String,
        promo: Option<String>,
        shipping: String,
    ) -> Self {
        Self {
            name,
            phone,
            address,
            promo,
            shipping,
        }
    }
}

/// Placed order document. `total_points` is computed once at placement and never
/// recomputed afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub products: Vec<LineItem>,
    pub shipping_info: ShippingInfo,
    pub donation: Points,
    pub total_points: Points,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at_ms: i64,
}

impl Order {
    /// Newly placed order: status starts at `Pending`, total derives from the
    /// enriched items plus donation. `None` when the total overflows the ledger's
    /// point range.
    #[must_use]
    pub fn placed(
        id: OrderId,
        user_id: UserId,
        products: Vec<LineItem>,
        shipping_info: ShippingInfo,
        donation: Points,
        created_at_ms: i64,
    ) -> Option<Self> {
        let total_points = order_total(&products, donation)?;
        Some(Self {
            id,
            user_id,
            products,
            shipping_info,
            donation,
            total_points,
            status: OrderStatus::Pending,
            created_at_ms,
            updated_at_ms: created_at_ms,
        })
    }
}

/// Total point cost of an order: sum of price x quantity over all items, plus the
/// donation amount. The donation is client-controlled, so the arithmetic is checked;
/// `None` means the total does not fit in the ledger's point range.
#[must_use]
pub fn order_total(items: &[LineItem], donation: Points) -> Option<Points> {
    items.iter().try_fold(donation, |total, item| {
        item.selling_price
            .checked_mul(Points::from(item.quantity))
            .and_then(|line| total.checked_add(line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Points, quantity: u32) -> LineItem {
        LineItem::new(
            ProductId::parse("prd-1").expect("id"),
            "Kibble".to_string(),
            None,
            price,
            quantity,
            10,
        )
    }

    #[test]
    fn status_parse_accepts_only_fixed_set() {
        assert_eq!(OrderStatus::parse("Pending"), Ok(OrderStatus::Pending));
        assert_eq!(
            OrderStatus::parse("Out for Delivery"),
            Ok(OrderStatus::OutForDelivery)
        );
        assert_eq!(OrderStatus::parse("Delivered"), Ok(OrderStatus::Delivered));
        assert!(OrderStatus::parse("Shipped").is_err());
        assert!(OrderStatus::parse("pending").is_err());
    }

    #[test]
    fn status_wire_string_matches_serde() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).expect("serialize");
        assert_eq!(json, "\"Out for Delivery\"");
    }

    #[test]
    fn total_is_price_times_quantity_plus_donation() {
        let items = vec![item(30, 2), item(5, 1)];
        assert_eq!(order_total(&items, 10), Some(75));
        assert_eq!(order_total(&[], 0), Some(0));
    }

    #[test]
    fn total_refuses_to_overflow() {
        assert_eq!(order_total(&[item(30, 2)], Points::MAX), None);
        assert_eq!(order_total(&[item(Points::MAX, 2)], 0), None);
        assert!(Order::placed(
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            vec![item(30, 2)],
            ShippingInfo::new(
                "Sam".to_string(),
                "555-0100".to_string(),
                "1 Shelter Way".to_string(),
                None,
                "standard".to_string(),
            ),
            Points::MAX,
            42,
        )
        .is_none());
    }

    #[test]
    fn placed_order_starts_pending_with_computed_total() {
        let order = Order::placed(
            OrderId::parse("ord-1").expect("id"),
            UserId::parse("usr-1").expect("id"),
            vec![item(30, 2)],
            ShippingInfo::new(
                "Sam".to_string(),
                "555-0100".to_string(),
                "1 Shelter Way".to_string(),
                None,
                "standard".to_string(),
            ),
            10,
            42,
        )
        .expect("total fits");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_points, 70);
        assert_eq!(order.updated_at_ms, 42);
    }
}
