// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use serde::{Deserialize, Serialize};

/// Cart item exactly as the client claims it. Only `productId` and `quantity` are
/// trusted downstream; name, image, and price are display hints that enrichment
/// replaces with catalog-resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub selling_price: Option<i64>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Option<Vec<CartItemDto>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
    #[serde(default)]
    pub promo: Option<String>,
    #[serde(default)]
    pub donation: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPointsRequest {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsertRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub purchase_cost: Option<i64>,
    #[serde(default)]
    pub selling_price: Option<i64>,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamCreateRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteRespondRequest {
    #[serde(default)]
    pub action: Option<String>,
}

/// Presence check for a required string field: absent, empty, or whitespace-only
/// all reject the same way.
pub fn require_str<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(field)),
    }
}

pub fn require_positive(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    match value {
        Some(v) if v > 0 => Ok(v),
        Some(_) => Err(ApiError::validation(format!("{field} must be positive"))),
        None => Err(ApiError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiErrorCode;

    #[test]
    fn require_str_trims_and_rejects_blank() {
        assert_eq!(
            require_str(&Some("  standard  ".to_string()), "shipping").expect("present"),
            "standard"
        );
        assert!(require_str(&Some("   ".to_string()), "shipping").is_err());
        assert!(require_str(&None, "shipping").is_err());
    }

    #[test]
    fn require_positive_distinguisher() {
        assert_eq!(require_positive(Some(5), "amount").expect("positive"), 5);
        let zero = require_positive(Some(0), "amount").expect_err("zero rejected");
        assert_eq!(zero.code, ApiErrorCode::ValidationFailed);
        let absent = require_positive(None, "amount").expect_err("absent rejected");
        assert_eq!(absent.code, ApiErrorCode::MissingField);
    }

    #[test]
    fn place_order_request_tolerates_extra_client_fields() {
        let raw = r#"{
            "items": [{"productId": "prd-1", "sellingPrice": 30, "quantity": 2, "cartRowId": 7}],
            "name": "Sam", "phone": "555", "address": "1 Way", "shipping": "standard",
            "uiTheme": "dark"
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(raw).expect("parse");
        let items = req.items.expect("items");
        assert_eq!(items[0].product_id.as_deref(), Some("prd-1"));
        assert_eq!(items[0].quantity, Some(2));
    }
}
