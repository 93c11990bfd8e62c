// SPDX-License-Identifier: Apache-2.0

use crate::ids::ProductId;
use crate::order::Points;
use serde::{Deserialize, Serialize};

/// Catalog product. `purchase_cost` is the internal wholesale cost; `selling_price`
/// is the customer-facing amount in PetPoints. The two are independently settable
/// with no enforced relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub purchase_cost: Points,
    pub selling_price: Points,
    pub stock_quantity: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

impl Product {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProductId,
        name: String,
        description: String,
        purchase_cost: Points,
        selling_price: Points,
        stock_quantity: u32,
        category: String,
        features: Vec<String>,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            name,
            description,
            purchase_cost,
            selling_price,
            stock_quantity,
            category,
            features,
            created_at_ms,
        }
    }

    #[must_use]
    pub fn price_snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            purchase_cost: self.purchase_cost,
            selling_price: self.selling_price,
            stock_quantity: self.stock_quantity,
        }
    }
}

/// Read-only pricing snapshot returned by catalog lookup during order enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct PriceSnapshot {
    pub purchase_cost: Points,
    pub selling_price: Points,
    pub stock_quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_mirrors_product_pricing() {
        let product = Product::new(
            ProductId::parse("prd-leash").expect("id"),
            "Reflective leash".to_string(),
            String::new(),
            12,
            30,
            5,
            "gear".to_string(),
            vec!["reflective".to_string()],
            0,
        );
        let snap = product.price_snapshot();
        assert_eq!(snap.purchase_cost, 12);
        assert_eq!(snap.selling_price, 30);
        assert_eq!(snap.stock_quantity, 5);
    }
}
