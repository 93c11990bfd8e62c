// SPDX-License-Identifier: Apache-2.0

//! Order enrichment: turn the client-claimed cart into server-trusted line items.
//!
//! The client's `sellingPrice` is a display hint only; the authoritative price is
//! re-resolved from the catalog at order time. A single unresolvable product aborts
//! the whole cart, so no order is ever created from a partially valid submission.

use serde_json::json;
use stray_paws_api::{ApiError, ApiErrorCode, CartItemDto};
use stray_paws_model::{LineItem, Product, ProductId};
use stray_paws_store::{RetryPolicy, Store, StoreError};
use tracing::warn;

pub(crate) async fn enrich_items(
    store: &dyn Store,
    retry: &RetryPolicy,
    items: &[CartItemDto],
) -> Result<Vec<LineItem>, ApiError> {
    let mut enriched = Vec::with_capacity(items.len());
    // Lookups are sequential; the first failure aborts the remaining items.
    for item in items {
        let raw_id = item
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::missing_field("items[].productId"))?;
        let product_id = ProductId::parse(raw_id)
            .map_err(|e| ApiError::validation(e.to_string()))?;
        let product = lookup_with_retry(store, retry, &product_id).await?;
        let prices = product.price_snapshot();
        let quantity = item.quantity.filter(|q| *q > 0).unwrap_or(1);
        enriched.push(LineItem::new(
            product_id,
            item.name.clone().unwrap_or_else(|| product.name.clone()),
            item.image_url.clone(),
            prices.selling_price,
            quantity,
            prices.purchase_cost,
        ));
    }
    Ok(enriched)
}

/// Catalog lookup with linear-backoff retry on store outages. Read-only, so retrying
/// is safe; writes elsewhere never get this treatment.
async fn lookup_with_retry(
    store: &dyn Store,
    retry: &RetryPolicy,
    id: &ProductId,
) -> Result<Product, ApiError> {
    let mut attempt = 1;
    loop {
        match store.product_by_id(id).await {
            Ok(product) => return Ok(product),
            Err(StoreError::NotFound) => {
                return Err(ApiError::new(
                    ApiErrorCode::ProductNotFound,
                    format!("product {id} not found"),
                    json!({"productId": id.as_str()}),
                ));
            }
            Err(err) if err.is_retriable_read() && attempt < retry.max_attempts => {
                warn!(product_id = %id, attempt, error = %err, "catalog lookup retry");
                tokio::time::sleep(retry.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(product_id = %id, error = %err, "catalog lookup failed");
                return Err(ApiError::store_unavailable());
            }
        }
    }
}
