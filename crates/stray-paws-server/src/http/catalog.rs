// SPDX-License-Identifier: Apache-2.0

//! Catalog endpoints. Listing and detail are public; mutations require an admin.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::json;
use stray_paws_api::{require_str, ApiError, ApiErrorCode, ProductUpsertRequest};
use stray_paws_model::{unix_millis, Product, ProductId};

use crate::auth::{authenticate, require_admin};
use crate::http::handlers::{ok_json, parse_body, store_failure, ApiResult};
use crate::AppState;

fn product_not_found() -> ApiError {
    ApiError::not_found(ApiErrorCode::ProductNotFound, "product")
}

fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    ProductId::parse(raw).map_err(|_| product_not_found())
}

pub(crate) async fn list_products_handler(State(state): State<AppState>) -> ApiResult {
    let products = state
        .store
        .list_products()
        .await
        .map_err(|e| store_failure("list_products", e, ApiError::internal()))?;
    Ok(ok_json(json!({"success": true, "products": products})))
}

pub(crate) async fn product_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult {
    let product_id = parse_product_id(&id)?;
    let product = state
        .store
        .product_by_id(&product_id)
        .await
        .map_err(|e| store_failure("product_by_id", e, product_not_found()))?;
    Ok(ok_json(json!({"success": true, "product": product})))
}

pub(crate) async fn create_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let req: ProductUpsertRequest = parse_body(&body)?;
    let id = match req.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => ProductId::parse(raw).map_err(|e| ApiError::validation(e.to_string()))?,
        None => ProductId::parse(&state.mint_id("prd")).map_err(|_| ApiError::internal())?,
    };
    let name = require_str(&req.name, "name")?.to_string();
    let selling_price = req
        .selling_price
        .ok_or_else(|| ApiError::missing_field("sellingPrice"))?;
    let purchase_cost = req.purchase_cost.unwrap_or(0);
    if selling_price < 0 || purchase_cost < 0 {
        return Err(ApiError::validation("prices must not be negative").into());
    }
    let product = Product::new(
        id,
        name,
        req.description.clone().unwrap_or_default(),
        purchase_cost,
        selling_price,
        req.stock_quantity.unwrap_or(0),
        req.category.clone().unwrap_or_default(),
        req.features.clone().unwrap_or_default(),
        unix_millis(),
    );
    state
        .store
        .create_product(&product)
        .await
        .map_err(|e| store_failure("create_product", e, ApiError::internal()))?;
    Ok(ok_json(json!({"success": true, "product": product})))
}

/// Partial update: absent fields keep their stored values. Stock adjustments come
/// through here as well.
pub(crate) async fn update_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let product_id = parse_product_id(&id)?;
    let req: ProductUpsertRequest = parse_body(&body)?;
    let mut product = state
        .store
        .product_by_id(&product_id)
        .await
        .map_err(|e| store_failure("product_by_id", e, product_not_found()))?;
    if let Some(name) = req.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        product.name = name.to_string();
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(selling_price) = req.selling_price {
        if selling_price < 0 {
            return Err(ApiError::validation("sellingPrice must not be negative").into());
        }
        product.selling_price = selling_price;
    }
    if let Some(purchase_cost) = req.purchase_cost {
        if purchase_cost < 0 {
            return Err(ApiError::validation("purchaseCost must not be negative").into());
        }
        product.purchase_cost = purchase_cost;
    }
    if let Some(stock_quantity) = req.stock_quantity {
        product.stock_quantity = stock_quantity;
    }
    if let Some(category) = req.category {
        product.category = category;
    }
    if let Some(features) = req.features {
        product.features = features;
    }
    state
        .store
        .update_product(&product)
        .await
        .map_err(|e| store_failure("update_product", e, product_not_found()))?;
    Ok(ok_json(json!({"success": true, "product": product})))
}

pub(crate) async fn delete_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let product_id = parse_product_id(&id)?;
    state
        .store
        .delete_product(&product_id)
        .await
        .map_err(|e| store_failure("delete_product", e, product_not_found()))?;
    Ok(ok_json(json!({"success": true})))
}
