#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use stray_paws_model::unix_millis;
use stray_paws_store::Store;

mod auth;
mod config;
mod http;
mod middleware;
mod services;
mod telemetry;

pub use config::{ApiConfig, CONFIG_SCHEMA_VERSION};

pub const CRATE_NAME: &str = "stray-paws-server";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub api: ApiConfig,
    pub ready: Arc<AtomicBool>,
    pub(crate) metrics: Arc<telemetry::RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
    pub(crate) id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<dyn Store>, api: ApiConfig) -> Self {
        Self {
            store,
            api,
            ready: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(telemetry::RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
            id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Mint a document id: time-ordered, unique within the process.
    pub(crate) fn mint_id(&self, prefix: &str) -> String {
        let seq = self.id_seed.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{millis:011x}{seq:04x}", millis = unix_millis())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/version", get(http::handlers::version_handler))
        .route("/api/users/register", post(http::users::register_handler))
        .route("/api/users/me", get(http::users::me_handler))
        .route(
            "/api/products",
            get(http::catalog::list_products_handler).post(http::catalog::create_product_handler),
        )
        .route(
            "/api/products/:id",
            get(http::catalog::product_detail_handler)
                .put(http::catalog::update_product_handler)
                .delete(http::catalog::delete_product_handler),
        )
        .route("/api/orders/place", post(http::orders::place_order_handler))
        .route("/api/orders/all", get(http::orders::list_all_handler))
        .route("/api/orders/mine", get(http::orders::list_mine_handler))
        .route(
            "/api/orders/:id",
            put(http::orders::update_status_handler).delete(http::orders::delete_order_handler),
        )
        .route("/api/points/load", post(http::ledger::load_points_handler))
        .route("/api/teams", post(http::teams::create_team_handler))
        .route("/api/teams/:id/invite", post(http::teams::invite_handler))
        .route(
            "/api/invitations/:id/respond",
            post(http::teams::respond_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
