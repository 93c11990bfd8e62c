#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use stray_paws_model::{sha256_hex, unix_millis, Role, UserAccount, UserId};
use stray_paws_server::{build_router, ApiConfig, AppState};
use stray_paws_store::{SqliteStore, Store, StoreError};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("STRAY_PAWS_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Seed an admin account and session token from the environment. Intended for
/// first boot; an already-registered admin email is left as it is.
async fn bootstrap_admin(store: &dyn Store) -> Result<(), String> {
    let (Ok(email), Ok(token)) = (
        env::var("STRAY_PAWS_BOOTSTRAP_ADMIN_EMAIL"),
        env::var("STRAY_PAWS_BOOTSTRAP_ADMIN_TOKEN"),
    ) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();
    let token = token.trim().to_string();
    if email.is_empty() || token.is_empty() {
        return Ok(());
    }
    let admin_id = match store.account_by_email(&email).await {
        Ok(existing) => {
            if existing.role != Role::Admin {
                warn!(email, "bootstrap admin email belongs to a non-admin account");
            }
            existing.id
        }
        Err(StoreError::NotFound) => {
            let password = env::var("STRAY_PAWS_BOOTSTRAP_ADMIN_PASSWORD")
                .map_err(|_| "STRAY_PAWS_BOOTSTRAP_ADMIN_PASSWORD is required when bootstrapping a new admin".to_string())?;
            let id = UserId::parse(&format!("usr-admin-{millis:011x}", millis = unix_millis()))
                .map_err(|e| format!("admin id: {e}"))?;
            let account = UserAccount::registered(
                id.clone(),
                "Administrator".to_string(),
                email.clone(),
                sha256_hex(password.as_bytes()),
                Role::Admin,
                unix_millis(),
            );
            store
                .create_account(&account)
                .await
                .map_err(|e| format!("create bootstrap admin: {e}"))?;
            info!(email, "bootstrap admin account created");
            id
        }
        Err(e) => return Err(format!("bootstrap admin lookup: {e}")),
    };
    store
        .insert_session(&token, &admin_id)
        .await
        .map_err(|e| format!("bootstrap admin session: {e}"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("STRAY_PAWS_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path = env::var("STRAY_PAWS_DB").unwrap_or_else(|_| "straypaws.db".to_string());

    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("STRAY_PAWS_MAX_BODY_BYTES", 64 * 1024),
        readiness_requires_store: env_bool("STRAY_PAWS_READINESS_REQUIRES_STORE", true),
        lookup_retry_attempts: env_usize("STRAY_PAWS_LOOKUP_RETRY_ATTEMPTS", 4),
        lookup_retry_backoff_ms: env_u64("STRAY_PAWS_LOOKUP_RETRY_BASE_MS", 120),
        ..ApiConfig::default()
    };

    let store: Arc<dyn Store> = if db_path == ":memory:" {
        Arc::new(SqliteStore::open_in_memory().map_err(|e| format!("open store: {e}"))?)
    } else {
        Arc::new(
            SqliteStore::open(&PathBuf::from(&db_path))
                .map_err(|e| format!("open store at {db_path}: {e}"))?,
        )
    };

    if let Err(e) = bootstrap_admin(store.as_ref()).await {
        error!("admin bootstrap failed: {e}");
        return Err(e);
    }

    let state = AppState::with_config(store, api_cfg);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!(db = %db_path, "stray-paws-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
