use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use rand::RngCore;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, FileService};
use crate::state::SharedState;

mod audit;
pub mod auth;
mod error;
mod files;
pub mod gate;
mod html;
mod observability;
mod pages;
pub mod session;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use gate::ApiKeyGate;
pub use types::*;

const SESSION_COOKIE_NAME: &str = "filewriter_session";

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub gate: ApiKeyGate,

    pub session_key: Key,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn file_service(&self) -> &Arc<dyn FileService> {
        &self.shared.file_service
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    let gate = ApiKeyGate::new(shared.config.security.api_key.clone());
    let session_key = session_key(shared.config.security.session_secret.as_deref());

    Arc::new(AppState {
        shared,
        gate,
        session_key,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

/// Derives the cookie-signing key from the configured secret, or generates a
/// throwaway key when none is set.
fn session_key(secret: Option<&str>) -> Key {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            tracing::warn!(
                "SESSION_SECRET is not set; using a random signing key, sessions will not survive a restart"
            );
            let mut bytes = [0u8; 64];
            rand::rng().fill_bytes(&mut bytes);
            Key::from(&bytes[..])
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let session_config = &state.config().session;
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(state.config().server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_config.idle_minutes,
        )))
        .with_signed(state.session_key.clone());

    let api_router = Router::new()
        .route("/health", get(system::health_check))
        .route("/docs", get(system::api_docs))
        .merge(create_gated_router(state.clone()));

    let protected_pages = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/change_password", post(auth::change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    let page_router = Router::new()
        .route("/", get(pages::index))
        .route(
            "/auth/register",
            get(auth::register_page).post(auth::register),
        )
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", get(auth::logout).post(auth::logout))
        .merge(protected_pages)
        .layer(session_layer);

    observability::with_request_tracing(
        Router::new()
            .nest("/api", api_router)
            .merge(page_router)
            .fallback(pages::not_found)
            .with_state(state),
    )
}

/// File endpoints: bearer-gated, and audited whether or not the gate lets them through.
/// File content has no size cap, so the default body limit is lifted here.
fn create_gated_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/write", post(files::write_file))
        .route("/append", post(files::append_file))
        .route("/generate", post(files::generate_module))
        .route(
            "/list",
            get(files::list_files_query).post(files::list_files_body),
        )
        .fallback(files::unknown_endpoint)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_api_key,
        ))
        .layer(middleware::from_fn_with_state(state, audit::record_request))
}
