use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use super::{ApiError, AppState};

/// Static bearer-token check in front of the file endpoints.
///
/// A request passes only when `Authorization` is exactly `Bearer <secret>`.
/// Without a configured secret every request is denied.
#[derive(Clone)]
pub struct ApiKeyGate {
    secret: Option<Arc<str>>,
}

impl ApiKeyGate {
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret.filter(|s| !s.is_empty()).map(Arc::from);
        if secret.is_none() {
            tracing::error!("API_SECRET_KEY is not set; all /api requests requiring a key will be denied");
        }
        Self { secret }
    }

    #[must_use]
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = &self.secret else {
            tracing::error!("API key is not configured; denying request");
            return false;
        };

        let Some(token) = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return false;
        };

        bool::from(token.as_bytes().ct_eq(secret.as_bytes()))
    }
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.gate.authorize(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
    ApiError::forbidden("Unauthorized: invalid or missing API key").into_response()
}
