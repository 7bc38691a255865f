use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{CurrentUser, current_user};
use super::{AppState, html, session};
use crate::db::User;

const DASHBOARD_LOG_LIMIT: u64 = 20;

/// Errors from page handlers, rendered as the HTML error page.
#[derive(Debug)]
pub enum PageError {
    NotFound,
    Internal(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Page not found"),
            Self::Internal(msg) => {
                tracing::error!("Page error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error occurred")
            }
        };

        let page = html::layout(message, None, &[], &html::error_body(message));
        (status, Html(page)).into_response()
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tower_sessions::session::Error> for PageError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("Session error: {err}"))
    }
}

/// Renders a full page, consuming any pending flash messages.
pub(super) async fn render(
    session: &Session,
    title: &str,
    user: Option<&User>,
    body: &str,
) -> Html<String> {
    let flashes = session::take_flashes(session).await;
    Html(html::layout(title, user, &flashes, body))
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>, session: Session) -> Html<String> {
    let user = current_user(&state, &session).await;
    render(&session, "Home", user.as_ref(), &html::index_body(user.as_ref())).await
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> Result<Html<String>, PageError> {
    let files = state.store().list_tracked_files().await?;
    let logs = state
        .store()
        .recent_request_logs(DASHBOARD_LOG_LIMIT)
        .await?;

    let user_count = if user.is_admin {
        Some(state.store().count_users().await?)
    } else {
        None
    };

    let body = html::dashboard_body(&user, user_count, &files, &logs);
    Ok(render(&session, "Dashboard", Some(&user), &body).await)
}

/// Fallback for unknown page routes.
pub async fn not_found() -> PageError {
    PageError::NotFound
}
