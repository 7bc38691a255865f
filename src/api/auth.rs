use axum::{
    Extension, Form,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::pages::{PageError, render};
use super::session::{self, FlashLevel, SessionIdentity};
use super::{AppState, html};
use crate::db::User;
use crate::services::{AuthError, PasswordChange, Registration};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub remember: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// The logged-in user, placed in request extensions by [`require_login`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

// ============================================================================
// Middleware
// ============================================================================

/// Redirects anonymous visitors to the login page, remembering where they were going.
pub async fn require_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = current_user(&state, &session).await {
        tracing::Span::current().record("user_id", user.id);
        request.extensions_mut().insert(CurrentUser(user));
        return next.run(request).await;
    }

    session::push_flash(&session, FlashLevel::Info, "Please log in to access this page.").await;

    let target = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(target))).into_response()
}

/// Resolves the session to an active user. Stale or deactivated sessions are ended.
pub async fn current_user(state: &AppState, session: &Session) -> Option<User> {
    let user_id = session::user_id(session).await?;

    match state.auth_service().get_user(user_id).await {
        Ok(Some(user)) if user.can_hold_session() => Some(user),
        Ok(_) => {
            tracing::info!(user_id, "Ending session for missing or inactive user");
            if let Err(e) = session::terminate(session, &state.config().session).await {
                tracing::warn!(error = %e, "Failed to end stale session");
            }
            None
        }
        Err(e) => {
            tracing::error!(error = %e, user_id, "Failed to load session user");
            None
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /auth/register
pub async fn register_page(State(state): State<Arc<AppState>>, session: Session) -> Response {
    if current_user(&state, &session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    render(&session, "Register", None, &html::register_body("", ""))
        .await
        .into_response()
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if current_user(&state, &session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let registration = Registration {
        username: form.username.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        password: form.password.unwrap_or_default(),
        confirm_password: form.confirm_password.unwrap_or_default(),
    };
    let (username, email) = (registration.username.clone(), registration.email.clone());

    match state.auth_service().register(registration).await {
        Ok(_) => {
            session::push_flash(
                &session,
                FlashLevel::Success,
                "Registration successful! You can now log in.",
            )
            .await;
            Redirect::to("/auth/login").into_response()
        }
        Err(e) => {
            let status = form_error_status(&e);
            session::push_flash(&session, FlashLevel::Danger, e.user_message()).await;
            let page = render(
                &session,
                "Register",
                None,
                &html::register_body(&username, &email),
            )
            .await;
            (status, page).into_response()
        }
    }
}

/// GET /auth/login
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<NextQuery>,
) -> Response {
    if current_user(&state, &session).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let next = session::safe_redirect_target(query.next.as_deref());
    render(&session, "Log in", None, &html::login_body("", next))
        .await
        .into_response()
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = form.email.unwrap_or_default();
    let password = form.password.unwrap_or_default();
    let remember = form.remember.is_some_and(|v| !v.is_empty());
    let next = session::safe_redirect_target(query.next.as_deref());

    match state.auth_service().login(&email, &password).await {
        Ok(user) => {
            session::establish(&session, &user, remember, &state.config().session).await?;
            session::push_flash(&session, FlashLevel::Success, "Login successful!").await;
            tracing::info!(user_id = user.id, remember, "User logged in");
            Ok(Redirect::to(next.unwrap_or("/")).into_response())
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials | AuthError::Inactive) {
                tracing::warn!(reason = %e, "Failed login attempt");
            }
            let status = form_error_status(&e);
            session::push_flash(&session, FlashLevel::Danger, e.user_message()).await;
            let page = render(&session, "Log in", None, &html::login_body(&email, next)).await;
            Ok((status, page).into_response())
        }
    }
}

/// GET|POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Redirect, PageError> {
    session::terminate(&session, &state.config().session).await?;
    session::push_flash(&session, FlashLevel::Info, "You have been logged out.").await;
    Ok(Redirect::to("/"))
}

/// GET /auth/profile
pub async fn profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
) -> impl IntoResponse {
    render(&session, "Profile", Some(&user), &html::profile_body(&user)).await
}

/// POST /auth/change_password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<ChangePasswordForm>,
) -> Redirect {
    let change = PasswordChange {
        current_password: form.current_password.unwrap_or_default(),
        new_password: form.new_password.unwrap_or_default(),
        confirm_password: form.confirm_password.unwrap_or_default(),
    };

    match state.auth_service().change_password(user.id, change).await {
        Ok(()) => {
            session::push_flash(&session, FlashLevel::Success, "Password changed successfully")
                .await;
        }
        Err(e) => {
            session::push_flash(&session, FlashLevel::Danger, e.user_message()).await;
        }
    }

    Redirect::to("/auth/profile")
}

const fn form_error_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Conflict => StatusCode::CONFLICT,
        AuthError::InvalidCredentials | AuthError::Inactive | AuthError::WrongPassword => {
            StatusCode::FORBIDDEN
        }
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
