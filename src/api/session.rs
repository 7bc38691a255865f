//! Session-cookie identity for the HTML pages.
//!
//! The session stores only the user id. Everything else is reloaded from the
//! database on each request so deactivating an account takes effect at once.

use serde::{Deserialize, Serialize};
use tower_sessions::{Expiry, Session};

use crate::config::SessionConfig;
use crate::db::User;

const USER_ID_KEY: &str = "user_id";
const FLASHES_KEY: &str = "_flashes";

/// Anything that can be bound to a browser session.
pub trait SessionIdentity {
    fn session_user_id(&self) -> i32;

    /// Inactive accounts keep their row but cannot hold a session.
    fn can_hold_session(&self) -> bool;
}

impl SessionIdentity for User {
    fn session_user_id(&self) -> i32 {
        self.id
    }

    fn can_hold_session(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Danger => "flash-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Binds `identity` to the session under a fresh id.
pub async fn establish(
    session: &Session,
    identity: &impl SessionIdentity,
    remember: bool,
    config: &SessionConfig,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(USER_ID_KEY, identity.session_user_id())
        .await?;

    if remember {
        session.set_expiry(Some(Expiry::OnInactivity(time::Duration::days(
            config.remember_days,
        ))));
    }

    Ok(())
}

/// Drops all session data, restores the idle expiry and rotates the id.
/// Safe to call without a session.
pub async fn terminate(
    session: &Session,
    config: &SessionConfig,
) -> Result<(), tower_sessions::session::Error> {
    session.clear().await;
    session.set_expiry(Some(Expiry::OnInactivity(time::Duration::minutes(
        config.idle_minutes,
    ))));
    session.cycle_id().await
}

pub async fn user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(USER_ID_KEY).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    }
}

pub async fn push_flash(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut flashes = session
        .get::<Vec<Flash>>(FLASHES_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(Flash {
        level,
        message: message.into(),
    });

    if let Err(e) = session.insert(FLASHES_KEY, flashes).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Removes and returns pending flash messages.
pub async fn take_flashes(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(FLASHES_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Accepts only same-origin absolute paths as post-login redirect targets.
#[must_use]
pub fn safe_redirect_target(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then_some(next)
}
