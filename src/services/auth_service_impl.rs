//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::repositories::user::verify_password;
use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthService, PasswordChange, Registration};
use async_trait::async_trait;
use tracing::{error, info};

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let username = registration.username.trim();
        let email = registration.email.trim();

        if username.is_empty() || email.is_empty() || registration.password.is_empty() {
            return Err(AuthError::Validation("All fields are required".to_string()));
        }

        if registration.password != registration.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        let created = self
            .store
            .create_user(&NewUser {
                username,
                email,
                password: &registration.password,
                is_admin: false,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Registration error");
                AuthError::from(e)
            })?
            .ok_or(AuthError::Conflict)?;

        info!(user_id = created.id, username = %created.username, "User registered");
        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some((user, password_hash)) = self
            .store
            .get_user_by_email_with_password(email.trim())
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(user_id).await?)
    }

    async fn change_password(
        &self,
        user_id: i32,
        change: PasswordChange,
    ) -> Result<(), AuthError> {
        if change.current_password.is_empty()
            || change.new_password.is_empty()
            || change.confirm_password.is_empty()
        {
            return Err(AuthError::Validation("All fields are required".to_string()));
        }

        if change.new_password != change.confirm_password {
            return Err(AuthError::Validation(
                "New passwords do not match".to_string(),
            ));
        }

        let (_, password_hash) = self
            .store
            .get_user_with_password(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(password_hash, &change.current_password).await? {
            return Err(AuthError::WrongPassword);
        }

        self.store
            .update_user_password(user_id, &change.new_password)
            .await
            .map_err(|e| {
                error!(error = %e, user_id, "Password change error");
                AuthError::from(e)
            })?;

        info!(user_id, "Password changed");
        Ok(())
    }
}
