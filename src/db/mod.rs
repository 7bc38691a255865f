use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::request_log::{NewRequestLog, RequestLog};
pub use repositories::tracked_file::TrackedFile;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_options(&DatabaseConfig {
            url: db_url.to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    pub async fn with_options(config: &DatabaseConfig) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let db_url = config.url.as_str();
        let in_memory = db_url.contains(":memory:");

        if let Some(path_str) = db_url.strip_prefix("sqlite:")
            && !in_memory
        {
            let path_str = path_str.trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .test_before_acquire(config.test_before_acquire)
            .sqlx_logging(false);

        // Every connection to an in-memory SQLite database sees its own empty
        // database, so the pool must hold exactly one.
        if in_memory {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
                .max_lifetime(Duration::from_secs(config.idle_timeout_seconds * 2));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            config.min_connections, config.max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn tracked_file_repo(&self) -> repositories::tracked_file::TrackedFileRepository {
        repositories::tracked_file::TrackedFileRepository::new(self.conn.clone())
    }

    fn request_log_repo(&self) -> repositories::request_log::RequestLogRepository {
        repositories::request_log::RequestLogRepository::new(self.conn.clone())
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn get_user_with_password(&self, id: i32) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_id_with_password(id).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_user(&self, new_user: &NewUser<'_>) -> Result<Option<User>> {
        self.user_repo().create(new_user).await
    }

    pub async fn update_user_password(&self, id: i32, new_password: &str) -> Result<()> {
        self.user_repo().update_password(id, new_password).await
    }

    pub async fn set_user_active(&self, email: &str, is_active: bool) -> Result<bool> {
        self.user_repo().set_active(email, is_active).await
    }

    pub async fn set_user_admin(&self, email: &str, is_admin: bool) -> Result<bool> {
        self.user_repo().set_admin(email, is_admin).await
    }

    pub async fn touch_tracked_file(&self, filename: &str, label: &str) -> Result<TrackedFile> {
        self.tracked_file_repo().touch(filename, label).await
    }

    pub async fn get_tracked_file(&self, filename: &str) -> Result<Option<TrackedFile>> {
        self.tracked_file_repo().get(filename).await
    }

    pub async fn list_tracked_files(&self) -> Result<Vec<TrackedFile>> {
        self.tracked_file_repo().list().await
    }

    pub async fn add_request_log(&self, entry: NewRequestLog) -> Result<()> {
        self.request_log_repo().add(entry).await
    }

    pub async fn recent_request_logs(&self, limit: u64) -> Result<Vec<RequestLog>> {
        self.request_log_repo().recent(limit).await
    }

    pub async fn count_request_logs(&self) -> Result<u64> {
        self.request_log_repo().count().await
    }

    pub async fn count_request_logs_with_status(
        &self,
        endpoint: &str,
        status_code: u16,
    ) -> Result<u64> {
        self.request_log_repo()
            .count_with_status(endpoint, status_code)
            .await
    }
}
