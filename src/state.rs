use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuditLogger, AuthService, FileService, LocalFileService, SeaOrmAuthService,
};

/// Long-lived services shared by the HTTP layer and the CLI.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub file_service: Arc<dyn FileService>,

    pub audit: AuditLogger,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_options(&config.database).await?;

        let files_root = config.files_root();
        if !files_root.exists() {
            tokio::fs::create_dir_all(&files_root).await?;
        }

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService>;

        let file_service = Arc::new(LocalFileService::new(
            files_root,
            store.clone(),
            config.files.writer_label.clone(),
        )) as Arc<dyn FileService>;

        let audit = AuditLogger::new(store.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            file_service,
            audit,
        })
    }
}
