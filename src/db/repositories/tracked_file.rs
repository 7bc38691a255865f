use crate::entities::{prelude::*, tracked_files};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub type TrackedFile = tracked_files::Model;

pub struct TrackedFileRepository {
    conn: DatabaseConnection,
}

impl TrackedFileRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates the row on first write, otherwise bumps `last_modified`.
    ///
    /// The lookup and the write are not serialized against other requests, so
    /// two concurrent first writes of the same file can both insert.
    pub async fn touch(&self, filename: &str, label: &str) -> Result<TrackedFile> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = TrackedFiles::find()
            .filter(tracked_files::Column::Filename.eq(filename))
            .one(&self.conn)
            .await
            .context("Failed to query tracked file")?;

        let model = if let Some(existing) = existing {
            let mut active: tracked_files::ActiveModel = existing.into();
            active.last_modified = Set(now);
            active.update(&self.conn).await?
        } else {
            tracked_files::ActiveModel {
                filename: Set(filename.to_string()),
                last_modified: Set(now),
                modified_by: Set(label.to_string()),
                ..Default::default()
            }
            .insert(&self.conn)
            .await?
        };

        Ok(model)
    }

    pub async fn get(&self, filename: &str) -> Result<Option<TrackedFile>> {
        TrackedFiles::find()
            .filter(tracked_files::Column::Filename.eq(filename))
            .one(&self.conn)
            .await
            .context("Failed to query tracked file")
    }

    pub async fn list(&self) -> Result<Vec<TrackedFile>> {
        TrackedFiles::find()
            .order_by_asc(tracked_files::Column::Filename)
            .all(&self.conn)
            .await
            .context("Failed to list tracked files")
    }
}
