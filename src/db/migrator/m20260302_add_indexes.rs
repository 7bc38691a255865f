use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Tracked files are looked up by filename on every write and listing
        manager
            .create_index(
                Index::create()
                    .name("idx_tracked_files_filename")
                    .table(TrackedFiles::Table)
                    .col(TrackedFiles::Filename)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_request_logs_timestamp")
                    .table(RequestLogs::Table)
                    .col(RequestLogs::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_request_logs_timestamp")
                    .table(RequestLogs::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracked_files_filename")
                    .table(TrackedFiles::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum TrackedFiles {
    Table,
    Filename,
}

#[derive(Iden)]
enum RequestLogs {
    Table,
    Timestamp,
}
