pub use super::request_logs::Entity as RequestLogs;
pub use super::tracked_files::Entity as TrackedFiles;
pub use super::users::Entity as Users;
