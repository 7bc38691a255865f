pub mod prelude;

pub mod request_logs;
pub mod tracked_files;
pub mod users;
