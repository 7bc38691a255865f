pub mod request_log;
pub mod tracked_file;
pub mod user;
