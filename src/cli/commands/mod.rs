mod files;
mod logs;
mod user;

pub use files::cmd_files;
pub use logs::cmd_logs;
pub use user::{cmd_user_create, cmd_user_set_active, cmd_user_set_admin};
