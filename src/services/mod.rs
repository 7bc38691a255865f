pub mod audit;
pub use audit::AuditLogger;

pub mod auth_service;
pub use auth_service::{AuthError, AuthService, PasswordChange, Registration};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod file_service;
pub use file_service::{FileError, FileService};

pub mod file_service_impl;
pub use file_service_impl::LocalFileService;

pub mod paths;
pub mod pattern;
pub mod scaffold;
