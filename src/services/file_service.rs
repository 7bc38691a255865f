//! Domain service for agent-driven file operations.
//!
//! Every operation is confined to the configured files root by the rules in
//! [`crate::services::paths`].

use serde::Serialize;
use thiserror::Error;

use super::paths::PathError;

/// Errors specific to file operations.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FileError {
    /// Classifies an OS error for `path`
    #[must_use]
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(format!("{path}: {source}"))
            }
            _ => Self::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

impl From<PathError> for FileError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::Traversal(_) => Self::Forbidden(err.to_string()),
            PathError::Empty | PathError::InvalidCharacter => Self::Validation(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for FileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub filename: String,
    pub bytes_written: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppendOutcome {
    pub filename: String,
    pub file_existed: bool,
    pub bytes_appended: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub filename: String,
    pub module: String,
    pub template: &'static str,
    pub overwritten: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub module: &'a str,
    pub module_type: Option<&'a str>,
    pub filename: Option<&'a str>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListRequest<'a> {
    pub directory: Option<&'a str>,
    pub pattern: Option<&'a str>,
    pub recursive: bool,
}

/// Metadata for one listed file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified: String,
    #[serde(rename = "type")]
    pub extension: String,
    pub last_modified_by: Option<String>,
    pub tracked_in_db: bool,
}

/// A listed file, or the reason its metadata could not be read.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FileEntry {
    Info(FileInfo),
    Failed {
        name: String,
        path: String,
        error: String,
    },
}

impl FileEntry {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Info(info) => &info.path,
            Self::Failed { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOutcome {
    pub directory: String,
    pub pattern: Option<String>,
    pub recursive: bool,
    pub count: usize,
    pub files: Vec<FileEntry>,
}

/// Domain service trait for file operations.
#[async_trait::async_trait]
pub trait FileService: Send + Sync {
    /// Creates or truncates `filename` with `content`. Empty content clears the file.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Forbidden`] if the path escapes the root.
    async fn write_file(&self, filename: &str, content: &str) -> Result<WriteOutcome, FileError>;

    /// Appends `content`, separated by a newline when the file already has content.
    async fn append_file(&self, filename: &str, content: &str)
    -> Result<AppendOutcome, FileError>;

    /// Writes a scaffold module.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::Conflict`] if the target exists and `overwrite` is false.
    async fn generate_module(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<GenerateOutcome, FileError>;

    /// Lists files under a directory, optionally recursively and filtered by a glob.
    async fn list_files(&self, request: ListRequest<'_>) -> Result<ListOutcome, FileError>;
}
