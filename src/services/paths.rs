//! Path confinement for user-supplied filenames and directories.
//!
//! Paths are normalized lexically (`.` dropped, `a/../b` collapsed to `b`) and
//! rejected if the result is absolute or starts with `..`. The prefix test also
//! refuses names like `..hidden` that stay inside the root. The check
//! never touches the filesystem, so a symlink inside the root that points
//! elsewhere is followed by the subsequent file operation. That gap is known.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Path cannot be empty")]
    Empty,

    #[error("Path contains a NUL byte")]
    InvalidCharacter,

    #[error("Access denied: {0} is outside the working directory")]
    Traversal(String),
}

/// A path that passed the confinement check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath {
    /// Normalized `/`-separated path relative to the root, `.` for the root itself
    pub relative: String,

    /// `root` joined with `relative`
    pub full: PathBuf,
}

impl SafePath {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative == "."
    }

    /// Relative path of a child entry, as stored in the tracked-file table
    #[must_use]
    pub fn child(&self, name: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}/{name}", self.relative)
        }
    }
}

/// Lexical normalization in the style of POSIX `normpath`.
///
/// Leading `..` components that cannot be collapsed are kept, which is what
/// [`resolve`] looks for.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn is_absolute(raw: &str) -> bool {
    raw.starts_with('/') || raw.starts_with('\\') || Path::new(raw).is_absolute()
}

/// Normalizes `raw` and confines it to `root`.
pub fn resolve(root: &Path, raw: &str) -> Result<SafePath, PathError> {
    if raw.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if raw.contains('\0') {
        return Err(PathError::InvalidCharacter);
    }

    let normalized = normalize(raw);
    if is_absolute(raw) || normalized.starts_with("..") {
        return Err(PathError::Traversal(raw.to_string()));
    }

    let full = if normalized == "." {
        root.to_path_buf()
    } else {
        root.join(&normalized)
    };

    Ok(SafePath {
        relative: normalized,
        full,
    })
}
