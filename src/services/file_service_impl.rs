//! Local-filesystem implementation of the `FileService` trait.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::db::Store;
use crate::services::file_service::{
    AppendOutcome, FileEntry, FileError, FileInfo, FileService, GenerateOutcome, GenerateRequest,
    ListOutcome, ListRequest, WriteOutcome,
};
use crate::services::paths::{self, SafePath};
use crate::services::pattern::FilePattern;
use crate::services::scaffold::ScaffoldKind;

pub struct LocalFileService {
    root: PathBuf,
    store: Store,
    writer_label: String,
}

impl LocalFileService {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, store: Store, writer_label: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            store,
            writer_label: writer_label.into(),
        }
    }

    /// Resolves a path that must name a file rather than the root itself.
    fn resolve_file(&self, filename: &str) -> Result<SafePath, FileError> {
        let target = paths::resolve(&self.root, filename)?;
        if target.is_root() {
            return Err(FileError::Validation(format!(
                "{filename} does not name a file"
            )));
        }
        Ok(target)
    }

    async fn ensure_parent(target: &SafePath) -> Result<(), FileError> {
        if let Some(parent) = target.full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::from_io(&target.relative, e))?;
        }
        Ok(())
    }

    /// Records the write in the tracked-file table. Failures are logged, not returned.
    async fn track(&self, target: &SafePath) {
        if let Err(e) = self
            .store
            .touch_tracked_file(&target.relative, &self.writer_label)
            .await
        {
            error!(error = %e, filename = %target.relative, "Failed to update file record");
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

#[async_trait]
impl FileService for LocalFileService {
    async fn write_file(&self, filename: &str, content: &str) -> Result<WriteOutcome, FileError> {
        let target = self.resolve_file(filename)?;
        Self::ensure_parent(&target).await?;

        tokio::fs::write(&target.full, content)
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;

        self.track(&target).await;
        info!(filename = %target.relative, bytes = content.len(), "File written");

        Ok(WriteOutcome {
            filename: target.relative,
            bytes_written: content.len(),
            timestamp: now(),
        })
    }

    async fn append_file(
        &self,
        filename: &str,
        content: &str,
    ) -> Result<AppendOutcome, FileError> {
        let target = self.resolve_file(filename)?;
        Self::ensure_parent(&target).await?;

        let (file_existed, has_content) = match tokio::fs::metadata(&target.full).await {
            Ok(meta) if meta.is_dir() => {
                return Err(FileError::Validation(format!(
                    "{} is a directory",
                    target.relative
                )));
            }
            Ok(meta) => (true, meta.len() > 0),
            Err(e) if e.kind() == ErrorKind::NotFound => (false, false),
            Err(e) => return Err(FileError::from_io(&target.relative, e)),
        };

        let mut data = String::with_capacity(content.len() + 1);
        if has_content {
            data.push('\n');
        }
        data.push_str(content);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target.full)
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;
        file.write_all(data.as_bytes())
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;
        file.flush()
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;

        self.track(&target).await;
        info!(filename = %target.relative, file_existed, bytes = data.len(), "File appended");

        Ok(AppendOutcome {
            filename: target.relative,
            file_existed,
            bytes_appended: data.len(),
            timestamp: now(),
        })
    }

    async fn generate_module(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<GenerateOutcome, FileError> {
        let module = request.module.trim();
        if module.is_empty() {
            return Err(FileError::Validation("Module name is required".to_string()));
        }

        let default_filename = format!("{module}.py");
        let filename = request
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(&default_filename);

        let target = self.resolve_file(filename)?;

        let exists = tokio::fs::try_exists(&target.full)
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;
        if exists && !request.overwrite {
            return Err(FileError::Conflict(format!(
                "File {} already exists. Set overwrite=true to replace it.",
                target.relative
            )));
        }

        let kind = ScaffoldKind::from_type(request.module_type);
        let content = kind.render(module);

        Self::ensure_parent(&target).await?;
        tokio::fs::write(&target.full, &content)
            .await
            .map_err(|e| FileError::from_io(&target.relative, e))?;

        self.track(&target).await;
        info!(
            filename = %target.relative,
            template = kind.name(),
            overwritten = exists,
            "Module generated"
        );

        Ok(GenerateOutcome {
            filename: target.relative,
            module: module.to_string(),
            template: kind.name(),
            overwritten: exists,
            timestamp: now(),
        })
    }

    async fn list_files(&self, request: ListRequest<'_>) -> Result<ListOutcome, FileError> {
        let directory = request
            .directory
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(".");
        let dir = paths::resolve(&self.root, directory)?;

        match tokio::fs::metadata(&dir.full).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(FileError::Validation(format!(
                    "{directory} is not a directory"
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FileError::NotFound(format!(
                    "Directory {directory} does not exist"
                )));
            }
            Err(e) => return Err(FileError::from_io(&dir.relative, e)),
        }

        let pattern = request
            .pattern
            .filter(|p| !p.is_empty())
            .map(FilePattern::new)
            .transpose()
            .map_err(|e| FileError::Validation(format!("Invalid pattern: {e}")))?;

        let tracked: HashMap<String, String> = self
            .store
            .list_tracked_files()
            .await?
            .into_iter()
            .map(|f| (f.filename, f.modified_by))
            .collect();

        let recursive = request.recursive;
        let scan_dir = dir.clone();
        let scan_pattern = pattern.clone();

        let mut files = tokio::task::spawn_blocking(move || {
            collect_entries(&scan_dir, scan_pattern.as_ref(), recursive, &tracked)
        })
        .await
        .map_err(|e| FileError::Internal(e.to_string()))?;

        files.sort_by(|a, b| a.path().cmp(b.path()));

        Ok(ListOutcome {
            directory: dir.relative,
            pattern: pattern.map(|p| p.as_str().to_string()),
            recursive,
            count: files.len(),
            files,
        })
    }
}

fn collect_entries(
    dir: &SafePath,
    pattern: Option<&FilePattern>,
    recursive: bool,
    tracked: &HashMap<String, String>,
) -> Vec<FileEntry> {
    let walker = walkdir::WalkDir::new(&dir.full)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .follow_links(false);

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.path().is_file())
        .filter(|e| {
            pattern.is_none_or(|p| p.matches(&e.file_name().to_string_lossy()))
        })
        .map(|e| {
            let relative_to_dir = e
                .path()
                .strip_prefix(&dir.full)
                .unwrap_or_else(|_| e.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            file_entry(e.path(), dir.child(&relative_to_dir), tracked)
        })
        .collect()
}

fn file_entry(full_path: &Path, relative: String, tracked: &HashMap<String, String>) -> FileEntry {
    let name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let meta = match std::fs::metadata(full_path) {
        Ok(meta) => meta,
        Err(e) => {
            error!(path = %full_path.display(), error = %e, "Error getting file info");
            return FileEntry::Failed {
                name,
                path: relative,
                error: e.to_string(),
            };
        }
    };

    let modified = match meta.modified() {
        Ok(time) => DateTime::<Utc>::from(time).to_rfc3339(),
        Err(e) => {
            error!(path = %full_path.display(), error = %e, "Error getting file info");
            return FileEntry::Failed {
                name,
                path: relative,
                error: e.to_string(),
            };
        }
    };

    let extension = full_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let last_modified_by = tracked.get(&relative).cloned();

    FileEntry::Info(FileInfo {
        name,
        tracked_in_db: last_modified_by.is_some(),
        last_modified_by,
        path: relative,
        size: meta.len(),
        modified,
        extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "hello").unwrap();

        let tracked = HashMap::from([("notes.md".to_string(), "Amaru".to_string())]);
        let FileEntry::Info(info) = file_entry(&path, "notes.md".to_string(), &tracked) else {
            panic!("expected metadata");
        };

        assert_eq!(info.name, "notes.md");
        assert_eq!(info.size, 5);
        assert_eq!(info.extension, "md");
        assert!(info.tracked_in_db);
        assert_eq!(info.last_modified_by.as_deref(), Some("Amaru"));
    }

    #[test]
    fn test_file_entry_captures_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");

        let entry = file_entry(&path, "gone.txt".to_string(), &HashMap::new());
        assert!(matches!(entry, FileEntry::Failed { ref name, .. } if name == "gone.txt"));
    }

    #[test]
    fn test_collect_entries_respects_depth_and_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::write(dir.path().join("a.py"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("sub/c.py"), "").unwrap();
        std::fs::write(dir.path().join("sub/deeper/d.py"), "").unwrap();

        let root = paths::resolve(dir.path(), ".").unwrap();
        let py = FilePattern::new("*.py").unwrap();

        let mut flat: Vec<String> = collect_entries(&root, None, false, &HashMap::new())
            .iter()
            .map(|e| e.path().to_string())
            .collect();
        flat.sort();
        assert_eq!(flat, vec!["a.py", "b.txt"]);

        let mut deep: Vec<String> = collect_entries(&root, Some(&py), true, &HashMap::new())
            .iter()
            .map(|e| e.path().to_string())
            .collect();
        deep.sort();
        assert_eq!(deep, vec!["a.py", "sub/c.py", "sub/deeper/d.py"]);

        let sub = paths::resolve(dir.path(), "sub").unwrap();
        let nested: Vec<String> = collect_entries(&sub, None, false, &HashMap::new())
            .iter()
            .map(|e| e.path().to_string())
            .collect();
        assert_eq!(nested, vec!["sub/c.py"]);
    }
}
