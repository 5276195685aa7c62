//! Read-only index over the example programs shipped with the gateway.
//!
//! Descriptions and previews are advisory metadata sniffed from loosely
//! structured text. Nothing here fails because a file lacks a comment.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub const DEFAULT_EXTENSION: &str = "ggcode";
pub const COMMENT_MARKER: &str = "//";
pub const PREVIEW_LINES: usize = 3;
pub const PREVIEW_CHARS: usize = 100;
pub const ELLIPSIS: &str = "...";

/// Summary of one example, as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleEntry {
    pub name: String,
    pub description: String,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleFile {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ExampleCatalog {
    directory: PathBuf,
    extension: String,
}

impl ExampleCatalog {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Summaries of every example file, sorted by name.
    ///
    /// Only regular files with the catalog extension are listed; symlinks and
    /// subdirectories are skipped.
    pub async fn list(&self) -> Result<Vec<ExampleEntry>, CatalogError> {
        let mut reader = fs::read_dir(&self.directory)
            .await
            .map_err(|err| self.directory_error(err))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| CatalogError::io(&self.directory, err))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| CatalogError::io(&path, err))?;
            if !file_type.is_file() || !self.has_extension(&path) {
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "skipping example with non UTF-8 name");
                continue;
            };

            if let Some(entry) = read_summary(name, &path).await {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = entries.len(), directory = %self.directory.display(), "listed examples");
        Ok(entries)
    }

    /// Full content of one example.
    ///
    /// `name` must be a bare file name inside the catalog directory.
    pub async fn get(&self, name: &str) -> Result<ExampleFile, CatalogError> {
        if let Err(err) = validate_name(name, &self.extension) {
            warn!(error = %err, "rejected example lookup");
            return Err(err);
        }

        let root = fs::canonicalize(&self.directory)
            .await
            .map_err(|err| self.directory_error(err))?;
        let resolved = match fs::canonicalize(root.join(name)).await {
            Ok(resolved) => resolved,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::FileMissing(name.to_string()))
            }
            Err(err) => return Err(CatalogError::io(root.join(name), err)),
        };

        if !resolved.starts_with(&root) {
            let err = CatalogError::InvalidName {
                name: name.to_string(),
                reason: "resolves outside the examples directory",
            };
            warn!(error = %err, target = %resolved.display(), "rejected example lookup");
            return Err(err);
        }

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|err| CatalogError::io(&resolved, err))?;
        if !metadata.is_file() {
            return Err(CatalogError::FileMissing(name.to_string()));
        }

        let bytes = fs::read(&resolved)
            .await
            .map_err(|err| CatalogError::io(&resolved, err))?;
        let content =
            String::from_utf8(bytes).map_err(|_| CatalogError::NotUtf8(name.to_string()))?;

        Ok(ExampleFile {
            name: name.to_string(),
            content,
        })
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension().and_then(OsStr::to_str) == Some(self.extension.as_str())
    }

    fn directory_error(&self, err: std::io::Error) -> CatalogError {
        if err.kind() == ErrorKind::NotFound {
            CatalogError::DirectoryMissing(self.directory.clone())
        } else {
            CatalogError::io(&self.directory, err)
        }
    }
}

/// Summary of one listed file. A file that cannot be read (for example one
/// removed after the directory scan) is left out of the listing.
async fn read_summary(name: String, path: &Path) -> Option<ExampleEntry> {
    match fs::read(path).await {
        Ok(bytes) => Some(summarize(name, &String::from_utf8_lossy(&bytes))),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable example");
            None
        }
    }
}

pub fn summarize(name: impl Into<String>, text: &str) -> ExampleEntry {
    ExampleEntry {
        name: name.into(),
        description: describe(text),
        preview: preview(text),
    }
}

/// First `//` comment line with the marker and surrounding whitespace
/// removed, or an empty string.
pub fn describe(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(COMMENT_MARKER))
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

/// First [`PREVIEW_LINES`] lines capped at [`PREVIEW_CHARS`] characters.
///
/// [`ELLIPSIS`] is appended only when something was cut off.
pub fn preview(text: &str) -> String {
    let head = text
        .lines()
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let mut preview: String = head.chars().take(PREVIEW_CHARS).collect();
    let truncated =
        head.chars().count() > PREVIEW_CHARS || text.lines().nth(PREVIEW_LINES).is_some();
    if truncated {
        preview.push_str(ELLIPSIS);
    }
    preview
}

fn validate_name(name: &str, extension: &str) -> Result<(), CatalogError> {
    let invalid = |reason: &'static str| {
        Err(CatalogError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        return invalid("path separators are not allowed");
    }
    if name.starts_with('.') {
        return invalid("hidden and relative names are not allowed");
    }

    let path = Path::new(name);
    let mut components = path.components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return invalid("name must be a single path segment");
    }

    if path.extension().and_then(OsStr::to_str) != Some(extension) {
        return invalid("unsupported file extension");
    }

    Ok(())
}
