use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures raised while handing source text to the external compiler.
///
/// Compiler diagnostics are not errors here: whatever text the compiler
/// returns is passed through as output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Encoding error: source contains a zero byte at offset {position}")]
    Encoding { position: usize },

    #[error("Compiler unavailable: {0}")]
    Unavailable(String),

    #[error("Compilation timed out after {after:?}")]
    Timeout { after: Duration },
}

impl BridgeError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Stable machine-readable label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::Encoding { .. } => "encoding",
            BridgeError::Unavailable(_) => "unavailable",
            BridgeError::Timeout { .. } => "timeout",
        }
    }
}

/// Example catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Examples directory not found: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("File not found: {0}")]
    FileMissing(String),

    #[error("Invalid example name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Example '{0}' is not valid UTF-8")]
    NotUtf8(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Message safe to return to HTTP callers. Filesystem paths stay in logs.
    pub fn public_message(&self) -> String {
        match self {
            CatalogError::DirectoryMissing(_) => "Examples directory not found".to_string(),
            CatalogError::FileMissing(_) | CatalogError::InvalidName { .. } => {
                "File not found".to_string()
            }
            CatalogError::NotUtf8(name) => format!("Example '{}' is not valid UTF-8", name),
            CatalogError::Io { source, .. } => format!("Failed to read example: {}", source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_names_are_reported_as_missing_files() {
        let err = CatalogError::InvalidName {
            name: "../etc/passwd".to_string(),
            reason: "path separators are not allowed",
        };
        assert_eq!(err.public_message(), "File not found");
        assert!(err.to_string().contains("../etc/passwd"));
    }

    #[test]
    fn directory_message_hides_path() {
        let err = CatalogError::DirectoryMissing(PathBuf::from("/srv/private/examples"));
        assert_eq!(err.public_message(), "Examples directory not found");
    }

    #[test]
    fn bridge_error_kinds() {
        assert_eq!(BridgeError::Encoding { position: 3 }.kind(), "encoding");
        assert_eq!(BridgeError::unavailable("gone").kind(), "unavailable");
        assert_eq!(BridgeError::Timeout { after: Duration::from_secs(1) }.kind(), "timeout");
    }
}
