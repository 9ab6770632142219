//! Error types for pkglink
//!
//! All fallible operations return `LinkResult<T>`. Conditions the provider
//! degrades on (stale bundles, unreadable folders, unresolved imports) are not
//! errors; they surface as filtered catalogs or `None` results instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pkglink operations
pub type LinkResult<T> = Result<T, LinkError>;

/// All errors that can occur in pkglink
#[derive(Error, Debug)]
pub enum LinkError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Bundle errors
    #[error("Failed to decode bundle {path}: {reason}")]
    BundleDecode { path: PathBuf, reason: String },

    #[error("Unsupported bundle format {major}.{minor} in {path} (expected {expected}.x)")]
    BundleVersion {
        path: PathBuf,
        major: u32,
        minor: u32,
        expected: u32,
    },

    #[error("Package {0} already holds a linked bundle")]
    AlreadyLinked(PathBuf),

    // Request errors
    #[error("No package provides {0}")]
    NoPackage(String),

    #[error("Cannot link {0}: its dependency closure contains an unresolvable package")]
    ClosureFailed(String),

    // Linker errors
    #[error("Linker fault for {uri}: {reason}")]
    LinkerFault { uri: String, reason: String },

    #[error("Linker returned no record for: {0}")]
    LinkerIncomplete(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LinkError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a linker fault for a single library URI
    pub fn linker_fault(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LinkerFault {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is raised by the external linker boundary
    pub fn is_linker_fault(&self) -> bool {
        matches!(self, Self::LinkerFault { .. } | Self::LinkerIncomplete(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoPackage(_) => Some(
                "Check that the package is listed under [packages] and that its output folder holds an up-to-date .full.ds bundle",
            ),
            Self::ClosureFailed(_) => Some("Run with -vv to see which import failed to resolve"),
            Self::BundleVersion { .. } => Some("Regenerate the bundle with a current summary tool"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LinkError::NoPackage("package:foo/foo.src".to_string());
        assert!(err.to_string().contains("No package provides package:foo/foo.src"));
    }

    #[test]
    fn error_hint() {
        let err = LinkError::ClosureFailed("package:a/a.src".to_string());
        assert_eq!(err.hint(), Some("Run with -vv to see which import failed to resolve"));
        assert!(LinkError::PathNotFound(PathBuf::from("/tmp/out")).hint().is_none());
    }

    #[test]
    fn linker_fault_classification() {
        assert!(LinkError::linker_fault("package:a/a.src", "boom").is_linker_fault());
        assert!(LinkError::LinkerIncomplete("package:a/a.src".to_string()).is_linker_fault());
        assert!(!LinkError::NoPackage("x".to_string()).is_linker_fault());
    }
}
