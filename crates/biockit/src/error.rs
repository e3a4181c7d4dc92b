//! Error types for environment reconciliation.
//!
//! Only configuration and parse failures are allowed to surface as `Err`:
//! anything scoped to a single package (install failure, availability miss,
//! bad remote ref) is carried as a report row instead, so one bad package
//! never aborts a batch.

use std::path::PathBuf;
use thiserror::Error;

/// Broad categories used for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Cluster detection or required path/env configuration failed
    Configuration,
    /// The manifest file could not be parsed
    Parse,
    /// Filesystem failure
    Io,
    /// Registry or other remote endpoint unreachable
    Network,
    /// Other/unexpected errors
    Other,
}

impl ErrorCategory {
    /// Whether this category is fatal to the whole run.
    ///
    /// Network failures degrade to per-package `Unknown` availability and
    /// are only fatal when they escape that handling.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Network)
    }

    /// A short user-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Parse => "Manifest parse error",
            Self::Io => "Filesystem error",
            Self::Network => "Registry unreachable",
            Self::Other => "Unexpected error",
        }
    }
}

/// Errors that can occur while reconciling an environment.
#[derive(Debug, Error)]
pub enum Error {
    /// No cluster probe matched the local filesystem
    #[error(
        "no known cluster detected; pass --cluster explicitly (installing into a guessed location is not supported)"
    )]
    ClusterNotDetected,

    /// An explicit cluster override named a profile that does not exist
    #[error("unknown cluster: {name} (known: {known})")]
    UnknownCluster {
        /// The name that was requested
        name: String,
        /// Comma-separated list of known profile names
        known: String,
    },

    /// Manifest file missing at the resolved path
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Installed-package library directory missing
    #[error("package library not found: {0}")]
    LibraryNotFound(PathBuf),

    /// Malformed manifest content
    #[error("invalid manifest field '{field}' at line {line}: {message}")]
    Parse {
        /// The DCF field being parsed when the error occurred
        field: String,
        /// 1-indexed line number
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A remote locator that could not be interpreted
    #[error("invalid remote locator '{locator}': {message}")]
    RemoteLocator {
        /// The locator text as written in the manifest
        locator: String,
        /// Description of the problem
        message: String,
    },

    /// HTTP transport failure talking to a registry
    #[error("registry request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Categorize this error for messaging.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ClusterNotDetected
            | Error::UnknownCluster { .. }
            | Error::ManifestNotFound(_)
            | Error::LibraryNotFound(_) => ErrorCategory::Configuration,
            Error::Parse { .. } | Error::RemoteLocator { .. } => ErrorCategory::Parse,
            Error::Io(_) => ErrorCategory::Io,
            Error::Http(_) => ErrorCategory::Network,
            Error::Other(_) => ErrorCategory::Other,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_fatal() {
        assert!(ErrorCategory::Configuration.is_fatal());
        assert!(ErrorCategory::Parse.is_fatal());
        assert!(!ErrorCategory::Network.is_fatal());
    }

    #[test]
    fn test_parse_error_names_field() {
        let err = Error::Parse {
            field: "Imports".to_string(),
            line: 7,
            message: "unbalanced parenthesis".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Imports"));
        assert!(msg.contains("line 7"));
        assert_eq!(err.category(), ErrorCategory::Parse);
    }

    #[test]
    fn test_cluster_errors_are_configuration() {
        assert_eq!(
            Error::ClusterNotDetected.category(),
            ErrorCategory::Configuration
        );
        let err = Error::UnknownCluster {
            name: "titan".to_string(),
            known: "gemini, apollo".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("gemini"));
    }
}
