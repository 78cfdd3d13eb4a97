//! Error types for SAF conversion.
//!
//! This module provides the [`SafError`] type for all extraction, mapping and
//! packaging operations and the [`Result`] convenience type. Every error is
//! terminal for the batch; nothing in this crate retries.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for all SAF conversion operations.
#[derive(Error, Debug)]
pub enum SafError {
    /// A required XML node or attribute is absent.
    #[error("Missing required node at {path}: {detail}")]
    Structural {
        /// Lookup path that failed to resolve
        path: String,
        /// What was expected there
        detail: String,
    },

    /// The target output or item directory already exists.
    #[error("{} already exists", .0.display())]
    Conflict(PathBuf),

    /// Copy or write failure on a specific path.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// The path being read, written or created
        path: PathBuf,
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML in a metadata source.
    #[error("XML error: {0}")]
    Xml(String),

    /// A package directory lacks one of its required entries.
    #[error("Invalid package {}: {detail}", .path.display())]
    Package {
        /// The package directory
        path: PathBuf,
        /// What is missing
        detail: String,
    },

    /// Failure while processing one item, tagged with its identifier.
    #[error("item_{identifier}: {source}")]
    Item {
        /// Zero-padded item identifier
        identifier: String,
        /// The failure that aborted the item
        #[source]
        source: Box<SafError>,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identifier registration client failure.
    #[error("Registration error: {0}")]
    Registration(String),
}

impl SafError {
    /// Build an [`SafError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SafError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`SafError::Structural`] for a lookup path.
    pub fn structural(path: impl Into<String>, detail: impl Into<String>) -> Self {
        SafError::Structural {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Tag this error with the item identifier it occurred under.
    #[must_use]
    pub fn for_item(self, identifier: &str) -> Self {
        SafError::Item {
            identifier: identifier.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<quick_xml::Error> for SafError {
    fn from(err: quick_xml::Error) -> Self {
        SafError::Xml(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`SafError`].
pub type Result<T> = std::result::Result<T, SafError>;
