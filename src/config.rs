//! Configuration options for SAF conversion.
//!
//! [`SafConfig`] controls how package directories are classified and the
//! literal values stamped onto every record. It can be built in code or read
//! from a TOML file; every key is optional.
//!
//! ```toml
//! output_dir_name = "SimpleArchiveFormat"
//! metadata_suffix = "DATA.xml"
//! payload_extensions = ["pdf"]
//! publisher = "University of Chicago"
//! rights_url = "http://doi.org/10.6082/M1CC0XM8"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SafError};

/// Name of the top-level output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "SimpleArchiveFormat";
/// File name suffix identifying the metadata export in a package.
pub const DEFAULT_METADATA_SUFFIX: &str = "DATA.xml";
/// Publisher stamped onto every record.
pub const DEFAULT_PUBLISHER: &str = "University of Chicago";
/// Rights URI stamped onto every record.
pub const DEFAULT_RIGHTS_URL: &str = "http://doi.org/10.6082/M1CC0XM8";

/// Configuration for a conversion run.
///
/// # Examples
///
/// ```ignore
/// use etdsaf::SafConfig;
///
/// let config = SafConfig {
///     payload_extensions: vec!["pdf".into(), "epub".into()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SafConfig {
    /// Directory created under the working directory to hold all items
    pub output_dir_name: String,
    /// Suffix that marks a package's metadata export file
    pub metadata_suffix: String,
    /// Extensions (without the dot) accepted as the primary payload file
    pub payload_extensions: Vec<String>,
    /// Value of the `publisher` field
    pub publisher: String,
    /// Value of the `rightsurl` field
    pub rights_url: String,
}

impl Default for SafConfig {
    fn default() -> Self {
        SafConfig {
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            metadata_suffix: DEFAULT_METADATA_SUFFIX.to_string(),
            payload_extensions: vec!["pdf".to_string()],
            publisher: DEFAULT_PUBLISHER.to_string(),
            rights_url: DEFAULT_RIGHTS_URL.to_string(),
        }
    }
}

impl SafConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SafError::Config`] on invalid TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| SafError::Config(e.to_string()))
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SafError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| SafError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Whether a file name marks the package's metadata export.
    #[must_use]
    pub fn is_metadata_source(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.metadata_suffix)
    }

    /// Whether a path has one of the configured payload extensions.
    #[must_use]
    pub fn is_payload(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.payload_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}
