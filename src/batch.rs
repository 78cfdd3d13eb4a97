//! Batch conversion of a directory of ProQuest packages.
//!
//! The input root holds one subdirectory per dissertation package. Each
//! package contains a metadata export (`*DATA.xml`), a primary payload file
//! (`*.pdf`), and optionally one subdirectory of related attachments. Other
//! files are ignored.
//!
//! [`run_batch`] converts every package in three passes. First it classifies
//! and extracts them all, then it creates the output directory if at least one
//! package was found, and finally it writes the items. The first error of any
//! kind aborts the batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::SafConfig;
use crate::dublin_core::map_to_dublin_core;
use crate::error::{Result, SafError};
use crate::metadata::extract_metadata;
use crate::saf::{create_new_dir, format_identifier, write_item, SafItem};
use crate::xml::parse_file;

/// The classified entries of one package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    /// The package directory
    pub directory: PathBuf,
    /// Metadata export file
    pub metadata_file: PathBuf,
    /// Primary payload file
    pub primary_file: PathBuf,
    /// Related attachments directory, if present
    pub attachments: Option<PathBuf>,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// The output tree, `None` when no packages were found
    pub output_dir: Option<PathBuf>,
    /// Item directories in identifier order
    pub items: Vec<PathBuf>,
}

/// List the package subdirectories of `input_root`, sorted by name.
///
/// # Errors
///
/// Returns [`SafError::Io`] if the directory cannot be read.
pub fn discover_packages(input_root: &Path) -> Result<Vec<PathBuf>> {
    let mut packages = Vec::new();
    for entry in fs::read_dir(input_root).map_err(|e| SafError::io(input_root, e))? {
        let path = entry.map_err(|e| SafError::io(input_root, e))?.path();
        if path.is_dir() {
            packages.push(path);
        }
    }
    packages.sort();
    Ok(packages)
}

/// Classify the entries of one package directory.
///
/// # Errors
///
/// Returns [`SafError::Package`] if the metadata source or primary file is
/// missing, or if any of the three roles is filled more than once.
pub fn classify_package(directory: &Path, config: &SafConfig) -> Result<PackageSource> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(directory).map_err(|e| SafError::io(directory, e))? {
        entries.push(entry.map_err(|e| SafError::io(directory, e))?.path());
    }
    entries.sort();

    let mut metadata_file = None;
    let mut primary_file = None;
    let mut attachments = None;

    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let slot = if path.is_dir() {
            &mut attachments
        } else if config.is_metadata_source(&name) {
            &mut metadata_file
        } else if config.is_payload(&path) {
            &mut primary_file
        } else {
            debug!(path = %path.display(), "ignoring unrecognized package entry");
            continue;
        };
        if let Some(existing) = slot.replace(path.clone()) {
            return Err(SafError::Package {
                path: directory.to_path_buf(),
                detail: format!(
                    "ambiguous entries {} and {}",
                    existing.display(),
                    path.display()
                ),
            });
        }
    }

    let missing = |what: &str| SafError::Package {
        path: directory.to_path_buf(),
        detail: format!("no {what} found"),
    };
    Ok(PackageSource {
        directory: directory.to_path_buf(),
        metadata_file: metadata_file.ok_or_else(|| missing("metadata export"))?,
        primary_file: primary_file.ok_or_else(|| missing("primary payload file"))?,
        attachments,
    })
}

/// Extract and map one package into an item with the given identifier.
///
/// # Errors
///
/// Returns any XML, structural, or IO error from reading the metadata export.
pub fn build_item(identifier: String, source: &PackageSource, config: &SafConfig) -> Result<SafItem> {
    let root = parse_file(&source.metadata_file)?;
    let record = extract_metadata(&root, config)?;
    Ok(SafItem {
        identifier,
        metadata: map_to_dublin_core(&record),
        primary_file: source.primary_file.clone(),
        attachments: source.attachments.clone(),
    })
}

/// Convert every package under `input_root` into a SAF tree under `working_dir`.
///
/// Items are numbered from `001` in package order. The output directory
/// (`working_dir/<output_dir_name>`) is only created when at least one package
/// exists.
///
/// # Errors
///
/// Returns the first error encountered. Per-item errors are wrapped in
/// [`SafError::Item`] with the item's identifier. An existing output
/// directory is a [`SafError::Conflict`].
pub fn run_batch(input_root: &Path, working_dir: &Path, config: &SafConfig) -> Result<BatchSummary> {
    let packages = discover_packages(input_root)?;
    info!(count = packages.len(), root = %input_root.display(), "discovered packages");

    let mut items = Vec::with_capacity(packages.len());
    for (index, package) in packages.iter().enumerate() {
        let identifier = format_identifier(index + 1);
        let item = classify_package(package, config)
            .and_then(|source| build_item(identifier.clone(), &source, config))
            .map_err(|e| e.for_item(&identifier))?;
        debug!(item = %identifier, package = %package.display(), "extracted metadata");
        items.push(item);
    }

    if items.is_empty() {
        warn!(root = %input_root.display(), "no packages found, nothing written");
        return Ok(BatchSummary::default());
    }

    let output_dir = working_dir.join(&config.output_dir_name);
    create_new_dir(&output_dir)?;

    let mut written = Vec::with_capacity(items.len());
    for item in items {
        let identifier = item.identifier.clone();
        let dir = write_item(item, &output_dir).map_err(|e| e.for_item(&identifier))?;
        info!(item = %identifier, dir = %dir.display(), "wrote item");
        written.push(dir);
    }

    Ok(BatchSummary {
        output_dir: Some(output_dir),
        items: written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"").expect("write");
    }

    #[test]
    fn test_classify_package() {
        let tmp = TempDir::new().expect("tempdir");
        let pkg = tmp.path();
        touch(&pkg.join("FOO_DATA.xml"));
        touch(&pkg.join("FOO.pdf"));
        touch(&pkg.join("notes.txt"));
        fs::create_dir(pkg.join("attachments")).expect("dir");

        let source = classify_package(pkg, &SafConfig::default()).expect("classify");
        assert_eq!(source.metadata_file, pkg.join("FOO_DATA.xml"));
        assert_eq!(source.primary_file, pkg.join("FOO.pdf"));
        assert_eq!(source.attachments, Some(pkg.join("attachments")));
    }

    #[test]
    fn test_classify_missing_primary() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("FOO_DATA.xml"));
        let err = classify_package(tmp.path(), &SafConfig::default()).unwrap_err();
        assert!(err.to_string().contains("primary payload file"));
    }

    #[test]
    fn test_classify_ambiguous_payload() {
        let tmp = TempDir::new().expect("tempdir");
        touch(&tmp.path().join("FOO_DATA.xml"));
        touch(&tmp.path().join("A.pdf"));
        touch(&tmp.path().join("B.pdf"));
        let err = classify_package(tmp.path(), &SafConfig::default()).unwrap_err();
        assert!(matches!(err, SafError::Package { .. }));
    }

    #[test]
    fn test_discover_only_directories_sorted() {
        let tmp = TempDir::new().expect("tempdir");
        fs::create_dir(tmp.path().join("b")).expect("dir");
        fs::create_dir(tmp.path().join("a")).expect("dir");
        touch(&tmp.path().join("stray.txt"));

        let packages = discover_packages(tmp.path()).expect("discover");
        assert_eq!(packages, vec![tmp.path().join("a"), tmp.path().join("b")]);
    }

    #[test]
    fn test_empty_input_creates_nothing() {
        let input = TempDir::new().expect("tempdir");
        let work = TempDir::new().expect("tempdir");
        let summary = run_batch(input.path(), work.path(), &SafConfig::default()).expect("run");
        assert_eq!(summary, BatchSummary::default());
        assert!(!work.path().join("SimpleArchiveFormat").exists());
    }
}
