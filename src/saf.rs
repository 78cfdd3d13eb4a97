//! Simple Archive Format item assembly.
//!
//! Each [`SafItem`] becomes one `item_<NNN>` directory under the output root:
//!
//! ```text
//! SimpleArchiveFormat/
//!   item_001/
//!     dublin_core        Dublin Core record
//!     contents           manifest, primary file first
//!     FOO.pdf            primary payload
//!     attachments/       copied related files, when present
//!       file1
//!       file2
//! ```
//!
//! An item directory that already exists is a [`SafError::Conflict`]; nothing
//! is ever merged into a previous run's output. The manifest is written after
//! every payload file has been copied, so a `contents` file only exists when
//! everything it lists is on disk.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dublin_core::{dublin_core_to_xml, DublinCoreRecord};
use crate::error::{Result, SafError};

/// File name of the Dublin Core record inside an item directory.
pub const DUBLIN_CORE_FILE: &str = "dublin_core";
/// File name of the contents manifest inside an item directory.
pub const CONTENTS_FILE: &str = "contents";

/// Format a 1-based sequence number as an item identifier (`1` becomes `"001"`).
#[must_use]
pub fn format_identifier(sequence: usize) -> String {
    format!("{sequence:03}")
}

/// One item ready to be written to the output tree.
#[derive(Debug, Clone)]
pub struct SafItem {
    /// Zero-padded identifier, e.g. `001`
    pub identifier: String,
    /// Dublin Core record for the item
    pub metadata: DublinCoreRecord,
    /// Primary payload file
    pub primary_file: PathBuf,
    /// Directory of related attachments, if any
    pub attachments: Option<PathBuf>,
}

impl SafItem {
    /// Name of the item's directory, `item_<identifier>`.
    #[must_use]
    pub fn directory_name(&self) -> String {
        format!("item_{}", self.identifier)
    }
}

/// Create a directory that must not exist yet.
///
/// # Errors
///
/// Returns [`SafError::Conflict`] if `path` already exists, or
/// [`SafError::Io`] if it cannot be created.
pub fn create_new_dir(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(SafError::Conflict(path.to_path_buf()));
    }
    fs::create_dir(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => SafError::Conflict(path.to_path_buf()),
        _ => SafError::io(path, e),
    })
}

/// List the files of an attachment directory, sorted by name.
///
/// # Errors
///
/// Returns [`SafError::Io`] if the directory cannot be read, or
/// [`SafError::Package`] if it contains a subdirectory.
pub fn list_attachments(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SafError::io(dir, e))? {
        let entry = entry.map_err(|e| SafError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            return Err(SafError::Package {
                path: dir.to_path_buf(),
                detail: format!("nested directory {} in attachments", path.display()),
            });
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Build the `contents` manifest.
///
/// The first line is the primary file's base name; each attachment follows as
/// `<attachment dir name>/<file name>`. Every line ends with a newline.
///
/// # Errors
///
/// Returns [`SafError::Package`] if a path has no file name or the name is
/// not valid UTF-8.
pub fn contents_manifest(primary_file: &Path, attachments: Option<(&Path, &[PathBuf])>) -> Result<String> {
    let mut manifest = String::new();
    manifest.push_str(base_name(primary_file)?);
    manifest.push('\n');

    if let Some((dir, files)) = attachments {
        let dir_name = base_name(dir)?;
        for file in files {
            manifest.push_str(dir_name);
            manifest.push('/');
            manifest.push_str(base_name(file)?);
            manifest.push('\n');
        }
    }
    Ok(manifest)
}

/// Write one item into `output_root` and return its directory.
///
/// Consumes the item: the record, payload, and attachments are written once.
/// File names are validated and the manifest is built before anything is
/// written; no file in the item directory is ever overwritten.
///
/// # Errors
///
/// Returns [`SafError::Package`] for a file name that is not valid UTF-8,
/// [`SafError::Conflict`] if the item directory or any destination file
/// exists, and [`SafError::Io`] for any failed write or copy. Errors are not
/// tagged with the item identifier; the caller does that.
pub fn write_item(item: SafItem, output_root: &Path) -> Result<PathBuf> {
    let attachments = match &item.attachments {
        Some(dir) => Some((dir.as_path(), list_attachments(dir)?)),
        None => None,
    };
    let manifest = contents_manifest(
        &item.primary_file,
        attachments.as_ref().map(|(dir, files)| (*dir, files.as_slice())),
    )?;

    let item_dir = output_root.join(item.directory_name());
    create_new_dir(&item_dir)?;
    debug!(item = %item.identifier, dir = %item_dir.display(), "created item directory");

    write_new_file(
        &item_dir.join(DUBLIN_CORE_FILE),
        dublin_core_to_xml(&item.metadata).as_bytes(),
    )?;
    copy_file(&item.primary_file, &item_dir.join(file_name(&item.primary_file)?))?;

    if let Some((dir, files)) = &attachments {
        let dest_dir = item_dir.join(file_name(dir)?);
        create_new_dir(&dest_dir)?;
        for file in files {
            copy_file(file, &dest_dir.join(file_name(file)?))?;
        }
    }

    write_new_file(&item_dir.join(CONTENTS_FILE), manifest.as_bytes())?;
    Ok(item_dir)
}

fn open_new(path: &Path) -> Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => SafError::Conflict(path.to_path_buf()),
            _ => SafError::io(path, e),
        })
}

fn write_new_file(path: &Path, bytes: &[u8]) -> Result<()> {
    open_new(path)?
        .write_all(bytes)
        .map_err(|e| SafError::io(path, e))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let mut source = fs::File::open(from).map_err(|e| SafError::io(from, e))?;
    let mut dest = open_new(to)?;
    io::copy(&mut source, &mut dest).map_err(|e| SafError::io(to, e))?;
    debug!(from = %from.display(), to = %to.display(), "copied");
    Ok(())
}

fn file_name(path: &Path) -> Result<&OsStr> {
    path.file_name().ok_or_else(|| SafError::Package {
        path: path.to_path_buf(),
        detail: "path has no file name".to_string(),
    })
}

fn base_name(path: &Path) -> Result<&str> {
    file_name(path)?.to_str().ok_or_else(|| SafError::Package {
        path: path.to_path_buf(),
        detail: "file name is not valid UTF-8".to_string(),
    })
}
