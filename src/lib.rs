#![warn(missing_docs)]

//! # etdsaf: ProQuest ETD to Simple Archive Format
//!
//! Converts a batch of ProQuest dissertation export packages into DSpace
//! Simple Archive Format (SAF) item directories, each carrying a qualified
//! Dublin Core record built from the package's `DISS_submission` metadata.
//!
//! ## Quick Start
//!
//! ```ignore
//! use etdsaf::{run_batch, SafConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = run_batch(Path::new("exports"), Path::new("."), &SafConfig::default())?;
//! if let Some(dir) = summary.output_dir {
//!     println!("{} was created", dir.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Single document
//!
//! ```ignore
//! use etdsaf::{dublin_core, metadata, xml, SafConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = xml::parse_file("FOO_DATA.xml".as_ref())?;
//! let record = metadata::extract_metadata(&root, &SafConfig::default())?;
//! let dc = dublin_core::map_to_dublin_core(&record);
//! print!("{}", dublin_core::dublin_core_to_xml(&dc));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`xml`] — XML element tree and path lookups
//! - [`metadata`] — Field extraction from ProQuest exports
//! - [`dublin_core`] — Field to Dublin Core mapping and serialization
//! - [`saf`] — SAF item directory assembly
//! - [`batch`] — Package discovery and batch orchestration
//! - [`config`] — Run configuration
//! - [`ezid`] — Persistent identifier registration client
//! - [`error`] — Error types and result type

pub mod batch;
pub mod config;
pub mod dublin_core;
pub mod error;
pub mod ezid;
pub mod metadata;
pub mod saf;
pub mod xml;

pub use batch::{run_batch, BatchSummary, PackageSource};
pub use config::SafConfig;
pub use dublin_core::{DcValue, DublinCoreRecord, FieldMapping, Transform};
pub use error::{Result, SafError};
pub use ezid::{Credentials, EzidClient};
pub use metadata::{Field, FieldValue, MetadataRecord};
pub use saf::SafItem;
pub use xml::{XmlElement, XmlPath};
