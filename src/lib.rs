//! # exif-edit
//!
//! View and rewrite the camera, exposure and GPS fields of a photo's EXIF
//! metadata, and draw the photo on a map next to lists of visited and
//! wishlist places.
//!
//! ## Quick Start
//!
//! The pipeline module handles the full read → edit → write flow:
//!
//! ```rust,no_run
//! use exif_edit::config::Config;
//! use exif_edit::exif::EditRequest;
//! use exif_edit::pipeline::{collect_images, process_image};
//! use std::path::PathBuf;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     let mut edits = EditRequest::new();
//!     edits.insert("Make".into(), "Canon".into());
//!     edits.insert("DateTimeOriginal".into(), "2024:05:01 12:30:00".into());
//!
//!     for path in &collect_images(&[PathBuf::from("./photos")]) {
//!         let result = process_image(path, &edits, &config, None);
//!
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error processing {}: {err}", path.display());
//!         }
//!         for err in &result.field_errors {
//!             eprintln!("  {err}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The transcoder works on raw TIFF bytes and never touches the filesystem:
//!
//! ```rust
//! use exif_edit::exif::{self, EditRequest, FIELD_SPECS, MetadataBlock};
//!
//! let mut edits = EditRequest::new();
//! edits.insert("GPSLatitude".into(), "48,51,30".into());
//! edits.insert("ISO".into(), "400".into());
//!
//! let applied = exif::apply(&MetadataBlock::new(), &edits, FIELD_SPECS);
//! assert!(applied.errors.is_empty());
//!
//! let bytes = exif::encode(&applied.block).unwrap();
//! let block = exif::decode(&bytes).unwrap();
//! assert_eq!(block, applied.block);
//!
//! for field in exif::project(&block, FIELD_SPECS) {
//!     println!("{:<18} {}", field.label, field.text.unwrap_or_default());
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | EXIF location |
//! |--------|---------------|
//! | JPEG (`.jpg`, `.jpeg`) | APP1 segment |
//! | PNG (`.png`) | `eXIf` chunk |
//! | WebP (`.webp`) | `EXIF` RIFF chunk |
//!
//! ## Modules
//!
//! - [`exif`]: metadata block model, decode/encode, field registry, edits
//! - [`container`]: EXIF payload extraction and reinsertion per image format
//! - [`pipeline`]: image collection and per-file processing
//! - [`locations`]: CSV place lists
//! - [`map`]: GeoJSON and Leaflet map output
//! - [`config`]: configuration types and loading/saving
//! - [`error`]: transcoder error types

pub mod config;
pub mod container;
pub mod error;
pub mod exif;
pub mod locations;
pub mod map;
pub mod pipeline;
