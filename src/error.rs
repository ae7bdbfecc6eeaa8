//! Error types for the metadata transcoder.
//!
//! Decoding a block either succeeds or fails as a whole with
//! [`MalformedMetadata`]. Applying edits never fails as a whole: each field
//! that does not parse yields one [`FieldError`], collected next to the
//! updated block.

use thiserror::Error;

use crate::exif::Section;

/// The input bytes could not be parsed as an EXIF/TIFF metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMetadata {
    /// Broken TIFF structure: bad header, truncated IFD, or an offset
    /// pointing outside the data.
    #[error("invalid TIFF data: {reason}")]
    InvalidFormat { reason: &'static str },

    #[error("TIFF data too big: {reason}")]
    TooBig { reason: &'static str },

    #[error("unsupported field type {type_code} for tag {tag:#06x} in {section}")]
    UnsupportedType {
        section: Section,
        tag: u16,
        type_code: u16,
    },

    #[error("thumbnail of {len} bytes at offset {offset} lies outside the EXIF data")]
    ThumbnailOutOfRange { offset: u32, len: u32 },

    #[error("unreadable EXIF data: {message}")]
    Unreadable { message: String },
}

impl From<::exif::Error> for MalformedMetadata {
    fn from(err: ::exif::Error) -> Self {
        match err {
            ::exif::Error::InvalidFormat(reason) => Self::InvalidFormat { reason },
            ::exif::Error::TooBig(reason) => Self::TooBig { reason },
            other => Self::Unreadable {
                message: other.to_string(),
            },
        }
    }
}

/// A block could not be serialized.
///
/// Blocks produced by `decode` or `apply` always encode; hitting this means a
/// caller built a block by hand that TIFF cannot hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to encode EXIF data: {message}")]
pub struct EncodeError {
    pub message: String,
}

impl From<::exif::Error> for EncodeError {
    fn from(err: ::exif::Error) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Why a single field edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    /// The text does not match the syntax of the field's value kind.
    #[error("invalid format, expected {expected}")]
    InvalidFormat { expected: &'static str },
}

/// A rejected edit, keyed by the field label the user typed it into.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label}: {kind}")]
pub struct FieldError {
    pub label: String,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(label: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}
