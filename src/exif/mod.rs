//! EXIF metadata decoding, editing, and encoding.
//!
//! The transcoder works on raw TIFF bytes as found in an image's EXIF
//! payload:
//!
//! - [`decode`]: bytes → [`MetadataBlock`]
//! - [`project`]: block → display text per registered field
//! - [`apply`]: block + [`EditRequest`] → updated block and per-field errors
//! - [`encode`]: block → bytes
//!
//! The editable fields live in [`FIELD_SPECS`]; each names a section, a tag,
//! and a [`ValueKind`] that decides how its text is parsed and formatted.

mod fields;
mod kind;
mod reader;
mod transcode;
mod value;
mod writer;

pub use fields::{FIELD_SPECS, FieldSpec, lookup};
pub use kind::{ALTITUDE_DENOMINATOR, DMS_DENOMINATOR, ValueKind};
pub use reader::decode;
pub use transcode::{
    Applied, DisplayField, EditRequest, GpsPosition, apply, decimal_degrees, gps_position, project,
};
pub use value::{ByteOrder, MetadataBlock, RawValue, Rational, SRational, Section};
pub use writer::encode;

/// Tag IDs of the editable fields.
pub mod tags {
    pub use super::fields::{
        TAG_DATE_TIME_ORIGINAL, TAG_EXPOSURE_TIME, TAG_F_NUMBER, TAG_GPS_ALTITUDE,
        TAG_GPS_ALTITUDE_REF, TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF,
        TAG_ISO_SPEED_RATINGS, TAG_MAKE, TAG_MODEL, TAG_SOFTWARE,
    };
}

/// APP1 prefix in front of the TIFF data in JPEG files.
pub(crate) const EXIF_HEADER: &[u8] = b"Exif\0\0";

// Layout tags. They describe where IFDs and image data sit in the file
// rather than the photo, so the block never stores them and the writer
// regenerates them.
pub(crate) const TAG_EXIF_IFD: u16 = 0x8769;
pub(crate) const TAG_GPS_IFD: u16 = 0x8825;
pub(crate) const TAG_INTEROP_IFD: u16 = 0xA005;
pub(crate) const TAG_THUMBNAIL_OFFSET: u16 = 0x0201;
pub(crate) const TAG_THUMBNAIL_LENGTH: u16 = 0x0202;
const TAG_STRIP_OFFSETS: u16 = 0x0111;
const TAG_STRIP_BYTE_COUNTS: u16 = 0x0117;
const TAG_TILE_OFFSETS: u16 = 0x0144;
const TAG_TILE_BYTE_COUNTS: u16 = 0x0145;

/// Whether `tag` is a layout tag within `section`.
pub(crate) fn is_structural(section: Section, tag: u16) -> bool {
    match section {
        Section::Primary | Section::Thumbnail => matches!(
            tag,
            TAG_EXIF_IFD
                | TAG_GPS_IFD
                | TAG_THUMBNAIL_OFFSET
                | TAG_THUMBNAIL_LENGTH
                | TAG_STRIP_OFFSETS
                | TAG_STRIP_BYTE_COUNTS
                | TAG_TILE_OFFSETS
                | TAG_TILE_BYTE_COUNTS
        ),
        Section::Exif => tag == TAG_INTEROP_IFD,
        Section::Gps | Section::Interop => false,
    }
}
