use serde::Serialize;

use super::kind::ValueKind;
use super::value::Section;

// IFD0
pub const TAG_MAKE: u16 = 0x010F;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_SOFTWARE: u16 = 0x0131;

// Exif IFD
pub const TAG_EXPOSURE_TIME: u16 = 0x829A;
pub const TAG_F_NUMBER: u16 = 0x829D;
pub const TAG_ISO_SPEED_RATINGS: u16 = 0x8827;
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;

// GPS IFD
pub const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub const TAG_GPS_LATITUDE: u16 = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub const TAG_GPS_LONGITUDE: u16 = 0x0004;
pub const TAG_GPS_ALTITUDE_REF: u16 = 0x0005;
pub const TAG_GPS_ALTITUDE: u16 = 0x0006;

/// One editable field: where it lives in the block and how its text is
/// read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub label: &'static str,
    pub section: Section,
    pub tag: u16,
    pub kind: ValueKind,
}

impl FieldSpec {
    const fn new(label: &'static str, section: Section, tag: u16, kind: ValueKind) -> Self {
        Self {
            label,
            section,
            tag,
            kind,
        }
    }
}

/// Every field the editor exposes, in display order.
///
/// Each label names exactly one section/tag pair, and each pair has exactly
/// one label.
pub const FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec::new("Make", Section::Primary, TAG_MAKE, ValueKind::Text),
    FieldSpec::new("Model", Section::Primary, TAG_MODEL, ValueKind::Text),
    FieldSpec::new(
        "DateTimeOriginal",
        Section::Exif,
        TAG_DATE_TIME_ORIGINAL,
        ValueKind::DateTime,
    ),
    FieldSpec::new("Software", Section::Primary, TAG_SOFTWARE, ValueKind::Text),
    FieldSpec::new("GPSLatitudeRef", Section::Gps, TAG_GPS_LATITUDE_REF, ValueKind::Text),
    FieldSpec::new(
        "GPSLatitude",
        Section::Gps,
        TAG_GPS_LATITUDE,
        ValueKind::DegreesMinutesSeconds,
    ),
    FieldSpec::new("GPSLongitudeRef", Section::Gps, TAG_GPS_LONGITUDE_REF, ValueKind::Text),
    FieldSpec::new(
        "GPSLongitude",
        Section::Gps,
        TAG_GPS_LONGITUDE,
        ValueKind::DegreesMinutesSeconds,
    ),
    FieldSpec::new(
        "GPSAltitudeRef",
        Section::Gps,
        TAG_GPS_ALTITUDE_REF,
        ValueKind::AltitudeReference,
    ),
    FieldSpec::new("GPSAltitude", Section::Gps, TAG_GPS_ALTITUDE, ValueKind::AltitudeScaled),
    FieldSpec::new(
        "ExposureTime",
        Section::Exif,
        TAG_EXPOSURE_TIME,
        ValueKind::RationalPair,
    ),
    FieldSpec::new("FNumber", Section::Exif, TAG_F_NUMBER, ValueKind::RationalPair),
    FieldSpec::new("ISO", Section::Exif, TAG_ISO_SPEED_RATINGS, ValueKind::Unsigned),
];

/// Find a field by its label in `specs`.
pub fn lookup<'a>(specs: &'a [FieldSpec], label: &str) -> Option<&'a FieldSpec> {
    specs.iter().find(|spec| spec.label == label)
}
