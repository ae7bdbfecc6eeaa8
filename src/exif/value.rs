use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A group of fields inside an EXIF block.
///
/// Each section is one IFD (Image File Directory) in the TIFF structure.
/// IFD 0 holds the primary image attributes and points to the Exif and GPS
/// sub-IFDs; the Exif IFD points to the interoperability IFD; IFD 1
/// describes the embedded thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Primary,
    Exif,
    Gps,
    Interop,
    Thumbnail,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Primary,
        Section::Exif,
        Section::Gps,
        Section::Interop,
        Section::Thumbnail,
    ];

    /// Human-readable section name.
    pub fn name(&self) -> &'static str {
        match self {
            Section::Primary => "primary image",
            Section::Exif => "exif",
            Section::Gps => "gps",
            Section::Interop => "interoperability",
            Section::Thumbnail => "thumbnail",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of the TIFF structure (`II` or `MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    Little,
    #[default]
    Big,
}

impl ByteOrder {
    pub(crate) fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::Little => *b"II",
            ByteOrder::Big => *b"MM",
        }
    }

    pub(crate) fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }

    pub(crate) fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Big => v.to_be_bytes(),
        }
    }
}

/// An unsigned fraction, stored exactly as the file stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Real-valued quotient. `None` for a zero denominator.
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }
}

impl From<(u32, u32)> for Rational {
    fn from((numerator, denominator): (u32, u32)) -> Self {
        Self::new(numerator, denominator)
    }
}

/// A signed fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SRational {
    pub numerator: i32,
    pub denominator: i32,
}

/// A field value as stored in the block.
///
/// `Ascii` holds the text without its NUL terminator. Everything else is a
/// sequence of the TIFF type it names; single values are one-element
/// sequences.
///
/// Float and Double payloads compare by bit pattern, so a NaN read from a
/// file equals itself after a round trip.
#[derive(Debug, Clone)]
pub enum RawValue {
    Byte(Vec<u8>),
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<SRational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl RawValue {
    /// UTF-8 text stored as an ASCII field.
    pub fn text(s: &str) -> Self {
        RawValue::Ascii(s.as_bytes().to_vec())
    }

    /// A single unsigned integer, if this value is exactly one.
    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            RawValue::Byte(v) if v.len() == 1 => Some(v[0] as u32),
            RawValue::Short(v) if v.len() == 1 => Some(v[0] as u32),
            RawValue::Long(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            RawValue::Rational(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ascii(&self) -> Option<&[u8]> {
        match self {
            RawValue::Ascii(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Byte(a), Self::Byte(b))
            | (Self::Ascii(a), Self::Ascii(b))
            | (Self::Undefined(a), Self::Undefined(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Rational(a), Self::Rational(b)) => a == b,
            (Self::SByte(a), Self::SByte(b)) => a == b,
            (Self::SShort(a), Self::SShort(b)) => a == b,
            (Self::SLong(a), Self::SLong(b)) => a == b,
            (Self::SRational(a), Self::SRational(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                a.iter().map(|v| v.to_bits()).eq(b.iter().map(|v| v.to_bits()))
            }
            (Self::Double(a), Self::Double(b)) => {
                a.iter().map(|v| v.to_bits()).eq(b.iter().map(|v| v.to_bits()))
            }
            _ => false,
        }
    }
}

impl Eq for RawValue {}

/// A decoded metadata block: section → tag → value.
///
/// Empty sections are never kept, so two blocks compare equal exactly when
/// they hold the same section/tag/value triples (plus byte order and
/// thumbnail bytes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataBlock {
    /// Byte order used when the block is encoded again.
    pub byte_order: ByteOrder,
    sections: BTreeMap<Section, BTreeMap<u16, RawValue>>,
    /// JPEG thumbnail referenced from IFD 1.
    pub thumbnail: Option<Vec<u8>>,
}

impl MetadataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte_order(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            ..Self::default()
        }
    }

    /// `true` when the block holds no fields and no thumbnail.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.thumbnail.is_none()
    }

    /// Total number of fields across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    pub fn get(&self, section: Section, tag: u16) -> Option<&RawValue> {
        self.sections.get(&section)?.get(&tag)
    }

    /// Store a value, returning the one it replaced.
    pub fn insert(&mut self, section: Section, tag: u16, value: RawValue) -> Option<RawValue> {
        self.sections.entry(section).or_default().insert(tag, value)
    }

    pub fn remove(&mut self, section: Section, tag: u16) -> Option<RawValue> {
        let fields = self.sections.get_mut(&section)?;
        let removed = fields.remove(&tag);
        if fields.is_empty() {
            self.sections.remove(&section);
        }
        removed
    }

    /// Fields of one section, in ascending tag order.
    pub fn section(&self, section: Section) -> Option<&BTreeMap<u16, RawValue>> {
        self.sections.get(&section)
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }

    /// Non-empty sections in IFD order.
    pub fn sections(&self) -> impl Iterator<Item = (Section, &BTreeMap<u16, RawValue>)> {
        self.sections.iter().map(|(s, fields)| (*s, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_drops_empty_section() {
        let mut block = MetadataBlock::new();
        block.insert(Section::Gps, 2, RawValue::Rational(vec![Rational::new(1, 1)]));
        assert!(block.has_section(Section::Gps));

        block.remove(Section::Gps, 2);
        assert!(!block.has_section(Section::Gps));
        assert_eq!(block, MetadataBlock::new());
    }

    #[test]
    fn nan_floats_compare_by_bits() {
        assert_eq!(RawValue::Float(vec![f32::NAN]), RawValue::Float(vec![f32::NAN]));
        assert_eq!(RawValue::Double(vec![f64::NAN, 1.0]), RawValue::Double(vec![f64::NAN, 1.0]));
        assert_ne!(RawValue::Float(vec![0.0]), RawValue::Float(vec![-0.0]));
        assert_ne!(RawValue::Float(vec![1.0]), RawValue::Double(vec![1.0]));
    }

    #[test]
    fn rational_zero_denominator() {
        assert_eq!(Rational::new(1, 0).to_f64(), None);
        assert_eq!(Rational::new(1, 4).to_f64(), Some(0.25));
    }
}
