use ::exif::{Context, Field, In, Reader, Value};

use super::value::{ByteOrder, MetadataBlock, RawValue, Rational, SRational, Section};
use super::{EXIF_HEADER, TAG_THUMBNAIL_LENGTH, TAG_THUMBNAIL_OFFSET, is_structural};
use crate::error::MalformedMetadata;

/// Decode a raw EXIF/TIFF block.
///
/// Empty input means the image carries no metadata and yields an empty
/// block. A leading `Exif\0\0` APP1 header is accepted and skipped.
///
/// ```rust
/// use exif_edit::exif::decode;
///
/// let block = decode(b"").unwrap();
/// assert!(block.is_empty());
/// ```
pub fn decode(raw: &[u8]) -> Result<MetadataBlock, MalformedMetadata> {
    let data = raw.strip_prefix(EXIF_HEADER).unwrap_or(raw);
    if data.is_empty() {
        log::debug!("No EXIF data present, using an empty block");
        return Ok(MetadataBlock::new());
    }

    let exif = Reader::new().read_raw(data.to_vec())?;
    let order = if exif.little_endian() {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    };
    let mut block = MetadataBlock::with_byte_order(order);

    let mut thumbnail_offset = None;
    let mut thumbnail_len = None;

    for field in exif.fields() {
        let Some(section) = section_of(field) else {
            log::debug!("Skipping {} in {} IFD", field.tag, field.ifd_num);
            continue;
        };
        let tag = field.tag.number();

        match (section, tag) {
            (Section::Thumbnail, TAG_THUMBNAIL_OFFSET) => {
                thumbnail_offset = field.value.get_uint(0);
                continue;
            }
            (Section::Thumbnail, TAG_THUMBNAIL_LENGTH) => {
                thumbnail_len = field.value.get_uint(0);
                continue;
            }
            _ if is_structural(section, tag) => {
                log::trace!("Dropping layout tag {tag:#06x} in {section}");
                continue;
            }
            _ => {}
        }

        let value = raw_value(section, tag, &field.value)?;
        if block.insert(section, tag, value).is_some() {
            log::debug!("Tag {tag:#06x} appears twice in {section}, keeping the last");
        }
    }

    if let (Some(offset), Some(len)) = (thumbnail_offset, thumbnail_len) {
        let start = offset as usize;
        let thumbnail = start
            .checked_add(len as usize)
            .and_then(|end| data.get(start..end))
            .ok_or(MalformedMetadata::ThumbnailOutOfRange { offset, len })?;
        block.thumbnail = Some(thumbnail.to_vec());
    }

    log::trace!(
        "Decoded {} fields ({:?} byte order{})",
        block.len(),
        block.byte_order,
        if block.thumbnail.is_some() { ", with thumbnail" } else { "" }
    );
    Ok(block)
}

/// Block section a field belongs to, or `None` for IFDs the block does not
/// model (IFD2 and later, sub-IFDs hanging off the thumbnail).
fn section_of(field: &Field) -> Option<Section> {
    match (&field.ifd_num, field.tag.context()) {
        (&In::PRIMARY, Context::Tiff) => Some(Section::Primary),
        (&In::PRIMARY, Context::Exif) => Some(Section::Exif),
        (&In::PRIMARY, Context::Gps) => Some(Section::Gps),
        (&In::PRIMARY, Context::Interop) => Some(Section::Interop),
        (&In::THUMBNAIL, Context::Tiff) => Some(Section::Thumbnail),
        _ => None,
    }
}

fn raw_value(section: Section, tag: u16, value: &Value) -> Result<RawValue, MalformedMetadata> {
    Ok(match value {
        Value::Byte(v) => RawValue::Byte(v.clone()),
        // kamadak splits ASCII at NULs; the block keeps one string per tag.
        Value::Ascii(parts) => RawValue::Ascii(parts.join(&0u8)),
        Value::Short(v) => RawValue::Short(v.clone()),
        Value::Long(v) => RawValue::Long(v.clone()),
        Value::Rational(v) => RawValue::Rational(
            v.iter()
                .map(|r| Rational::new(r.num, r.denom))
                .collect(),
        ),
        Value::SByte(v) => RawValue::SByte(v.clone()),
        Value::Undefined(v, _) => RawValue::Undefined(v.clone()),
        Value::SShort(v) => RawValue::SShort(v.clone()),
        Value::SLong(v) => RawValue::SLong(v.clone()),
        Value::SRational(v) => RawValue::SRational(
            v.iter()
                .map(|r| SRational {
                    numerator: r.num,
                    denominator: r.denom,
                })
                .collect(),
        ),
        Value::Float(v) => RawValue::Float(v.clone()),
        Value::Double(v) => RawValue::Double(v.clone()),
        Value::Unknown(type_code, ..) => {
            return Err(MalformedMetadata::UnsupportedType {
                section,
                tag,
                type_code: *type_code,
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::{FIELD_SPECS, encode, project};
    use little_exif::endian::Endian;
    use little_exif::exif_tag::ExifTag;
    use little_exif::ifd::ExifTagGroup;
    use little_exif::exif_tag_format::ExifTagFormat;
    use little_exif::filetype::FileExtension;
    use little_exif::metadata::Metadata;

    /// Little-endian TIFF with IFD0 = { Make: "Canon" }.
    fn make_only_le() -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(b"II");
        b.extend_from_slice(&42u16.to_le_bytes());
        b.extend_from_slice(&8u32.to_le_bytes());
        // IFD0: 1 entry
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&0x010Fu16.to_le_bytes());
        b.extend_from_slice(&2u16.to_le_bytes());
        b.extend_from_slice(&6u32.to_le_bytes());
        b.extend_from_slice(&26u32.to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        // value area at offset 26
        b.extend_from_slice(b"Canon\0");
        b
    }

    /// EXIF payload written by little_exif: Make, ImageDescription and a
    /// northern latitude of 48°51'30".
    fn little_exif_payload() -> Vec<u8> {
        let mut metadata = Metadata::new();
        metadata.set_tag(ExifTag::Make("Canon".to_string()));
        metadata.set_tag(ExifTag::ImageDescription("Harbour at dusk".to_string()));

        let latitude_ref = ExifTag::from_u16_with_data(
            0x0001,
            &ExifTagFormat::STRING,
            &b"N\0".to_vec(),
            &Endian::Little,
            &ExifTagGroup::GPS,
        )
        .unwrap();
        metadata.set_tag(latitude_ref);

        let mut dms = Vec::new();
        for (num, denom) in [(48u32, 1u32), (51, 1), (30, 1)] {
            dms.extend_from_slice(&num.to_le_bytes());
            dms.extend_from_slice(&denom.to_le_bytes());
        }
        let latitude = ExifTag::from_u16_with_data(
            0x0002,
            &ExifTagFormat::RATIONAL64U,
            &dms,
            &Endian::Little,
            &ExifTagGroup::GPS,
        )
        .unwrap();
        metadata.set_tag(latitude);

        // APP1 marker and length come first; decode skips the Exif\0\0 itself
        metadata.as_u8_vec(FileExtension::JPEG).unwrap()[4..].to_vec()
    }

    // ── empty / header handling ──────────────────────────────────────

    #[test]
    fn empty_input_is_empty_block() {
        let block = decode(b"").unwrap();
        assert!(block.is_empty());
        assert_eq!(block, MetadataBlock::new());
    }

    #[test]
    fn bare_app1_header_is_empty_block() {
        assert!(decode(b"Exif\0\0").unwrap().is_empty());
    }

    #[test]
    fn skips_app1_header() {
        let mut raw = b"Exif\0\0".to_vec();
        raw.extend_from_slice(&make_only_le());
        let block = decode(&raw).unwrap();
        assert_eq!(block.get(Section::Primary, 0x010F), Some(&RawValue::text("Canon")));
    }

    // ── hand-built blobs ─────────────────────────────────────────────

    #[test]
    fn reads_out_of_line_ascii() {
        let block = decode(&make_only_le()).unwrap();
        assert_eq!(block.byte_order, ByteOrder::Little);
        assert_eq!(block.len(), 1);
        assert_eq!(block.get(Section::Primary, 0x010F), Some(&RawValue::text("Canon")));
    }

    #[test]
    fn reads_inline_short_big_endian() {
        let mut b = Vec::new();
        b.extend_from_slice(b"MM");
        b.extend_from_slice(&42u16.to_be_bytes());
        b.extend_from_slice(&8u32.to_be_bytes());
        b.extend_from_slice(&1u16.to_be_bytes());
        b.extend_from_slice(&0x0112u16.to_be_bytes()); // Orientation
        b.extend_from_slice(&3u16.to_be_bytes());
        b.extend_from_slice(&1u32.to_be_bytes());
        b.extend_from_slice(&[0x00, 0x06, 0x00, 0x00]);
        b.extend_from_slice(&0u32.to_be_bytes());

        let block = decode(&b).unwrap();
        assert_eq!(block.byte_order, ByteOrder::Big);
        assert_eq!(block.get(Section::Primary, 0x0112), Some(&RawValue::Short(vec![6])));
    }

    // ── payload from another writer ──────────────────────────────────

    #[test]
    fn reads_little_exif_payload() {
        let block = decode(&little_exif_payload()).unwrap();

        assert_eq!(block.get(Section::Primary, 0x010F), Some(&RawValue::text("Canon")));
        assert_eq!(
            block.get(Section::Primary, 0x010E),
            Some(&RawValue::text("Harbour at dusk"))
        );
        assert_eq!(block.get(Section::Gps, 0x0001), Some(&RawValue::text("N")));
        assert_eq!(
            block.get(Section::Gps, 0x0002),
            Some(&RawValue::Rational(vec![
                Rational::new(48, 1),
                Rational::new(51, 1),
                Rational::new(30, 1),
            ]))
        );

        let shown = project(&block, FIELD_SPECS);
        let latitude = shown.iter().find(|f| f.label == "GPSLatitude").unwrap();
        assert_eq!(latitude.text.as_deref(), Some("48,51,30"));
    }

    #[test]
    fn little_exif_payload_survives_reencoding() {
        let block = decode(&little_exif_payload()).unwrap();
        assert_eq!(decode(&encode(&block).unwrap()).unwrap(), block);
    }

    // ── malformed input ──────────────────────────────────────────────

    #[test]
    fn bad_byte_order() {
        let err = decode(b"XX\0\x2a\0\0\0\x08").unwrap_err();
        assert!(matches!(err, MalformedMetadata::InvalidFormat { .. }));
    }

    #[test]
    fn bad_magic() {
        let err = decode(b"II\x2b\0\x08\0\0\0").unwrap_err();
        assert!(matches!(err, MalformedMetadata::InvalidFormat { .. }));
    }

    #[test]
    fn truncated_header() {
        assert!(decode(b"II\x2a").is_err());
    }

    #[test]
    fn truncated_value() {
        let mut raw = make_only_le();
        raw.truncate(raw.len() - 3);
        assert!(decode(&raw).is_err());
    }

    #[test]
    fn unsupported_type() {
        let mut raw = make_only_le();
        // type code lives at offset 8 (IFD) + 2 (count) + 2 (tag)
        raw[12] = 99;
        let err = decode(&raw).unwrap_err();
        assert_eq!(
            err,
            MalformedMetadata::UnsupportedType {
                section: Section::Primary,
                tag: 0x010F,
                type_code: 99,
            }
        );
    }

    #[test]
    fn thumbnail_outside_data() {
        let mut b = Vec::new();
        b.extend_from_slice(b"II");
        b.extend_from_slice(&42u16.to_le_bytes());
        b.extend_from_slice(&8u32.to_le_bytes());
        // IFD0: no entries, next IFD at 14
        b.extend_from_slice(&0u16.to_le_bytes());
        b.extend_from_slice(&14u32.to_le_bytes());
        // IFD1: thumbnail offset and length, far past the end
        b.extend_from_slice(&2u16.to_le_bytes());
        for (tag, value) in [(TAG_THUMBNAIL_OFFSET, 4000u32), (TAG_THUMBNAIL_LENGTH, 64)] {
            b.extend_from_slice(&tag.to_le_bytes());
            b.extend_from_slice(&4u16.to_le_bytes());
            b.extend_from_slice(&1u32.to_le_bytes());
            b.extend_from_slice(&value.to_le_bytes());
        }
        b.extend_from_slice(&0u32.to_le_bytes());

        assert_eq!(
            decode(&b).unwrap_err(),
            MalformedMetadata::ThumbnailOutOfRange {
                offset: 4000,
                len: 64
            }
        );
    }
}
