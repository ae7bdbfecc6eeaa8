use std::io::Cursor;

use ::exif::experimental::Writer;
use ::exif::{Context, Field, In, Tag, Value};

use super::is_structural;
use super::value::{ByteOrder, MetadataBlock, RawValue, Section};
use crate::error::EncodeError;

/// Serialize a block into TIFF bytes, the format [`decode`](super::decode)
/// reads.
///
/// Sub-IFD, strip and thumbnail pointers are generated by the writer; copies
/// stored in the block are dropped. An empty block becomes a bare header with
/// an empty IFD0 so that its byte order survives a round trip.
pub fn encode(block: &MetadataBlock) -> Result<Vec<u8>, EncodeError> {
    if block.is_empty() && block.thumbnail.is_none() {
        return Ok(empty_tiff(block.byte_order));
    }

    let fields: Vec<Field> = block
        .sections()
        .flat_map(|(section, values)| {
            values.iter().filter_map(move |(&tag, value)| {
                if is_structural(section, tag) {
                    log::warn!("Dropping stored layout tag {tag:#06x} in {section}");
                    return None;
                }
                Some(to_field(section, tag, value))
            })
        })
        .collect();

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    if let Some(thumbnail) = &block.thumbnail {
        writer.set_jpeg(thumbnail, In::THUMBNAIL);
    }

    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, block.byte_order == ByteOrder::Little)?;
    let bytes = out.into_inner();

    log::trace!("Encoded {} fields into {} bytes", fields.len(), bytes.len());
    Ok(bytes)
}

fn to_field(section: Section, tag: u16, value: &RawValue) -> Field {
    let (context, ifd_num) = match section {
        Section::Primary => (Context::Tiff, In::PRIMARY),
        Section::Exif => (Context::Exif, In::PRIMARY),
        Section::Gps => (Context::Gps, In::PRIMARY),
        Section::Interop => (Context::Interop, In::PRIMARY),
        Section::Thumbnail => (Context::Tiff, In::THUMBNAIL),
    };
    Field {
        tag: Tag(context, tag),
        ifd_num,
        value: to_value(value),
    }
}

fn to_value(value: &RawValue) -> Value {
    match value {
        RawValue::Byte(v) => Value::Byte(v.clone()),
        RawValue::Ascii(v) => Value::Ascii(vec![v.clone()]),
        RawValue::Short(v) => Value::Short(v.clone()),
        RawValue::Long(v) => Value::Long(v.clone()),
        RawValue::Rational(v) => Value::Rational(
            v.iter()
                .map(|r| ::exif::Rational {
                    num: r.numerator,
                    denom: r.denominator,
                })
                .collect(),
        ),
        RawValue::SByte(v) => Value::SByte(v.clone()),
        RawValue::Undefined(v) => Value::Undefined(v.clone(), 0),
        RawValue::SShort(v) => Value::SShort(v.clone()),
        RawValue::SLong(v) => Value::SLong(v.clone()),
        RawValue::SRational(v) => Value::SRational(
            v.iter()
                .map(|r| ::exif::SRational {
                    num: r.numerator,
                    denom: r.denominator,
                })
                .collect(),
        ),
        RawValue::Float(v) => Value::Float(v.clone()),
        RawValue::Double(v) => Value::Double(v.clone()),
    }
}

/// Header plus an IFD0 with no entries and no next IFD.
fn empty_tiff(order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(14);
    out.extend_from_slice(&order.marker());
    out.extend_from_slice(&order.u16_bytes(42));
    out.extend_from_slice(&order.u32_bytes(8));
    out.extend_from_slice(&order.u16_bytes(0));
    out.extend_from_slice(&order.u32_bytes(0));
    out
}
