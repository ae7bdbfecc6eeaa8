use std::collections::BTreeMap;

use serde::Serialize;

use super::fields::{
    FieldSpec, TAG_GPS_ALTITUDE_REF, TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, TAG_GPS_LONGITUDE,
    TAG_GPS_LONGITUDE_REF, lookup,
};
use super::kind::{ValueKind, is_below_sea_level};
use super::value::{MetadataBlock, RawValue, Rational, Section};
use crate::error::FieldError;

/// Field label → text the user typed for it.
pub type EditRequest = BTreeMap<String, String>;

/// One registered field as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayField {
    pub label: &'static str,
    /// Formatted value, or `None` when the block has nothing usable.
    pub text: Option<String>,
    /// Input syntax for editing.
    pub hint: &'static str,
}

/// Result of applying an [`EditRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub block: MetadataBlock,
    /// Labels whose value was stored, in request order.
    pub written: Vec<&'static str>,
    /// One entry per field whose text did not parse. Those fields keep
    /// their previous value.
    pub errors: Vec<FieldError>,
}

/// Format every registered field of `block` for display, in registry order.
///
/// Altitudes below sea level (altitude reference `1`) are shown negative.
pub fn project(block: &MetadataBlock, specs: &[FieldSpec]) -> Vec<DisplayField> {
    let below_sea_level = block
        .get(Section::Gps, TAG_GPS_ALTITUDE_REF)
        .and_then(RawValue::as_unsigned)
        == Some(1);

    specs
        .iter()
        .map(|spec| {
            let text = block
                .get(spec.section, spec.tag)
                .and_then(|raw| spec.kind.format(raw))
                .map(|text| match spec.kind {
                    ValueKind::AltitudeScaled if below_sea_level && text != "0" => {
                        format!("-{text}")
                    }
                    _ => text,
                });
            DisplayField {
                label: spec.label,
                text,
                hint: spec.kind.hint(),
            }
        })
        .collect()
}

/// Apply user edits to a copy of `block`.
///
/// Blank entries and labels not in `specs` are skipped. A field whose text
/// fails to parse is left untouched and reported in [`Applied::errors`];
/// every other field is still applied.
///
/// An altitude also sets the GPS altitude reference from its sign. An
/// explicit `GPSAltitudeRef` edit sorts after `GPSAltitude` and wins.
///
/// ```rust
/// use exif_edit::exif::{apply, EditRequest, MetadataBlock, FIELD_SPECS};
///
/// let mut edits = EditRequest::new();
/// edits.insert("ISO".into(), "100".into());
/// edits.insert("FNumber".into(), "f/2.8".into());
///
/// let applied = apply(&MetadataBlock::new(), &edits, FIELD_SPECS);
/// assert_eq!(applied.written, vec!["ISO"]);
/// assert_eq!(applied.errors.len(), 1);
/// assert_eq!(applied.errors[0].label, "FNumber");
/// ```
pub fn apply(block: &MetadataBlock, edits: &EditRequest, specs: &[FieldSpec]) -> Applied {
    let mut block = block.clone();
    let mut written = Vec::new();
    let mut errors = Vec::new();

    for (label, text) in edits {
        if text.trim().is_empty() {
            continue;
        }
        let Some(spec) = lookup(specs, label) else {
            log::debug!("Ignoring edit for unknown field `{label}`");
            continue;
        };

        match spec.kind.parse(text) {
            Ok(raw) => {
                log::debug!("  {}: {text}", spec.label);
                block.insert(spec.section, spec.tag, raw);
                if spec.kind == ValueKind::AltitudeScaled {
                    let reference = RawValue::Byte(vec![u8::from(is_below_sea_level(text))]);
                    block.insert(Section::Gps, TAG_GPS_ALTITUDE_REF, reference);
                }
                written.push(spec.label);
            }
            Err(kind) => {
                log::debug!("  {}: rejected `{text}` ({kind})", spec.label);
                errors.push(FieldError::new(spec.label, kind));
            }
        }
    }

    Applied {
        block,
        written,
        errors,
    }
}

/// Convert a degree/minute/second triple to decimal degrees.
///
/// `None` unless there are exactly three components, all with a non-zero
/// denominator. Display and mapping only; the triple stays canonical.
pub fn decimal_degrees(triple: &[Rational]) -> Option<f64> {
    match triple {
        [d, m, s] => Some(d.to_f64()? + m.to_f64()? / 60.0 + s.to_f64()? / 3600.0),
        _ => None,
    }
}

/// A signed latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Read the photo's position from the GPS section.
///
/// A `S` latitude reference or `W` longitude reference makes the
/// coordinate negative.
pub fn gps_position(block: &MetadataBlock) -> Option<GpsPosition> {
    let coordinate = |tag: u16, ref_tag: u16, negative: u8| {
        let value = block.get(Section::Gps, tag)?.as_rationals()?;
        let degrees = decimal_degrees(value)?;
        let reference = block
            .get(Section::Gps, ref_tag)
            .and_then(|raw| raw.as_ascii())
            .and_then(|b| b.first().copied());
        Some(match reference {
            Some(r) if r.eq_ignore_ascii_case(&negative) => -degrees,
            _ => degrees,
        })
    };

    Some(GpsPosition {
        latitude: coordinate(TAG_GPS_LATITUDE, TAG_GPS_LATITUDE_REF, b'S')?,
        longitude: coordinate(TAG_GPS_LONGITUDE, TAG_GPS_LONGITUDE_REF, b'W')?,
    })
}
