use chrono::NaiveDateTime;
use serde::Serialize;

use super::value::{RawValue, Rational};
use crate::error::FieldErrorKind;

/// Denominator used for each degree/minute/second component.
pub const DMS_DENOMINATOR: u32 = 1_000_000;

/// Denominator used for altitudes.
pub const ALTITUDE_DENOMINATOR: u32 = 100;

/// EXIF date/time layout.
const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// How a field's text maps onto its stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// Free text, stored as an ASCII field holding UTF-8.
    Text,
    /// `YYYY:MM:DD HH:MM:SS`, stored as text.
    DateTime,
    /// A base-10 integer stored as one SHORT.
    Unsigned,
    /// `num/denom`, stored as one RATIONAL.
    RationalPair,
    /// `deg,min,sec`, stored as three RATIONALs over 1,000,000.
    DegreesMinutesSeconds,
    /// A decimal number, stored as its magnitude in one RATIONAL over 100.
    /// The sign goes to the altitude reference.
    AltitudeScaled,
    /// `0` above sea level, `1` below, stored as one BYTE.
    AltitudeReference,
}

impl ValueKind {
    /// The input syntax, shown in forms and error messages.
    pub fn hint(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::DateTime => "YYYY:MM:DD HH:MM:SS",
            ValueKind::Unsigned => "a whole number",
            ValueKind::RationalPair => "num/denom",
            ValueKind::DegreesMinutesSeconds => "deg,min,sec",
            ValueKind::AltitudeScaled => "a decimal number",
            ValueKind::AltitudeReference => "0 (above sea level) or 1 (below)",
        }
    }

    /// Parse user text into the value this kind stores.
    ///
    /// Numeric kinds ignore surrounding whitespace.
    pub fn parse(&self, text: &str) -> Result<RawValue, FieldErrorKind> {
        let invalid = || FieldErrorKind::InvalidFormat {
            expected: self.hint(),
        };

        match self {
            ValueKind::Text => Ok(RawValue::text(text)),
            ValueKind::DateTime => {
                NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT).map_err(|_| invalid())?;
                Ok(RawValue::text(text.trim()))
            }
            ValueKind::Unsigned => {
                let n: u16 = text.trim().parse().map_err(|_| invalid())?;
                Ok(RawValue::Short(vec![n]))
            }
            ValueKind::RationalPair => {
                let (num, denom) = text.trim().split_once('/').ok_or_else(invalid)?;
                let numerator: u32 = num.trim().parse().map_err(|_| invalid())?;
                let denominator: u32 = denom.trim().parse().map_err(|_| invalid())?;
                Ok(RawValue::Rational(vec![Rational::new(numerator, denominator)]))
            }
            ValueKind::DegreesMinutesSeconds => {
                let parts: Vec<&str> = text.split(',').collect();
                if parts.len() != 3 {
                    return Err(invalid());
                }
                let components = parts
                    .iter()
                    .map(|part| scaled(part, DMS_DENOMINATOR).ok_or_else(invalid))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawValue::Rational(components))
            }
            ValueKind::AltitudeScaled => {
                let text = text.trim();
                let magnitude = text.strip_prefix('-').unwrap_or(text);
                let altitude = scaled(magnitude, ALTITUDE_DENOMINATOR).ok_or_else(invalid)?;
                Ok(RawValue::Rational(vec![altitude]))
            }
            ValueKind::AltitudeReference => match text.trim() {
                "0" => Ok(RawValue::Byte(vec![0])),
                "1" => Ok(RawValue::Byte(vec![1])),
                _ => Err(invalid()),
            },
        }
    }

    /// Format a stored value for display and editing.
    ///
    /// Returns `None` when the value does not have the shape this kind
    /// stores (e.g. a camera wrote FNumber as a SHORT).
    pub fn format(&self, raw: &RawValue) -> Option<String> {
        match self {
            ValueKind::Text | ValueKind::DateTime => {
                let bytes = raw.as_ascii()?;
                let text = String::from_utf8_lossy(bytes);
                Some(text.trim_end_matches('\0').to_string())
            }
            ValueKind::Unsigned => match raw {
                RawValue::Byte(v) if !v.is_empty() => Some(join(v)),
                RawValue::Short(v) if !v.is_empty() => Some(join(v)),
                RawValue::Long(v) if !v.is_empty() => Some(join(v)),
                _ => None,
            },
            ValueKind::RationalPair => match raw.as_rationals()? {
                [r] => Some(format!("{}/{}", r.numerator, r.denominator)),
                _ => None,
            },
            ValueKind::DegreesMinutesSeconds => match raw.as_rationals()? {
                [d, m, s] => Some(format!(
                    "{},{},{}",
                    d.to_f64()?,
                    m.to_f64()?,
                    s.to_f64()?
                )),
                _ => None,
            },
            ValueKind::AltitudeScaled => match raw.as_rationals()? {
                [r] => r.to_f64().map(|v| v.to_string()),
                _ => None,
            },
            ValueKind::AltitudeReference => raw.as_unsigned().map(|v| v.to_string()),
        }
    }
}

/// Whether altitude text lies below sea level.
pub(crate) fn is_below_sea_level(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(|v| v < 0.0)
}

/// Parse a non-negative decimal and store it as `round(v * denominator) / denominator`.
fn scaled(text: &str, denominator: u32) -> Option<Rational> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let numerator = (value * denominator as f64).round();
    if numerator > u32::MAX as f64 {
        return None;
    }
    Some(Rational::new(numerator as u32, denominator))
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(kind: ValueKind) -> Result<RawValue, FieldErrorKind> {
        Err(FieldErrorKind::InvalidFormat {
            expected: kind.hint(),
        })
    }

    // ── unsigned ─────────────────────────────────────────────────────

    #[test]
    fn unsigned_parses_digits() {
        assert_eq!(ValueKind::Unsigned.parse("100"), Ok(RawValue::Short(vec![100])));
        assert_eq!(ValueKind::Unsigned.parse(" 3200 "), Ok(RawValue::Short(vec![3200])));
    }

    #[test]
    fn unsigned_rejects_garbage_and_overflow() {
        assert_eq!(ValueKind::Unsigned.parse("not-a-number"), invalid(ValueKind::Unsigned));
        assert_eq!(ValueKind::Unsigned.parse("-5"), invalid(ValueKind::Unsigned));
        assert_eq!(ValueKind::Unsigned.parse("70000"), invalid(ValueKind::Unsigned));
    }

    #[test]
    fn unsigned_formats_short_and_long() {
        assert_eq!(ValueKind::Unsigned.format(&RawValue::Short(vec![100])).as_deref(), Some("100"));
        assert_eq!(ValueKind::Unsigned.format(&RawValue::Long(vec![6400])).as_deref(), Some("6400"));
        assert_eq!(
            ValueKind::Unsigned.format(&RawValue::Short(vec![100, 200])).as_deref(),
            Some("100, 200")
        );
        assert_eq!(ValueKind::Unsigned.format(&RawValue::text("100")), None);
    }

    // ── rational pair ────────────────────────────────────────────────

    #[test]
    fn rational_pair() {
        let raw = ValueKind::RationalPair.parse("1/250").unwrap();
        assert_eq!(raw, RawValue::Rational(vec![Rational::new(1, 250)]));
        assert_eq!(ValueKind::RationalPair.format(&raw).as_deref(), Some("1/250"));
    }

    #[test]
    fn rational_pair_rejects_bad_shapes() {
        for text in ["1", "1/2/3", "a/b", "1/", "/2", "-1/2", "1.5/2"] {
            assert_eq!(
                ValueKind::RationalPair.parse(text),
                invalid(ValueKind::RationalPair),
                "{text}"
            );
        }
    }

    #[test]
    fn rational_pair_allows_zero_denominator() {
        // 0/0 marks an unknown value in EXIF
        let unknown = ValueKind::RationalPair.parse("0/0").unwrap();
        assert_eq!(unknown, RawValue::Rational(vec![Rational::new(0, 0)]));
        assert_eq!(ValueKind::RationalPair.format(&unknown).as_deref(), Some("0/0"));

        let raw = ValueKind::RationalPair.parse("1/0").unwrap();
        assert_eq!(ValueKind::RationalPair.format(&raw).as_deref(), Some("1/0"));
    }

    // ── degrees, minutes, seconds ────────────────────────────────────

    #[test]
    fn dms_scales_by_a_million() {
        let raw = ValueKind::DegreesMinutesSeconds.parse("48,51,30").unwrap();
        assert_eq!(
            raw,
            RawValue::Rational(vec![
                Rational::new(48_000_000, 1_000_000),
                Rational::new(51_000_000, 1_000_000),
                Rational::new(30_000_000, 1_000_000),
            ])
        );
        assert_eq!(ValueKind::DegreesMinutesSeconds.format(&raw).as_deref(), Some("48,51,30"));
    }

    #[test]
    fn dms_keeps_fractional_seconds() {
        let raw = ValueKind::DegreesMinutesSeconds.parse("2, 17, 40.2").unwrap();
        assert_eq!(raw.as_rationals().unwrap()[2], Rational::new(40_200_000, 1_000_000));
        assert_eq!(ValueKind::DegreesMinutesSeconds.format(&raw).as_deref(), Some("2,17,40.2"));
    }

    #[test]
    fn dms_rejects_wrong_arity_and_junk() {
        for text in ["48,51", "48,51,30,1", "48;51;30", "48,x,30", "", "-48,51,30", "inf,0,0"] {
            assert_eq!(
                ValueKind::DegreesMinutesSeconds.parse(text),
                invalid(ValueKind::DegreesMinutesSeconds),
                "{text}"
            );
        }
    }

    // ── altitude ─────────────────────────────────────────────────────

    #[test]
    fn altitude_rounds_to_hundredths() {
        assert_eq!(
            ValueKind::AltitudeScaled.parse("123.45"),
            Ok(RawValue::Rational(vec![Rational::new(12345, 100)]))
        );
        assert_eq!(
            ValueKind::AltitudeScaled.parse("0.005"),
            Ok(RawValue::Rational(vec![Rational::new(1, 100)]))
        );
        let raw = RawValue::Rational(vec![Rational::new(12345, 100)]);
        assert_eq!(ValueKind::AltitudeScaled.format(&raw).as_deref(), Some("123.45"));
    }

    #[test]
    fn altitude_stores_magnitude_of_negative_input() {
        assert_eq!(
            ValueKind::AltitudeScaled.parse("-430.5"),
            Ok(RawValue::Rational(vec![Rational::new(43050, 100)]))
        );
        assert!(is_below_sea_level(" -430.5"));
        assert!(!is_below_sea_level("430.5"));
        assert!(!is_below_sea_level("-0"));
    }

    #[test]
    fn altitude_rejects_trailing_junk() {
        for text in ["12.3abc", "NaN", "--5", "-"] {
            assert_eq!(
                ValueKind::AltitudeScaled.parse(text),
                invalid(ValueKind::AltitudeScaled),
                "{text}"
            );
        }
    }

    #[test]
    fn altitude_reference_is_zero_or_one() {
        assert_eq!(ValueKind::AltitudeReference.parse("1"), Ok(RawValue::Byte(vec![1])));
        assert_eq!(ValueKind::AltitudeReference.parse(" 0 "), Ok(RawValue::Byte(vec![0])));
        assert_eq!(ValueKind::AltitudeReference.parse("2"), invalid(ValueKind::AltitudeReference));
        assert_eq!(
            ValueKind::AltitudeReference.format(&RawValue::Byte(vec![1])).as_deref(),
            Some("1")
        );
    }

    // ── text ─────────────────────────────────────────────────────────

    #[test]
    fn text_is_utf8() {
        let raw = ValueKind::Text.parse("Modèle Ü").unwrap();
        assert_eq!(raw, RawValue::Ascii("Modèle Ü".as_bytes().to_vec()));
        assert_eq!(ValueKind::Text.format(&raw).as_deref(), Some("Modèle Ü"));
    }

    #[test]
    fn date_time_is_validated() {
        assert_eq!(
            ValueKind::DateTime.parse("2023:07:14 18:05:09"),
            Ok(RawValue::text("2023:07:14 18:05:09"))
        );
        assert_eq!(ValueKind::DateTime.parse("2023-07-14 18:05:09"), invalid(ValueKind::DateTime));
        assert_eq!(ValueKind::DateTime.parse("2023:13:01 00:00:00"), invalid(ValueKind::DateTime));
    }
}
