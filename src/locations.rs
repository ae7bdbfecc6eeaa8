//! Place lists ("visited", "wishlist") read from CSV files.
//!
//! The first row is a header. The `latitude`, `longitude` and `name`
//! columns are found by name, in any order; other columns are ignored.

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Read every location from a CSV file.
pub fn read_locations(path: &Path) -> Result<Vec<Location>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read locations file {}", path.display()))?;
    parse_locations(&contents).with_context(|| format!("Invalid locations file {}", path.display()))
}

/// Columns every location file must have.
const REQUIRED_COLUMNS: [&str; 3] = ["latitude", "longitude", "name"];

/// Parse locations from CSV text.
///
/// Header names are matched case-insensitively. A leading byte order mark
/// is ignored, and quoted fields may span lines.
pub fn parse_locations(contents: &str) -> Result<Vec<Location>> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(str::to_lowercase)
        .collect();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("Missing `{column}` column");
        }
    }

    let mut locations = Vec::new();
    for record in reader.records() {
        let record = record.context("Malformed CSV record")?;
        let line = record.position().map_or(0, |p| p.line());

        let location: Location = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Line {line}: invalid row"))?;
        check_range(location.latitude, 90.0)
            .with_context(|| format!("Line {line}: invalid latitude"))?;
        check_range(location.longitude, 180.0)
            .with_context(|| format!("Line {line}: invalid longitude"))?;

        locations.push(location);
    }

    log::debug!("Parsed {} locations", locations.len());
    Ok(locations)
}

fn check_range(value: f64, limit: f64) -> Result<()> {
    if !value.is_finite() || value.abs() > limit {
        bail!("`{value}` is outside ±{limit}");
    }
    Ok(())
}
