use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_edit::exif::{self, DisplayField, EditRequest, FIELD_SPECS, GpsPosition};
use exif_edit::map::{self, PhotoMarker};
use exif_edit::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-edit",
    version,
    about = "View and edit EXIF metadata (camera, capture settings, GPS) and map where photos were taken"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Set a field, e.g. `--set ISO=400` (repeatable)
    #[arg(long = "set", value_name = "LABEL=VALUE")]
    set: Vec<String>,

    /// JSON file with field edits (`{"Make": "Canon", ...}`)
    #[arg(long, value_name = "FILE")]
    edits: Option<PathBuf>,

    /// Write the edited image to this file (single image only)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a map of the photos and configured places (.html or .geojson)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// List the editable fields and their input formats, then exit
    #[arg(long)]
    fields: bool,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Handle --fields
    if cli.fields {
        print_field_list();
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.output.dry_run = true;
    }

    let edits = collect_edits(cli.edits.as_deref(), &cli.set)?;

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }
    if cli.output.is_some() && images.len() > 1 {
        anyhow::bail!("--output needs exactly one input image, found {}", images.len());
    }

    log::info!("Found {} image(s)", images.len());

    let markers = if edits.is_empty() {
        show_images(&images, cli.json)?
    } else {
        edit_images(&images, &edits, &config, cli.output.as_deref(), cli.json)?
    };

    // Handle --map
    if let Some(ref map_path) = cli.map {
        if markers.is_empty() {
            log::warn!("No image has a GPS position; the map shows places only");
        }
        let layers = pipeline::map_layers(markers, &config);
        map::write_map(map_path, &layers)?;
    }

    Ok(())
}

/// Merge the edits file with `--set` pairs. `--set` wins on conflicts.
fn collect_edits(edits_file: Option<&Path>, pairs: &[String]) -> Result<EditRequest> {
    let mut edits = match edits_file {
        Some(path) => pipeline::read_edits(path)?,
        None => EditRequest::new(),
    };

    for pair in pairs {
        let (label, value) = pair
            .split_once('=')
            .with_context(|| format!("Invalid --set `{pair}`, expected LABEL=VALUE"))?;
        let label = label.trim();
        if exif::lookup(FIELD_SPECS, label).is_none() {
            log::warn!("Unknown field `{label}` (see --fields), ignoring");
        }
        edits.insert(label.to_string(), value.to_string());
    }

    Ok(edits)
}

/// Print the registered fields of each image.
fn show_images(images: &[PathBuf], json: bool) -> Result<Vec<PhotoMarker>> {
    let mut markers = Vec::new();
    let mut json_results = Vec::new();

    for image_path in images {
        let metadata = match pipeline::read_metadata(image_path) {
            Ok(m) => m,
            Err(e) => {
                log::error!("{}: {e:#}", image_path.display());
                if json {
                    json_results.push(serde_json::json!({
                        "path": image_path.display().to_string(),
                        "error": format!("{e:#}"),
                    }));
                }
                continue;
            }
        };

        let fields = exif::project(&metadata.block, FIELD_SPECS);
        let position = pipeline::photo_position(&metadata.block);
        if let Some(position) = position {
            markers.push(marker(image_path, position));
        }

        if json {
            json_results.push(serde_json::json!({
                "path": image_path.display().to_string(),
                "format": metadata.kind.name(),
                "dimensions": metadata.dimensions,
                "fields": fields,
                "position": position,
            }));
        } else {
            print_fields(image_path, metadata.dimensions, &fields, &[], position);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    Ok(markers)
}

/// Apply the edits to every image and report what happened.
fn edit_images(
    images: &[PathBuf],
    edits: &EditRequest,
    config: &config::Config,
    output: Option<&Path>,
    json: bool,
) -> Result<Vec<PhotoMarker>> {
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!(
            "[{}/{}] Processing: {}",
            i + 1,
            total,
            image_path.display()
        );

        let result = pipeline::process_image(image_path, edits, config, output);

        // Print result
        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else {
            if !result.written.is_empty() {
                log::info!("  Wrote: {}", result.written.join(", "));
            }
            if let Some(ref out) = result.output_path {
                log::info!("  Output: {}", out.display());
            }
            if let Some(ref backup) = result.backup_path {
                log::info!("  Backup: {}", backup.display());
            }
            if config.output.dry_run && !json {
                print_fields(
                    image_path,
                    None,
                    &result.fields,
                    &result.written,
                    result.position,
                );
            }
        }

        results.push(result);
    }

    // JSON output
    if json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "backup_path": r.backup_path.as_ref().map(|p| p.display().to_string()),
                    "written": r.written,
                    "field_errors": r.field_errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                    "fields": r.fields,
                    "position": r.position,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let rejected: usize = results.iter().map(|r| r.field_errors.len()).sum();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");
    if rejected > 0 {
        log::warn!("{rejected} field value(s) were rejected and left unchanged");
    }

    Ok(results
        .into_iter()
        .filter_map(|r| {
            let position = r.position?;
            Some(marker(&r.path, position))
        })
        .collect())
}

fn marker(path: &Path, position: GpsPosition) -> PhotoMarker {
    PhotoMarker {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
        position,
    }
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const LABEL_WIDTH: usize = 22;
/// Value column width before wrapping.
const VALUE_WIDTH: usize = 46;

/// Print the editable fields with their section and input format.
fn print_field_list() {
    println!();
    println!("  {BOLD}Editable fields{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(70));
    for spec in FIELD_SPECS {
        print_row(
            spec.label,
            &format!("{} {DIM}({}){RESET}", spec.kind.hint(), spec.section),
            false,
        );
    }
    println!();
}

/// Print the registered fields of one image. Labels in `written` are
/// highlighted as new values.
fn print_fields(
    path: &Path,
    dimensions: Option<(u32, u32)>,
    fields: &[DisplayField],
    written: &[&str],
    position: Option<GpsPosition>,
) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    if let Some((w, h)) = dimensions {
        print_row("ImageSize", &format!("{w} x {h}"), false);
    }

    let mut any = false;
    for field in fields {
        let Some(ref text) = field.text else {
            continue;
        };
        any = true;
        print_row(field.label, text, written.contains(&field.label));
    }

    if let Some(position) = position {
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        print_row("Latitude", &format!("{:.6}", position.latitude), false);
        print_row("Longitude", &format!("{:.6}", position.longitude), false);
    }

    if !any {
        println!("  {DIM}(no EXIF metadata found){RESET}");
    }
    if !written.is_empty() {
        println!("  {GREEN}*{RESET} = new value to be written");
    }
    println!();
}

/// Print one table row. A `changed` value is green and marked with `*`.
fn print_row(label: &str, value: &str, changed: bool) {
    let mut lines = row_lines(label, value);
    if changed {
        if let Some(last) = lines.last_mut() {
            last.push_str(" *");
        }
    }
    for line in lines {
        if changed {
            println!("  {GREEN}{line}{RESET}");
        } else {
            println!("  {line}");
        }
    }
}

/// Lay out a label and its value, filling words into the value column.
/// Continuation lines line up under the first value line.
fn row_lines(label: &str, value: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    for word in value.split_whitespace() {
        match chunks.last_mut() {
            Some(chunk) if chunk.len() + 1 + word.len() <= VALUE_WIDTH => {
                chunk.push(' ');
                chunk.push_str(word);
            }
            _ => chunks.push(word.to_string()),
        }
    }
    if chunks.is_empty() {
        chunks.push(value.to_string());
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                format!("{label:<LABEL_WIDTH$} : {chunk}")
            } else {
                format!("{:indent$}{chunk}", "", indent = LABEL_WIDTH + 3)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── collect_edits ────────────────────────────────────────────────

    #[test]
    fn set_pairs_override_edits_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("edits.json");
        std::fs::write(&path, r#"{ "Make": "Canon", "ISO": "100" }"#).unwrap();

        let edits = collect_edits(Some(&path), &["ISO=800".into(), "Model = R5".into()]).unwrap();
        assert_eq!(edits.get("Make").map(String::as_str), Some("Canon"));
        assert_eq!(edits.get("ISO").map(String::as_str), Some("800"));
        assert_eq!(edits.get("Model").map(String::as_str), Some(" R5"));
    }

    #[test]
    fn set_pair_keeps_equals_in_value() {
        let edits = collect_edits(None, &["Software=a=b".into()]).unwrap();
        assert_eq!(edits.get("Software").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn set_pair_without_equals_is_an_error() {
        assert!(collect_edits(None, &["ISO".into()]).is_err());
    }

    // ── row_lines ────────────────────────────────────────────────────

    #[test]
    fn short_value_fits_one_row() {
        assert_eq!(row_lines("ISO", "400"), vec![format!("{:<22} : 400", "ISO")]);
        assert_eq!(row_lines("Software", ""), vec![format!("{:<22} : ", "Software")]);
    }

    #[test]
    fn long_value_wraps_under_the_value_column() {
        let value = "Adobe Photoshop Lightroom Classic 13.2 (Macintosh) with a very long build tag";
        let lines = row_lines("Software", value);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Software "));
        assert!(lines[0].len() <= 22 + 3 + VALUE_WIDTH);
        assert!(lines[1].starts_with(&" ".repeat(25)));
        assert_eq!(lines[1].trim_start(), "(Macintosh) with a very long build tag");
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "exif-edit",
            "photo.jpg",
            "--set",
            "ISO=400",
            "--set",
            "Make=Canon",
            "--map",
            "map.html",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("photo.jpg")]);
        assert_eq!(cli.set.len(), 2);
        assert_eq!(cli.map, Some(PathBuf::from("map.html")));
        assert!(cli.dry_run);
    }
}
