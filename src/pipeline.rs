use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{Config, OutputConfig};
use crate::container::{self, ImageKind};
use crate::error::FieldError;
use crate::exif::{self, DisplayField, EditRequest, FIELD_SPECS, GpsPosition, MetadataBlock};
use crate::locations::{self, Location};
use crate::map::{MapLayers, PhotoMarker};

/// Supported image file extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// What was found in an image file.
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub kind: ImageKind,
    /// Pixel size, when the image header could be read.
    pub dimensions: Option<(u32, u32)>,
    /// Decoded EXIF block; empty when the file carries none.
    pub block: MetadataBlock,
}

/// The result of processing a single image.
///
/// Per-field problems land in `field_errors` and do not stop the other
/// fields from being written. `error` is set only when the file as a whole
/// could not be handled.
///
/// # Example
///
/// ```rust,no_run
/// # use exif_edit::pipeline::process_image;
/// # use exif_edit::config::Config;
/// # use exif_edit::exif::EditRequest;
/// let mut edits = EditRequest::new();
/// edits.insert("Make".into(), "Canon".into());
///
/// let result = process_image("photo.jpg".as_ref(), &edits, &Config::default(), None);
/// if result.error.is_none() {
///     println!("Wrote: {:?}", result.written);
///     if let Some(ref out) = result.output_path {
///         println!("Output: {}", out.display());
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Where the edited image went (or would go, in a dry run).
    pub output_path: Option<PathBuf>,
    /// The registered fields after the edits were applied.
    pub fields: Vec<DisplayField>,
    pub written: Vec<&'static str>,
    pub field_errors: Vec<FieldError>,
    pub position: Option<GpsPosition>,
    pub backup_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output_path: None,
            fields: Vec::new(),
            written: Vec::new(),
            field_errors: Vec::new(),
            position: None,
            backup_path: None,
            error: None,
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only files with an extension from
/// [`IMAGE_EXTENSIONS`] are included.
///
/// # Example
///
/// ```rust,no_run
/// use exif_edit::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Create a backup of the original file. An existing backup is kept as is.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Read and decode the EXIF block of an image file.
pub fn read_metadata(path: &Path) -> Result<ImageMetadata> {
    let kind = ImageKind::from_path(path)
        .with_context(|| format!("Unsupported image format: {}", path.display()))?;
    let bytes = std::fs::read(path).context("Failed to read file")?;
    read_metadata_from_bytes(&bytes, kind)
}

fn read_metadata_from_bytes(bytes: &[u8], kind: ImageKind) -> Result<ImageMetadata> {
    let block = match container::extract_exif(bytes, kind)? {
        Some(tiff) => exif::decode(&tiff).context("Malformed EXIF block")?,
        None => {
            log::debug!("No EXIF block in {} image", kind.name());
            MetadataBlock::new()
        }
    };

    let dimensions = match container::dimensions(bytes) {
        Ok(dims) => Some(dims),
        Err(e) => {
            log::warn!("Could not read image size: {e:#}");
            None
        }
    };

    Ok(ImageMetadata {
        kind,
        dimensions,
        block,
    })
}

/// Where an edited copy of `path` is written.
///
/// The original itself when `overwrite_originals` is set, otherwise
/// `<stem><suffix>.<ext>` in the same directory.
pub fn output_path_for(path: &Path, output: &OutputConfig) -> PathBuf {
    if output.overwrite_originals {
        return path.to_path_buf();
    }

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}{}.{}", output.suffix, ext.to_string_lossy()),
        None => format!("{stem}{}", output.suffix),
    };
    path.with_file_name(file_name)
}

/// Read field edits from a JSON object of `label → text`.
pub fn read_edits(path: &Path) -> Result<EditRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edits file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse edits file {}", path.display()))
}

/// Position of the photo for the map, if its GPS fields are complete.
pub fn photo_position(block: &MetadataBlock) -> Option<GpsPosition> {
    let position = exif::gps_position(block);
    if position.is_none() && block.has_section(exif::Section::Gps) {
        log::debug!("GPS section present but latitude/longitude incomplete");
    }
    position
}

/// Apply `edits` to an image and write the result.
///
/// The edited image goes to `output` when given, otherwise to
/// [`output_path_for`]. Nothing is written when no field was changed or in
/// a dry run. Overwriting the original makes a `.bak` copy first when
/// `backup_originals` is set.
pub fn process_image(
    path: &Path,
    edits: &EditRequest,
    config: &Config,
    output: Option<&Path>,
) -> ProcessResult {
    let mut result = ProcessResult::new(path);
    if let Err(e) = edit_image(path, edits, config, output, &mut result) {
        result.error = Some(format!("{e:#}"));
    }
    result
}

fn edit_image(
    path: &Path,
    edits: &EditRequest,
    config: &Config,
    output: Option<&Path>,
    result: &mut ProcessResult,
) -> Result<()> {
    let kind = ImageKind::from_path(path)
        .with_context(|| format!("Unsupported image format: {}", path.display()))?;
    let bytes = std::fs::read(path).context("Failed to read file")?;
    let metadata = read_metadata_from_bytes(&bytes, kind)?;

    let applied = exif::apply(&metadata.block, edits, FIELD_SPECS);
    for err in &applied.errors {
        log::warn!("  {err}");
    }

    result.fields = exif::project(&applied.block, FIELD_SPECS);
    result.position = photo_position(&applied.block);
    result.written = applied.written;
    result.field_errors = applied.errors;

    if result.written.is_empty() {
        log::info!("  No fields changed");
        return Ok(());
    }

    let target = match output {
        Some(p) => p.to_path_buf(),
        None => output_path_for(path, &config.output),
    };
    result.output_path = Some(target.clone());

    if config.output.dry_run {
        log::info!("  Would write {}", target.display());
        return Ok(());
    }

    let tiff = exif::encode(&applied.block).context("Failed to encode EXIF block")?;
    let edited = container::replace_exif(&bytes, kind, Some(tiff))?;

    if target == path && config.output.backup_originals {
        result.backup_path = Some(backup_file(path)?);
    }

    let len = edited.len();
    std::fs::write(&target, edited)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    log::debug!("  Wrote {len} bytes to {}", target.display());
    Ok(())
}

/// Load the configured place lists. A list that cannot be read is logged
/// and left empty.
pub fn load_locations(config: &Config) -> (Vec<Location>, Vec<Location>) {
    let load = |path: &Option<PathBuf>, layer: &str| match path {
        Some(p) => match locations::read_locations(p) {
            Ok(list) => {
                log::info!("Loaded {} {layer} places from {}", list.len(), p.display());
                list
            }
            Err(e) => {
                log::warn!("Skipping {layer} places: {e:#}");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    (
        load(&config.locations.visited, "visited"),
        load(&config.locations.wishlist, "wishlist"),
    )
}

/// Build the map from placed photos and the configured place lists.
pub fn map_layers(photos: Vec<PhotoMarker>, config: &Config) -> MapLayers {
    let (visited, wishlist) = load_locations(config);
    MapLayers {
        photos,
        visited,
        wishlist,
        connect_points: config.map.connect_points,
        zoom_start: config.map.zoom_start,
    }
}
