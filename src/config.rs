use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for exif-edit.
///
/// Controls which place lists are drawn on the map, how the map looks,
/// and where edited images are written.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_edit::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.locations.visited = Some("visited.csv".into());
/// config.output.overwrite_originals = true;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV files with places to draw next to the photos.
    pub locations: LocationsConfig,
    /// Map rendering options.
    pub map: MapConfig,
    /// Output behavior (dry run, backups, file naming).
    pub output: OutputConfig,
}

/// Place lists shown on the map. Each file is a CSV with `latitude`,
/// `longitude` and `name` columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationsConfig {
    /// Places already visited (green markers).
    pub visited: Option<PathBuf>,
    /// Places to visit (blue markers).
    pub wishlist: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Draw a line through each place list, in file order.
    pub connect_points: bool,
    /// Zoom level used when no photo has a GPS position.
    pub zoom_start: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            connect_points: true,
            zoom_start: 2,
        }
    }
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would be written without modifying any files.
    pub dry_run: bool,
    /// If `true`, create a `.bak` backup before overwriting an image.
    pub backup_originals: bool,
    /// If `true`, write edits back into the original file instead of a copy.
    pub overwrite_originals: bool,
    /// Appended to the file stem of edited copies (`IMG_1.jpg` → `IMG_1_edited.jpg`).
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_originals: true,
            overwrite_originals: false,
            suffix: "_edited".to_string(),
        }
    }
}

impl Config {
    /// Default config location: `config.json` beside the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Failed to locate the running executable")?;
        exe.parent()
            .map(|dir| dir.join("config.json"))
            .context("Executable has no parent directory")
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        path.map_or_else(Self::config_path, |p| Ok(p.to_path_buf()))
    }

    /// Load config from `path`, or from [`config_path`](Self::config_path).
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write config as pretty JSON to `path`, or to
    /// [`config_path`](Self::config_path). Missing parent directories are
    /// created.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve(path)?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!("Wrote config to {}", path.display());
        Ok(())
    }
}
