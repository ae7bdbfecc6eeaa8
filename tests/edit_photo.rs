use std::fs;
use std::io::Cursor;
use std::path::Path;

use exif_edit::config::Config;
use exif_edit::exif::{self, EditRequest, FIELD_SPECS};
use exif_edit::map::{self, PhotoMarker};
use exif_edit::pipeline;
use image::{DynamicImage, ImageFormat};
use tempfile::TempDir;

fn write_image(path: &Path, format: ImageFormat) {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(20, 10)
        .write_to(&mut out, format)
        .unwrap();
    fs::write(path, out.into_inner()).unwrap();
}

fn edits(pairs: &[(&str, &str)]) -> EditRequest {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn edit_png_then_reedit() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("beach.png");
    write_image(&photo, ImageFormat::Png);

    let mut config = Config::default();
    config.output.overwrite_originals = true;
    config.output.backup_originals = false;

    let first = pipeline::process_image(
        &photo,
        &edits(&[
            ("Make", "Sony"),
            ("ExposureTime", "1/250"),
            ("GPSAltitude", "8.25"),
        ]),
        &config,
        None,
    );
    assert!(first.error.is_none(), "{:?}", first.error);
    assert!(!dir.path().join("beach.png.bak").exists());

    // A second pass with one bad value leaves the earlier fields alone.
    let second = pipeline::process_image(
        &photo,
        &edits(&[("ISO", "lots"), ("Model", "A7 IV")]),
        &config,
        None,
    );
    assert!(second.error.is_none(), "{:?}", second.error);
    assert_eq!(second.written, vec!["Model"]);
    assert_eq!(second.field_errors[0].to_string(), "ISO: invalid format, expected a whole number");

    let metadata = pipeline::read_metadata(&photo).unwrap();
    assert_eq!(metadata.dimensions, Some((20, 10)));

    let shown: Vec<(&str, Option<String>)> = exif::project(&metadata.block, FIELD_SPECS)
        .into_iter()
        .map(|f| (f.label, f.text))
        .filter(|(_, text)| text.is_some())
        .collect();
    assert_eq!(
        shown,
        vec![
            ("Make", Some("Sony".to_string())),
            ("Model", Some("A7 IV".to_string())),
            ("GPSAltitudeRef", Some("0".to_string())),
            ("GPSAltitude", Some("8.25".to_string())),
            ("ExposureTime", Some("1/250".to_string())),
        ]
    );
}

#[test]
fn tagged_photo_lands_on_the_map() {
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("harbour.jpg");
    let output = dir.path().join("out").join("harbour.jpg");
    fs::create_dir(output.parent().unwrap()).unwrap();
    write_image(&photo, ImageFormat::Jpeg);

    let result = pipeline::process_image(
        &photo,
        &edits(&[
            ("GPSLatitude", "33,51,25"),
            ("GPSLatitudeRef", "S"),
            ("GPSLongitude", "151,12,55"),
            ("GPSLongitudeRef", "E"),
        ]),
        &Config::default(),
        Some(&output),
    );
    assert!(result.error.is_none(), "{:?}", result.error);
    assert_eq!(result.output_path.as_deref(), Some(output.as_path()));

    let metadata = pipeline::read_metadata(&output).unwrap();
    let position = pipeline::photo_position(&metadata.block).unwrap();
    assert!(position.latitude < -33.8 && position.latitude > -33.9);

    let visited = dir.path().join("visited.csv");
    fs::write(&visited, "name,latitude,longitude\nAuckland,-36.8485,174.7633\n").unwrap();
    let mut config = Config::default();
    config.locations.visited = Some(visited);

    let layers = pipeline::map_layers(
        vec![PhotoMarker {
            name: "harbour.jpg".into(),
            position,
        }],
        &config,
    );
    let map_path = dir.path().join("map.html");
    map::write_map(&map_path, &layers).unwrap();

    let html = fs::read_to_string(&map_path).unwrap();
    assert!(html.contains("harbour.jpg"));
    assert!(html.contains("Auckland"));
}
