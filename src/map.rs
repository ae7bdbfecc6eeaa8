//! Map of the photo location next to the visited and wishlist places.
//!
//! Layers are serialized as a GeoJSON `FeatureCollection`. [`render_html`]
//! wraps that in a standalone Leaflet page with a legend.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;

use crate::exif::GpsPosition;
use crate::locations::Location;

const PHOTO_COLOR: &str = "red";
const VISITED_COLOR: &str = "green";
const WISHLIST_COLOR: &str = "blue";

/// A photo placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoMarker {
    pub name: String,
    pub position: GpsPosition,
}

/// Everything drawn on the map.
#[derive(Debug, Clone, Default)]
pub struct MapLayers {
    pub photos: Vec<PhotoMarker>,
    pub visited: Vec<Location>,
    pub wishlist: Vec<Location>,
    /// Join each place list with a polyline.
    pub connect_points: bool,
    /// Initial zoom when no photo is placed.
    pub zoom_start: u8,
}

impl MapLayers {
    /// The first photo's position, or (0, 0) when there is none.
    pub fn center(&self) -> (f64, f64) {
        self.photos
            .first()
            .map(|p| (p.position.latitude, p.position.longitude))
            .unwrap_or((0.0, 0.0))
    }

    /// Build a GeoJSON FeatureCollection. Coordinates are `[lon, lat]`.
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::new();

        for photo in &self.photos {
            features.push(point(
                photo.position.latitude,
                photo.position.longitude,
                &photo.name,
                "photo",
                PHOTO_COLOR,
            ));
        }

        for (layer, color, places) in [
            ("visited", VISITED_COLOR, &self.visited),
            ("wishlist", WISHLIST_COLOR, &self.wishlist),
        ] {
            for place in places {
                features.push(point(place.latitude, place.longitude, &place.name, layer, color));
            }
            if self.connect_points && places.len() >= 2 {
                let coords: Vec<[f64; 2]> = places.iter().map(|p| [p.longitude, p.latitude]).collect();
                features.push(json!({
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": coords },
                    "properties": { "layer": layer, "color": color },
                }));
            }
        }

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

fn point(lat: f64, lon: f64, name: &str, layer: &str, color: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": { "name": name, "layer": layer, "color": color },
    })
}

const MAP_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Photo map</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        body { margin: 0; padding: 0; }
        #map { height: 100vh; width: 100vw; }
        .legend {
            background: white;
            border: 2px solid grey;
            padding: 10px;
            font-size: 14px;
            line-height: 22px;
        }
        .legend i {
            display: inline-block;
            width: 12px;
            height: 12px;
            border-radius: 50%;
            margin-right: 6px;
        }
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var mapData = __GEOJSON__;
        var map = L.map('map').setView([__LAT__, __LON__], __ZOOM__);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            attribution: '&copy; OpenStreetMap contributors'
        }).addTo(map);

        L.geoJSON(mapData, {
            pointToLayer: function (feature, latlng) {
                return L.circleMarker(latlng, {
                    radius: 8,
                    color: feature.properties.color,
                    fillColor: feature.properties.color,
                    fillOpacity: 0.8
                });
            },
            style: function (feature) {
                return { color: feature.properties.color, weight: 2.5, opacity: 1 };
            },
            onEachFeature: function (feature, layer) {
                if (feature.properties.name) {
                    layer.bindTooltip(feature.properties.name);
                }
            }
        }).addTo(map);

        var legend = L.control({ position: 'bottomleft' });
        legend.onAdd = function () {
            var div = L.DomUtil.create('div', 'legend');
            div.innerHTML = '<b>Legend</b><br>'
                + '<i style="background:red"></i>Photo location<br>'
                + '<i style="background:green"></i>Visited places<br>'
                + '<i style="background:blue"></i>Wishlist places';
            return div;
        };
        legend.addTo(map);
    </script>
</body>
</html>
"#;

/// Zoom used when centering on a photo.
const PHOTO_ZOOM: u8 = 10;

/// Render a standalone Leaflet page for the layers.
pub fn render_html(layers: &MapLayers) -> Result<String> {
    let geojson =
        serde_json::to_string(&layers.to_geojson()).context("Failed to serialize map data")?;
    // Keep `</script>` inside names from closing the script element.
    let geojson = geojson.replace("</", "<\\/");

    let (lat, lon) = layers.center();
    let zoom = if layers.photos.is_empty() {
        layers.zoom_start
    } else {
        PHOTO_ZOOM
    };

    Ok(MAP_HTML_TEMPLATE
        .replace("__GEOJSON__", &geojson)
        .replace("__LAT__", &lat.to_string())
        .replace("__LON__", &lon.to_string())
        .replace("__ZOOM__", &zoom.to_string()))
}

/// Write the map to `path`: an HTML page for `.html`/`.htm`, GeoJSON
/// otherwise.
pub fn write_map(path: &Path, layers: &MapLayers) -> Result<()> {
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "html" | "htm"))
        .unwrap_or(false);

    let contents = if is_html {
        render_html(layers)?
    } else {
        serde_json::to_string_pretty(&layers.to_geojson()).context("Failed to serialize map data")?
    };

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write map file {}", path.display()))?;
    log::info!("Map written to {}", path.display());
    Ok(())
}
