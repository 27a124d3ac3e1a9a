//! Marker catalog loading and marker hit-testing.

use crate::{MapMarker, MarkerCatalog};
use rust_embed::RustEmbed;
use std::collections::HashSet;
use thiserror::Error;

/// Data files bundled into the binary.
/// In debug mode they are read from the filesystem, in release mode they are
/// compressed and embedded.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

const CATALOG_FILE: &str = "markers.ron";

/// Errors that can occur when loading the marker catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("markers.ron not found in embedded assets")]
    CatalogNotFound,
    #[error("invalid UTF-8 in markers.ron: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("failed to parse markers.ron: {0}")]
    ParseError(#[from] ron::de::SpannedError),
    #[error("duplicate marker id '{0}'")]
    DuplicateId(String),
    #[error("marker '{0}' has an empty label")]
    EmptyLabel(String),
    #[error("marker '{id}' is outside the map: ({x}, {y})")]
    OutOfBounds { id: String, x: f32, y: f32 },
}

/// Loads the marker catalog from embedded assets.
pub fn load_markers() -> Result<MarkerCatalog, CatalogError> {
    let file = Assets::get(CATALOG_FILE).ok_or(CatalogError::CatalogNotFound)?;
    let ron_string = std::str::from_utf8(&file.data)?;
    parse_markers(ron_string)
}

/// Parses and validates a marker catalog in RON form.
pub fn parse_markers(ron_string: &str) -> Result<MarkerCatalog, CatalogError> {
    let markers: MarkerCatalog = ron::from_str(ron_string)?;

    let mut seen = HashSet::new();
    for marker in &markers {
        if !seen.insert(marker.id.as_str()) {
            return Err(CatalogError::DuplicateId(marker.id.clone()));
        }
        if marker.label.trim().is_empty() {
            return Err(CatalogError::EmptyLabel(marker.id.clone()));
        }
        let in_range = |v: f32| (0.0..=100.0).contains(&v);
        if !in_range(marker.x) || !in_range(marker.y) {
            return Err(CatalogError::OutOfBounds {
                id: marker.id.clone(),
                x: marker.x,
                y: marker.y,
            });
        }
    }

    log::debug!("Loaded {} markers", markers.len());
    Ok(markers)
}

/// Finds a catalog entry by id or by label (case-insensitive).
pub fn find_marker<'a>(markers: &'a [MapMarker], query: &str) -> Option<&'a MapMarker> {
    let query = query.trim();
    let lowered = query.to_lowercase();
    markers
        .iter()
        .find(|m| m.id == query)
        .or_else(|| markers.iter().find(|m| m.label.to_lowercase() == lowered))
}

impl MapMarker {
    /// Position of the marker inside the displayed image rectangle.
    pub fn screen_position(&self, map_min: [f32; 2], map_size: [f32; 2]) -> [f32; 2] {
        [
            map_min[0] + self.x / 100.0 * map_size[0],
            map_min[1] + self.y / 100.0 * map_size[1],
        ]
    }
}

/// Returns the top-most marker whose hit box contains `point`.
///
/// The hit box is the square of half-side `radius` centred on the marker,
/// the same area the viewer makes clickable. Markers later in the slice are
/// drawn on top, so they win overlaps.
pub fn marker_at<'a>(
    markers: &'a [MapMarker],
    map_min: [f32; 2],
    map_size: [f32; 2],
    point: [f32; 2],
    radius: f32,
) -> Option<&'a MapMarker> {
    markers.iter().rev().find(|marker| {
        let [mx, my] = marker.screen_position(map_min, map_size);
        (point[0] - mx).abs() <= radius && (point[1] - my).abs() <= radius
    })
}
