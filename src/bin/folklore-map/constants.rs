/// Width of the story panel in pixels.
pub const STORY_PANEL_WIDTH: f32 = 450.0;

/// Height of the unzoomed map as a fraction of the map area.
pub const MAP_HEIGHT_FRACTION: f32 = 0.9;

/// Largest side of the map texture; bigger images are downscaled on load.
pub const MAX_TEXTURE_SIDE: u32 = 4096;

/// File extensions offered by the map image picker.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Radius of a marker dot in points.
pub const MARKER_RADIUS: f32 = 6.0;

/// Radius around a marker that belongs to the marker rather than the map.
pub const MARKER_HIT_RADIUS: f32 = 12.0;

/// Storage key for the last map source.
pub const MAP_SOURCE_KEY: &str = "map_source";
