//! Color constants for the map, markers and story panel.

use eframe::egui::Color32;

// Map image tint (warm sepia)
pub const MAP_TINT: Color32 = Color32::from_rgb(240, 222, 190);
pub const BACKGROUND: Color32 = Color32::from_rgb(26, 21, 18);

// Markers
pub const MARKER_FILL: Color32 = Color32::from_rgb(127, 29, 29);
pub const MARKER_STROKE: Color32 = Color32::from_rgb(253, 230, 138);
pub const MARKER_RING: Color32 = Color32::from_rgba_premultiplied(64, 15, 15, 100);

// Title overlay
pub const TITLE_TEXT: Color32 = Color32::from_rgba_premultiplied(255, 251, 235, 230);
pub const SUBTITLE_TEXT: Color32 = Color32::from_rgba_premultiplied(253, 230, 138, 204);
pub const TEXT_SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 200);

// Story panel
pub const PAPER: Color32 = Color32::from_rgb(244, 236, 216);
pub const INK_HEADING: Color32 = Color32::from_rgb(120, 53, 15);
pub const INK_TITLE: Color32 = Color32::from_rgb(69, 26, 3);
pub const INK_BODY: Color32 = Color32::from_rgb(41, 37, 36);
pub const INK_FADED: Color32 = Color32::from_rgb(160, 120, 90);
