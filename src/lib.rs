use serde::{Deserialize, Serialize};

pub mod config;
pub mod gemini;
pub mod markers;
pub mod shell;
pub mod story;
pub mod viewport;

/// A clickable region on the map (e.g., "Jujuy", "Misiones")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    /// Unique identifier within the catalog
    pub id: String,
    /// Display name, also used as the region name in prompts
    pub label: String,
    /// Horizontal position, percent of the image width [0, 100]
    pub x: f32,
    /// Vertical position, percent of the image height [0, 100]
    pub y: f32,
    /// Places, spirits and legends that seed the storyteller
    pub region_context: String,
}

/// A legend ready to be shown in the story panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    /// Archaic title of the legend
    pub title: String,
    /// Body text, paragraphs separated by newlines
    pub content: String,
    /// Region label the legend was told for
    pub region: String,
}

impl Story {
    /// Non-empty paragraphs of the story body.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .split('\n')
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
    }

    /// Caption shown under the title.
    pub fn footer(&self) -> String {
        format!("Región de {} — Circa 1882", self.region)
    }
}

/// What the user is currently doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppMode {
    /// Panning and zooming the map
    #[default]
    Exploring,
    /// A marker was clicked; a story is loading or displayed
    Reading,
}

/// Root type for the marker catalog file
pub type MarkerCatalog = Vec<MapMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_skip_blank_lines() {
        let story = Story {
            title: "La Luz Mala".to_owned(),
            content: "Primera parte.\n\n  Segunda parte.  \n".to_owned(),
            region: "Salta".to_owned(),
        };
        let paragraphs: Vec<_> = story.paragraphs().collect();
        assert_eq!(paragraphs, vec!["Primera parte.", "Segunda parte."]);
    }

    #[test]
    fn footer_names_region_and_era() {
        let story = Story {
            title: String::new(),
            content: String::new(),
            region: "Misiones".to_owned(),
        };
        assert_eq!(story.footer(), "Región de Misiones — Circa 1882");
    }
}
