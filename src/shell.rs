//! Application mode and story panel state.

use crate::{AppMode, MapMarker, Story};

/// Identity of one story request. Later clicks get larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// A story fetch the caller should run in the background.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRequest {
    pub id: RequestId,
    pub marker_id: String,
    pub region: String,
    pub context: String,
}

/// Exploring/Reading state machine behind the story panel.
///
/// Only the most recent request may fill the panel: results tagged with an
/// older [`RequestId`], or arriving after the panel was closed, are dropped.
#[derive(Debug, Default)]
pub struct Shell {
    mode: AppMode,
    loading: bool,
    story: Option<Story>,
    pending: Option<StoryRequest>,
    next_request: u64,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Marker id of the request currently awaited, if any.
    #[cfg(test)]
    fn pending_marker(&self) -> Option<&str> {
        self.pending.as_ref().map(|request| request.marker_id.as_str())
    }

    /// Switches to reading `marker` and returns the fetch to run.
    pub fn select_marker(&mut self, marker: &MapMarker) -> StoryRequest {
        self.next_request += 1;
        let request = StoryRequest {
            id: RequestId(self.next_request),
            marker_id: marker.id.clone(),
            region: marker.label.clone(),
            context: marker.region_context.clone(),
        };

        self.mode = AppMode::Reading;
        self.loading = true;
        self.story = None;
        self.pending = Some(request.clone());

        log::debug!("Request {:?} opened for {}", request.id, request.region);
        request
    }

    /// Applies a finished fetch. Returns `false` if the result was stale.
    pub fn resolve(&mut self, id: RequestId, story: Story) -> bool {
        if self.pending.as_ref().map(|request| request.id) != Some(id) {
            log::debug!("Discarding stale story {:?} for {}", id, story.region);
            return false;
        }

        self.pending = None;
        self.loading = false;
        self.story = Some(story);
        true
    }

    /// Closes the panel, whatever is loading.
    pub fn close(&mut self) {
        self.mode = AppMode::Exploring;
        self.loading = false;
        self.story = None;
        self.pending = None;
    }

    pub fn panel_visible(&self) -> bool {
        self.mode == AppMode::Reading || self.loading
    }

    pub fn panel_heading(&self) -> &'static str {
        if self.loading {
            "Consultando los Archivos..."
        } else {
            "Archivo Folclórico"
        }
    }
}
