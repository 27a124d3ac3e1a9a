//! Tracks the fingers currently touching the screen.
//!
//! egui also turns the first finger into pointer events; while any finger is
//! down the map listens to touches only, so a pan is never applied twice.

use eframe::egui;
use std::collections::BTreeMap;

/// What a touch event did to the set of fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchChange {
    Started,
    Moved,
    Ended,
}

#[derive(Default)]
pub struct TouchTracker {
    active: BTreeMap<u64, egui::Pos2>,
}

impl TouchTracker {
    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Positions of all fingers, oldest touch id first.
    pub fn points(&self) -> Vec<[f32; 2]> {
        self.active.values().map(|p| [p.x, p.y]).collect()
    }

    pub fn apply(
        &mut self,
        id: egui::TouchId,
        phase: egui::TouchPhase,
        pos: egui::Pos2,
    ) -> TouchChange {
        match phase {
            egui::TouchPhase::Start => {
                self.active.insert(id.0, pos);
                TouchChange::Started
            }
            egui::TouchPhase::Move => {
                self.active.insert(id.0, pos);
                TouchChange::Moved
            }
            egui::TouchPhase::End | egui::TouchPhase::Cancel => {
                self.active.remove(&id.0);
                TouchChange::Ended
            }
        }
    }
}
