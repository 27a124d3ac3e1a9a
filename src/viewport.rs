//! Pan and zoom state for the map image.

use std::fmt;

/// Minimum zoom level (1.0 = image at its base size).
pub const MIN_SCALE: f32 = 1.0;

/// Maximum zoom level.
pub const MAX_SCALE: f32 = 8.0;

/// Scale change per unit of wheel delta, relative to the current scale.
pub const WHEEL_SENSITIVITY: f32 = 0.001;

/// Multiplier for the zoom buttons and keyboard shortcuts.
pub const ZOOM_STEP: f32 = 1.2;

/// Pan offset and zoom scale of the map, plus the drag in progress.
///
/// Zoom is anchored at the centre of the view, not at the pointer, and the
/// offset is never clamped: the map may be dragged past its edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f32,
    offset: [f32; 2],
    /// Pointer position minus offset at the start of the current drag
    drag_anchor: Option<[f32; 2]>,
    initial_scale: f32,
    initial_offset: [f32; 2],
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(MIN_SCALE, [0.0, 0.0])
    }
}

impl Viewport {
    /// Creates a viewport, clamping `scale` into the allowed range.
    pub fn new(scale: f32, offset: [f32; 2]) -> Self {
        let scale = clamp_scale(scale);
        Self {
            scale,
            offset,
            drag_anchor: None,
            initial_scale: scale,
            initial_offset: offset,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Zooms by a wheel delta (positive `delta_y` scrolls down and zooms out).
    pub fn on_wheel(&mut self, delta_y: f32) {
        let delta = -delta_y * WHEEL_SENSITIVITY;
        self.scale = clamp_scale(self.scale + delta * self.scale);
    }

    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(self.scale * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(self.scale / ZOOM_STEP);
    }

    /// Begins a drag with the pointer at `(x, y)`.
    pub fn drag_start(&mut self, x: f32, y: f32) {
        self.drag_anchor = Some([x - self.offset[0], y - self.offset[1]]);
    }

    /// Moves the map with the pointer. Ignored when no drag is in progress.
    pub fn drag_move(&mut self, x: f32, y: f32) {
        if let Some([ax, ay]) = self.drag_anchor {
            self.offset = [x - ax, y - ay];
        }
    }

    /// Ends the drag, whether or not one was in progress.
    pub fn drag_end(&mut self) {
        self.drag_anchor = None;
    }

    /// Starts a pan when exactly one finger touches the map.
    pub fn touch_start(&mut self, touches: &[[f32; 2]]) {
        if let [[x, y]] = touches {
            self.drag_start(*x, *y);
        }
    }

    /// Pans with a single finger; multi-finger moves are ignored (no pinch zoom).
    pub fn touch_move(&mut self, touches: &[[f32; 2]]) {
        if let [[x, y]] = touches {
            self.drag_move(*x, *y);
        }
    }

    pub fn touch_end(&mut self) {
        self.drag_end();
    }

    /// Restores the view the viewport was created with.
    pub fn reset(&mut self) {
        self.scale = self.initial_scale;
        self.offset = self.initial_offset;
        self.drag_anchor = None;
    }

    /// CSS-equivalent transform, e.g. `translate(20px, 500px) scale(3.5)`.
    pub fn transform(&self) -> String {
        self.to_string()
    }

    /// Rectangle `(min, size)` of the image after the transform.
    ///
    /// `center` is the centre of the view and `base_size` the untransformed
    /// image size; scaling happens about `center`, then the offset applies.
    pub fn project(&self, center: [f32; 2], base_size: [f32; 2]) -> ([f32; 2], [f32; 2]) {
        let size = [base_size[0] * self.scale, base_size[1] * self.scale];
        let min = [
            center[0] + self.offset[0] - size[0] / 2.0,
            center[1] + self.offset[1] - size[1] / 2.0,
        ];
        (min, size)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({})",
            self.offset[0], self.offset[1], self.scale
        )
    }
}

fn clamp_scale(scale: f32) -> f32 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn wheel_keeps_scale_in_range() {
        let deltas = [
            -1.0e6, -5000.0, -1000.0, -120.0, -1.0, 0.0, 1.0, 53.0, 120.0, 999.0, 1000.0, 1.0e6,
        ];
        for start in [1.0, 2.5, 8.0] {
            for delta in deltas {
                let mut viewport = Viewport::new(start, [0.0, 0.0]);
                for _ in 0..20 {
                    viewport.on_wheel(delta);
                    assert!(
                        (MIN_SCALE..=MAX_SCALE).contains(&viewport.scale()),
                        "scale {} out of range after delta {delta}",
                        viewport.scale()
                    );
                }
            }
        }
    }

    #[test]
    fn wheel_up_zooms_in_proportionally() {
        let mut viewport = Viewport::new(2.0, [0.0, 0.0]);
        viewport.on_wheel(-100.0);
        assert!((viewport.scale() - 2.2).abs() < EPS);

        viewport.on_wheel(100.0);
        assert!((viewport.scale() - 1.98).abs() < EPS);
    }

    #[test]
    fn wheel_leaves_offset_alone() {
        let mut viewport = Viewport::new(2.0, [15.0, -30.0]);
        viewport.on_wheel(-250.0);
        assert_eq!(viewport.offset(), [15.0, -30.0]);
    }

    #[test]
    fn zoom_in_then_out_round_trips() {
        for start in [1.5, 3.5, 6.0] {
            let mut viewport = Viewport::new(start, [0.0, 0.0]);
            viewport.zoom_in();
            viewport.zoom_out();
            assert!((viewport.scale() - start).abs() < EPS);

            viewport.zoom_out();
            viewport.zoom_in();
            assert!((viewport.scale() - start).abs() < EPS);
        }
    }

    #[test]
    fn zoom_buttons_clamp() {
        let mut viewport = Viewport::new(7.9, [0.0, 0.0]);
        viewport.zoom_in();
        assert_eq!(viewport.scale(), MAX_SCALE);

        let mut viewport = Viewport::new(1.1, [0.0, 0.0]);
        viewport.zoom_out();
        assert_eq!(viewport.scale(), MIN_SCALE);
    }

    #[test]
    fn new_clamps_initial_scale() {
        assert_eq!(Viewport::new(0.2, [0.0, 0.0]).scale(), MIN_SCALE);
        assert_eq!(Viewport::new(40.0, [0.0, 0.0]).scale(), MAX_SCALE);
    }

    #[test]
    fn drag_follows_pointer_from_anchor() {
        let mut viewport = Viewport::new(1.0, [20.0, 500.0]);
        viewport.drag_start(100.0, 100.0);
        viewport.drag_move(130.0, 90.0);
        assert_eq!(viewport.offset(), [50.0, 490.0]);
    }

    #[test]
    fn drag_there_and_back_restores_offset() {
        let mut viewport = Viewport::new(2.0, [-12.5, 40.0]);
        let (dx, dy) = (73.25, -18.5);

        viewport.drag_start(300.0, 200.0);
        viewport.drag_move(300.0 + dx, 200.0 + dy);
        viewport.drag_end();

        viewport.drag_start(300.0 + dx, 200.0 + dy);
        viewport.drag_move(300.0, 200.0);
        viewport.drag_end();

        let [x, y] = viewport.offset();
        assert!((x + 12.5).abs() < EPS);
        assert!((y - 40.0).abs() < EPS);
    }

    #[test]
    fn offset_is_not_clamped() {
        let mut viewport = Viewport::default();
        viewport.drag_start(0.0, 0.0);
        viewport.drag_move(-1.0e5, 1.0e5);
        assert_eq!(viewport.offset(), [-1.0e5, 1.0e5]);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let mut viewport = Viewport::new(1.0, [5.0, 5.0]);
        viewport.drag_move(200.0, 200.0);
        assert_eq!(viewport.offset(), [5.0, 5.0]);

        viewport.drag_start(0.0, 0.0);
        viewport.drag_end();
        viewport.drag_move(200.0, 200.0);
        assert_eq!(viewport.offset(), [5.0, 5.0]);
    }

    #[test]
    fn drag_end_is_unconditional() {
        let mut viewport = Viewport::default();
        viewport.drag_end();
        assert!(!viewport.is_dragging());
        viewport.drag_start(1.0, 1.0);
        assert!(viewport.is_dragging());
        viewport.drag_end();
        viewport.drag_end();
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn single_finger_pans() {
        let mut viewport = Viewport::default();
        viewport.touch_start(&[[10.0, 10.0]]);
        viewport.touch_move(&[[25.0, 5.0]]);
        viewport.touch_end();
        assert_eq!(viewport.offset(), [15.0, -5.0]);
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn multi_finger_touch_does_not_pan_or_zoom() {
        let mut viewport = Viewport::new(2.0, [0.0, 0.0]);
        viewport.touch_start(&[[10.0, 10.0], [50.0, 50.0]]);
        assert!(!viewport.is_dragging());
        viewport.touch_move(&[[0.0, 0.0], [90.0, 90.0]]);
        assert_eq!(viewport.offset(), [0.0, 0.0]);
        assert_eq!(viewport.scale(), 2.0);
    }

    #[test]
    fn second_finger_pauses_an_existing_pan() {
        let mut viewport = Viewport::default();
        viewport.touch_start(&[[0.0, 0.0]]);
        viewport.touch_move(&[[10.0, 0.0], [40.0, 40.0]]);
        assert_eq!(viewport.offset(), [0.0, 0.0]);
        viewport.touch_move(&[[20.0, 0.0]]);
        assert_eq!(viewport.offset(), [20.0, 0.0]);
    }

    #[test]
    fn reset_restores_initial_view() {
        let mut viewport = Viewport::new(3.5, [20.0, 500.0]);
        viewport.zoom_in();
        viewport.drag_start(0.0, 0.0);
        viewport.drag_move(90.0, 90.0);
        viewport.reset();
        assert_eq!(viewport.scale(), 3.5);
        assert_eq!(viewport.offset(), [20.0, 500.0]);
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn transform_matches_css_form() {
        let viewport = Viewport::new(3.5, [20.0, 500.0]);
        assert_eq!(viewport.transform(), "translate(20px, 500px) scale(3.5)");
    }

    #[test]
    fn project_scales_about_center_then_translates() {
        let viewport = Viewport::new(2.0, [10.0, -20.0]);
        let (min, size) = viewport.project([400.0, 300.0], [100.0, 50.0]);
        assert_eq!(size, [200.0, 100.0]);
        assert_eq!(min, [310.0, 230.0]);
    }
}
