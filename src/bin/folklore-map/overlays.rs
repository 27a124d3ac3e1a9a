//! Marker and title overlays drawn above the map.

use crate::colors;
use crate::constants::{MARKER_HIT_RADIUS, MARKER_RADIUS, STORY_PANEL_WIDTH};
use eframe::egui;
use folklore_map::MapMarker;
use folklore_map::shell::Shell;

const STORY_PANEL_MARGIN: i8 = 24;

/// Draws clickable markers over the map. Returns the marker clicked this frame.
pub fn draw_markers<'a>(
    ui: &mut egui::Ui,
    map_rect: egui::Rect,
    markers: &'a [MapMarker],
) -> Option<&'a MapMarker> {
    let mut clicked = None;
    let map_min = [map_rect.min.x, map_rect.min.y];
    let map_size = [map_rect.width(), map_rect.height()];

    for marker in markers {
        let [x, y] = marker.screen_position(map_min, map_size);
        let pos = egui::pos2(x, y);

        if !ui.clip_rect().expand(MARKER_HIT_RADIUS).contains(pos) {
            continue;
        }

        let hit_rect =
            egui::Rect::from_center_size(pos, egui::Vec2::splat(MARKER_HIT_RADIUS * 2.0));
        let marker_id = ui.id().with(("marker", &marker.id));
        let response = ui
            .interact(hit_rect, marker_id, egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .on_hover_text(marker.label.to_uppercase());

        let radius = if response.hovered() {
            MARKER_RADIUS * 1.5
        } else {
            MARKER_RADIUS
        };

        let painter = ui.painter();
        painter.circle_filled(pos, radius * 2.0, colors::MARKER_RING);
        painter.circle(
            pos,
            radius,
            colors::MARKER_FILL,
            egui::Stroke::new(1.0, colors::MARKER_STROKE),
        );

        if response.clicked() {
            clicked = Some(marker);
        }
    }

    clicked
}

/// Draws the map title in the top-left corner.
pub fn draw_title(ctx: &egui::Context, panel_rect: egui::Rect) {
    egui::Area::new(egui::Id::new("map_title"))
        .fixed_pos(panel_rect.min + egui::vec2(32.0, 32.0))
        .interactable(false)
        .show(ctx, |ui| {
            let painter = ui.painter();
            let origin = ui.cursor().min;

            let layers = [
                (egui::vec2(2.0, 3.0), colors::TEXT_SHADOW),
                (egui::Vec2::ZERO, colors::TITLE_TEXT),
            ];
            for (offset, color) in layers {
                painter.text(
                    origin + offset,
                    egui::Align2::LEFT_TOP,
                    "NORTE ARGENTINO",
                    egui::FontId::proportional(40.0),
                    color,
                );
            }

            painter.text(
                origin + egui::vec2(0.0, 52.0),
                egui::Align2::LEFT_TOP,
                "Leyendas de Salta, Jujuy, Tucumán y el Litoral.",
                egui::FontId::proportional(16.0),
                colors::SUBTITLE_TEXT,
            );

            ui.allocate_space(egui::vec2(420.0, 76.0));
        });
}

/// Right-hand strip of `map_area` covered by the story panel.
pub fn story_panel_rect(map_area: egui::Rect) -> egui::Rect {
    let width = STORY_PANEL_WIDTH.min(map_area.width());
    egui::Rect::from_min_max(
        egui::pos2(map_area.right() - width, map_area.top()),
        map_area.right_bottom(),
    )
}

/// Draws the story panel laid over the right edge of the map.
///
/// The map area keeps its size, so opening or closing the panel never moves
/// the map underneath.
pub fn draw_story_panel(ctx: &egui::Context, map_area: egui::Rect, shell: &mut Shell) {
    if !shell.panel_visible() {
        return;
    }

    let rect = story_panel_rect(map_area);
    let inner = rect.shrink(f32::from(STORY_PANEL_MARGIN));

    egui::Area::new(egui::Id::new("story_panel"))
        .order(egui::Order::Foreground)
        .fixed_pos(rect.min)
        .interactable(true)
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(colors::PAPER)
                .inner_margin(egui::Margin::same(STORY_PANEL_MARGIN))
                .show(ui, |ui| {
                    ui.set_min_size(inner.size());
                    ui.set_max_size(inner.size());

                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(shell.panel_heading().to_uppercase())
                                .size(13.0)
                                .color(colors::INK_HEADING),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let close = egui::Button::new(
                                egui::RichText::new("✖").color(colors::INK_HEADING),
                            )
                            .frame(false);
                            if ui.add(close).on_hover_text("Cerrar (Esc)").clicked() {
                                shell.close();
                            }
                        });
                    });
                    ui.separator();

                    egui::ScrollArea::vertical().show(ui, |ui| {
                        story_content(ui, shell);
                    });
                });
        });
}

fn story_content(ui: &mut egui::Ui, shell: &Shell) {
    ui.add_space(12.0);

    if shell.is_loading() {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.add(egui::Spinner::new().size(32.0).color(colors::INK_HEADING));
            ui.add_space(12.0);
            ui.label(
                egui::RichText::new("Invocando leyenda...")
                    .italics()
                    .color(colors::INK_FADED),
            );
        });
        return;
    }

    let Some(story) = shell.story() else {
        return;
    };

    ui.label(
        egui::RichText::new(&story.title)
            .size(26.0)
            .strong()
            .color(colors::INK_TITLE),
    );
    ui.label(
        egui::RichText::new(story.footer())
            .italics()
            .color(colors::INK_FADED),
    );
    ui.add_space(16.0);

    for paragraph in story.paragraphs() {
        ui.label(
            egui::RichText::new(paragraph)
                .size(16.0)
                .color(colors::INK_BODY),
        );
        ui.add_space(10.0);
    }

    ui.add_space(16.0);
    ui.vertical_centered(|ui| {
        ui.label(
            egui::RichText::new("República Argentina")
                .small()
                .color(colors::INK_FADED),
        );
    });
}
