//! UI rendering methods for the folklore map viewer.

use crate::FolkloreMapApp;
use crate::assets::AssetLoadState;
use crate::colors;
use crate::constants::{IMAGE_EXTENSIONS, MAP_HEIGHT_FRACTION, MARKER_HIT_RADIUS};
use crate::gestures::TouchChange;
use crate::overlays::{draw_markers, draw_story_panel, draw_title};
use eframe::egui;
use folklore_map::config::MapSource;
use folklore_map::markers::marker_at;
use rfd::FileDialog;

impl FolkloreMapApp {
    /// Handles keyboard shortcuts for zoom and closing the story panel.
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                self.viewport.zoom_in();
            }
            if i.key_pressed(egui::Key::Minus) {
                self.viewport.zoom_out();
            }
            if i.key_pressed(egui::Key::Num0) {
                self.viewport.reset();
            }
            if i.key_pressed(egui::Key::Escape) {
                self.shell.close();
            }
        });
    }

    /// Renders the bottom status bar with controls hint and current transform.
    pub fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Rueda: Zoom | Arrastrar: Mover | +/-: Zoom | 0: Reiniciar | Esc: Cerrar");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.viewport.transform());
                });
            });
        });
    }

    /// Renders the central panel containing the map view.
    pub fn show_central_panel(&mut self, ctx: &egui::Context) {
        let frame = egui::Frame::central_panel(&ctx.style()).fill(colors::BACKGROUND);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let panel_rect = ui.max_rect();
            self.show_map(ui, ctx);
            draw_title(ctx, panel_rect);
            self.show_zoom_controls(ctx, panel_rect);
            self.show_source_controls(ctx, panel_rect);
            draw_story_panel(ctx, panel_rect, &mut self.shell);
        });
    }

    /// Renders the floating zoom buttons.
    fn show_zoom_controls(&mut self, ctx: &egui::Context, panel_rect: egui::Rect) {
        let margin = 12.0;
        let panel_width = 96.0;
        let panel_height = 36.0;

        let anchor_pos = egui::pos2(
            panel_rect.right() - panel_width - margin,
            panel_rect.bottom() - panel_height - margin,
        );

        egui::Area::new(egui::Id::new("zoom_controls"))
            .fixed_pos(anchor_pos)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui.button("+").on_hover_text("Acercar (+)").clicked() {
                                self.viewport.zoom_in();
                            }
                            if ui.button("−").on_hover_text("Alejar (-)").clicked() {
                                self.viewport.zoom_out();
                            }
                        });
                    });
            });
    }

    /// Renders the controls used to swap the map image.
    fn show_source_controls(&mut self, ctx: &egui::Context, panel_rect: egui::Rect) {
        let margin = 12.0;
        let panel_height = 36.0;

        let anchor_pos = egui::pos2(
            panel_rect.left() + margin,
            panel_rect.bottom() - panel_height - margin,
        );

        let mut picked: Option<MapSource> = None;
        egui::Area::new(egui::Id::new("map_source_controls"))
            .fixed_pos(anchor_pos)
            .interactable(true)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(ui.style().visuals.window_fill.gamma_multiply(0.95))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui
                                .button("Cambiar Mapa")
                                .on_hover_text("Elegir una imagen del disco")
                                .clicked()
                                && let Some(path) = FileDialog::new()
                                    .add_filter("Imagen", IMAGE_EXTENSIONS)
                                    .pick_file()
                            {
                                picked = Some(MapSource::File(path));
                            }

                            let field = ui.add(
                                egui::TextEdit::singleline(&mut self.source_input)
                                    .hint_text("URL o archivo de imagen")
                                    .desired_width(260.0),
                            );
                            let entered = field.lost_focus()
                                && ui.input(|i| i.key_pressed(egui::Key::Enter));
                            let opened = ui
                                .button("Abrir")
                                .on_hover_text("También puede soltar una imagen en la ventana")
                                .clicked();

                            let input = self.source_input.trim();
                            if (entered || opened) && !input.is_empty() {
                                let Ok(source) = input.parse::<MapSource>();
                                picked = Some(source);
                            }
                        });
                    });
            });

        if let Some(source) = picked {
            self.load_map(ctx, source);
        }
    }

    /// Renders the map image and its markers, and applies pan and zoom input.
    fn show_map(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        match &self.map_image {
            Some(AssetLoadState::Loading(_)) | None => {
                ui.centered_and_justified(|ui| ui.spinner());
                return;
            }
            Some(AssetLoadState::Error(msg)) => {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        colors::MAP_TINT,
                        format!("No se pudo cargar el mapa: {msg}"),
                    );
                });
                return;
            }
            Some(AssetLoadState::Ready(_)) => {}
        }

        let Some(texture) = &self.texture else {
            return;
        };
        let texture_id = texture.id();
        let image_size = texture.size_vec2();

        let (viewport_rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());

        let base_height = viewport_rect.height() * MAP_HEIGHT_FRACTION;
        let base_size = [base_height * image_size.x / image_size.y, base_height];
        let center = [viewport_rect.center().x, viewport_rect.center().y];

        self.handle_wheel(ui, ctx, viewport_rect);
        self.handle_touches(ctx);
        if !self.touches.is_active() {
            self.handle_pointer_drag(ctx, &response, viewport_rect, base_size);
        }

        let (min, size) = self.viewport.project(center, base_size);
        let map_rect =
            egui::Rect::from_min_size(egui::pos2(min[0], min[1]), egui::vec2(size[0], size[1]));

        if self.viewport.is_dragging() {
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
        }

        ui.set_clip_rect(viewport_rect);
        ui.painter().image(
            texture_id,
            map_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            colors::MAP_TINT,
        );

        let clicked = draw_markers(ui, map_rect, &self.markers).cloned();
        if let Some(marker) = clicked {
            self.request_story(ctx, &marker);
        }
    }

    /// Zooms with the mouse wheel while the pointer is over the map itself.
    fn handle_wheel(&mut self, ui: &egui::Ui, ctx: &egui::Context, viewport_rect: egui::Rect) {
        let (hover_pos, scroll_y) = ctx.input(|i| (i.pointer.hover_pos(), i.raw_scroll_delta.y));
        if scroll_y == 0.0 {
            return;
        }

        let over_map = hover_pos.is_some_and(|pos| {
            viewport_rect.contains(pos) && ctx.layer_id_at(pos) == Some(ui.layer_id())
        });
        if over_map {
            // egui reports wheel-up as positive; the viewport expects DOM-style deltas.
            self.viewport.on_wheel(-scroll_y);
        }
    }

    /// Pans with a single finger.
    fn handle_touches(&mut self, ctx: &egui::Context) {
        let events = ctx.input(|i| i.events.clone());

        for event in events {
            let egui::Event::Touch { id, phase, pos, .. } = event else {
                continue;
            };

            match self.touches.apply(id, phase, pos) {
                TouchChange::Started => self.viewport.touch_start(&self.touches.points()),
                TouchChange::Moved => self.viewport.touch_move(&self.touches.points()),
                TouchChange::Ended => self.viewport.touch_end(),
            }
        }
    }

    /// Pans with the mouse unless the press started on a marker.
    ///
    /// The drag ends on release or as soon as the pointer leaves the map area.
    fn handle_pointer_drag(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        viewport_rect: egui::Rect,
        base_size: [f32; 2],
    ) {
        let center = [viewport_rect.center().x, viewport_rect.center().y];

        if response.drag_started_by(egui::PointerButton::Primary) {
            let (map_min, map_size) = self.viewport.project(center, base_size);
            let origin = ctx.input(|i| i.pointer.press_origin());
            let on_marker = origin.is_some_and(|p| {
                marker_at(&self.markers, map_min, map_size, [p.x, p.y], MARKER_HIT_RADIUS)
                    .is_some()
            });

            if !on_marker && let Some(pos) = origin {
                self.viewport.drag_start(pos.x, pos.y);
            }
        }

        if response.dragged()
            && let Some(pos) = response.interact_pointer_pos()
        {
            self.viewport.drag_move(pos.x, pos.y);
        }

        let left_map = ctx
            .input(|i| i.pointer.latest_pos())
            .is_some_and(|pos| !viewport_rect.contains(pos));
        if response.drag_stopped() || left_map {
            self.viewport.drag_end();
        }
    }
}
