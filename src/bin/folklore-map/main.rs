#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod assets;
mod cli;
mod colors;
mod constants;
mod gestures;
mod overlays;
mod ui;

use assets::{AssetLoadState, load_map_image};
use clap::Parser;
use cli::{Args, LaunchOptions};
use constants::MAP_SOURCE_KEY;
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use folklore_map::config::MapSource;
use folklore_map::gemini::GeminiClient;
use folklore_map::markers::load_markers;
use folklore_map::shell::{RequestId, Shell};
use folklore_map::story::{StoryOutcome, StoryService};
use folklore_map::viewport::Viewport;
use folklore_map::{MapMarker, MarkerCatalog};
use gestures::TouchTracker;
use std::sync::{Arc, mpsc};

type StoryMessage = (RequestId, StoryOutcome);

/// Main application state for the folklore map viewer.
pub struct FolkloreMapApp {
    markers: MarkerCatalog,
    viewport: Viewport,
    shell: Shell,
    map_source: MapSource,
    map_image: Option<AssetLoadState>,
    texture: Option<TextureHandle>,
    /// Text of the "change map" field
    source_input: String,
    touches: TouchTracker,
    story_service: Arc<StoryService<GeminiClient>>,
    story_tx: mpsc::Sender<StoryMessage>,
    story_rx: mpsc::Receiver<StoryMessage>,
    toasts: Toasts,
    runtime: tokio::runtime::Runtime,
}

impl FolkloreMapApp {
    fn new(cc: &eframe::CreationContext<'_>, options: LaunchOptions) -> Self {
        let LaunchOptions {
            config,
            map_override,
            startup_error,
        } = options;

        let mut toasts = Toasts::new()
            .anchor(egui::Align2::RIGHT_TOP, (-10.0, 10.0))
            .direction(egui::Direction::TopDown);

        if let Some(err) = startup_error {
            add_error_toast(&mut toasts, err, 10.0);
        }

        let markers = match load_markers() {
            Ok(markers) => markers,
            Err(err) => {
                log::error!("{err}");
                add_error_toast(&mut toasts, err.to_string(), 10.0);
                Vec::new()
            }
        };

        let remembered = cc
            .storage
            .and_then(|storage| eframe::get_value::<MapSource>(storage, MAP_SOURCE_KEY));
        let map_source = map_override
            .or(remembered)
            .unwrap_or_else(|| config.map_source.clone());

        let runtime = tokio::runtime::Runtime::new().expect("create tokio runtime");
        let (story_tx, story_rx) = mpsc::channel();

        let mut app = Self {
            markers,
            viewport: Viewport::new(config.initial_scale, config.initial_offset),
            shell: Shell::new(),
            source_input: map_source.to_string(),
            map_source: map_source.clone(),
            map_image: None,
            texture: None,
            touches: TouchTracker::default(),
            story_service: Arc::new(StoryService::new(config.story_client())),
            story_tx,
            story_rx,
            toasts,
            runtime,
        };
        app.load_map(&cc.egui_ctx, map_source);
        app
    }

    /// Starts loading a new map image. Marker positions are kept as they are.
    fn load_map(&mut self, ctx: &egui::Context, source: MapSource) {
        log::info!("Loading map from {source}");

        let (tx, rx) = mpsc::channel();
        let ctx = ctx.clone();
        let task_source = source.clone();

        self.runtime.spawn(async move {
            let result = load_map_image(task_source).await;
            let _ = tx.send(result);
            ctx.request_repaint();
        });

        // Replacing the receiver drops any load still in flight.
        self.map_image = Some(AssetLoadState::Loading(rx));
        self.source_input = source.to_string();
        self.map_source = source;
    }

    /// Polls the map image load and creates the texture once it is decoded.
    fn poll_map_image(&mut self, ctx: &egui::Context) {
        let mut done: Option<AssetLoadState> = None;

        if let Some(AssetLoadState::Loading(rx)) = &self.map_image {
            match rx.try_recv() {
                Ok(Ok(decoded)) => done = Some(AssetLoadState::Ready(decoded)),
                Ok(Err(err)) => done = Some(AssetLoadState::Error(err.to_string())),
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    done = Some(AssetLoadState::Error("channel disconnected".to_owned()));
                }
            }
        }

        let Some(new_state) = done else {
            return;
        };

        match &new_state {
            AssetLoadState::Ready(decoded) => {
                let image = ColorImage::from_rgba_unmultiplied(
                    [decoded.width as usize, decoded.height as usize],
                    &decoded.pixels,
                );
                self.texture = Some(ctx.load_texture("map", image, TextureOptions::LINEAR));
            }
            AssetLoadState::Error(msg) => {
                log::error!("{msg}");
                add_error_toast(&mut self.toasts, msg.clone(), 8.0);
            }
            AssetLoadState::Loading(_) => {}
        }

        self.map_image = Some(new_state);
    }

    /// Opens the story panel for `marker` and asks for its legend in the background.
    fn request_story(&mut self, ctx: &egui::Context, marker: &MapMarker) {
        let request = self.shell.select_marker(marker);
        let service = Arc::clone(&self.story_service);
        let tx = self.story_tx.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let outcome = service
                .fetch_story(&request.region, Some(&request.context))
                .await;
            let _ = tx.send((request.id, outcome));
            ctx.request_repaint();
        });
    }

    /// Applies finished legends; results for superseded clicks are dropped.
    fn poll_stories(&mut self) {
        while let Ok((id, outcome)) = self.story_rx.try_recv() {
            self.shell.resolve(id, outcome.into_story());
        }
    }

    /// Loads the first image file dropped onto the window.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.load_map(ctx, MapSource::File(path));
        }
    }
}

impl eframe::App for FolkloreMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_map_image(ctx);
        self.poll_stories();
        self.handle_dropped_files(ctx);
        self.handle_keyboard_input(ctx);

        self.show_status_bar(ctx);
        self.show_central_panel(ctx);

        self.toasts.show(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, MAP_SOURCE_KEY, &self.map_source);
    }
}

fn add_error_toast(toasts: &mut Toasts, text: String, seconds: f64) {
    toasts.add(Toast {
        kind: ToastKind::Error,
        text: text.into(),
        options: ToastOptions::default()
            .duration_in_seconds(seconds)
            .show_icon(true),
        ..Default::default()
    });
}

fn main() -> eframe::Result {
    env_logger::init();

    let launch = Args::parse().into_launch_options();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Folklore Map",
        options,
        Box::new(|cc| Ok(Box::new(FolkloreMapApp::new(cc, launch)))),
    )
}
