use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use egui::{TextureId, Vec2};

use crate::command::Command;
use crate::config::EditorConfig;
use crate::element::Element;
use crate::event::EditorEvent;
use crate::file_handler::{fit_to_canvas, Dropped, FileHandler};
use crate::image_cache::{
    FsFetcher, HttpFetcher, ImageCache, ImageFetcher, ImageLoad, MemoryFetcher, SchemeFetcher,
};
use crate::input::InputHandler;
use crate::interaction::Controller;
use crate::panels::{central_panel, tools_panel};
use crate::renderer::{encode_png, Renderer};
use crate::state::{DesignSnapshot, DesignStore, EditorStore, View};
use crate::texture_manager::{to_color_image, RasterVersion, TextureGenerationError, TextureManager};

/// How often to look for finished image loads while some are in flight
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Text fields and messages owned by the side panel
#[derive(Debug, Default)]
pub struct PanelState {
    pub new_text: String,
    pub image_path: String,
    pub design_name: String,
    pub status: Option<String>,
    /// A color picker edit is open as a gesture
    pub editing_color: bool,
    /// A focused or dragged property field has a gesture open
    pub editing_field: bool,
}

/// The eframe host: owns the store and wires input, rendering and storage around it
pub struct MockupEditorApp {
    pub(crate) config: EditorConfig,
    pub(crate) store: EditorStore,
    pub(crate) controller: Controller,
    pub(crate) images: ImageCache,
    memory: Arc<MemoryFetcher>,
    pub(crate) renderer: Renderer,
    pub(crate) input: InputHandler,
    textures: TextureManager,
    pub(crate) designs: DesignStore,
    file_handler: FileHandler,
    pending_loads: Vec<ImageLoad>,
    /// Set by the store's event bus when something visible changed
    needs_repaint: Arc<AtomicBool>,
    pub(crate) panel: PanelState,
}

impl MockupEditorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let mut app = Self::headless(config);
        if let Some(storage) = cc.storage {
            if let Some(snapshot) = eframe::get_value::<DesignSnapshot>(storage, eframe::APP_KEY) {
                log::info!("restoring last session ({} elements)", snapshot.scene.len());
                snapshot.restore(&mut app.store);
            }
        }
        app
    }

    /// Everything except the window, for tests and tooling
    pub fn headless(config: EditorConfig) -> Self {
        let local: Arc<dyn ImageFetcher> = Arc::new(FsFetcher::new());
        let sources: Arc<dyn ImageFetcher> = match HttpFetcher::new(config.image_load_timeout()) {
            Ok(http) => Arc::new(SchemeFetcher::new(local, Arc::new(http))),
            Err(e) => {
                log::warn!("remote images disabled: {}", e);
                local
            }
        };
        let memory = Arc::new(MemoryFetcher::with_fallback(sources));
        let images = ImageCache::threaded(memory.clone(), config.image_load_timeout());
        let store = EditorStore::new(&config);

        let needs_repaint = Arc::new(AtomicBool::new(true));
        let flag = needs_repaint.clone();
        store.subscribe(Box::new(move |event: &EditorEvent| {
            if event.needs_repaint() {
                flag.store(true, Ordering::Relaxed);
            }
        }));

        Self {
            controller: Controller::new(&config),
            renderer: Renderer::from_config(&config),
            designs: DesignStore::new(config.design_dir.clone()),
            config,
            store,
            images,
            memory,
            input: InputHandler::new(),
            textures: TextureManager::new(),
            file_handler: FileHandler::new(),
            pending_loads: Vec::new(),
            needs_repaint,
            panel: PanelState::default(),
        }
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    pub(crate) fn execute(&mut self, command: &Command) {
        if let Err(e) = self.store.execute(command) {
            self.panel.status = Some(e.to_string());
        }
    }

    /// Add a text element centered on the canvas
    pub(crate) fn add_centered_text(&mut self, text: &str) {
        let canvas = self.store.canvas_size();
        let mut element = Element::text(0.0, 0.0, text);
        element.x = ((canvas.x - element.width) / 2.0).max(0.0);
        element.y = ((canvas.y - element.height) / 2.0).max(0.0);
        self.store.add_element(element);
    }

    /// Add an image file by path, sized from its header and fitted to the canvas
    pub(crate) fn add_image_from_path(&mut self, path: &str) {
        let natural = match image::image_dimensions(path) {
            Ok((w, h)) => Vec2::new(w as f32, h as f32),
            Err(e) => {
                log::warn!("cannot read {}: {}", path, e);
                self.panel.status = Some(format!("Cannot open {}: {}", path, e));
                return;
            }
        };
        self.add_image_sized(path, natural);
    }

    /// Fit an image of known size to the canvas and track its load
    fn add_image_sized(&mut self, src: &str, natural: Vec2) {
        let rect = fit_to_canvas(natural, self.store.canvas_size());
        let (_, load) = self.store.add_image_loaded(
            rect.min.x,
            rect.min.y,
            src,
            rect.width(),
            rect.height(),
            &mut self.images,
        );
        self.pending_loads.push(load);
    }

    fn add_dropped(&mut self, dropped: Dropped) {
        match dropped {
            Dropped::Image { src, natural } => self.add_image_sized(&src, natural),
            Dropped::Rejected { name, reason } => {
                self.panel.status = Some(format!("Cannot add {}: {}", name, reason));
            }
        }
    }

    /// Report load failures for images this session added
    fn check_pending_loads(&mut self) {
        let mut failures = Vec::new();
        self.pending_loads.retain_mut(|load| match load.try_result() {
            None => true,
            Some(Ok(_)) => false,
            Some(Err(e)) => {
                failures.push(e.to_string());
                false
            }
        });
        for failure in failures {
            log::warn!("{}", failure);
            self.panel.status = Some(failure);
        }
    }

    /// Texture of the current view, repainted only when the scene or a bitmap changed
    pub(crate) fn canvas_texture(&mut self, ctx: &egui::Context) -> Result<TextureId, TextureGenerationError> {
        let view = self.store.current_view();
        self.renderer.request_images(&self.store, view, &mut self.images);
        let version = RasterVersion {
            scene: self.store.generation(),
            images: self.images.generation(),
        };
        let (renderer, store, images) = (&self.renderer, &self.store, &self.images);
        self.textures.get_or_create_texture(
            view,
            version,
            || to_color_image(&renderer.render(store, view, images)?),
            ctx,
        )
    }

    pub(crate) fn save_design(&mut self) {
        let name = self.panel.design_name.trim().to_owned();
        self.panel.status = Some(match self.designs.save(&name, &self.store) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => format!("Save failed: {}", e),
        });
    }

    pub(crate) fn load_design(&mut self, name: &str) {
        match self.designs.load(name) {
            Ok(snapshot) => {
                snapshot.restore(&mut self.store);
                self.controller = Controller::new(&self.config);
                self.textures.clear_cache();
                self.drop_unused_images();
                self.panel.design_name = name.to_owned();
                self.panel.status = Some(format!("Loaded {}", name));
            }
            Err(e) => self.panel.status = Some(format!("Load failed: {}", e)),
        }
    }

    /// Write a PNG preview of every view next to the saved design
    pub(crate) fn export_previews(&mut self) {
        let name = self.panel.design_name.trim().to_owned();
        let mut written = 0;
        for view in View::ALL {
            let result = self
                .renderer
                .render_view_to_image(&self.store, view, &self.images)
                .map_err(|e| e.to_string())
                .and_then(|image| {
                    self.designs
                        .save_preview(&name, view, &image)
                        .map_err(|e| e.to_string())
                });
            match result {
                Ok(_) => written += 1,
                Err(e) => {
                    self.panel.status = Some(format!("Export of {} failed: {}", view, e));
                    return;
                }
            }
        }
        self.panel.status = Some(format!("Exported {} previews", written));
    }

    /// PNG bytes of the current view
    pub fn export_current_view(&self) -> Result<Vec<u8>, crate::error::RenderError> {
        let image = self
            .renderer
            .render_view_to_image(&self.store, self.store.current_view(), &self.images)?;
        encode_png(&image)
    }

    fn drop_unused_images(&mut self) {
        let mut live = self.store.scene().image_sources();
        live.extend(self.renderer.product().sources().into_iter().map(str::to_owned));
        self.images.retain_sources(live.iter().map(String::as_str));
    }
}

impl eframe::App for MockupEditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &DesignSnapshot::new(&self.store));
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.images.poll() {
            ctx.request_repaint();
        }
        if self.images.is_loading() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }
        self.check_pending_loads();

        for dropped in self.file_handler.process_dropped_files(ctx, &self.memory) {
            self.add_dropped(dropped);
        }

        tools_panel(self, ctx);
        central_panel(self, ctx);
        self.file_handler.preview_files_being_dropped(ctx);

        if self.needs_repaint.swap(false, Ordering::Relaxed) {
            ctx.request_repaint();
        }
    }
}
