#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod components;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod geometry;
pub mod id_generator;
pub mod image_cache;
pub mod input;
pub mod interaction;
pub mod overlay;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod texture_manager;
pub mod util;
pub mod widgets;

pub use app::MockupEditorApp;
pub use command::{Command, CommandError, History};
pub use config::{EditorConfig, ProductViews};
pub use element::{Element, ElementKind, ElementPatch, Payload};
pub use event::{EditorEvent, EventBus};
pub use id_generator::ElementId;
pub use image_cache::{ImageCache, ImageLoad};
pub use input::{InputEvent, KeyEvent, PointerEvent};
pub use interaction::{Controller, InteractionResponse};
pub use overlay::OverlayLayout;
pub use renderer::{DisplayList, FontBook, Renderer};
pub use state::{DesignStore, EditorStore, Scene, View};
