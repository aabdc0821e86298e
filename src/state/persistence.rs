use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{EditorStore, Scene, View};
use crate::util::time;

/// Errors that can occur while saving or loading designs
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize design: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to access design file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to write preview: {0}")]
    PreviewError(#[from] image::ImageError),

    #[error("Invalid design name: {0:?}")]
    InvalidName(String),

    #[error("No design named {0:?}")]
    NotFound(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serialize a scene to pretty JSON
pub fn to_json(scene: &Scene) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(scene)?)
}

/// Parse a scene from JSON
pub fn from_json(json: &str) -> PersistenceResult<Scene> {
    Ok(serde_json::from_str(json)?)
}

/// A saved design: the scene plus the canvas it was laid out on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSnapshot {
    pub scene: Scene,
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Seconds since the UNIX epoch
    pub timestamp: u64,
    /// Crate version that wrote the snapshot
    pub version: String,
}

impl DesignSnapshot {
    pub fn new(store: &EditorStore) -> Self {
        let canvas = store.canvas_size();
        Self {
            scene: store.scene().clone(),
            canvas_width: canvas.x,
            canvas_height: canvas.y,
            timestamp: time::timestamp_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Load this snapshot into the store, replacing its scene and history
    pub fn restore(self, store: &mut EditorStore) {
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "design snapshot version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }
        store.set_canvas_size(self.canvas_width, self.canvas_height);
        store.replace_scene(self.scene);
    }
}

/// Named designs stored as JSON files, with optional per-view PNG previews
#[derive(Debug, Clone)]
pub struct DesignStore {
    dir: PathBuf,
}

impl DesignStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn design_path(&self, name: &str) -> PersistenceResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}.json", name)))
    }

    pub fn preview_path(&self, name: &str, view: View) -> PersistenceResult<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{}-{}.png", name, view.as_str())))
    }

    /// Save the store's scene under `name`, overwriting any previous design
    pub fn save(&self, name: &str, store: &EditorStore) -> PersistenceResult<PathBuf> {
        let path = self.design_path(name)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&DesignSnapshot::new(store))?;
        fs::write(&path, json)?;
        log::info!("saved design {:?} to {}", name, path.display());
        Ok(path)
    }

    pub fn save_preview(
        &self,
        name: &str,
        view: View,
        preview: &image::RgbaImage,
    ) -> PersistenceResult<PathBuf> {
        let path = self.preview_path(name, view)?;
        fs::create_dir_all(&self.dir)?;
        preview.save_with_format(&path, image::ImageFormat::Png)?;
        log::info!("saved {} preview of {:?}", view, name);
        Ok(path)
    }

    pub fn load(&self, name: &str) -> PersistenceResult<DesignSnapshot> {
        let path = self.design_path(name)?;
        if !path.exists() {
            return Err(PersistenceError::NotFound(name.to_owned()));
        }
        let json = fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&json)?;
        log::info!("loaded design {:?}", name);
        Ok(snapshot)
    }

    /// Names of saved designs, sorted
    pub fn list(&self) -> PersistenceResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != "json" {
                    return None;
                }
                path.file_stem()?.to_str().map(str::to_owned)
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Remove a design and its previews
    pub fn delete(&self, name: &str) -> PersistenceResult<()> {
        let path = self.design_path(name)?;
        if !path.exists() {
            return Err(PersistenceError::NotFound(name.to_owned()));
        }
        fs::remove_file(path)?;
        for view in View::ALL {
            let preview = self.preview_path(name, view)?;
            if preview.exists() {
                fs::remove_file(preview)?;
            }
        }
        log::info!("deleted design {:?}", name);
        Ok(())
    }
}

fn validate_name(name: &str) -> PersistenceResult<()> {
    let bad = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(|c: char| matches!(c, '/' | '\\' | ':') || c.is_control());
    if bad {
        Err(PersistenceError::InvalidName(name.to_owned()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mockup-editor-{}-{}", tag, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn rejects_path_like_names() {
        assert!(validate_name("shirt").is_ok());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(".hidden").is_err());
    }

    #[test]
    fn save_list_load_delete() {
        let dir = temp_dir("store");
        let designs = DesignStore::new(&dir);
        let mut store = EditorStore::default();
        store.add_text(10.0, 20.0, "Saved");
        store.set_canvas_size(500.0, 300.0);

        designs.save("tee", &store).unwrap();
        designs.save("hoodie", &store).unwrap();
        assert_eq!(designs.list().unwrap(), vec!["hoodie".to_string(), "tee".to_string()]);

        let snapshot = designs.load("tee").unwrap();
        assert_eq!(snapshot.scene, *store.scene());
        assert_eq!(snapshot.canvas_width, 500.0);

        let mut restored = EditorStore::default();
        snapshot.restore(&mut restored);
        assert_eq!(restored.scene(), store.scene());
        assert_eq!(restored.canvas_size(), egui::vec2(500.0, 300.0));
        assert!(!restored.can_undo());

        designs.delete("tee").unwrap();
        assert!(matches!(designs.load("tee"), Err(PersistenceError::NotFound(_))));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let designs = DesignStore::new(std::env::temp_dir().join("mockup-editor-does-not-exist"));
        assert!(designs.list().unwrap().is_empty());
    }
}
