use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{ColorU8, Pixmap};

use crate::error::ImageLoadError;

/// Source of raw encoded image bytes for a `src` string
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError>;
}

/// Reads local paths and `file://` URLs; relative paths resolve against `root`
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    root: Option<PathBuf>,
}

impl FsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn resolve(&self, src: &str) -> PathBuf {
        let raw = src.strip_prefix("file://").unwrap_or(src);
        let path = Path::new(raw);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError> {
        if super::is_remote(src) {
            return Err(ImageLoadError::Fetch {
                src: src.to_owned(),
                reason: "remote sources need a network fetcher".into(),
            });
        }
        let path = self.resolve(src);
        std::fs::read(&path).map_err(|e| ImageLoadError::Fetch {
            src: src.to_owned(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

/// In-memory byte store, optionally deferring unknown sources to another fetcher
#[derive(Default, Clone)]
pub struct MemoryFetcher {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fallback: Option<Arc<dyn ImageFetcher>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: Arc<dyn ImageFetcher>) -> Self {
        Self {
            entries: Arc::default(),
            fallback: Some(fallback),
        }
    }

    pub fn insert(&self, src: impl Into<String>, bytes: Vec<u8>) {
        self.entries.write().insert(src.into(), bytes);
    }

    pub fn remove(&self, src: &str) -> Option<Vec<u8>> {
        self.entries.write().remove(src)
    }

    pub fn contains(&self, src: &str) -> bool {
        self.entries.read().contains_key(src)
    }
}

impl std::fmt::Debug for MemoryFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFetcher")
            .field("entries", &self.entries.read().len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, ImageLoadError> {
        if let Some(bytes) = self.entries.read().get(src) {
            return Ok(bytes.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.fetch(src),
            None => Err(ImageLoadError::Fetch {
                src: src.to_owned(),
                reason: "not found".into(),
            }),
        }
    }
}

/// Decode encoded bytes into a premultiplied bitmap
pub fn decode_bitmap(src: &str, bytes: &[u8]) -> Result<Pixmap, ImageLoadError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageLoadError::Decode {
        src: src.to_owned(),
        reason: e.to_string(),
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| ImageLoadError::InvalidDimensions {
        src: src.to_owned(),
        width,
        height,
    })?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 128]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_and_premultiplies() {
        let pixmap = decode_bitmap("red.png", &png_bytes(3, 2)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (3, 2));
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_bitmap("junk", b"not an image").unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }

    #[test]
    fn memory_fetcher_falls_back() {
        let inner = MemoryFetcher::new();
        inner.insert("b.png", vec![2]);
        let outer = MemoryFetcher::with_fallback(Arc::new(inner));
        outer.insert("a.png", vec![1]);
        assert_eq!(outer.fetch("a.png").unwrap(), vec![1]);
        assert_eq!(outer.fetch("b.png").unwrap(), vec![2]);
        assert!(outer.fetch("c.png").is_err());
    }

    #[test]
    fn fs_fetcher_resolves_file_urls() {
        let fetcher = FsFetcher::with_root("/assets");
        assert_eq!(fetcher.resolve("file:///tmp/a.png"), PathBuf::from("/tmp/a.png"));
        assert_eq!(fetcher.resolve("tee.png"), PathBuf::from("/assets/tee.png"));
        assert!(fetcher.fetch("https://example.com/a.png").is_err());
    }
}
