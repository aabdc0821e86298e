use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use std::collections::HashMap;
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::error::RenderError;
use crate::state::View;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("invalid texture dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// What a raster was painted from: the store's generation and the image cache's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterVersion {
    pub scene: u64,
    pub images: u64,
}

/// Premultiplied surface pixels as an egui image
pub fn to_color_image(surface: &Pixmap) -> Result<ColorImage, TextureGenerationError> {
    let (width, height) = (surface.width(), surface.height());
    if width == 0 || height == 0 {
        return Err(TextureGenerationError::InvalidDimensions(width, height));
    }
    Ok(ColorImage::from_rgba_premultiplied(
        [width as usize, height as usize],
        surface.data(),
    ))
}

/// Keeps one canvas texture per view and re-uploads it only when its version changes
#[derive(Default)]
pub struct TextureManager {
    textures: HashMap<View, (RasterVersion, TextureHandle)>,
    uploads: u64,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `view` at `version`, calling `generator` only when the cached one is stale
    pub fn get_or_create_texture<F>(
        &mut self,
        view: View,
        version: RasterVersion,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        if let Some((painted, handle)) = self.textures.get(&view) {
            if *painted == version {
                return Ok(handle.id());
            }
        }

        let image = generator()?;
        self.uploads += 1;
        log::trace!("repainting {} canvas at {:?}", view, version);

        match self.textures.get_mut(&view) {
            Some((painted, handle)) => {
                handle.set(image, TextureOptions::LINEAR);
                *painted = version;
                Ok(handle.id())
            }
            None => {
                let name = format!("canvas_{}", view.as_str());
                let handle = ctx.load_texture(name, image, TextureOptions::LINEAR);
                let id = handle.id();
                self.textures.insert(view, (version, handle));
                Ok(id)
            }
        }
    }

    /// Clears all textures from the cache
    pub fn clear_cache(&mut self) {
        self.textures.clear();
    }
}

impl std::fmt::Debug for TextureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureManager")
            .field("textures", &self.textures.len())
            .field("uploads", &self.uploads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Result<ColorImage, TextureGenerationError> {
        Ok(ColorImage::new([10, 10], egui::Color32::WHITE))
    }

    fn version(scene: u64, images: u64) -> RasterVersion {
        RasterVersion { scene, images }
    }

    #[test]
    fn same_version_hits_the_cache() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let first = manager.get_or_create_texture(View::Front, version(1, 0), blank, &ctx).unwrap();
        let second = manager
            .get_or_create_texture(View::Front, version(1, 0), || panic!("repainted"), &ctx)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.uploads, 1);
        assert_eq!(manager.textures.len(), 1);
    }

    #[test]
    fn new_version_reuses_the_texture() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let first = manager.get_or_create_texture(View::Front, version(1, 0), blank, &ctx).unwrap();
        let second = manager.get_or_create_texture(View::Front, version(1, 1), blank, &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.uploads, 2);
        assert_eq!(manager.textures.len(), 1);
    }

    #[test]
    fn views_are_cached_separately() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        manager.get_or_create_texture(View::Front, version(1, 0), blank, &ctx).unwrap();
        manager.get_or_create_texture(View::Back, version(1, 0), blank, &ctx).unwrap();
        assert_eq!(manager.textures.len(), 2);
        manager.clear_cache();
        assert!(manager.textures.is_empty());
    }

    #[test]
    fn generator_errors_propagate() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let result = manager.get_or_create_texture(
            View::Left,
            version(0, 0),
            || Err(TextureGenerationError::InvalidDimensions(0, 0)),
            &ctx,
        );
        assert!(result.is_err());
        assert_eq!(manager.textures.len(), 0);
    }

    #[test]
    fn surfaces_convert_to_images() {
        let mut surface = Pixmap::new(3, 2).unwrap();
        surface.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));
        let image = to_color_image(&surface).unwrap();
        assert_eq!(image.size, [3, 2]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(10, 20, 30));
    }
}
