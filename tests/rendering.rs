use std::io::Cursor;
use std::sync::Arc;

use mockup_editor::element::ElementPatch;
use mockup_editor::image_cache::{ImageStatus, MemoryFetcher};
use mockup_editor::renderer::{to_rgba_image, FontBook};
use mockup_editor::{EditorStore, ImageCache, ProductViews, Renderer, View};

fn near(pixel: &image::Rgba<u8>, expected: [u8; 4]) -> bool {
    pixel.0.iter().zip(expected).all(|(&a, b)| a.abs_diff(b) <= 2)
}

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct Fixture {
    store: EditorStore,
    cache: ImageCache,
    renderer: Renderer,
}

impl Fixture {
    fn new(product: ProductViews) -> Self {
        let memory = MemoryFetcher::new();
        memory.insert("red.png", png(4, 4, [255, 0, 0, 255]));
        memory.insert("blue.png", png(10, 10, [0, 0, 255, 255]));
        Self {
            store: EditorStore::with_canvas(200.0, 200.0),
            cache: ImageCache::inline(Arc::new(memory)),
            renderer: Renderer::new(product, FontBook::default()),
        }
    }

    fn load(&mut self) {
        let view = self.store.current_view();
        self.renderer.request_images(&self.store, view, &mut self.cache);
        self.cache.poll();
    }

    fn image(&self) -> image::RgbaImage {
        self.renderer
            .render_view_to_image(&self.store, self.store.current_view(), &self.cache)
            .unwrap()
    }
}

#[test]
fn background_is_stretched_over_the_canvas() {
    let mut fx = Fixture::new(ProductViews {
        front: Some("red.png".into()),
        ..ProductViews::default()
    });
    fx.load();
    let image = fx.image();
    assert_eq!(image.dimensions(), (200, 200));
    assert!(near(image.get_pixel(100, 100), [255, 0, 0, 255]));

    // the back view has no background of its own
    fx.store.switch_view(View::Back);
    fx.load();
    assert_eq!(fx.image().get_pixel(100, 100).0[3], 0);
}

#[test]
fn images_are_placed_and_rotated_about_their_center() {
    let mut fx = Fixture::new(ProductViews::default());
    let id = fx.store.add_image(100.0, 100.0, "blue.png", 50.0, 50.0);
    fx.load();

    let image = fx.image();
    assert!(near(image.get_pixel(125, 125), [0, 0, 255, 255]));
    assert!(near(image.get_pixel(101, 101), [0, 0, 255, 255]));
    assert_eq!(image.get_pixel(125, 95).0[3], 0);

    fx.store.update_element(id, &ElementPatch::rotation(45.0));
    let image = fx.image();
    assert!(near(image.get_pixel(125, 125), [0, 0, 255, 255]));
    // corners swing out of the old box, the diagonal tips reach past its edges
    assert_eq!(image.get_pixel(101, 101).0[3], 0);
    assert!(image.get_pixel(125, 95).0[3] > 0);
}

#[test]
fn missing_images_are_skipped() {
    let mut fx = Fixture::new(ProductViews::default());
    fx.store.add_image(10.0, 10.0, "nowhere.png", 50.0, 50.0);
    fx.store.add_image(100.0, 100.0, "blue.png", 50.0, 50.0);
    fx.load();
    assert!(matches!(fx.cache.status("nowhere.png"), ImageStatus::Failed(_)));

    let image = fx.image();
    assert_eq!(image.get_pixel(30, 30).0[3], 0);
    assert!(near(image.get_pixel(125, 125), [0, 0, 255, 255]));
}

#[test]
fn text_is_painted_inside_its_box() {
    let mut fx = Fixture::new(ProductViews::default());
    let id = fx.store.add_text(20.0, 20.0, "Hello");
    let rect = fx.store.find(id).unwrap().rect();
    fx.load();

    let image = fx.image();
    let inked = |x: u32, y: u32| image.get_pixel(x, y).0[3] > 0;
    let inside = (rect.min.y as u32..rect.max.y as u32)
        .flat_map(|y| (rect.min.x as u32..rect.max.x as u32).map(move |x| (x, y)))
        .filter(|&(x, y)| inked(x, y))
        .count();
    assert!(inside > 0, "no text pixels inside {:?}", rect);
    // nothing far from the box
    assert!(!inked(190, 190));
}

#[test]
fn export_matches_the_interactive_raster() {
    let mut fx = Fixture::new(ProductViews {
        fallback: Some("red.png".into()),
        ..ProductViews::default()
    });
    let text = fx.store.add_text(10.0, 10.0, "Front\nprint");
    fx.store.update_element(text, &ElementPatch::rotation(30.0));
    fx.store.add_image(60.0, 80.0, "blue.png", 40.0, 20.0);
    fx.load();

    let view = fx.store.current_view();
    let surface = fx.renderer.render(&fx.store, view, &fx.cache).unwrap();
    let exported = fx.renderer.render_view_to_image(&fx.store, view, &fx.cache).unwrap();
    assert_eq!(to_rgba_image(&surface), exported);
}
