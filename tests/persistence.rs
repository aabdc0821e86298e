use std::fs;
use std::path::PathBuf;

use mockup_editor::element::{Element, ElementPatch, Provenance};
use mockup_editor::state::persistence::{from_json, to_json};
use mockup_editor::state::DesignSnapshot;
use mockup_editor::{DesignStore, EditorStore, View};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("mockup-editor-it-{}", uuid::Uuid::new_v4()))
}

fn populated_store() -> EditorStore {
    let mut store = EditorStore::with_canvas(600.0, 400.0);
    for view in View::ALL {
        store.switch_view(view);
        let text = store.add_text(12.5, 30.0, format!("{}\nsecond line", view.label()));
        store.update_element(
            text,
            &ElementPatch {
                color: Some("#ff8800cc".into()),
                ..ElementPatch::rotation(15.0)
            },
        );
        let image = Element::image(100.0, 120.0, format!("{}.png", view.as_str()), 160.0, 90.0)
            .with_provenance(Provenance {
                prompt: Some("a cat on a skateboard".into()),
                provider: Some("local".into()),
            });
        let id = image.id;
        store.add_element(image);
        // a squashed copy keeps its original aspect on record
        store.update_element(
            id,
            &ElementPatch {
                width: Some(80.0),
                ..Default::default()
            },
        );
    }
    store.switch_view(View::Front);
    store
}

#[test]
fn scene_json_round_trip_keeps_every_view() {
    let store = populated_store();
    let json = to_json(store.scene()).unwrap();
    assert!(json.contains("\"type\": \"image\""));
    assert!(json.contains("\"originalWidth\""));
    assert!(json.contains("a cat on a skateboard"));

    let parsed = from_json(&json).unwrap();
    assert_eq!(&parsed, store.scene());
    for view in View::ALL {
        let elements = parsed.view(view);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].as_text().unwrap().text.lines().count(), 2);
        let image = elements[1].as_image().unwrap();
        assert_eq!((image.original_width, image.original_height), (160.0, 90.0));
        assert_eq!(elements[1].width, 80.0);
    }
}

#[test]
fn missing_views_parse_as_empty() {
    let scene = from_json("{}").unwrap();
    assert!(scene.is_empty());
    assert!(from_json("not json").is_err());
}

#[test]
fn saved_design_restores_scene_and_canvas() {
    let dir = scratch_dir();
    let designs = DesignStore::new(&dir);
    let store = populated_store();

    let path = designs.save("summer-tee", &store).unwrap();
    assert!(path.exists());
    assert_eq!(designs.list().unwrap(), vec!["summer-tee".to_string()]);

    let mut restored = EditorStore::default();
    restored.add_text(0.0, 0.0, "to be replaced");
    designs.load("summer-tee").unwrap().restore(&mut restored);
    assert_eq!(restored.scene(), store.scene());
    assert_eq!(restored.canvas_size(), store.canvas_size());
    assert!(!restored.can_undo());
    assert_eq!(restored.selected_id(), None);

    // the host's session snapshot goes through the same type
    let snapshot = DesignSnapshot::new(&restored);
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: DesignSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn previews_are_written_per_view_and_deleted_with_the_design() {
    let dir = scratch_dir();
    let designs = DesignStore::new(&dir);
    let store = populated_store();
    designs.save("hoodie", &store).unwrap();

    let preview = image::RgbaImage::from_pixel(8, 8, image::Rgba([0, 128, 0, 255]));
    let path = designs.save_preview("hoodie", View::Back, &preview).unwrap();
    assert_eq!(path, designs.preview_path("hoodie", View::Back).unwrap());
    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded, preview);

    designs.delete("hoodie").unwrap();
    assert!(!path.exists());
    assert!(designs.list().unwrap().is_empty());
    assert!(designs.save("../escape", &store).is_err());

    fs::remove_dir_all(dir).ok();
}
