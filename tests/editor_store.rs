use mockup_editor::command::Command;
use mockup_editor::config::EditorConfig;
use mockup_editor::element::ElementPatch;
use mockup_editor::state::{EditorStore, View};
use mockup_editor::EditorEvent;
use std::sync::Arc;

#[test]
fn hello_scenario() {
    let mut store = EditorStore::with_canvas(400.0, 400.0);
    assert!(store.scene().is_empty());

    let id = store.add_text(100.0, 100.0, "Hello");
    assert_eq!(store.current_elements().len(), 1);
    assert_eq!(store.selected_id(), None);
    assert!(store.can_undo());

    store.switch_view(View::Back);
    assert_eq!(store.scene().view(View::Front).len(), 1);
    assert_eq!(store.scene().view(View::Back).len(), 0);
    assert!(store.current_elements().is_empty());

    store.switch_view(View::Front);
    store.select(Some(id));
    let before = store.find(id).cloned().unwrap();
    assert!(store.delete_element(id));
    assert!(store.find(id).is_none());

    assert!(store.undo());
    let restored = store.find(id).cloned().unwrap();
    assert_eq!(restored, before);
    assert_eq!((restored.x, restored.y), (100.0, 100.0));

    assert!(store.redo());
    assert!(store.find(id).is_none());
}

#[test]
fn undo_then_redo_is_identity() {
    let mut store = EditorStore::default();
    let a = store.add_text(10.0, 10.0, "a");
    let b = store.add_image(50.0, 60.0, "logo.png", 120.0, 80.0);
    store.update_element(b, &ElementPatch::rotation(30.0));
    store.switch_view(View::Left);
    store.add_text(5.0, 5.0, "left side");
    store.switch_view(View::Front);
    store.update_element(a, &ElementPatch::text("a!"));

    let mut states = vec![store.scene().clone()];
    while store.undo() {
        states.push(store.scene().clone());
    }
    assert!(store.scene().is_empty());

    // walking forward again revisits every state in reverse
    for expected in states.iter().rev().skip(1) {
        assert!(store.redo());
        assert_eq!(store.scene(), expected);
    }
    assert!(!store.redo());
}

#[test]
fn mutations_only_touch_the_current_view() {
    let mut store = EditorStore::default();
    store.add_text(0.0, 0.0, "front");
    store.switch_view(View::Right);
    store.add_text(0.0, 0.0, "right");
    store.add_text(0.0, 50.0, "right 2");

    let front = store.scene().view(View::Front).to_vec();
    store.clear_current_view();
    assert!(store.scene().view(View::Right).is_empty());
    assert_eq!(store.scene().view(View::Front), front.as_slice());

    // ids from another view are not found through the current view's selection
    store.select(Some(front[0].id));
    assert_eq!(store.selected_element(), None);
}

#[test]
fn ids_stay_unique_across_views_and_duplicates() {
    let mut store = EditorStore::default();
    for view in View::ALL {
        store.switch_view(view);
        let id = store.add_image(10.0, 10.0, "a.png", 50.0, 50.0);
        store.duplicate(id);
        store.add_text(0.0, 0.0, view.label());
    }
    assert_eq!(store.scene().len(), 12);
    assert!(store.scene().ids_unique());
}

#[test]
fn history_is_bounded() {
    let config = EditorConfig {
        history_limit: 5,
        ..EditorConfig::default()
    };
    let mut store = EditorStore::new(&config);
    for i in 0..20 {
        store.add_text(i as f32, 0.0, format!("{}", i));
    }
    assert_eq!(store.history().undo_len(), 5);

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, 5);
    assert_eq!(store.current_elements().len(), 15);
}

#[test]
fn commands_dispatch_against_the_store() {
    let mut store = EditorStore::default();
    store
        .execute(&Command::AddText {
            x: 20.0,
            y: 20.0,
            text: "cmd".into(),
        })
        .unwrap();
    let id = store.current_elements()[0].id;

    store.execute(&Command::Select(Some(id))).unwrap();
    store.execute(&Command::DeleteSelected).unwrap();
    assert!(store.current_elements().is_empty());
    assert!(store.execute(&Command::DeleteSelected).is_err());

    store.execute(&Command::Undo).unwrap();
    assert_eq!(store.current_elements().len(), 1);
    store.execute(&Command::SwitchView(View::Back)).unwrap();
    assert_eq!(store.current_view(), View::Back);
}

#[test]
fn subscribers_see_view_and_history_changes() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut store = EditorStore::default();
    store.subscribe(Box::new(move |event: &EditorEvent| sink.lock().push(event.clone())));

    store.add_text(0.0, 0.0, "x");
    store.switch_view(View::Back);

    let events = seen.lock();
    assert!(events.iter().any(|e| matches!(e, EditorEvent::SceneChanged { view: View::Front })));
    assert!(events.iter().any(|e| matches!(e, EditorEvent::HistoryChanged { can_undo: true, .. })));
    assert!(events.iter().any(|e| matches!(
        e,
        EditorEvent::ViewChanged {
            old: View::Front,
            new: View::Back
        }
    )));
}
