use egui::Vec2;

use super::scene::{Scene, SceneStore, View};
use crate::command::{Command, CommandResult, History};
use crate::config::EditorConfig;
use crate::element::{Element, ElementPatch};
use crate::event::{EditorEvent, EventBus, EventHandler, Subscription};
use crate::id_generator::ElementId;
use crate::image_cache::{ImageCache, ImageLoad};

/// The editor engine's single owned state: scene, history and event bus.
///
/// Discrete actions commit an undo step when they change the scene.
/// Continuous gestures call [`begin_gesture`](Self::begin_gesture), mutate
/// through [`update_live`](Self::update_live) and commit once in
/// [`end_gesture`](Self::end_gesture).
#[derive(Debug)]
pub struct EditorStore {
    scene: SceneStore,
    history: History,
    events: EventBus,
    /// Bumped on every change that affects the raster
    generation: u64,
    /// Scene captured when the active gesture began
    gesture_start: Option<Scene>,
}

impl EditorStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            scene: SceneStore::new(config.canvas_width, config.canvas_height),
            history: History::with_limit(config.history_limit),
            events: EventBus::new(),
            generation: 0,
            gesture_start: None,
        }
    }

    pub fn with_canvas(width: f32, height: f32) -> Self {
        Self::new(&EditorConfig {
            canvas_width: width,
            canvas_height: height,
            ..Default::default()
        })
    }

    pub fn scene_store(&self) -> &SceneStore {
        &self.scene
    }

    /// Read-only view of every element sequence
    pub fn scene(&self) -> &Scene {
        self.scene.scene()
    }

    pub fn current_view(&self) -> View {
        self.scene.current_view()
    }

    pub fn current_elements(&self) -> &[Element] {
        self.scene.current_elements()
    }

    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.scene.find(id)
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.scene.selected_id()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.scene.selected_element()
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.scene.canvas_size()
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.scene.set_canvas_size(width, height);
        self.touch();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> Subscription {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Dispatch a toolbar command
    pub fn execute(&mut self, command: &Command) -> CommandResult {
        log::debug!("execute {:?}", command);
        let result = command.execute(self);
        if let Err(e) = &result {
            log::debug!("{} had no effect: {}", command.label(), e);
        }
        result
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Run a discrete mutation and commit an undo step if the scene changed
    fn mutate<R>(&mut self, f: impl FnOnce(&mut SceneStore) -> R) -> R {
        self.end_gesture();
        let before = self.scene.scene().clone();
        let old_selection = self.scene.selected_id();
        let result = f(&mut self.scene);
        if *self.scene.scene() != before {
            self.emit_scene_diff(&before);
            self.history.commit(before);
            self.emit_history();
        }
        self.emit_selection(old_selection);
        result
    }

    fn emit_scene_diff(&mut self, before: &Scene) {
        self.touch();
        for view in View::ALL {
            if before.view(view) != self.scene.elements(view) {
                self.events.emit(EditorEvent::SceneChanged { view });
            }
        }
    }

    fn emit_selection(&self, old: Option<ElementId>) {
        let new = self.scene.selected_id();
        if old != new {
            self.events.emit(EditorEvent::SelectionChanged { old, new });
        }
    }

    fn emit_history(&self) {
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    /// Add an element to the current view. Returns false if its id is taken.
    pub fn add_element(&mut self, element: Element) -> bool {
        let id = element.id;
        let view = self.scene.current_view();
        let added = self.mutate(|scene| scene.add_element(view, element));
        if added {
            self.events.emit(EditorEvent::ElementAdded { id, view });
        }
        added
    }

    pub fn add_text(&mut self, x: f32, y: f32, text: impl Into<String>) -> ElementId {
        let element = Element::text(x, y, text);
        let id = element.id;
        self.add_element(element);
        id
    }

    pub fn add_image(
        &mut self,
        x: f32,
        y: f32,
        src: impl Into<String>,
        width: f32,
        height: f32,
    ) -> ElementId {
        let element = Element::image(x, y, src, width, height);
        let id = element.id;
        self.add_element(element);
        id
    }

    /// Add an image and start loading its bitmap; the returned future reports load failures
    pub fn add_image_loaded(
        &mut self,
        x: f32,
        y: f32,
        src: impl Into<String>,
        width: f32,
        height: f32,
        cache: &mut ImageCache,
    ) -> (ElementId, ImageLoad) {
        let src = src.into();
        let load = cache.request(&src);
        let id = self.add_image(x, y, src, width, height);
        (id, load)
    }

    /// Property edit: merge the patch and commit
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        self.mutate(|scene| scene.update_element(id, patch))
    }

    /// Gesture frame: merge the patch without committing
    pub fn update_live(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(view) = self.scene.view_of(id) else {
            log::debug!("live update ignored for unknown element {}", id);
            return false;
        };
        let before = self.scene.find(id).cloned();
        if !self.scene.update_element(id, patch) {
            return false;
        }
        if self.scene.find(id) != before.as_ref() {
            self.touch();
            self.events.emit(EditorEvent::SceneChanged { view });
        }
        true
    }

    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let view = self.scene.view_of(id);
        let removed = self.mutate(|scene| scene.delete_element(id)).is_some();
        if let (true, Some(view)) = (removed, view) {
            self.events.emit(EditorEvent::ElementRemoved { id, view });
        }
        removed
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        let old = self.scene.selected_id();
        self.scene.select(id);
        self.emit_selection(old);
    }

    pub fn switch_view(&mut self, view: View) {
        self.end_gesture();
        let old = self.scene.current_view();
        let old_selection = self.scene.selected_id();
        self.scene.switch_view(view);
        if old != view {
            self.touch();
            self.events.emit(EditorEvent::ViewChanged { old, new: view });
        }
        self.emit_selection(old_selection);
    }

    pub fn clear_current_view(&mut self) {
        self.mutate(|scene| scene.clear_current_view());
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.mutate(|scene| scene.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.mutate(|scene| scene.send_to_back(id))
    }

    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let new_id = self.mutate(|scene| scene.duplicate(id))?;
        if let Some(view) = self.scene.view_of(new_id) {
            self.events.emit(EditorEvent::ElementAdded { id: new_id, view });
        }
        Some(new_id)
    }

    /// Return an image element to its original size
    pub fn reset_size(&mut self, id: ElementId) -> bool {
        let Some(size) = self.scene.find(id).and_then(Element::original_size) else {
            return false;
        };
        let patch = ElementPatch {
            width: Some(size.x),
            height: Some(size.y),
            ..Default::default()
        };
        self.update_element(id, &patch)
    }

    /// Capture the pre-gesture scene. Nested calls keep the first capture.
    pub fn begin_gesture(&mut self) {
        if self.gesture_start.is_none() {
            self.gesture_start = Some(self.scene.scene().clone());
        }
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture_start.is_some()
    }

    /// Finish the active gesture; commits one undo step if the scene changed
    pub fn end_gesture(&mut self) -> bool {
        let Some(before) = self.gesture_start.take() else {
            return false;
        };
        if *self.scene.scene() == before {
            log::debug!("gesture ended without changes");
            return false;
        }
        self.history.commit(before);
        self.emit_history();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        match self.history.undo(self.scene.scene()) {
            Some(scene) => {
                self.restore(scene);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        match self.history.redo(self.scene.scene()) {
            Some(scene) => {
                self.restore(scene);
                true
            }
            None => false,
        }
    }

    /// Install a loaded scene, discarding history
    pub fn replace_scene(&mut self, mut scene: Scene) {
        let fixed = scene.dedupe_ids();
        if fixed > 0 {
            log::warn!("loaded scene reused {} element id(s); assigned fresh ids", fixed);
        }
        self.gesture_start = None;
        self.history.clear();
        self.restore(scene);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.emit_history();
    }

    fn restore(&mut self, scene: Scene) {
        let old_selection = self.scene.selected_id();
        self.scene.set_scene(scene);
        self.touch();
        self.events.emit(EditorEvent::SceneReplaced);
        self.events.emit(EditorEvent::SceneChanged {
            view: self.scene.current_view(),
        });
        self.emit_selection(old_selection);
        self.emit_history();
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
