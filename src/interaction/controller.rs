use egui::{CursorIcon, Pos2, Vec2};

use super::resize::{clamp_to_canvas, resize, rotation_toward, ResizeStart};
use crate::config::EditorConfig;
use crate::element::{Element, ElementPatch};
use crate::geometry::{hit_resize_handle, hit_rotate_handle, hit_test, Handle, HandleMetrics};
use crate::id_generator::ElementId;
use crate::input::{Button, InputEvent, Key, KeyEvent, PointerEvent};
use crate::state::EditorStore;

/// Placeholder text for elements created by double-click
pub const NEW_TEXT_PLACEHOLDER: &str = "Double click to edit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Dragging,
    Resizing,
    Rotating,
}

/// The active pointer gesture with everything needed to compute each frame
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging {
        id: ElementId,
        /// Pointer position minus element position at pointer-down
        offset: Vec2,
    },
    Resizing {
        id: ElementId,
        handle: Handle,
        start: ResizeStart,
        pointer_start: Pos2,
    },
    Rotating {
        id: ElementId,
        center: Pos2,
    },
}

impl Gesture {
    pub fn mode(&self) -> InteractionMode {
        match self {
            Gesture::Idle => InteractionMode::Idle,
            Gesture::Dragging { .. } => InteractionMode::Dragging,
            Gesture::Resizing { .. } => InteractionMode::Resizing,
            Gesture::Rotating { .. } => InteractionMode::Rotating,
        }
    }

    pub fn element(&self) -> Option<ElementId> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. }
            | Gesture::Resizing { id, .. }
            | Gesture::Rotating { id, .. } => Some(*id),
        }
    }
}

/// What the host should do after an input was handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionResponse {
    /// The store changed; repaint
    pub changed: bool,
    pub cursor: CursorIcon,
}

impl InteractionResponse {
    fn unchanged(cursor: CursorIcon) -> Self {
        Self { changed: false, cursor }
    }

    fn changed(changed: bool, cursor: CursorIcon) -> Self {
        Self { changed, cursor }
    }

    /// Combine responses from several events in one frame
    pub fn merge(self, other: Self) -> Self {
        Self {
            changed: self.changed || other.changed,
            cursor: other.cursor,
        }
    }
}

impl Default for InteractionResponse {
    fn default() -> Self {
        Self::unchanged(CursorIcon::Default)
    }
}

/// Direction for nudge controls and arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn vector(&self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Translates pointer and keyboard input into store mutations
#[derive(Debug, Clone)]
pub struct Controller {
    gesture: Gesture,
    metrics: HandleMetrics,
    rotate_step: f32,
    nudge_step: f32,
    nudge_step_large: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Controller {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            gesture: Gesture::Idle,
            metrics: HandleMetrics::from(config),
            rotate_step: config.rotate_step,
            nudge_step: config.nudge_step,
            nudge_step_large: config.nudge_step_large,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn mode(&self) -> InteractionMode {
        self.gesture.mode()
    }

    pub fn metrics(&self) -> &HandleMetrics {
        &self.metrics
    }

    pub fn rotate_step(&self) -> f32 {
        self.rotate_step
    }

    /// Route one canvas-space input event
    pub fn handle(&mut self, store: &mut EditorStore, event: &InputEvent) -> InteractionResponse {
        match event {
            InputEvent::PointerDown(e) => self.pointer_down(store, e),
            InputEvent::PointerMove(e) => self.pointer_move(store, e),
            InputEvent::PointerUp(e) => self.pointer_up(store, e),
            InputEvent::PointerLeave => self.pointer_leave(store),
            InputEvent::DoubleClick(e) => self.double_click(store, e),
            InputEvent::Key(e) => self.key_down(store, e),
        }
    }

    pub fn pointer_down(&mut self, store: &mut EditorStore, event: &PointerEvent) -> InteractionResponse {
        if event.button != Button::Primary {
            return InteractionResponse::default();
        }
        let changed = self.settle(store);

        if let Some(selected) = store.selected_element() {
            let id = selected.id;
            if hit_rotate_handle(selected, event.pos, &self.metrics) {
                self.gesture = Gesture::Rotating {
                    id,
                    center: selected.center(),
                };
                store.begin_gesture();
                log::debug!("rotating {}", id);
                return InteractionResponse::changed(changed, CursorIcon::Grabbing);
            }
            if let Some(handle) = hit_resize_handle(selected, event.pos, &self.metrics) {
                self.gesture = Gesture::Resizing {
                    id,
                    handle,
                    start: ResizeStart::of(selected),
                    pointer_start: event.pos,
                };
                store.begin_gesture();
                log::debug!("resizing {} from {}", id, handle.as_str());
                return InteractionResponse::changed(changed, handle.cursor_icon());
            }
        }

        let old_selection = store.selected_id();
        match hit_test(store.current_elements(), event.pos) {
            Some(id) => {
                let Some(element) = store.find(id) else {
                    return InteractionResponse::changed(changed, CursorIcon::Default);
                };
                let offset = event.pos - element.position();
                store.select(Some(id));
                store.begin_gesture();
                self.gesture = Gesture::Dragging { id, offset };
                InteractionResponse::changed(changed || old_selection != Some(id), CursorIcon::Grabbing)
            }
            None => {
                store.select(None);
                InteractionResponse::changed(changed || old_selection.is_some(), CursorIcon::Default)
            }
        }
    }

    pub fn pointer_move(&mut self, store: &mut EditorStore, event: &PointerEvent) -> InteractionResponse {
        match self.gesture.clone() {
            Gesture::Idle => InteractionResponse::unchanged(self.hover_cursor(store, event.pos)),
            Gesture::Dragging { id, offset } => {
                let Some(element) = store.find(id) else {
                    return self.abandon(store);
                };
                let pos = clamp_to_canvas(event.pos - offset, element.size(), store.canvas_size());
                let changed = store.update_live(id, &ElementPatch::position(pos));
                InteractionResponse::changed(changed, CursorIcon::Grabbing)
            }
            Gesture::Resizing {
                id,
                handle,
                start,
                pointer_start,
            } => {
                let outcome = resize(&start, handle, event.pos - pointer_start);
                let mut patch = ElementPatch::rect(outcome.rect);
                patch.font_size = outcome.font_size;
                let changed = store.update_live(id, &patch);
                if !changed {
                    return self.abandon(store);
                }
                InteractionResponse::changed(true, handle.cursor_icon())
            }
            Gesture::Rotating { id, center } => {
                let rotation = rotation_toward(center, event.pos);
                let changed = store.update_live(id, &ElementPatch::rotation(rotation));
                if !changed {
                    return self.abandon(store);
                }
                InteractionResponse::changed(true, CursorIcon::Grabbing)
            }
        }
    }

    pub fn pointer_up(&mut self, store: &mut EditorStore, event: &PointerEvent) -> InteractionResponse {
        let changed = self.finish(store);
        InteractionResponse::changed(changed, self.hover_cursor(store, event.pos))
    }

    /// Leaving the surface is an implicit pointer-up
    pub fn pointer_leave(&mut self, store: &mut EditorStore) -> InteractionResponse {
        InteractionResponse::changed(self.finish(store), CursorIcon::Default)
    }

    /// Create a text element centered on a double-click over empty canvas
    pub fn double_click(&mut self, store: &mut EditorStore, event: &PointerEvent) -> InteractionResponse {
        if event.button != Button::Primary || hit_test(store.current_elements(), event.pos).is_some() {
            return InteractionResponse::default();
        }
        self.finish(store);
        let mut element = Element::text(0.0, 0.0, NEW_TEXT_PLACEHOLDER);
        element.x = event.pos.x - element.width / 2.0;
        element.y = event.pos.y - element.height / 2.0;
        let changed = store.add_element(element);
        InteractionResponse::changed(changed, CursorIcon::Default)
    }

    pub fn key_down(&mut self, store: &mut EditorStore, event: &KeyEvent) -> InteractionResponse {
        if event.text_input_focused {
            return InteractionResponse::default();
        }
        let m = event.modifiers;
        let changed = match event.key {
            Key::Delete | Key::Backspace => self.delete_selected(store),
            Key::Escape => {
                self.finish(store);
                let had = store.selected_id().is_some();
                store.select(None);
                had
            }
            Key::Char('z') if m.command() && m.shift => self.redo(store),
            Key::Char('z') if m.command() => self.undo(store),
            Key::Char('y') if m.command() => self.redo(store),
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let direction = match event.key {
                    Key::ArrowUp => Direction::Up,
                    Key::ArrowDown => Direction::Down,
                    Key::ArrowLeft => Direction::Left,
                    _ => Direction::Right,
                };
                let amount = if m.shift { self.nudge_step_large } else { self.nudge_step };
                self.nudge(store, direction, amount)
            }
            _ => false,
        };
        if changed && self.gesture != Gesture::Idle {
            // undo/redo or delete may have removed the gesture target
            if self.gesture.element().and_then(|id| store.find(id)).is_none() {
                self.gesture = Gesture::Idle;
            }
        }
        InteractionResponse::changed(changed, CursorIcon::Default)
    }

    /// Undo, first settling any gesture in progress so the controller
    /// never keeps editing a restored snapshot
    pub fn undo(&mut self, store: &mut EditorStore) -> bool {
        self.finish(store);
        store.undo()
    }

    pub fn redo(&mut self, store: &mut EditorStore) -> bool {
        self.finish(store);
        store.redo()
    }

    /// Begin resizing the selection from an overlay handle
    pub fn begin_resize(&mut self, store: &mut EditorStore, handle: Handle, pointer: Pos2) -> bool {
        self.settle(store);
        let Some(selected) = store.selected_element() else {
            return false;
        };
        self.gesture = Gesture::Resizing {
            id: selected.id,
            handle,
            start: ResizeStart::of(selected),
            pointer_start: pointer,
        };
        store.begin_gesture();
        true
    }

    /// Begin rotating the selection from the overlay rotate handle
    pub fn begin_rotate(&mut self, store: &mut EditorStore) -> bool {
        self.settle(store);
        let Some(selected) = store.selected_element() else {
            return false;
        };
        self.gesture = Gesture::Rotating {
            id: selected.id,
            center: selected.center(),
        };
        store.begin_gesture();
        true
    }

    /// Move the selection by `amount` pixels, clamped to the canvas; one undo step
    pub fn nudge(&mut self, store: &mut EditorStore, direction: Direction, amount: f32) -> bool {
        let Some(selected) = store.selected_element() else {
            return false;
        };
        let id = selected.id;
        let target = selected.position() + direction.vector() * amount;
        let pos = clamp_to_canvas(target, selected.size(), store.canvas_size());
        let before = selected.position();
        if pos == before {
            return false;
        }
        store.update_element(id, &ElementPatch::position(pos))
    }

    pub fn delete_selected(&mut self, store: &mut EditorStore) -> bool {
        let Some(id) = store.selected_element().map(|e| e.id) else {
            return false;
        };
        if self.gesture.element() == Some(id) {
            self.finish(store);
        }
        store.delete_element(id)
    }

    /// Rotate the selection by a fixed number of degrees; one undo step
    pub fn rotate_selected_by(&mut self, store: &mut EditorStore, degrees: f32) -> bool {
        let Some(selected) = store.selected_element() else {
            return false;
        };
        let id = selected.id;
        let rotation = selected.rotation + degrees;
        store.update_element(id, &ElementPatch::rotation(rotation))
    }

    /// Duplicate the selection and select the copy
    pub fn duplicate_selected(&mut self, store: &mut EditorStore) -> Option<ElementId> {
        let id = store.selected_element()?.id;
        let copy = store.duplicate(id)?;
        store.select(Some(copy));
        Some(copy)
    }

    /// End the active gesture; returns true if it committed a change
    fn finish(&mut self, store: &mut EditorStore) -> bool {
        if self.gesture == Gesture::Idle {
            return false;
        }
        self.gesture = Gesture::Idle;
        store.end_gesture()
    }

    /// End our gesture and any store gesture opened elsewhere, such as a
    /// focused property field, so a new gesture starts its own undo step
    fn settle(&mut self, store: &mut EditorStore) -> bool {
        let mine = self.finish(store);
        store.end_gesture() || mine
    }

    /// The gesture target vanished mid-gesture
    fn abandon(&mut self, store: &mut EditorStore) -> InteractionResponse {
        log::debug!("gesture target disappeared, returning to idle");
        let changed = self.finish(store);
        InteractionResponse::changed(changed, CursorIcon::Default)
    }

    /// Cursor for hovering `pos` while idle
    pub fn hover_cursor(&self, store: &EditorStore, pos: Pos2) -> CursorIcon {
        if let Some(selected) = store.selected_element() {
            if hit_rotate_handle(selected, pos, &self.metrics) {
                return CursorIcon::Grab;
            }
            if let Some(handle) = hit_resize_handle(selected, pos, &self.metrics) {
                return handle.cursor_icon();
            }
        }
        if hit_test(store.current_elements(), pos).is_some() {
            CursorIcon::Move
        } else {
            CursorIcon::Default
        }
    }
}
