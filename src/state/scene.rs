use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::{Element, ElementPatch};
use crate::id_generator::ElementId;

/// Offset applied to duplicated elements
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// One side of the product mockup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

impl View {
    pub const ALL: [View; 4] = [View::Front, View::Back, View::Left, View::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Front => "front",
            View::Back => "back",
            View::Left => "left",
            View::Right => "right",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Front => "Front",
            View::Back => "Back",
            View::Left => "Left",
            View::Right => "Right",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element sequences for every view. Order is paint order, last on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub front: Vec<Element>,
    pub back: Vec<Element>,
    pub left: Vec<Element>,
    pub right: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self, view: View) -> &[Element] {
        match view {
            View::Front => &self.front,
            View::Back => &self.back,
            View::Left => &self.left,
            View::Right => &self.right,
        }
    }

    pub fn view_mut(&mut self, view: View) -> &mut Vec<Element> {
        match view {
            View::Front => &mut self.front,
            View::Back => &mut self.back,
            View::Left => &mut self.left,
            View::Right => &mut self.right,
        }
    }

    /// Every element with the view it lives in
    pub fn iter(&self) -> impl Iterator<Item = (View, &Element)> {
        View::ALL
            .into_iter()
            .flat_map(move |view| self.view(view).iter().map(move |e| (view, e)))
    }

    pub fn len(&self) -> usize {
        View::ALL.iter().map(|v| self.view(*v).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locate an element, returning its view and index
    pub fn locate(&self, id: ElementId) -> Option<(View, usize)> {
        View::ALL.into_iter().find_map(|view| {
            self.view(view)
                .iter()
                .position(|e| e.id == id)
                .map(|index| (view, index))
        })
    }

    /// Locate an element, searching `preferred` before the other views
    fn locate_from(&self, preferred: View, id: ElementId) -> Option<(View, usize)> {
        self.view(preferred)
            .iter()
            .position(|e| e.id == id)
            .map(|index| (preferred, index))
            .or_else(|| self.locate(id))
    }

    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.locate(id).map(|(view, index)| &self.view(view)[index])
    }

    /// True when no id appears twice across all views
    pub fn ids_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.iter().all(|(_, e)| seen.insert(e.id))
    }

    /// Give a fresh id to every element whose id was already seen; returns how many changed
    pub fn dedupe_ids(&mut self) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut changed = 0;
        for view in View::ALL {
            for element in self.view_mut(view) {
                if !seen.insert(element.id) {
                    element.id = crate::id_generator::generate_id();
                    seen.insert(element.id);
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Image sources referenced by any view
    pub fn image_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .iter()
            .filter_map(|(_, e)| e.src().map(str::to_owned))
            .collect();
        sources.sort();
        sources.dedup();
        sources
    }
}

/// Per-view element lists plus current view, selection and canvas size.
///
/// Every operation is total: unknown ids are logged and ignored.
#[derive(Debug, Clone)]
pub struct SceneStore {
    scene: Scene,
    current_view: View,
    selected: Option<ElementId>,
    canvas_size: Vec2,
}

impl SceneStore {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            scene: Scene::new(),
            current_view: View::Front,
            selected: None,
            canvas_size: Vec2::new(canvas_width.max(1.0), canvas_height.max(1.0)),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Swap in a whole scene, keeping view and canvas size.
    /// The selection is dropped if it no longer resolves in the current view.
    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        if let Some(id) = self.selected {
            if !self.current_elements().iter().any(|e| e.id == id) {
                self.selected = None;
            }
        }
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn elements(&self, view: View) -> &[Element] {
        self.scene.view(view)
    }

    pub fn current_elements(&self) -> &[Element] {
        self.scene.view(self.current_view)
    }

    pub fn find(&self, id: ElementId) -> Option<&Element> {
        self.scene
            .locate_from(self.current_view, id)
            .map(|(view, index)| &self.scene.view(view)[index])
    }

    pub fn view_of(&self, id: ElementId) -> Option<View> {
        self.scene.locate(id).map(|(view, _)| view)
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_size = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// The selected element, if the selection resolves in the current view
    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selected?;
        self.current_elements().iter().find(|e| e.id == id)
    }

    /// Set the selection without validating it
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    /// Append to a view; returns false if the id is already in use
    pub fn add_element(&mut self, view: View, element: Element) -> bool {
        if self.scene.locate(element.id).is_some() {
            log::warn!("refusing to add element {}: id already present", element.id);
            return false;
        }
        self.scene.view_mut(view).push(element);
        true
    }

    /// Merge a patch into the element in any view; returns false if unknown
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.scene.locate_from(self.current_view, id) {
            Some((view, index)) => {
                self.scene.view_mut(view)[index].apply_patch(patch);
                true
            }
            None => {
                log::debug!("update ignored for unknown element {}", id);
                false
            }
        }
    }

    /// Remove from whichever view holds it, clearing the selection if needed
    pub fn delete_element(&mut self, id: ElementId) -> Option<Element> {
        let Some((view, index)) = self.scene.locate(id) else {
            log::debug!("delete ignored for unknown element {}", id);
            return None;
        };
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.scene.view_mut(view).remove(index))
    }

    pub fn switch_view(&mut self, view: View) {
        self.current_view = view;
        self.selected = None;
    }

    pub fn clear_current_view(&mut self) {
        self.scene.view_mut(self.current_view).clear();
        self.selected = None;
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.reorder(id, |list, element| list.push(element))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.reorder(id, |list, element| list.insert(0, element))
    }

    fn reorder(&mut self, id: ElementId, place: impl FnOnce(&mut Vec<Element>, Element)) -> bool {
        let Some((view, index)) = self.scene.locate(id) else {
            log::debug!("reorder ignored for unknown element {}", id);
            return false;
        };
        let list = self.scene.view_mut(view);
        let element = list.remove(index);
        place(list, element);
        true
    }

    /// Clone an element under a fresh id into its own view; returns the new id
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let (view, index) = self.scene.locate(id)?;
        let copy = self.scene.view(view)[index].duplicate(Vec2::splat(DUPLICATE_OFFSET));
        let new_id = copy.id;
        self.scene.view_mut(view).push(copy);
        Some(new_id)
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(400.0, 400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_text() -> (SceneStore, ElementId) {
        let mut store = SceneStore::default();
        let element = Element::text(10.0, 10.0, "Hi");
        let id = element.id;
        assert!(store.add_element(View::Front, element));
        (store, id)
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let (mut store, id) = store_with_text();
        let copy = store.find(id).unwrap().clone();
        assert!(!store.add_element(View::Back, copy));
        assert!(store.elements(View::Back).is_empty());
        assert!(store.scene().ids_unique());
    }

    #[test]
    fn update_reaches_other_views() {
        let (mut store, id) = store_with_text();
        store.switch_view(View::Left);
        assert!(store.update_element(id, &ElementPatch::position(egui::pos2(50.0, 60.0))));
        assert_eq!(store.elements(View::Front)[0].x, 50.0);
        assert_eq!(store.view_of(id), Some(View::Front));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (mut store, _) = store_with_text();
        let before = store.scene().clone();
        let stranger = crate::id_generator::generate_id();
        assert!(!store.update_element(stranger, &ElementPatch::rotation(45.0)));
        assert!(store.delete_element(stranger).is_none());
        assert!(!store.bring_to_front(stranger));
        assert!(store.duplicate(stranger).is_none());
        assert_eq!(store.scene(), &before);
    }

    #[test]
    fn delete_clears_selection() {
        let (mut store, id) = store_with_text();
        store.select(Some(id));
        assert!(store.delete_element(id).is_some());
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn switching_views_clears_selection() {
        let (mut store, id) = store_with_text();
        store.select(Some(id));
        store.switch_view(View::Back);
        assert_eq!(store.selected_id(), None);
        assert_eq!(store.current_view(), View::Back);
    }

    #[test]
    fn dangling_selection_reads_as_none() {
        let (mut store, _) = store_with_text();
        store.select(Some(crate::id_generator::generate_id()));
        assert!(store.selected_element().is_none());
    }

    #[test]
    fn reorder_and_duplicate() {
        let (mut store, first) = store_with_text();
        let second = Element::text(0.0, 0.0, "There");
        let second_id = second.id;
        store.add_element(View::Front, second);

        assert!(store.bring_to_front(first));
        assert_eq!(store.current_elements().last().unwrap().id, first);
        assert!(store.send_to_back(first));
        assert_eq!(store.current_elements()[0].id, first);

        let copy = store.duplicate(second_id).unwrap();
        let copied = store.find(copy).unwrap();
        assert_eq!(copied.x, DUPLICATE_OFFSET);
        assert_eq!(store.current_elements().len(), 3);
        assert!(store.scene().ids_unique());
    }

    #[test]
    fn dedupe_assigns_fresh_ids() {
        let element = Element::text(0.0, 0.0, "twin");
        let mut scene = Scene::new();
        scene.front.push(element.clone());
        scene.back.push(element);
        assert!(!scene.ids_unique());
        assert_eq!(scene.dedupe_ids(), 1);
        assert!(scene.ids_unique());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn clear_only_touches_current_view() {
        let (mut store, _) = store_with_text();
        store.add_element(View::Back, Element::text(0.0, 0.0, "back"));
        store.clear_current_view();
        assert!(store.elements(View::Front).is_empty());
        assert_eq!(store.elements(View::Back).len(), 1);
    }
}
