use crate::state::Scene;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Snapshot-based undo/redo for the scene
#[derive(Debug, Clone)]
pub struct History {
    /// Scenes as they were before each committed change
    undo_stack: Vec<Scene>,
    /// Scenes that were current before each undo
    redo_stack: Vec<Scene>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the scene as it was before a change
    pub fn commit(&mut self, before: Scene) {
        self.undo_stack.push(before);
        if self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
            log::debug!("history limit {} reached, dropped {} snapshot(s)", self.limit, excess);
        }
        self.redo_stack.clear();
    }

    /// Step back; `live` becomes the redo target. None when nothing to undo.
    pub fn undo(&mut self, live: &Scene) -> Option<Scene> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(live.clone());
        Some(previous)
    }

    /// Step forward; `live` goes back onto the undo stack. None when nothing to redo.
    pub fn redo(&mut self, live: &Scene) -> Option<Scene> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(live.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn scene_with(n: usize) -> Scene {
        let mut scene = Scene::new();
        for i in 0..n {
            scene.front.push(Element::text(i as f32, 0.0, "x"));
        }
        scene
    }

    #[test]
    fn empty_stacks_are_no_ops() {
        let mut history = History::new();
        let live = scene_with(1);
        assert!(history.undo(&live).is_none());
        assert!(history.redo(&live).is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_then_redo_restores() {
        let mut history = History::new();
        let before = scene_with(0);
        let after = scene_with(1);
        history.commit(before.clone());

        let undone = history.undo(&after).unwrap();
        assert_eq!(undone, before);
        assert!(history.can_redo());

        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, after);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn commit_clears_redo() {
        let mut history = History::new();
        history.commit(scene_with(0));
        history.undo(&scene_with(1));
        history.commit(scene_with(0));
        assert!(!history.can_redo());
    }

    #[test]
    fn limit_drops_oldest() {
        let mut history = History::with_limit(3);
        for i in 0..5 {
            history.commit(scene_with(i));
        }
        assert_eq!(history.undo_len(), 3);
        let live = scene_with(5);
        let mut last = None;
        while let Some(scene) = history.undo(&live) {
            last = Some(scene);
        }
        assert_eq!(last.unwrap().front.len(), 2);
    }
}
