use crate::id_generator::ElementId;
use crate::state::View;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Elements of a view were added, removed, moved or edited
    SceneChanged { view: View },
    ElementAdded { id: ElementId, view: View },
    ElementRemoved { id: ElementId, view: View },
    SelectionChanged {
        old: Option<ElementId>,
        new: Option<ElementId>,
    },
    ViewChanged { old: View, new: View },
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The whole scene was swapped out (undo, redo or load)
    SceneReplaced,
}

impl EditorEvent {
    /// True for events after which the raster surface is stale
    pub fn needs_repaint(&self) -> bool {
        !matches!(self, EditorEvent::HistoryChanged { .. })
    }
}
