use serde::{Deserialize, Serialize};

use super::{CommandError, CommandResult};
use crate::element::ElementPatch;
use crate::id_generator::ElementId;
use crate::state::{EditorStore, View};

/// Toolbar-style actions that can be dispatched against the editor store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Add a text element to the current view
    AddText { x: f32, y: f32, text: String },

    /// Add an image element to the current view
    AddImage {
        x: f32,
        y: f32,
        src: String,
        width: f32,
        height: f32,
    },

    /// Merge partial fields into an element
    UpdateElement { id: ElementId, patch: ElementPatch },

    DeleteElement(ElementId),

    /// Delete whatever is selected in the current view
    DeleteSelected,

    Select(Option<ElementId>),

    SwitchView(View),

    /// Remove every element from the current view
    ClearView,

    BringToFront(ElementId),

    SendToBack(ElementId),

    Duplicate(ElementId),

    /// Return an image to its original dimensions
    ResetSize(ElementId),

    Undo,

    Redo,
}

impl Command {
    /// Execute the command against the store
    pub fn execute(&self, store: &mut EditorStore) -> CommandResult {
        match self {
            Command::AddText { x, y, text } => {
                store.add_text(*x, *y, text.clone());
                Ok(())
            }

            Command::AddImage { x, y, src, width, height } => {
                store.add_image(*x, *y, src.clone(), *width, *height);
                Ok(())
            }

            Command::UpdateElement { id, patch } => {
                require(store.update_element(*id, patch), *id)
            }

            Command::DeleteElement(id) => require(store.delete_element(*id), *id),

            Command::DeleteSelected => {
                let id = store
                    .scene_store()
                    .selected_element()
                    .map(|e| e.id)
                    .ok_or(CommandError::NothingSelected)?;
                require(store.delete_element(id), id)
            }

            Command::Select(id) => {
                store.select(*id);
                Ok(())
            }

            Command::SwitchView(view) => {
                store.switch_view(*view);
                Ok(())
            }

            Command::ClearView => {
                store.clear_current_view();
                Ok(())
            }

            Command::BringToFront(id) => require(store.bring_to_front(*id), *id),

            Command::SendToBack(id) => require(store.send_to_back(*id), *id),

            Command::Duplicate(id) => store
                .duplicate(*id)
                .map(|_| ())
                .ok_or(CommandError::UnknownElement(*id)),

            Command::ResetSize(id) => {
                let element = store
                    .scene_store()
                    .find(*id)
                    .ok_or(CommandError::UnknownElement(*id))?;
                if element.as_image().is_none() {
                    return Err(CommandError::NotAnImage(*id));
                }
                store.reset_size(*id);
                Ok(())
            }

            Command::Undo => {
                if store.undo() {
                    Ok(())
                } else {
                    Err(CommandError::NothingToUndo)
                }
            }

            Command::Redo => {
                if store.redo() {
                    Ok(())
                } else {
                    Err(CommandError::NothingToRedo)
                }
            }
        }
    }

    /// Short label for toolbars and logs
    pub fn label(&self) -> &'static str {
        match self {
            Command::AddText { .. } => "Add text",
            Command::AddImage { .. } => "Add image",
            Command::UpdateElement { .. } => "Edit",
            Command::DeleteElement(_) | Command::DeleteSelected => "Delete",
            Command::Select(_) => "Select",
            Command::SwitchView(_) => "Switch view",
            Command::ClearView => "Clear view",
            Command::BringToFront(_) => "Bring to front",
            Command::SendToBack(_) => "Send to back",
            Command::Duplicate(_) => "Duplicate",
            Command::ResetSize(_) => "Reset size",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
        }
    }
}

fn require(found: bool, id: ElementId) -> CommandResult {
    if found {
        Ok(())
    } else {
        Err(CommandError::UnknownElement(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_generator::generate_id;

    #[test]
    fn add_then_undo() {
        let mut store = EditorStore::default();
        Command::AddText { x: 10.0, y: 10.0, text: "Hi".into() }
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.scene_store().current_elements().len(), 1);
        Command::Undo.execute(&mut store).unwrap();
        assert!(store.scene_store().current_elements().is_empty());
        assert_eq!(Command::Undo.execute(&mut store), Err(CommandError::NothingToUndo));
    }

    #[test]
    fn unknown_ids_report_errors() {
        let mut store = EditorStore::default();
        let id = generate_id();
        assert_eq!(
            Command::DeleteElement(id).execute(&mut store),
            Err(CommandError::UnknownElement(id))
        );
        assert_eq!(
            Command::DeleteSelected.execute(&mut store),
            Err(CommandError::NothingSelected)
        );
        assert!(!store.can_undo());
    }

    #[test]
    fn reset_size_requires_image() {
        let mut store = EditorStore::default();
        let id = store.add_text(0.0, 0.0, "Hi");
        assert_eq!(
            Command::ResetSize(id).execute(&mut store),
            Err(CommandError::NotAnImage(id))
        );
    }
}
