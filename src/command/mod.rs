mod commands;
mod history;

use thiserror::Error;

use crate::id_generator::ElementId;

pub use commands::Command;
pub use history::{History, DEFAULT_HISTORY_LIMIT};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Reasons a command had no effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no element with id {0}")]
    UnknownElement(ElementId),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("element {0} is not an image")]
    NotAnImage(ElementId),
}
