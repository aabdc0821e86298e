use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque element identifier, unique across every view of a design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Random v4 ids stay unique across sessions and restored designs
pub fn generate_id() -> ElementId {
    ElementId(Uuid::new_v4())
}
