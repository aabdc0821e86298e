mod scene;
mod store;
pub mod persistence;

pub use scene::{Scene, SceneStore, View, DUPLICATE_OFFSET};
pub use store::EditorStore;
pub use persistence::{
    DesignSnapshot,
    DesignStore,
    PersistenceError,
    PersistenceResult,
};
