//! Scene Store
//!
//! The single owner of the live scene. Every mutation runs under the write
//! half of an async reader-writer lock, so ID assignment and insertion are
//! one atomic step. Readers get deep copies and never see a half-applied
//! change.

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::scene::{Element, ElementId, NewElement, Scene};

struct StoreState {
    scene: Scene,
    /// Next ID to hand out; survives clear and re-init
    next_id: u64,
}

/// In-memory scene store shared by every request handler
pub struct SceneStore {
    state: RwLock<StoreState>,
}

impl SceneStore {
    /// Create a store holding an empty scene of the given size
    pub fn new(width: i64, height: i64) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(StoreState {
                scene: Scene::new(width, height)?,
                next_id: 1,
            }),
        })
    }

    /// Replace the scene with an empty one of the given size
    pub async fn init(&self, width: i64, height: i64) -> Result<Scene> {
        let scene = Scene::new(width, height)?;

        let mut state = self.state.write().await;
        state.scene = scene;
        debug!(width, height, "Scene initialized");
        Ok(state.scene.clone())
    }

    /// Drop every element, keeping the dimensions
    pub async fn clear(&self) -> Scene {
        let mut state = self.state.write().await;
        let removed = state.scene.elements.len();
        state.scene.elements.clear();
        debug!(removed, "Scene cleared");
        state.scene.clone()
    }

    /// Validate and append an element, returning it with the updated scene
    pub async fn append(&self, draft: NewElement) -> Result<(Element, Scene)> {
        draft.validate()?;

        let mut state = self.state.write().await;
        let id = ElementId(state.next_id);
        state.next_id += 1;

        let element = draft.into_element(id);
        state.scene.elements.push(element.clone());
        debug!(id = %id, kind = element.element_type(), "Element appended");

        Ok((element, state.scene.clone()))
    }

    /// Point-in-time copy of the scene
    pub async fn snapshot(&self) -> Scene {
        self.state.read().await.scene.clone()
    }

    /// Number of elements currently in the scene
    pub async fn element_count(&self) -> usize {
        self.state.read().await.scene.elements.len()
    }
}
