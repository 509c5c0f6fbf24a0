//! Published state shared with consumer threads
//!
//! Each slot holds an `Arc` that is replaced wholesale under a short write
//! lock. Readers clone the current `Arc` and never observe a half-built value.

use super::snapshot::EntitySnapshot;
use crate::game::LocalData;
use parking_lot::RwLock;
use std::mem;
use std::sync::Arc;

/// A swappable, shareable value
#[derive(Debug)]
pub struct Published<T> {
    slot: Arc<RwLock<Arc<T>>>,
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Published {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Published<T> {
    pub fn new(value: T) -> Self {
        Published {
            slot: Arc::new(RwLock::new(Arc::new(value))),
        }
    }

    /// The current value
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&*self.slot.read())
    }

    /// Replaces the value, returning the previous one
    pub fn store(&self, value: Arc<T>) -> Arc<T> {
        mem::replace(&mut *self.slot.write(), value)
    }
}

/// Local data and entity snapshot taken at the same frame, published together
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    pub local: Arc<LocalData>,
    pub entities: Arc<EntitySnapshot>,
}

/// Read-only, cloneable view of an engine's published state
#[derive(Debug)]
pub struct EngineView<Mesh> {
    pub(crate) world: Published<WorldState>,
    pub(crate) mesh: Published<Mesh>,
}

impl<Mesh> Clone for EngineView<Mesh> {
    fn clone(&self) -> Self {
        EngineView {
            world: self.world.clone(),
            mesh: self.mesh.clone(),
        }
    }
}

impl<Mesh> EngineView<Mesh> {
    /// Local data and snapshot of one frame
    pub fn world(&self) -> Arc<WorldState> {
        self.world.load()
    }

    pub fn snapshot(&self) -> Arc<EntitySnapshot> {
        Arc::clone(&self.world.load().entities)
    }

    pub fn local_data(&self) -> Arc<LocalData> {
        Arc::clone(&self.world.load().local)
    }

    pub fn mesh(&self) -> Arc<Mesh> {
        self.mesh.load()
    }
}
