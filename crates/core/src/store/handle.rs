use super::{MedicalStore, StoreEvent};
use crate::state::MedicalState;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Shared ownership of one [`MedicalStore`].
///
/// Cloning the handle is cheap; every clone refers to the same store. Guards must not be held
/// across an `.await`.
#[derive(Clone, Debug, Default)]
pub struct StoreHandle {
    inner: Arc<RwLock<MedicalStore>>,
}

impl StoreHandle {
    pub fn new(store: MedicalStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    // Mutations commit only fully validated records, so a poisoned lock still guards a
    // consistent state.
    pub fn read(&self) -> RwLockReadGuard<'_, MedicalStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, MedicalStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> MedicalState {
        self.read().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.read().subscribe()
    }
}
