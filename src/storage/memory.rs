//! In-memory cart store

use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::{
    cart::CartState,
    storage::{CartStore, SessionId, StorageError},
};

/// Carts held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    carts: RwLock<FxHashMap<SessionId, CartState>>,
}

impl MemoryCartStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock was poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self
            .carts
            .read()
            .map_err(|_poisoned| StorageError::Poisoned)?
            .len())
    }

    /// Whether no carts are stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock was poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self, session: &SessionId) -> Result<Option<CartState>, StorageError> {
        let carts = self
            .carts
            .read()
            .map_err(|_poisoned| StorageError::Poisoned)?;

        Ok(carts.get(session).cloned())
    }

    fn save(&self, session: &SessionId, cart: &CartState) -> Result<(), StorageError> {
        let mut carts = self
            .carts
            .write()
            .map_err(|_poisoned| StorageError::Poisoned)?;

        carts.insert(session.clone(), cart.clone());

        Ok(())
    }

    fn remove(&self, session: &SessionId) -> Result<(), StorageError> {
        let mut carts = self
            .carts
            .write()
            .map_err(|_poisoned| StorageError::Poisoned)?;

        carts.remove(session);

        Ok(())
    }
}
