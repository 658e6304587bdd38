//! Cart storage
//!
//! Carts outlive a single pricing call, so sessions persist them through a [`CartStore`]. The
//! store is injected rather than global: an in-memory map for tests and embedding, or a directory
//! of JSON documents standing in for a browser's local storage. Writes are last-writer-wins.

use std::{fmt, io, str::FromStr};

use thiserror::Error;

use crate::cart::CartState;

pub mod file;
pub mod memory;

pub use file::FileCartStore;
pub use memory::MemoryCartStore;

const MAX_SESSION_ID_LEN: usize = 128;

/// Errors raised by cart stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Session ids may only contain ASCII letters, digits, `-` and `_`.
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// IO error reading or writing a stored cart
    #[error("Cart storage IO error: {0}")]
    Io(#[from] io::Error),

    /// A stored cart could not be encoded or decoded
    #[error("Stored cart is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A lock guarding the store was poisoned by a panicking writer
    #[error("Cart store lock poisoned")]
    Poisoned,
}

/// Identifies one shopper's session, and so one stored cart.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidSessionId`] if the id is empty, longer than 128 characters,
    /// or contains anything other than ASCII letters, digits, `-` and `_`.
    pub fn new(id: impl Into<String>) -> Result<Self, StorageError> {
        let id = id.into();

        let valid = !id.is_empty()
            && id.len() <= MAX_SESSION_ID_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(id))
        } else {
            Err(StorageError::InvalidSessionId(id))
        }
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Persistence for carts, keyed by session.
#[cfg_attr(test, mockall::automock)]
pub trait CartStore {
    /// Load the cart stored for a session, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the stored cart cannot be read.
    fn load(&self, session: &SessionId) -> Result<Option<CartState>, StorageError>;

    /// Store a session's cart, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be written.
    fn save(&self, session: &SessionId, cart: &CartState) -> Result<(), StorageError>;

    /// Forget a session's cart. Removing a cart that isn't stored is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart cannot be removed.
    fn remove(&self, session: &SessionId) -> Result<(), StorageError>;
}

impl<S: CartStore + ?Sized> CartStore for &S {
    fn load(&self, session: &SessionId) -> Result<Option<CartState>, StorageError> {
        (**self).load(session)
    }

    fn save(&self, session: &SessionId, cart: &CartState) -> Result<(), StorageError> {
        (**self).save(session, cart)
    }

    fn remove(&self, session: &SessionId) -> Result<(), StorageError> {
        (**self).remove(session)
    }
}
