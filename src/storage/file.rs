//! File-backed cart store

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    cart::CartState,
    storage::{CartStore, SessionId, StorageError},
};

/// One JSON document per session in a directory (`<dir>/<session>.json`).
///
/// The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    dir: PathBuf,
}

impl FileCartStore {
    /// Store carts under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory carts are stored in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session: &SessionId) -> PathBuf {
        self.dir.join(format!("{session}.json"))
    }
}

impl CartStore for FileCartStore {
    fn load(&self, session: &SessionId) -> Result<Option<CartState>, StorageError> {
        let path = self.path_for(session);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        debug!(session = %session, path = %path.display(), "loaded cart");

        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, session: &SessionId, cart: &CartState) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(session);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, serde_json::to_vec_pretty(cart)?)?;
        fs::rename(&staging, &path)?;

        debug!(session = %session, path = %path.display(), lines = cart.len(), "saved cart");

        Ok(())
    }

    fn remove(&self, session: &SessionId) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(session)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
