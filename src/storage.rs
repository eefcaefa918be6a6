//! Persistence collaborators for the ledger snapshot.
//!
//! A storage holds exactly one blob under a fixed key. It knows nothing about its content.
use std::convert::Infallible;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Key under which the snapshot is stored.
pub const STORAGE_KEY: &str = "bankflow-data";

pub trait Storage {
    type Error: Error + Send + Sync + 'static;

    /// Returns the stored blob, or `None` if nothing was stored yet.
    fn read(&self) -> Result<Option<String>, Self::Error>;

    fn write(&mut self, raw: &str) -> Result<(), Self::Error>;

    fn remove(&mut self) -> Result<(), Self::Error>;
}

/// Keeps the snapshot in `<dir>/bankflow-data.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    type Error = io::Error;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, raw: &str) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Readers see either the old or the new snapshot, never a partial one.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw)?;
        fs::rename(&staging, &self.path)
    }

    fn remove(&mut self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

/// Keeps the snapshot in memory. Useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
}

impl MemoryStorage {
    pub fn new(blob: Option<String>) -> Self {
        Self { blob }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl Storage for MemoryStorage {
    type Error = Infallible;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, raw: &str) -> Result<(), Self::Error> {
        self.blob = Some(raw.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), Self::Error> {
        self.blob = None;
        Ok(())
    }
}
