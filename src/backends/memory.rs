//! In-memory backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Backend, Content, FsError, Mode, RawFile};

/// Files held in a process-local map of path to bytes.
///
/// Paths are opaque keys; no normalization is applied, and there are no
/// directories.
///
/// ```rust
/// use blobfs::{Filesystem, MemoryBackend};
///
/// let fs = Filesystem::new(MemoryBackend::from_tree([("seed.txt", b"x".to_vec())]));
/// assert!(fs.is_file("seed.txt").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with initial files.
    ///
    /// Values may be bytes or text; text is stored as its UTF-8 bytes.
    pub fn from_tree<K, V, I>(tree: I) -> Self
    where
        K: Into<String>,
        V: Into<Content>,
        I: IntoIterator<Item = (K, V)>,
    {
        let files = tree
            .into_iter()
            .map(|(k, v)| (k.into(), v.into().into_bytes()))
            .collect();
        Self {
            files: RwLock::new(files),
        }
    }

    /// Stored bytes for a path, exactly as written by the pipeline.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files().get(path).cloned()
    }

    /// Copy of every stored file.
    pub fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.files().clone()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    fn files(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct MemoryFile<'a> {
    backend: &'a MemoryBackend,
    path: String,
}

impl MemoryFile<'_> {
    fn not_found(&self) -> FsError {
        FsError::NotFound {
            path: self.path.clone(),
        }
    }
}

impl RawFile for MemoryFile<'_> {
    fn read_checks(&self, mode: &Mode) -> Result<(), FsError> {
        mode.check_readable()?;
        if !self.backend.files().contains_key(&self.path) {
            return Err(self.not_found());
        }
        Ok(())
    }

    fn read_raw(&mut self) -> Result<Vec<u8>, FsError> {
        self.backend.get(&self.path).ok_or_else(|| self.not_found())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<usize, FsError> {
        self.backend
            .files_mut()
            .insert(self.path.clone(), data.to_vec());
        Ok(data.len())
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn acquire<'a>(&'a self, path: &str, _mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError> {
        Ok(Box::new(MemoryFile {
            backend: self,
            path: path.to_owned(),
        }))
    }

    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.files().contains_key(path))
    }

    fn remove_raw(&self, path: &str) -> Result<(), FsError> {
        self.files_mut().remove(path);
        Ok(())
    }

    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError> {
        let mut files = self.files_mut();
        let data = files
            .remove(src)
            .ok_or_else(|| FsError::NotFound { path: src.into() })?;
        files.insert(dst.to_owned(), data);
        Ok(())
    }
}
