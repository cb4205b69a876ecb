//! # Declarative Construction
//!
//! [`FilesystemConfig`] describes a backend and a default compression as
//! plain data, so a filesystem can be chosen at runtime. With the `serde`
//! feature it deserializes from JSON:
//!
//! ```json
//! { "backend": { "type": "local", "directory": "/srv/data" }, "compression": "gzip" }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::backends::{LocalBackend, MemoryBackend};
use crate::registry::CompressorRegistry;
use crate::{Backend, Filesystem, FsError};

#[cfg(feature = "sqlite")]
use crate::backends::SqliteBackend;

/// Which backend to build, and its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum BackendConfig {
    /// [`LocalBackend`] rooted at `directory`.
    Local {
        /// Root directory.
        directory: PathBuf,
        /// Reject paths that escape the root.
        #[cfg_attr(feature = "serde", serde(default = "defaults::safe_paths"))]
        safe_paths: bool,
    },
    /// Empty [`MemoryBackend`].
    Memory,
    /// [`SqliteBackend`] on a database file or `":memory:"`.
    #[cfg(feature = "sqlite")]
    Sqlite {
        /// Database path.
        #[cfg_attr(feature = "serde", serde(default = "defaults::database"))]
        database: String,
        /// Storage table.
        #[cfg_attr(feature = "serde", serde(default = "defaults::table_name"))]
        table_name: String,
        /// Path column.
        #[cfg_attr(feature = "serde", serde(default = "defaults::file_col"))]
        file_col: String,
        /// Content column.
        #[cfg_attr(feature = "serde", serde(default = "defaults::content_col"))]
        content_col: String,
    },
}

impl BackendConfig {
    /// Construct the configured backend.
    ///
    /// # Errors
    ///
    /// Whatever the backend constructor reports.
    pub fn build(&self) -> Result<Box<dyn Backend>, FsError> {
        Ok(match self {
            BackendConfig::Local {
                directory,
                safe_paths,
            } => Box::new(LocalBackend::with_safe_paths(directory, *safe_paths)?),
            BackendConfig::Memory => Box::new(MemoryBackend::new()),
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite {
                database,
                table_name,
                file_col,
                content_col,
            } => Box::new(SqliteBackend::with_table(
                database,
                table_name,
                file_col,
                content_col,
            )?),
        })
    }
}

/// A backend plus the filesystem's default compression name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilesystemConfig {
    /// Backend selection.
    pub backend: BackendConfig,
    /// Default compression name; `None` means no compression.
    #[cfg_attr(feature = "serde", serde(default))]
    pub compression: Option<String>,
}

impl FilesystemConfig {
    /// Configuration for `backend` without compression.
    pub fn new(backend: BackendConfig) -> Self {
        Self {
            backend,
            compression: None,
        }
    }

    /// Build against the process-wide registry.
    ///
    /// # Errors
    ///
    /// Whatever the backend constructor reports. Compression names are
    /// checked when files are opened.
    pub fn build(&self) -> Result<Filesystem<Box<dyn Backend>>, FsError> {
        self.build_with_registry(CompressorRegistry::global())
    }

    /// Build against an explicit registry.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_registry(
        &self,
        registry: Arc<CompressorRegistry>,
    ) -> Result<Filesystem<Box<dyn Backend>>, FsError> {
        let mut fs = Filesystem::with_registry(self.backend.build()?, registry);
        if let Some(name) = &self.compression {
            fs = fs.with_compression(name.as_str());
        }
        Ok(fs)
    }

    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// - [`FsError::Deserialization`] if the document does not match
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, FsError> {
        serde_json::from_str(json).map_err(|e| FsError::Deserialization(e.to_string()))
    }
}

#[cfg(feature = "serde")]
mod defaults {
    pub(super) fn safe_paths() -> bool {
        true
    }

    #[cfg(feature = "sqlite")]
    pub(super) fn database() -> String {
        ":memory:".into()
    }

    #[cfg(feature = "sqlite")]
    pub(super) fn table_name() -> String {
        "files".into()
    }

    #[cfg(feature = "sqlite")]
    pub(super) fn file_col() -> String {
        "file".into()
    }

    #[cfg(feature = "sqlite")]
    pub(super) fn content_col() -> String {
        "content".into()
    }
}
