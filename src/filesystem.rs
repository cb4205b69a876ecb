//! # Filesystems
//!
//! [`Filesystem`] pairs a [`Backend`] with default compression and transform
//! settings, opens [`File`]s, and exposes the directory-level operations.
//!
//! ## Example
//!
//! ```rust
//! use blobfs::{Content, Filesystem, MemoryBackend, OpenOptions};
//!
//! let fs = Filesystem::new(MemoryBackend::new());
//!
//! let written = fs.open("notes.txt", "w").unwrap().write("abc").unwrap();
//! assert_eq!(written, 3);
//!
//! let text = fs.open("notes.txt", "r").unwrap().read().unwrap();
//! assert_eq!(text, Content::Text("abc".into()));
//!
//! let raw = fs
//!     .open_with("notes.txt", &OpenOptions::new().mode("rb"))
//!     .unwrap()
//!     .read()
//!     .unwrap();
//! assert_eq!(raw.as_bytes(), b"abc");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::compressor::Compressor;
use crate::registry::{CompressorRegistry, NO_COMPRESSION};
use crate::transform::Transform;
use crate::{Backend, DirFd, Encoding, File, FsError};

/// Which compression to use: a registry name, or a transform supplied directly.
///
/// Names are resolved against the registry each time a file is opened, so
/// registry changes are visible to later opens.
#[derive(Debug, Clone)]
pub enum CompressionSpec {
    /// Look the name up in the registry (`"none"` disables compression).
    Named(String),
    /// Use this transform as the compression.
    Custom(Transform),
}

impl CompressionSpec {
    /// The "no compression" selector.
    pub fn none() -> Self {
        CompressionSpec::Named(NO_COMPRESSION.to_owned())
    }

    fn resolve(&self, registry: &CompressorRegistry) -> Result<Option<Transform>, FsError> {
        match self {
            CompressionSpec::Named(name) => registry.get(Some(name)),
            CompressionSpec::Custom(transform) => Ok(Some(transform.clone())),
        }
    }
}

impl Default for CompressionSpec {
    fn default() -> Self {
        Self::none()
    }
}

impl From<&str> for CompressionSpec {
    fn from(value: &str) -> Self {
        CompressionSpec::Named(value.to_owned())
    }
}

impl From<String> for CompressionSpec {
    fn from(value: String) -> Self {
        CompressionSpec::Named(value)
    }
}

impl From<Transform> for CompressionSpec {
    fn from(value: Transform) -> Self {
        CompressionSpec::Custom(value)
    }
}

impl From<Compressor> for CompressionSpec {
    fn from(value: Compressor) -> Self {
        CompressionSpec::Custom(value.into())
    }
}

/// Per-open settings.
///
/// Unset compression and transform fall back to the filesystem defaults.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    mode: String,
    encoding: Encoding,
    compression: Option<CompressionSpec>,
    transform: Option<Transform>,
}

impl OpenOptions {
    /// Text-mode read (`"rt"`), UTF-8, filesystem defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode string.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Set the text encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override the filesystem's compression for this file.
    pub fn compression(mut self, compression: impl Into<CompressionSpec>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    /// Override the filesystem's transform for this file.
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            mode: "rt".to_owned(),
            encoding: Encoding::Utf8,
            compression: None,
            transform: None,
        }
    }
}

/// A collection of files on one backend, sharing default pipeline settings.
pub struct Filesystem<B> {
    backend: B,
    registry: Arc<CompressorRegistry>,
    compression: CompressionSpec,
    transform: Option<Transform>,
}

impl<B: Backend> Filesystem<B> {
    /// Wrap a backend using the process-wide compressor registry.
    pub fn new(backend: B) -> Self {
        Self::with_registry(backend, CompressorRegistry::global())
    }

    /// Wrap a backend with an explicit registry.
    pub fn with_registry(backend: B, registry: Arc<CompressorRegistry>) -> Self {
        Self {
            backend,
            registry,
            compression: CompressionSpec::none(),
            transform: None,
        }
    }

    /// Set the default compression for every file.
    pub fn with_compression(mut self, compression: impl Into<CompressionSpec>) -> Self {
        self.compression = compression.into();
        self
    }

    /// Set the default transform for every file.
    ///
    /// Transforms are applied before compression on write and removed after
    /// decompression on read.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The registry used to resolve compression names.
    pub fn registry(&self) -> &CompressorRegistry {
        &self.registry
    }

    /// Default compression selector.
    pub fn compression(&self) -> &CompressionSpec {
        &self.compression
    }

    /// Default transform.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Open a file with the given mode and default settings.
    ///
    /// # Errors
    ///
    /// See [`open_with`](Self::open_with).
    pub fn open(&self, path: &str, mode: &str) -> Result<File<'_>, FsError> {
        self.open_with(path, &OpenOptions::new().mode(mode))
    }

    /// Open a file.
    ///
    /// Resolves compression and transform (per-call override first, then the
    /// filesystem default), validates the mode and acquires the backend
    /// resource. The resource is released when the returned [`File`] drops.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] for a malformed mode
    /// - [`FsError::UnknownCompression`] if a compression name is not registered
    /// - backend acquisition errors, e.g. [`FsError::NotFound`]
    pub fn open_with(&self, path: &str, options: &OpenOptions) -> Result<File<'_>, FsError> {
        let compression = options
            .compression
            .as_ref()
            .unwrap_or(&self.compression)
            .resolve(&self.registry)?;
        let transform = options.transform.clone().or_else(|| self.transform.clone());
        let mode = self.backend.check_mode(&options.mode)?;
        let location = self.backend.describe(path);
        log::debug!("open {location} mode={mode}");
        let raw = self.backend.acquire(path, &mode)?;
        Ok(File::new(
            raw,
            path,
            location,
            mode,
            options.encoding,
            compression,
            transform,
        ))
    }

    /// Open a file, run `body` on it, and close it.
    ///
    /// The file is closed whether `body` succeeds or fails. A close failure
    /// is reported only when `body` itself succeeded.
    pub fn with_file<T>(
        &self,
        path: &str,
        options: &OpenOptions,
        body: impl FnOnce(&mut File<'_>) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let mut file = self.open_with(path, options)?;
        let result = body(&mut file);
        let closed = file.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Check whether the path refers to an existing entry.
    pub fn exists(&self, path: &str) -> Result<bool, FsError> {
        self.backend.exists(path)
    }

    /// Check whether the path is a regular file.
    pub fn is_file(&self, path: &str) -> Result<bool, FsError> {
        self.backend.is_file(path)
    }

    /// Remove (delete) a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::PermissionDenied`] if the path is not a regular file
    pub fn remove(&self, path: &str) -> Result<(), FsError> {
        self.remove_at(path, None)
    }

    /// Remove a file relative to a directory handle.
    ///
    /// # Errors
    ///
    /// As [`remove`](Self::remove), plus [`FsError::NotSupported`] if the
    /// backend does not accept directory handles.
    pub fn remove_at(&self, path: &str, dir_fd: Option<DirFd<'_>>) -> Result<(), FsError> {
        log::debug!("remove {}", self.backend.describe(path));
        self.backend.remove(path, dir_fd)
    }

    /// Rename (move) a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the source does not exist
    /// - [`FsError::PermissionDenied`] if the source is not a regular file
    /// - [`FsError::AlreadyExists`] if the destination exists
    pub fn rename(&self, src: &str, dst: &str) -> Result<(), FsError> {
        self.rename_at(src, None, dst, None)
    }

    /// Rename a file with paths relative to directory handles.
    ///
    /// # Errors
    ///
    /// As [`rename`](Self::rename), plus [`FsError::NotSupported`] if the
    /// backend does not accept directory handles.
    pub fn rename_at(
        &self,
        src: &str,
        src_dir_fd: Option<DirFd<'_>>,
        dst: &str,
        dst_dir_fd: Option<DirFd<'_>>,
    ) -> Result<(), FsError> {
        log::debug!(
            "rename {} -> {}",
            self.backend.describe(src),
            self.backend.describe(dst)
        );
        self.backend.rename(src, dst, src_dir_fd, dst_dir_fd)
    }
}

impl<B: Backend> fmt::Debug for Filesystem<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filesystem")
            .field("backend", &self.backend.name())
            .field("compression", &self.compression)
            .field("transform", &self.transform)
            .finish()
    }
}
