//! Storage backend contract.

use crate::{DirFd, FsError, Mode, RawFile};

/// A storage medium that holds named blobs.
///
/// A backend supplies only the storage-specific primitives: acquiring a
/// [`RawFile`], existence checks, and raw remove/rename. Everything else
/// (mode handling, transforms, compression, encodings) is shared by
/// [`Filesystem`](crate::Filesystem) and [`File`](crate::File).
///
/// # Guard Checks
///
/// [`remove`](Self::remove) and [`rename`](Self::rename) have default bodies
/// that reject directory handles, missing sources, non-file sources and
/// existing destinations before calling the raw operation. A backend may
/// override them to get native error behavior, but must still report the
/// same conditions.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`, and methods take `&self`.
/// Backends use interior mutability (`RwLock`, `Mutex`) for their state.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn Backend`.
pub trait Backend: Send + Sync {
    /// Short backend name used in messages.
    fn name(&self) -> &'static str;

    /// Human-readable location of a path, used in debug output and logs.
    fn describe(&self, path: &str) -> String {
        format!("{}:{}", self.name(), path)
    }

    /// Validate a mode string before acquisition.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] for malformed or conflicting modes
    fn check_mode(&self, mode: &str) -> Result<Mode, FsError> {
        Mode::parse(mode)
    }

    /// Acquire the backend resource for one open file.
    ///
    /// Backends without a real handle (rows, keys, map entries) return a
    /// lightweight view and do no work here.
    ///
    /// # Errors
    ///
    /// Backend-specific; a local file opened for reading that does not exist
    /// fails here with [`FsError::NotFound`].
    fn acquire<'a>(&'a self, path: &str, mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError>;

    /// Check whether the path is a regular file.
    fn is_file(&self, path: &str) -> Result<bool, FsError>;

    /// Check whether the path refers to anything at all.
    ///
    /// Defaults to [`is_file`](Self::is_file). Backends with directories or
    /// other non-file entries override it.
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        self.is_file(path)
    }

    /// Delete a path that the guards have already validated.
    fn remove_raw(&self, path: &str) -> Result<(), FsError>;

    /// Move a path that the guards have already validated.
    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError>;

    /// Remove (delete) a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if `dir_fd` is given
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::PermissionDenied`] if the path exists but is not a file
    fn remove(&self, path: &str, dir_fd: Option<DirFd<'_>>) -> Result<(), FsError> {
        if dir_fd.is_some() {
            return Err(FsError::NotSupported {
                operation: format!("dir_fd is not supported by {}", self.name()),
            });
        }
        if !self.exists(path)? {
            return Err(FsError::NotFound { path: path.into() });
        }
        if !self.is_file(path)? {
            return Err(FsError::PermissionDenied {
                path: path.into(),
                operation: "remove",
            });
        }
        self.remove_raw(path)
    }

    /// Rename (move) a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if either directory handle is given
    /// - [`FsError::NotFound`] if the source does not exist
    /// - [`FsError::PermissionDenied`] if the source is not a file
    /// - [`FsError::AlreadyExists`] if the destination exists; the source is untouched
    fn rename(
        &self,
        src: &str,
        dst: &str,
        src_dir_fd: Option<DirFd<'_>>,
        dst_dir_fd: Option<DirFd<'_>>,
    ) -> Result<(), FsError> {
        if src_dir_fd.is_some() || dst_dir_fd.is_some() {
            return Err(FsError::NotSupported {
                operation: format!(
                    "src_dir_fd and dst_dir_fd are not supported by {}",
                    self.name()
                ),
            });
        }
        if !self.exists(src)? {
            return Err(FsError::NotFound { path: src.into() });
        }
        if !self.is_file(src)? {
            return Err(FsError::PermissionDenied {
                path: src.into(),
                operation: "rename",
            });
        }
        if self.exists(dst)? {
            return Err(FsError::AlreadyExists {
                path: dst.into(),
                operation: "rename",
            });
        }
        self.rename_raw(src, dst)
    }
}

// Forward every method so overrides survive boxing.
impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn describe(&self, path: &str) -> String {
        (**self).describe(path)
    }

    fn check_mode(&self, mode: &str) -> Result<Mode, FsError> {
        (**self).check_mode(mode)
    }

    fn acquire<'a>(&'a self, path: &str, mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError> {
        (**self).acquire(path, mode)
    }

    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        (**self).is_file(path)
    }

    fn exists(&self, path: &str) -> Result<bool, FsError> {
        (**self).exists(path)
    }

    fn remove_raw(&self, path: &str) -> Result<(), FsError> {
        (**self).remove_raw(path)
    }

    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError> {
        (**self).rename_raw(src, dst)
    }

    fn remove(&self, path: &str, dir_fd: Option<DirFd<'_>>) -> Result<(), FsError> {
        (**self).remove(path, dir_fd)
    }

    fn rename(
        &self,
        src: &str,
        dst: &str,
        src_dir_fd: Option<DirFd<'_>>,
        dst_dir_fd: Option<DirFd<'_>>,
    ) -> Result<(), FsError> {
        (**self).rename(src, dst, src_dir_fd, dst_dir_fd)
    }
}
