//! Backend half of an open file.

use crate::{Content, FsError, Mode};

/// Raw byte I/O for one open file, supplied by a backend.
///
/// The shared pipeline in [`File`](crate::File) handles modes, encodings,
/// transforms and compression; a `RawFile` only moves final bytes in and out
/// of storage and releases whatever it acquired.
///
/// # Pre-check Hooks
///
/// [`read_checks`](Self::read_checks) and [`write_checks`](Self::write_checks)
/// default to the generic mode checks. Override them when the backend can
/// report a condition earlier (a missing key, say) or when its native calls
/// already signal the same errors.
pub trait RawFile {
    /// Checks run before [`read_raw`](Self::read_raw).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the mode is not readable
    fn read_checks(&self, mode: &Mode) -> Result<(), FsError> {
        mode.check_readable()
    }

    /// Checks run before any transform touches the content.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the mode is not writeable
    /// - [`FsError::TypeMismatch`] if the content does not match the text/binary mode
    fn write_checks(&self, mode: &Mode, content: &Content) -> Result<(), FsError> {
        mode.check_writable(content)
    }

    /// Read the stored bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if nothing is stored under the path
    fn read_raw(&mut self) -> Result<Vec<u8>, FsError>;

    /// Store bytes, replacing any previous content.
    ///
    /// Returns the number of bytes written.
    fn write_raw(&mut self, data: &[u8]) -> Result<usize, FsError>;

    /// Release the backend resource. Called exactly once.
    fn close(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}
