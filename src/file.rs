//! # Open Files
//!
//! The read/write pipeline shared by every backend.
//!
//! ## Pipeline
//!
//! ```text
//! write: Content ─▶ checks ─▶ encode text ─▶ transform.apply ─▶ compression.apply ─▶ write_raw
//! read:  read_raw ─▶ compression.remove ─▶ transform.remove ─▶ decode text ─▶ Content
//! ```
//!
//! The extra transform sits inside the compression on disk, so it is applied
//! first on write and removed last on read.
//!
//! ## Lifecycle
//!
//! A [`File`] is created open by [`Filesystem::open`](crate::Filesystem::open)
//! and is meant for exactly one `read` or one `write`. The backend resource
//! is released when the `File` is dropped, on every exit path; call
//! [`File::close`] to observe a release error instead of having it logged.

use std::fmt;

use crate::transform::Transform;
use crate::{Content, Encoding, FsError, Mode, RawFile};

/// One opened logical file.
pub struct File<'fs> {
    raw: Option<Box<dyn RawFile + 'fs>>,
    path: String,
    location: String,
    mode: Mode,
    encoding: Encoding,
    compression: Option<Transform>,
    transform: Option<Transform>,
}

impl<'fs> File<'fs> {
    pub(crate) fn new(
        raw: Box<dyn RawFile + 'fs>,
        path: &str,
        location: String,
        mode: Mode,
        encoding: Encoding,
        compression: Option<Transform>,
        transform: Option<Transform>,
    ) -> Self {
        Self {
            raw: Some(raw),
            path: path.to_owned(),
            location,
            mode,
            encoding,
            compression,
            transform,
        }
    }

    /// Read the whole file.
    ///
    /// Returns [`Content::Text`] in text mode and [`Content::Bytes`] in
    /// binary mode.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the file is not open for reading, or closed
    /// - [`FsError::NotFound`] if the backend has nothing stored under the path
    /// - [`FsError::Transform`] if decompression or a transform fails
    /// - [`FsError::InvalidData`] if text mode cannot decode the bytes
    pub fn read(&mut self) -> Result<Content, FsError> {
        let Some(raw) = self.raw.as_mut() else {
            return Err(closed());
        };
        raw.read_checks(&self.mode)?;
        let mut data = raw.read_raw()?;
        if let Some(compression) = &self.compression {
            data = compression
                .remove(&data)
                .map_err(|source| transform_failed(&self.path, source))?;
        }
        if let Some(transform) = &self.transform {
            data = transform
                .remove(&data)
                .map_err(|source| transform_failed(&self.path, source))?;
        }
        if self.mode.is_text() {
            return Ok(Content::Text(self.encoding.decode(data, &self.path)?));
        }
        Ok(Content::Bytes(data))
    }

    /// Write the whole file, replacing any previous content.
    ///
    /// Returns the number of bytes the backend stored. With compression
    /// active this is the compressed length, not the length of `content`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] if the file is not open for writing, or closed
    /// - [`FsError::TypeMismatch`] if bytes are given in text mode or text in binary mode
    /// - [`FsError::InvalidData`] if the text cannot be encoded
    /// - [`FsError::Transform`] if compression or a transform fails
    pub fn write(&mut self, content: impl Into<Content>) -> Result<usize, FsError> {
        let content = content.into();
        let Some(raw) = self.raw.as_mut() else {
            return Err(closed());
        };
        raw.write_checks(&self.mode, &content)?;
        // Transforms and every backend work on raw bytes.
        let mut data = match content {
            Content::Bytes(bytes) => bytes,
            Content::Text(text) if self.encoding == Encoding::Utf8 => text.into_bytes(),
            Content::Text(text) => self.encoding.encode(&text, &self.path)?,
        };
        if let Some(transform) = &self.transform {
            data = transform
                .apply(&data)
                .map_err(|source| transform_failed(&self.path, source))?;
        }
        if let Some(compression) = &self.compression {
            data = compression
                .apply(&data)
                .map_err(|source| transform_failed(&self.path, source))?;
        }
        raw.write_raw(&data)
    }

    /// Release the backend resource now and report any failure.
    pub fn close(mut self) -> Result<(), FsError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), FsError> {
        match self.raw.take() {
            Some(mut raw) => {
                log::trace!("closing {}", self.location);
                raw.close()
            }
            None => Ok(()),
        }
    }

    /// Logical path the file was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Normalized mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Text encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Resolved compression, if any.
    pub fn compression(&self) -> Option<&Transform> {
        self.compression.as_ref()
    }

    /// Resolved extra transform, if any.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Returns `true` once the backend resource has been released.
    pub fn is_closed(&self) -> bool {
        self.raw.is_none()
    }
}

impl Drop for File<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("failed to close {}: {e}", self.location);
        }
    }
}

impl fmt::Display for File<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for File<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("location", &self.location)
            .field("mode", &self.mode.as_str())
            .field("encoding", &self.encoding)
            .field("compression", &self.compression)
            .field("transform", &self.transform)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn closed() -> FsError {
    FsError::NotSupported {
        operation: "I/O operation on closed file".into(),
    }
}

fn transform_failed(path: &str, source: std::io::Error) -> FsError {
    FsError::Transform {
        path: path.to_owned(),
        source,
    }
}
