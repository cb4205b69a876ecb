//! Object-store backend over a caller-supplied client.

use std::error::Error;

use crate::{Backend, FsError, Mode, RawFile};

/// Failure reported by an [`ObjectClient`].
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// The key (or bucket) does not exist.
    #[error("object not found")]
    NotFound,
    /// Any other service or transport failure.
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl ObjectError {
    /// Wrap an arbitrary client error.
    pub fn other(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        ObjectError::Other(error.into())
    }
}

/// The subset of an object-store API the backend needs.
///
/// Implement this over an SDK client; bucket names are passed on every call.
pub trait ObjectClient: Send + Sync {
    /// Fetch the whole object body.
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ObjectError>;

    /// Store an object body, replacing any existing object.
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ObjectError>;

    /// Check that an object exists, returning [`ObjectError::NotFound`] if not.
    fn head_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError>;

    /// Delete an object.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError>;

    /// Copy an object to a new key in the same bucket.
    fn copy_object(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<(), ObjectError>;
}

/// Files stored as objects in one bucket.
///
/// Rename is a copy followed by a delete, so it is not atomic.
#[derive(Debug)]
pub struct ObjectBackend<C> {
    client: C,
    bucket: String,
}

impl<C: ObjectClient> ObjectBackend<C> {
    /// Serve objects of `bucket` through `client`.
    pub fn new(client: C, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

fn backend_error(error: ObjectError, key: &str) -> FsError {
    match error {
        ObjectError::NotFound => FsError::NotFound { path: key.into() },
        ObjectError::Other(source) => FsError::Backend(source),
    }
}

struct ObjectFile<'a, C> {
    backend: &'a ObjectBackend<C>,
    key: String,
}

impl<C: ObjectClient> RawFile for ObjectFile<'_, C> {
    fn read_raw(&mut self) -> Result<Vec<u8>, FsError> {
        self.backend
            .client
            .get_object(&self.backend.bucket, &self.key)
            .map_err(|e| backend_error(e, &self.key))
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<usize, FsError> {
        self.backend
            .client
            .put_object(&self.backend.bucket, &self.key, data)
            .map_err(|e| backend_error(e, &self.key))?;
        Ok(data.len())
    }
}

impl<C: ObjectClient> Backend for ObjectBackend<C> {
    fn name(&self) -> &'static str {
        "object"
    }

    fn describe(&self, path: &str) -> String {
        format!("{}:{}", self.bucket, path)
    }

    fn acquire<'a>(&'a self, path: &str, _mode: &Mode) -> Result<Box<dyn RawFile + 'a>, FsError> {
        Ok(Box::new(ObjectFile {
            backend: self,
            key: path.to_owned(),
        }))
    }

    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        match self.client.head_object(&self.bucket, path) {
            Ok(()) => Ok(true),
            Err(ObjectError::NotFound) => Ok(false),
            Err(e) => Err(backend_error(e, path)),
        }
    }

    fn remove_raw(&self, path: &str) -> Result<(), FsError> {
        self.client
            .delete_object(&self.bucket, path)
            .map_err(|e| backend_error(e, path))
    }

    fn rename_raw(&self, src: &str, dst: &str) -> Result<(), FsError> {
        self.client
            .copy_object(&self.bucket, src, dst)
            .map_err(|e| backend_error(e, src))?;
        self.remove_raw(src)
    }
}
