//! Error types for the blobfs storage abstraction.

use std::io;

/// Storage error type with contextual variants.
///
/// Variants follow the conventional file-system failure kinds (missing file,
/// permission, already exists, unsupported operation) so callers can treat
/// every backend the same way. Uses `#[non_exhaustive]` for forward
/// compatibility.
///
/// # Examples
///
/// ```rust
/// use blobfs::FsError;
///
/// let err = FsError::NotFound { path: "reports/q1.csv".into() };
/// assert_eq!(err.to_string(), "no such file or directory: reports/q1.csv");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Argument Errors
    /// Malformed or conflicting argument, such as a bad mode string.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// Table or column name rejected by identifier validation.
    #[error("invalid identifier for {name}: {value:?} may only contain letters, numbers, and underscores")]
    InvalidIdentifier {
        /// Which setting carried the identifier.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Content passed to `write()` does not match the declared text/binary mode.
    #[error("write() argument must be {expected}, not {found}")]
    TypeMismatch {
        /// Content type the mode requires.
        expected: &'static str,
        /// Content type that was supplied.
        found: &'static str,
    },

    /// Compression name not present in the registry.
    #[error("unknown compression: {name}")]
    UnknownCompression {
        /// The unresolved name.
        name: String,
    },

    // Path/File Errors
    /// Path or key does not exist.
    #[error("no such file or directory: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Destination already exists.
    #[error("{operation}: file exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Target exists but is not a regular file, or access was refused.
    #[error("{operation}: operation not permitted: {path}")]
    PermissionDenied {
        /// The path where the operation was refused.
        path: String,
        /// The operation that was refused.
        operation: &'static str,
    },

    /// Operation is not supported by this handle or backend.
    #[error("unsupported operation: {operation}")]
    NotSupported {
        /// Description of the unsupported operation.
        operation: String,
    },

    // Data Errors
    /// Content could not be encoded or decoded with the configured text encoding.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: String,
        /// Details about the invalid data.
        details: String,
    },

    /// A transform or codec failed while applying or removing itself.
    #[error("transform failed for {path}: {source}")]
    Transform {
        /// The path being read or written.
        path: String,
        /// The codec error, unchanged.
        #[source]
        source: io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    // Backend Errors
    /// SQLite failure, propagated unchanged.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic backend error, propagated unchanged.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Build an error from a native I/O failure, keeping the path.
    ///
    /// Missing files, existing destinations and refused access map to the
    /// matching variants so local-disk errors look like every other backend's.
    /// A directory where a file was expected counts as refused access.
    pub fn io(operation: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { path, operation },
            io::ErrorKind::PermissionDenied | io::ErrorKind::IsADirectory => {
                FsError::PermissionDenied { path, operation }
            }
            _ => FsError::Io {
                operation,
                path,
                source,
            },
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        FsError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Returns `true` for the not-found kind, whichever backend produced it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        FsError::io("io", String::new(), error)
    }
}
