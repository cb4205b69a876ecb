//! # blobfs
//!
//! Uniform whole-file access over local disk, memory, SQLite tables and
//! object stores, with pluggable compression and reversible transforms.
//!
//! Calling code opens a path on a [`Filesystem`], performs one read or one
//! write, and never learns which storage medium sits underneath.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use blobfs::{Content, Filesystem, MemoryBackend, OpenOptions};
//!
//! let fs = Filesystem::new(MemoryBackend::new());
//!
//! // Text mode is the default; "w" normalizes to "wt".
//! fs.open("hello.txt", "w").unwrap().write("hello").unwrap();
//!
//! // Per-call compression overrides the filesystem default.
//! let gz = OpenOptions::new().mode("wb").compression("gzip");
//! let stored = fs.open_with("hello.gz", &gz).unwrap().write(b"hello").unwrap();
//! assert!(stored > 0);
//!
//! let back = fs
//!     .open_with("hello.gz", &OpenOptions::new().mode("rb").compression("gzip"))
//!     .unwrap()
//!     .read()
//!     .unwrap();
//! assert_eq!(back, Content::Bytes(b"hello".to_vec()));
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Filesystem`] | a backend plus default compression/transform; opens files |
//! | [`File`] | one open file; runs the read/write pipeline |
//! | [`Backend`] / [`RawFile`] | what a storage medium implements |
//! | [`Transform`] | ordered chain of reversible byte steps |
//! | [`Compressor`] | a [`Codec`] with bound compress/decompress parameters |
//! | [`CompressorRegistry`] | name to transform lookup for compression |
//! | [`FsError`] | every failure, with path context |
//!
//! ---
//!
//! ## Pipeline
//!
//! ```text
//! write: Content ─▶ encode ─▶ transform ─▶ compression ─▶ backend
//! read:  backend ─▶ decompress ─▶ untransform ─▶ decode ─▶ Content
//! ```
//!
//! A write reports the number of bytes the backend stored, which is the
//! compressed length when compression is active.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`:
//!
//! ```rust
//! use blobfs::FsError;
//!
//! let err = FsError::NotFound { path: "missing.txt".into() };
//! assert_eq!(err.to_string(), "no such file or directory: missing.txt");
//!
//! let err = FsError::PermissionDenied { path: "dir".into(), operation: "remove" };
//! assert_eq!(err.to_string(), "remove: operation not permitted: dir");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! Backends are `Send + Sync` and take `&self`; a [`Filesystem`] can be
//! shared behind an `Arc`. Each [`File`] borrows its filesystem and is used
//! from one place at a time.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `bz2`, `gzip`, `lzma`, `lz4`, `zstd` | yes | built-in codecs registered under the same names |
//! | `sqlite` | yes | [`SqliteBackend`] |
//! | `serde` | no | config deserialization and JSON helpers |

mod backends;
mod compressor;
mod config;
mod error;
mod ext;
mod file;
mod filesystem;
mod path_resolver;
mod registry;
mod traits;
mod transform;
mod types;

pub mod codecs;

pub use error::FsError;
pub use types::{Content, DirFd, Encoding, Mode, VALID_MODE_CHARS};

pub use compressor::{Codec, CodecParams, Compressor};
pub use registry::{CANDIDATES, CompressorRegistry, NO_COMPRESSION};
pub use transform::{Reversible, Transform};

pub use traits::{Backend, RawFile};

pub use file::File;
pub use filesystem::{CompressionSpec, Filesystem, OpenOptions};

#[cfg(feature = "sqlite")]
pub use backends::SqliteBackend;
pub use backends::{LocalBackend, MemoryBackend, ObjectBackend, ObjectClient, ObjectError};
pub use path_resolver::{PathResolver, normalize};

pub use config::{BackendConfig, FilesystemConfig};
pub use ext::FsExt;

#[cfg(feature = "serde")]
pub use ext::FsExtJson;
