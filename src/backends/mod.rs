//! # Storage Backends
//!
//! | Backend | Storage | Feature |
//! |---------|---------|---------|
//! | [`LocalBackend`] | files under a root directory | always |
//! | [`MemoryBackend`] | a map of path to bytes | always |
//! | [`SqliteBackend`] | one row per file in a SQLite table | `sqlite` |
//! | [`ObjectBackend`] | keys in an object-store bucket | always, client supplied by the caller |

mod local;
mod memory;
mod object;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use object::{ObjectBackend, ObjectClient, ObjectError};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
