//! # Backend Traits
//!
//! The two seams a storage backend implements.
//!
//! ```text
//! Filesystem<B> ── open() ──▶ B::acquire() ──▶ Box<dyn RawFile>
//!      │                                            │
//!      │ exists / is_file / remove / rename         │ read_raw / write_raw / close
//!      ▼                                            ▼
//!   Backend                                      RawFile
//! ```
//!
//! | Trait | Role | Implemented by |
//! |-------|------|----------------|
//! | [`Backend`] | directory-level operations and file acquisition | one type per storage medium |
//! | [`RawFile`] | raw byte I/O for one open file | a small view or handle type per backend |
//!
//! The read/write pipeline itself is not part of either trait; it lives in
//! [`File`](crate::File) and is shared by every backend.

mod backend;
mod raw_file;

pub use backend::Backend;
pub use raw_file::RawFile;
