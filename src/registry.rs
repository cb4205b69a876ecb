//! # Compressor Registry
//!
//! Maps short names (`"gzip"`, `"zstd"`, ...) to ready-to-use transforms.
//!
//! The registry is an explicit value. Build one at startup with
//! [`CompressorRegistry::with_builtin`] and hand it to filesystems through
//! [`Filesystem::with_registry`](crate::Filesystem::with_registry), or use the
//! process-wide [`CompressorRegistry::global`] instance, which is populated
//! exactly once no matter how many threads ask for it first.
//!
//! `"none"` is always present and resolves to "no compression".

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::transform::Transform;
use crate::FsError;
#[cfg(any(feature = "bz2", feature = "gzip", feature = "lzma", feature = "lz4", feature = "zstd"))]
use crate::{codecs, compressor::Compressor};

/// Registry name meaning "do not compress".
pub const NO_COMPRESSION: &str = "none";

/// Codecs probed by [`CompressorRegistry::init`], in probe order.
///
/// Names without a matching cargo feature are skipped.
pub const CANDIDATES: [&str; 8] = [
    "bz2", "gzip", "lzma", "blosc", "brotli", "lz4", "snappy", "zstd",
];

static GLOBAL: OnceLock<Arc<CompressorRegistry>> = OnceLock::new();

/// Name → transform lookup table.
///
/// # Example
///
/// ```rust
/// use blobfs::CompressorRegistry;
///
/// let registry = CompressorRegistry::with_builtin();
/// assert!(registry.get(Some("none")).unwrap().is_none());
/// assert!(registry.get(None).unwrap().is_none());
/// assert!(registry.get(Some("no-such-codec")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompressorRegistry {
    entries: BTreeMap<String, Option<Transform>>,
}

impl CompressorRegistry {
    /// An empty registry. Call [`init`](Self::init) to populate it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with every codec compiled into this build.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.init();
        registry
    }

    /// The shared process-wide registry, populated on first use.
    pub fn global() -> Arc<CompressorRegistry> {
        GLOBAL
            .get_or_init(|| Arc::new(CompressorRegistry::with_builtin()))
            .clone()
    }

    /// Rebuild the table from scratch and return the sorted, lower-cased names.
    ///
    /// Always inserts `"none"`. Each candidate in [`CANDIDATES`] is registered
    /// when its codec feature is enabled and silently skipped otherwise.
    /// Custom entries added with [`register`](Self::register) are discarded.
    pub fn init(&mut self) -> Vec<String> {
        self.entries.clear();
        self.entries.insert(NO_COMPRESSION.to_owned(), None);
        for name in CANDIDATES {
            match probe(name) {
                Some(transform) => {
                    self.entries.insert(name.to_owned(), Some(transform));
                }
                None => log::trace!("compression codec {name} not available, skipping"),
            }
        }
        let names = self.names();
        log::debug!("compression registry initialized: {names:?}");
        names
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: &str, transform: impl Into<Transform>) {
        self.entries
            .insert(name.to_ascii_lowercase(), Some(transform.into()));
    }

    /// Resolve a name.
    ///
    /// `None` and `"none"` both resolve to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`FsError::UnknownCompression`] if the name is not registered
    pub fn get(&self, name: Option<&str>) -> Result<Option<Transform>, FsError> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.entries
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| FsError::UnknownCompression {
                name: name.to_owned(),
            })
    }

    /// Returns `true` if the name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Sorted registered names, including `"none"`.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns `true` if nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn probe(name: &str) -> Option<Transform> {
    match name {
        #[cfg(feature = "bz2")]
        "bz2" => Some(Compressor::new(codecs::Bz2).into()),
        #[cfg(feature = "gzip")]
        "gzip" => Some(Compressor::new(codecs::Gzip).into()),
        #[cfg(feature = "lzma")]
        "lzma" => Some(Compressor::new(codecs::Lzma).into()),
        #[cfg(feature = "lz4")]
        "lz4" => Some(Compressor::new(codecs::Lz4).into()),
        #[cfg(feature = "zstd")]
        "zstd" => Some(codecs::zstd_transform(0)),
        _ => None,
    }
}
