//! Compression codecs bound into reversible transforms.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::transform::{Reversible, Transform};

/// Codec-specific keyword parameters for one direction (compress or decompress).
///
/// `level` covers the setting every built-in codec understands; `options`
/// carries anything else a custom codec wants to read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecParams {
    /// Compression level; `None` means the codec's own default.
    pub level: Option<i32>,
    /// Additional named integer options.
    pub options: BTreeMap<String, i64>,
}

impl CodecParams {
    /// Parameters with only a compression level set.
    pub fn with_level(level: i32) -> Self {
        Self {
            level: Some(level),
            options: BTreeMap::new(),
        }
    }

    /// Look up a named option.
    pub fn option(&self, name: &str) -> Option<i64> {
        self.options.get(name).copied()
    }
}

/// A compression library with one-shot compress and decompress entry points.
pub trait Codec: Send + Sync {
    /// Short registry name, e.g. `"gzip"`.
    fn name(&self) -> &'static str;

    /// Compress a complete buffer.
    fn compress(&self, data: &[u8], params: &CodecParams) -> io::Result<Vec<u8>>;

    /// Decompress a complete buffer.
    fn decompress(&self, data: &[u8], params: &CodecParams) -> io::Result<Vec<u8>>;
}

/// A [`Codec`] bound to its compress and decompress parameters.
///
/// Cloning copies the parameter maps, so chained copies never share mutable
/// state with the original.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "gzip")] {
/// use blobfs::{CodecParams, Compressor, Transform, codecs::Gzip};
///
/// let gzip: Transform = Compressor::new(Gzip)
///     .with_compress_params(CodecParams::with_level(1))
///     .into();
/// let packed = gzip.apply(b"aaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
/// assert_eq!(gzip.remove(&packed).unwrap(), b"aaaaaaaaaaaaaaaaaaaaaaaa");
/// # }
/// ```
#[derive(Clone)]
pub struct Compressor {
    codec: Arc<dyn Codec>,
    compress_params: CodecParams,
    decompress_params: CodecParams,
}

impl Compressor {
    /// Bind a codec with default parameters.
    pub fn new(codec: impl Codec + 'static) -> Self {
        Self::from_arc(Arc::new(codec))
    }

    /// Bind an already shared codec.
    pub fn from_arc(codec: Arc<dyn Codec>) -> Self {
        Self {
            codec,
            compress_params: CodecParams::default(),
            decompress_params: CodecParams::default(),
        }
    }

    /// Set the parameters passed on every compress call.
    pub fn with_compress_params(mut self, params: CodecParams) -> Self {
        self.compress_params = params;
        self
    }

    /// Set the parameters passed on every decompress call.
    pub fn with_decompress_params(mut self, params: CodecParams) -> Self {
        self.decompress_params = params;
        self
    }

    /// The bound codec's name.
    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Parameters used when compressing.
    pub fn compress_params(&self) -> &CodecParams {
        &self.compress_params
    }

    /// Parameters used when decompressing.
    pub fn decompress_params(&self) -> &CodecParams {
        &self.decompress_params
    }
}

impl Reversible for Compressor {
    fn apply(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.codec.compress(data, &self.compress_params)
    }

    fn remove(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.codec.decompress(data, &self.decompress_params)
    }

    fn name(&self) -> &str {
        self.codec.name()
    }
}

impl From<Compressor> for Transform {
    fn from(value: Compressor) -> Self {
        Transform::from_step(value)
    }
}

impl fmt::Debug for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compressor")
            .field("codec", &self.codec.name())
            .field("compress_params", &self.compress_params)
            .field("decompress_params", &self.decompress_params)
            .finish()
    }
}
