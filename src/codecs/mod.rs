//! Built-in compression codecs.
//!
//! Each codec lives behind a cargo feature named after its registry entry.
//! A disabled feature is the equivalent of the codec library being absent:
//! the registry silently skips it.
//!
//! | Feature | Registry name | Crate | Format |
//! |---------|---------------|-------|--------|
//! | `bz2` | `bz2` | `bzip2` | bzip2 stream |
//! | `gzip` | `gzip` | `flate2` | gzip member(s) |
//! | `lzma` | `lzma` | `xz2` | `.xz` container |
//! | `lz4` | `lz4` | `lz4_flex` | LZ4 frame |
//! | `zstd` | `zstd` | `zstd` | Zstandard frame |

#[cfg(any(feature = "bz2", feature = "gzip", feature = "lzma", feature = "lz4"))]
use std::io::{self, Read};

#[cfg(feature = "bz2")]
mod bz2;
#[cfg(feature = "gzip")]
mod gzip;
#[cfg(feature = "lz4")]
mod lz4;
#[cfg(feature = "lzma")]
mod lzma;
#[cfg(feature = "zstd")]
mod zstd;

#[cfg(feature = "bz2")]
pub use bz2::Bz2;
#[cfg(feature = "gzip")]
pub use gzip::Gzip;
#[cfg(feature = "lz4")]
pub use lz4::Lz4;
#[cfg(feature = "lzma")]
pub use lzma::Lzma;
#[cfg(feature = "zstd")]
pub use zstd::zstd_transform;

/// Drain a decoder into a fresh buffer.
#[cfg(any(feature = "bz2", feature = "gzip", feature = "lzma", feature = "lz4"))]
fn read_all(mut reader: impl Read, size_hint: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(size_hint);
    reader.read_to_end(&mut out)?;
    Ok(out)
}

/// Clamp a caller-supplied level into a codec's accepted range.
#[cfg(any(feature = "bz2", feature = "gzip", feature = "lzma"))]
fn level_in(level: Option<i32>, default: u32, max: u32) -> u32 {
    match level {
        Some(l) if l >= 0 => (l as u32).min(max),
        _ => default,
    }
}
