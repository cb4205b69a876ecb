//! Zstandard via the `zstd` crate.
//!
//! Registered as a plain closure [`Transform`] rather than a [`Compressor`]:
//! the encoder and decoder are configured once, up front, instead of taking
//! per-call parameters.
//!
//! [`Compressor`]: crate::Compressor

use crate::transform::Transform;

/// Build a zstd transform at the given level (`0` selects zstd's default, 3).
pub fn zstd_transform(level: i32) -> Transform {
    Transform::new(
        move |data| ::zstd::stream::encode_all(data, level),
        |data| ::zstd::stream::decode_all(data),
    )
}
