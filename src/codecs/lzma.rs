//! LZMA2 in the `.xz` container via xz2.

use std::io;

use xz2::read::{XzDecoder, XzEncoder};

use super::{level_in, read_all};
use crate::compressor::{Codec, CodecParams};

/// xz/LZMA2 codec. Preset 0..=9, default 6.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzma;

impl Codec for Lzma {
    fn name(&self) -> &'static str {
        "lzma"
    }

    fn compress(&self, data: &[u8], params: &CodecParams) -> io::Result<Vec<u8>> {
        let preset = level_in(params.level, 6, 9);
        read_all(XzEncoder::new(data, preset), data.len() / 2 + 64)
    }

    fn decompress(&self, data: &[u8], _params: &CodecParams) -> io::Result<Vec<u8>> {
        read_all(XzDecoder::new_multi_decoder(data), data.len() * 2)
    }
}
