//! LZ4 frame format via lz4_flex.

use std::io::{self, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use super::read_all;
use crate::compressor::{Codec, CodecParams};

/// LZ4 frame codec. lz4_flex has a single speed setting, so `level` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4;

impl Codec for Lz4 {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, data: &[u8], _params: &CodecParams) -> io::Result<Vec<u8>> {
        let mut encoder = FrameEncoder::new(Vec::with_capacity(data.len() / 2 + 32));
        encoder.write_all(data)?;
        encoder.finish().map_err(io::Error::other)
    }

    fn decompress(&self, data: &[u8], _params: &CodecParams) -> io::Result<Vec<u8>> {
        read_all(FrameDecoder::new(data), data.len() * 2)
    }
}
