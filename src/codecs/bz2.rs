//! bzip2 via the `bzip2` crate.

use std::io;

use bzip2::Compression;
use bzip2::read::{BzEncoder, MultiBzDecoder};

use super::{level_in, read_all};
use crate::compressor::{Codec, CodecParams};

/// bzip2 codec. Level is the block size in 100k units (1..=9, default 9).
#[derive(Debug, Clone, Copy, Default)]
pub struct Bz2;

impl Codec for Bz2 {
    fn name(&self) -> &'static str {
        "bz2"
    }

    fn compress(&self, data: &[u8], params: &CodecParams) -> io::Result<Vec<u8>> {
        let level = level_in(params.level, 9, 9).max(1);
        read_all(BzEncoder::new(data, Compression::new(level)), data.len() / 2 + 64)
    }

    fn decompress(&self, data: &[u8], _params: &CodecParams) -> io::Result<Vec<u8>> {
        read_all(MultiBzDecoder::new(data), data.len() * 2)
    }
}
