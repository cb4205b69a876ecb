//! gzip via flate2.

use std::io::{self, Write};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use super::{level_in, read_all};
use crate::compressor::{Codec, CodecParams};

/// gzip codec. Defaults to level 9, like the `gzip` module in most stdlibs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gzip;

impl Codec for Gzip {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, data: &[u8], params: &CodecParams) -> io::Result<Vec<u8>> {
        let level = Compression::new(level_in(params.level, 9, 9));
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8], _params: &CodecParams) -> io::Result<Vec<u8>> {
        read_all(MultiGzDecoder::new(data), data.len() * 2)
    }
}
