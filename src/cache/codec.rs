//! Compression codec
//!
//! gzip over raw byte payloads. `decompress(compress(b)) == b` for every
//! input, including the empty slice.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Default gzip level used when none is configured.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Compresses `data` at the given gzip level (0-9, clamped).
pub fn compress(data: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompresses a gzip payload produced by [`compress`].
pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
