//! Gzip envelope layer.

use std::io::{Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{EnvelopeError, EnvelopeResult};

/// Decompress a gzip stream, verifying each header and CRC trailer.
///
/// Members are concatenated; bytes after a member that do not start a valid
/// member are an error.
pub fn decode(blob: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(blob);
    let mut out = Vec::with_capacity(blob.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(EnvelopeError::Decompression)?;
    Ok(out)
}

/// Gzip-compress `data` at the default level.
pub fn compress(data: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(EnvelopeError::Compression)?;
    encoder.finish().map_err(EnvelopeError::Compression)
}
