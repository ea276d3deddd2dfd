//! Payload decoding: gzip detection and decompression.
//!
//! A payload is treated as gzip when it starts with [`GZIP_MAGIC`]. The
//! transport's `Content-Encoding` header is consulted too, but a body that
//! the transport labels gzip without carrying the magic bytes has already
//! been inflated upstream and is passed through unchanged.

use std::io::Read;

use bytes::Bytes;
use flate2::read::MultiGzDecoder;
use tracing::{debug, trace};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::FetchedBytes;

/// First two bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check for the gzip magic number at the start of `data`.
pub fn has_gzip_magic(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..2] == GZIP_MAGIC
}

/// Decompress `data` when `gzip` is set, otherwise return it untouched.
pub fn decompress(data: Bytes, gzip: bool) -> FetchResult<Bytes> {
    if !gzip {
        return Ok(data);
    }

    let mut decoder = MultiGzDecoder::new(data.as_ref());
    let mut inflated = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| FetchError::Decompression(e.to_string()))?;

    trace!(
        compressed = data.len(),
        inflated = inflated.len(),
        "Inflated gzip payload"
    );
    Ok(Bytes::from(inflated))
}

/// Turn a fetched body into plain document bytes.
pub fn decode_payload(payload: FetchedBytes) -> FetchResult<Bytes> {
    let magic = payload.has_gzip_magic();
    if payload.declares_gzip() && !magic {
        debug!(
            size = payload.len(),
            "Transport reported gzip but body is already inflated"
        );
    }
    decompress(payload.bytes, magic)
}
