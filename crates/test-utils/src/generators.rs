//! Generators for synthetic chunk documents and payloads.
//!
//! Chunks are produced as `serde_json::Value` so tests can corrupt or
//! reshape them before serializing.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

/// Creates a chunk document of `width * height` cells.
///
/// `available(index)` decides each cell's `a` flag. Available cells carry
/// an owner id of `index + 1` and heights derived from the index, so a test
/// can tell cells apart after materialization.
///
/// # Example
///
/// ```
/// use test_utils::chunk_json;
///
/// let chunk = chunk_json(4.0, 52.0, 2, 2, |i| i % 2 == 0);
/// assert_eq!(chunk["cells"].as_array().unwrap().len(), 4);
/// assert_eq!(chunk["cells"][0]["a"], true);
/// assert_eq!(chunk["cells"][1]["a"], false);
/// ```
pub fn chunk_json(
    lon: f64,
    lat: f64,
    width: u32,
    height: u32,
    available: impl Fn(usize) -> bool,
) -> Value {
    let cells: Vec<Value> = (0..(width * height) as usize)
        .map(|index| {
            if available(index) {
                json!({
                    "a": true,
                    "o": index + 1,
                    "minH": index as f64,
                    "maxH": index as f64 + 10.0,
                })
            } else {
                json!({ "a": false })
            }
        })
        .collect();

    json!({
        "lon": lon,
        "lat": lat,
        "width": width,
        "height": height,
        "cells": cells,
    })
}

/// Gzip-compresses `data` with default settings.
pub fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("write to in-memory encoder");
    encoder.finish().expect("finish in-memory encoder")
}
