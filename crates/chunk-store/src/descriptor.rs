//! Grid descriptor loading and locator resolution.

use grid_storage::{decode_payload, ByteFetcher};
use tracing::{error, info, instrument, warn};

use crate::error::{ChunkStoreError, Result};
use crate::types::GridDescriptor;

/// Directory part of a descriptor locator.
///
/// Query strings and fragments are dropped, then the last path segment.
/// A bare file name resolves to `.`, a file directly under the root to `/`.
pub fn base_path(locator: &str) -> String {
    let path = locator.split(['?', '#']).next().unwrap_or_default();

    match path.rfind('/') {
        None => ".".to_string(),
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Join a chunk file name onto a base path without doubling the separator.
pub fn chunk_locator(base: &str, file: &str) -> String {
    let file = file.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{}{}", base, file)
    } else {
        format!("{}/{}", base, file)
    }
}

/// Parse descriptor bytes into a [`GridDescriptor`].
pub fn parse_descriptor(locator: &str, data: &[u8]) -> Result<GridDescriptor> {
    let descriptor: GridDescriptor = serde_json::from_slice(data)
        .map_err(|e| ChunkStoreError::descriptor_parse(locator, e))?;

    if !descriptor.bounding_box.is_finite() {
        return Err(ChunkStoreError::descriptor_parse(
            locator,
            "bounding box contains non-finite values",
        ));
    }

    if !descriptor.lookup_shape_matches() {
        warn!(
            locator = %locator,
            rows = descriptor.lookup.len(),
            expected_rows = descriptor.total_chunks_y,
            expected_cols = descriptor.total_chunks_x,
            "Lookup table shape does not match chunk counts; missing slots are treated as empty"
        );
    }

    Ok(descriptor)
}

/// Fetch, decode and parse the descriptor at `locator`.
#[instrument(skip(fetcher), fields(backend = fetcher.backend()))]
pub async fn load_descriptor(fetcher: &dyn ByteFetcher, locator: &str) -> Result<GridDescriptor> {
    let payload = fetcher.fetch(locator).await.map_err(|source| {
        error!(error = %source, "Failed to fetch grid descriptor");
        ChunkStoreError::DescriptorFetch {
            locator: locator.to_string(),
            source,
        }
    })?;

    let data = decode_payload(payload)
        .map_err(|e| ChunkStoreError::descriptor_parse(locator, e))?;

    let descriptor = parse_descriptor(locator, &data)?;

    info!(
        chunks_x = descriptor.total_chunks_x,
        chunks_y = descriptor.total_chunks_y,
        chunk_size = descriptor.chunk_size,
        "Loaded grid descriptor"
    );

    Ok(descriptor)
}
