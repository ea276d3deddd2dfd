//! Chunk retrieval: fetch, decompress, decode and parse one chunk file.

use std::sync::Arc;

use grid_storage::{decode_payload, ByteFetcher};
use tracing::{debug, instrument};

use crate::descriptor::chunk_locator;
use crate::error::{ChunkStoreError, Result};
use crate::types::Chunk;

/// A chunk selected by a query: its file name and grid position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkRequest {
    pub file: String,
    pub row: u32,
    pub col: u32,
}

impl ChunkRequest {
    pub fn new(file: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            row,
            col,
        }
    }
}

/// Retrieves chunks relative to the descriptor's directory.
#[derive(Clone)]
pub struct ChunkFetcher {
    fetcher: Arc<dyn ByteFetcher>,
    base_path: String,
}

impl ChunkFetcher {
    pub fn new(fetcher: Arc<dyn ByteFetcher>, base_path: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_path: base_path.into(),
        }
    }

    /// Directory chunk files are resolved against.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Full locator for a chunk file.
    pub fn locator(&self, file: &str) -> String {
        chunk_locator(&self.base_path, file)
    }

    /// Fetch and parse one chunk.
    ///
    /// Transport failures become [`ChunkStoreError::ChunkFetch`]; anything
    /// wrong with the payload itself becomes [`ChunkStoreError::ChunkParse`].
    #[instrument(skip(self, request), fields(file = %request.file, row = request.row, col = request.col))]
    pub async fn fetch(&self, request: &ChunkRequest) -> Result<Chunk> {
        let locator = self.locator(&request.file);

        let payload =
            self.fetcher
                .fetch(&locator)
                .await
                .map_err(|source| ChunkStoreError::ChunkFetch {
                    file: request.file.clone(),
                    row: request.row,
                    col: request.col,
                    source,
                })?;

        let compressed = payload.len();
        let data = decode_payload(payload).map_err(|e| {
            ChunkStoreError::chunk_parse(&request.file, request.row, request.col, e)
        })?;

        let chunk = parse_chunk(request, &data)?;
        debug!(
            compressed,
            inflated = data.len(),
            cells = chunk.cells.len(),
            "Fetched chunk"
        );
        Ok(chunk)
    }
}

/// Decode chunk bytes as UTF-8 JSON and check the cell count.
pub fn parse_chunk(request: &ChunkRequest, data: &[u8]) -> Result<Chunk> {
    let parse_err = |message: String| {
        ChunkStoreError::chunk_parse(&request.file, request.row, request.col, message)
    };

    let text = std::str::from_utf8(data).map_err(|e| parse_err(format!("invalid UTF-8: {}", e)))?;
    let chunk: Chunk = serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?;
    chunk.validate().map_err(parse_err)?;

    Ok(chunk)
}
