//! Error types for the chunked grid store.

use grid_storage::FetchError;
use thiserror::Error;

/// Errors that can occur while loading or querying a chunked grid.
///
/// Descriptor errors are fatal to a store: it never becomes ready.
/// Chunk errors are scoped to one chunk and are logged, not propagated,
/// by [`SpatialGridStore::spatial_query`](crate::SpatialGridStore::spatial_query).
#[derive(Error, Debug)]
pub enum ChunkStoreError {
    /// The descriptor could not be retrieved.
    #[error("failed to fetch grid descriptor {locator}: {source}")]
    DescriptorFetch {
        locator: String,
        #[source]
        source: FetchError,
    },

    /// The descriptor payload does not have the expected shape.
    #[error("failed to parse grid descriptor {locator}: {message}")]
    DescriptorParse { locator: String, message: String },

    /// A chunk could not be retrieved.
    #[error("failed to fetch chunk {file} (row {row}, col {col}): {source}")]
    ChunkFetch {
        file: String,
        row: u32,
        col: u32,
        #[source]
        source: FetchError,
    },

    /// A chunk payload is malformed.
    #[error("failed to parse chunk {file} (row {row}, col {col}): {message}")]
    ChunkParse {
        file: String,
        row: u32,
        col: u32,
        message: String,
    },

    /// Write paths are not supported by this read-only store.
    #[error("operation not implemented: {0}")]
    Unsupported(&'static str),

    /// The descriptor has not finished loading.
    #[error("grid descriptor is still loading")]
    NotReady,

    /// The descriptor load failed; the store will never become ready.
    #[error("grid descriptor unavailable: {0}")]
    DescriptorFailed(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChunkStoreError {
    /// Create a DescriptorParse error.
    pub fn descriptor_parse(locator: impl Into<String>, message: impl ToString) -> Self {
        Self::DescriptorParse {
            locator: locator.into(),
            message: message.to_string(),
        }
    }

    /// Create a ChunkParse error.
    pub fn chunk_parse(file: impl Into<String>, row: u32, col: u32, message: impl ToString) -> Self {
        Self::ChunkParse {
            file: file.into(),
            row,
            col,
            message: message.to_string(),
        }
    }

    /// True for errors scoped to a single chunk.
    pub fn is_chunk_error(&self) -> bool {
        matches!(self, Self::ChunkFetch { .. } | Self::ChunkParse { .. })
    }
}

/// Result type for chunk store operations.
pub type Result<T> = std::result::Result<T, ChunkStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_errors_are_scoped() {
        let parse = ChunkStoreError::chunk_parse("c_1_2.json.gz", 1, 2, "bad json");
        let fetch = ChunkStoreError::ChunkFetch {
            file: "c_0_0.json.gz".to_string(),
            row: 0,
            col: 0,
            source: FetchError::NotFound("c_0_0.json.gz".to_string()),
        };

        assert!(parse.is_chunk_error());
        assert!(fetch.is_chunk_error());
        assert!(!ChunkStoreError::NotReady.is_chunk_error());
        assert!(!ChunkStoreError::Unsupported("add").is_chunk_error());
    }

    #[test]
    fn test_messages_name_the_chunk() {
        let err = ChunkStoreError::chunk_parse("c_1_2.json.gz", 1, 2, "bad json");
        let message = err.to_string();
        assert!(message.contains("c_1_2.json.gz"));
        assert!(message.contains("row 1"));
        assert!(message.contains("col 2"));
    }

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            ChunkStoreError::Unsupported("remove").to_string(),
            "operation not implemented: remove"
        );
    }
}
