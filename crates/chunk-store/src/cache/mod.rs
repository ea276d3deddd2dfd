//! Cache implementations for parsed chunks.

mod chunk_cache;

pub use chunk_cache::{ChunkCache, ChunkKey};
