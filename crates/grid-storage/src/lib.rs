//! Storage abstractions for chunked grid data.
//!
//! Provides:
//! - [`ByteFetcher`]: the byte-retrieval capability used for descriptor and
//!   chunk documents, with HTTP ([`HttpFetcher`]) and object storage
//!   ([`ObjectStoreFetcher`]: S3/MinIO, local filesystem, in-memory) backends
//! - [`decode`]: gzip detection and decompression of fetched payloads

pub mod decode;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod object_store;

pub use self::object_store::{ObjectStorageConfig, ObjectStoreFetcher};
pub use decode::{decode_payload, decompress, has_gzip_magic, GZIP_MAGIC};
pub use error::{FetchError, FetchResult};
pub use fetcher::{ByteFetcher, FetchedBytes};
pub use http::{HttpFetcher, HttpFetcherConfig};
