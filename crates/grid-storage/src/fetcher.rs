//! The byte-retrieval capability.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::decode;
use crate::error::FetchResult;

/// Raw bytes returned by a fetch, plus what the transport said about them.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    /// Body exactly as received.
    pub bytes: Bytes,
    /// `Content-Encoding` reported by the transport, if any.
    pub content_encoding: Option<String>,
}

impl FetchedBytes {
    /// Bytes with no transport encoding information.
    pub fn raw(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_encoding: None,
        }
    }

    /// Bytes the transport reported with the given `Content-Encoding`.
    pub fn with_encoding(bytes: impl Into<Bytes>, encoding: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_encoding: Some(encoding.into()),
        }
    }

    /// True when the transport reported a gzip content encoding.
    pub fn declares_gzip(&self) -> bool {
        self.content_encoding
            .as_deref()
            .map(|enc| {
                enc.split(',')
                    .any(|part| matches!(part.trim().to_ascii_lowercase().as_str(), "gzip" | "x-gzip"))
            })
            .unwrap_or(false)
    }

    /// True when the body starts with the gzip magic bytes.
    pub fn has_gzip_magic(&self) -> bool {
        decode::has_gzip_magic(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Retrieves the raw bytes behind a locator.
///
/// Locators are opaque to the caller: a URL for [`HttpFetcher`](crate::HttpFetcher),
/// an object path for [`ObjectStoreFetcher`](crate::ObjectStoreFetcher).
/// Implementations must not decompress; payload decoding happens in
/// [`decode_payload`](crate::decode_payload).
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    /// Fetch the bytes at `locator`.
    async fn fetch(&self, locator: &str) -> FetchResult<FetchedBytes>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<T: ByteFetcher + ?Sized> ByteFetcher for Arc<T> {
    async fn fetch(&self, locator: &str) -> FetchResult<FetchedBytes> {
        (**self).fetch(locator).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_gzip_variants() {
        assert!(FetchedBytes::with_encoding(vec![], "gzip").declares_gzip());
        assert!(FetchedBytes::with_encoding(vec![], "GZIP").declares_gzip());
        assert!(FetchedBytes::with_encoding(vec![], "x-gzip").declares_gzip());
        assert!(FetchedBytes::with_encoding(vec![], "identity, gzip").declares_gzip());
        assert!(!FetchedBytes::with_encoding(vec![], "br").declares_gzip());
        assert!(!FetchedBytes::raw(vec![]).declares_gzip());
    }

    #[test]
    fn test_magic_detection() {
        assert!(FetchedBytes::raw(vec![0x1f, 0x8b, 0x08]).has_gzip_magic());
        assert!(!FetchedBytes::raw(b"{\"a\":1}".to_vec()).has_gzip_magic());
        assert!(!FetchedBytes::raw(vec![0x1f]).has_gzip_magic());
    }
}
