//! Fetch-and-decode tests across object store backends.

use std::sync::Arc;

use bytes::Bytes;
use grid_storage::{decode_payload, ByteFetcher, FetchError, ObjectStoreFetcher};
use object_store::{path::Path, ObjectStore};
use test_utils::gzip_bytes;

#[tokio::test]
async fn test_gzip_object_decodes_to_plain_bytes() {
    let (fetcher, store) = ObjectStoreFetcher::in_memory();
    let body = br#"{"lon":4.89,"lat":52.37,"width":1,"height":1,"cells":[{"a":true}]}"#;
    store
        .put(&Path::from("grid/c_0_0.json.gz"), Bytes::from(gzip_bytes(body)).into())
        .await
        .unwrap();

    let fetched = fetcher.fetch("grid/c_0_0.json.gz").await.unwrap();
    assert!(fetched.has_gzip_magic());
    assert!(!fetched.declares_gzip());

    let decoded = decode_payload(fetched).unwrap();
    assert_eq!(decoded.as_ref(), body);
}

#[tokio::test]
async fn test_fetcher_behind_trait_object() {
    let (fetcher, store) = ObjectStoreFetcher::in_memory();
    store
        .put(&Path::from("a/b.json"), Bytes::from_static(b"[]").into())
        .await
        .unwrap();

    let shared: Arc<dyn ByteFetcher> = Arc::new(fetcher);
    assert_eq!(shared.backend(), "object_store");

    let fetched = shared.fetch("a/b.json").await.unwrap();
    assert_eq!(decode_payload(fetched).unwrap().as_ref(), b"[]");
}

#[tokio::test]
async fn test_local_gzip_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("grid")).unwrap();
    std::fs::write(dir.path().join("grid/meta.json.gz"), gzip_bytes(b"{\"ok\":true}")).unwrap();

    let fetcher = ObjectStoreFetcher::local(dir.path()).unwrap();
    let decoded = decode_payload(fetcher.fetch("grid/meta.json.gz").await.unwrap()).unwrap();
    assert_eq!(decoded.as_ref(), b"{\"ok\":true}");

    let err = fetcher.fetch("grid/absent.json").await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_corrupt_gzip_is_decompression_error() {
    let (fetcher, store) = ObjectStoreFetcher::in_memory();
    let mut data = gzip_bytes(b"a payload long enough to be cut in half");
    data.truncate(data.len() / 2);
    store
        .put(&Path::from("bad.gz"), Bytes::from(data).into())
        .await
        .unwrap();

    let fetched = fetcher.fetch("bad.gz").await.unwrap();
    assert!(matches!(
        decode_payload(fetched),
        Err(FetchError::Decompression(_))
    ));
}
