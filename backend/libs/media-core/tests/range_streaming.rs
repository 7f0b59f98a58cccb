use futures::TryStreamExt;
use media_core::{open_media, MediaError, StreamOptions, StreamStatus};
use std::io::Write;

fn write_fixture(len: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
    let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(&data).expect("write fixture");
    (file, data)
}

async fn body_bytes(response: media_core::MediaResponse) -> Vec<u8> {
    let chunks: Vec<bytes::Bytes> = response.body.try_collect().await.expect("read body");
    chunks.concat()
}

#[tokio::test]
async fn every_satisfiable_range_yields_the_exact_slice() {
    let (file, data) = write_fixture(1000);
    let mime: mime::Mime = "video/mp4".parse().unwrap();
    let options = StreamOptions {
        chunk_size: 64,
        ..StreamOptions::default()
    };

    for (start, end) in [(0, 0), (0, 999), (1, 63), (64, 64), (100, 199), (990, 999)] {
        let header = format!("bytes={}-{}", start, end);
        let response = open_media(file.path(), Some(&header), &mime, &options)
            .await
            .expect("open range");

        assert_eq!(response.status, StreamStatus::Partial);
        assert_eq!(response.content_length, (end - start + 1) as u64);
        assert_eq!(
            response.header("Content-Range"),
            Some(format!("bytes {}-{}/1000", start, end).as_str())
        );
        assert_eq!(body_bytes(response).await, &data[start..=end]);
    }
}

#[tokio::test]
async fn open_ended_range_on_thousand_byte_file() {
    let (file, data) = write_fixture(1000);
    let mime: mime::Mime = "video/mp4".parse().unwrap();

    let response = open_media(file.path(), Some("bytes=900-"), &mime, &StreamOptions::default())
        .await
        .expect("open range");

    assert_eq!(response.header("Content-Length"), Some("100"));
    assert_eq!(response.header("Content-Range"), Some("bytes 900-999/1000"));
    assert_eq!(body_bytes(response).await, &data[900..]);
}

#[tokio::test]
async fn full_body_matches_file_for_odd_chunk_sizes() {
    let (file, data) = write_fixture(4097);
    let mime: mime::Mime = "audio/mpeg".parse().unwrap();

    for chunk_size in [1, 7, 4096, 8192] {
        let options = StreamOptions {
            chunk_size,
            ..StreamOptions::default()
        };
        let response = open_media(file.path(), None, &mime, &options)
            .await
            .expect("open full");
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(response.header("Content-Length"), Some("4097"));
        assert_eq!(body_bytes(response).await, data);
    }
}

#[tokio::test]
async fn malformed_ranges_are_rejected_with_total_length() {
    let (file, _) = write_fixture(1000);
    let mime: mime::Mime = "video/mp4".parse().unwrap();

    for header in ["bytes=abc-", "bytes=300-200", "bytes=1000-1001", "pages=0-1"] {
        let err = open_media(file.path(), Some(header), &mime, &StreamOptions::default())
            .await
            .expect_err("range should be rejected");
        match err {
            MediaError::RangeNotSatisfiable { total, .. } => assert_eq!(total, 1000),
            other => panic!("unexpected error for {header:?}: {other}"),
        }
    }
}
