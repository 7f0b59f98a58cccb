//! Serving stored media files over HTTP.
//!
//! Resolves a record's file under the storage root, picks its content type
//! and turns the range-aware body from `media-core` into an actix response.

use actix_web::body::SizedStream;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse};
use futures::TryStreamExt;
use media_core::{
    detect_content_type, open_media, resolve_storage_path, Disposition, MediaKind, MediaPaths,
    StreamOptions,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{StorageConfig, StreamConfig};
use crate::error::{AppError, Result};
use crate::metrics::stream::{
    MEDIA_BYTES_STREAMED_TOTAL, MEDIA_STREAM_ABORTS_TOTAL, MEDIA_STREAM_REQUESTS_TOTAL,
};

#[derive(Debug, Clone)]
pub struct MediaService {
    storage_root: PathBuf,
    chunk_size: usize,
    cache_max_age_secs: u64,
}

impl MediaService {
    pub fn new(storage: &StorageConfig, stream: &StreamConfig) -> Self {
        Self {
            storage_root: storage.root.clone(),
            chunk_size: stream.chunk_size,
            cache_max_age_secs: stream.cache_max_age_secs,
        }
    }

    /// Stream the record's media inline, honouring the request's `Range`.
    pub async fn stream<R: MediaPaths>(&self, req: &HttpRequest, record: &R) -> Result<HttpResponse> {
        self.serve(req, record, Disposition::Inline).await
    }

    /// Same as [`stream`](Self::stream) but asks the client to save the file.
    pub async fn download<R: MediaPaths>(
        &self,
        req: &HttpRequest,
        record: &R,
        filename: String,
    ) -> Result<HttpResponse> {
        self.serve(req, record, Disposition::Attachment { filename })
            .await
    }

    async fn serve<R: MediaPaths>(
        &self,
        req: &HttpRequest,
        record: &R,
        disposition: Disposition,
    ) -> Result<HttpResponse> {
        let kind = record.media_kind();
        let result = self.respond(req, record, kind, disposition).await;

        let status = match &result {
            Ok(response) => response.status(),
            Err(err) => actix_web::ResponseError::status_code(err),
        };
        MEDIA_STREAM_REQUESTS_TOTAL
            .with_label_values(&[kind.as_str(), status.as_str()])
            .inc();

        result
    }

    async fn respond<R: MediaPaths>(
        &self,
        req: &HttpRequest,
        record: &R,
        kind: MediaKind,
        disposition: Disposition,
    ) -> Result<HttpResponse> {
        let path = record
            .primary_media_path()
            .and_then(|stored| resolve_storage_path(&self.storage_root, stored))
            .ok_or_else(|| AppError::NotFound("Media file not found".to_string()))?;

        let fallback = kind.default_content_type();
        let content_type = if kind.sniffs_content_type() {
            detect_content_type(&path, &fallback).await
        } else {
            fallback
        };

        let range = range_header(req);
        let options = StreamOptions {
            chunk_size: self.chunk_size,
            cache_max_age_secs: self.cache_max_age_secs,
            disposition,
        };

        let media = open_media(&path, range.as_deref(), &content_type, &options).await?;

        info!(
            kind = kind.as_str(),
            status = media.status.as_u16(),
            total = media.total_length,
            bytes = media.content_length,
            content_type = %content_type,
            "media stream started"
        );

        let status = StatusCode::from_u16(media.status.as_u16())
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let mut builder = HttpResponse::build(status);
        for (name, value) in &media.headers {
            // Derived from the sized body below
            if name.eq_ignore_ascii_case(header::CONTENT_LENGTH.as_str()) {
                continue;
            }
            builder.insert_header((*name, value.as_str()));
        }

        let label = kind.as_str();
        let expected = media.content_length;
        let body = media
            .body
            .inspect_ok(move |chunk| {
                MEDIA_BYTES_STREAMED_TOTAL
                    .with_label_values(&[label])
                    .inc_by(chunk.len() as u64);
            })
            .inspect_err(move |err| {
                MEDIA_STREAM_ABORTS_TOTAL.with_label_values(&[label]).inc();
                warn!(kind = label, bytes = expected, error = %err, "media stream aborted");
            });

        debug!(kind = label, bytes = expected, "media body attached");
        Ok(builder.body(SizedStream::new(expected, body)))
    }
}

/// The raw `Range` header. Non-UTF-8 values are kept lossily so they still
/// fail range parsing instead of being ignored.
fn range_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::RANGE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
