//! Range-aware file streaming.
//!
//! [`open_media`] resolves the status, headers and body for a stored file
//! and an optional `Range` header. The body is a chunked stream that owns
//! the open file, so the handle is closed when the stream finishes, fails,
//! or is dropped because the client went away.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use mime::Mime;
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::constants::{DEFAULT_CACHE_MAX_AGE_SECS, DEFAULT_CHUNK_SIZE};
use crate::error::{MediaError, MediaResult};
use crate::range::{parse_range, ByteRange};

/// Body of a media response.
pub type MediaBody = BoxStream<'static, io::Result<Bytes>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment { filename: String },
}

impl Disposition {
    pub fn header_value(&self) -> String {
        match self {
            Disposition::Inline => "inline".to_string(),
            Disposition::Attachment { filename } => {
                let safe: String = filename
                    .chars()
                    .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
                    .collect();
                format!("attachment; filename=\"{}\"", safe)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub chunk_size: usize,
    pub cache_max_age_secs: u64,
    pub disposition: Disposition,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            disposition: Disposition::Inline,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Full,
    Partial,
}

impl StreamStatus {
    pub fn as_u16(&self) -> u16 {
        match self {
            StreamStatus::Full => 200,
            StreamStatus::Partial => 206,
        }
    }
}

pub struct MediaResponse {
    pub status: StreamStatus,
    /// Total size of the underlying file.
    pub total_length: u64,
    /// Number of bytes the body will yield.
    pub content_length: u64,
    pub headers: Vec<(&'static str, String)>,
    pub body: MediaBody,
}

impl MediaResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for MediaResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaResponse")
            .field("status", &self.status)
            .field("total_length", &self.total_length)
            .field("content_length", &self.content_length)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Open `path` and prepare a full (200) or partial (206) response.
pub async fn open_media(
    path: &Path,
    range_header: Option<&str>,
    content_type: &Mime,
    options: &StreamOptions,
) -> MediaResult<MediaResponse> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MediaError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(MediaError::Io(e)),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(MediaError::NotFound(path.to_path_buf()));
    }
    let total = metadata.len();

    let requested = range_header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_range(value, total))
        .transpose()
        .map_err(|reason| MediaError::RangeNotSatisfiable { total, reason })?;

    let mut headers = vec![
        ("Content-Type", content_type.to_string()),
        ("Accept-Ranges", "bytes".to_string()),
        (
            "Cache-Control",
            format!("public, max-age={}", options.cache_max_age_secs),
        ),
        ("Content-Disposition", options.disposition.header_value()),
    ];

    let (status, span) = match requested {
        Some(range) => {
            headers.push(("Content-Range", range.content_range(total)));
            (StreamStatus::Partial, Some(range))
        }
        None => (StreamStatus::Full, ByteRange::full(total)),
    };

    let content_length = span.map(|r| r.len()).unwrap_or(0);
    headers.push(("Content-Length", content_length.to_string()));

    debug!(
        path = %path.display(),
        status = status.as_u16(),
        total,
        content_length,
        "media stream prepared"
    );

    let body = match span {
        Some(range) => chunked_body(file, range.start, range.len(), options.chunk_size),
        None => stream::empty::<io::Result<Bytes>>().boxed(),
    };

    Ok(MediaResponse {
        status,
        total_length: total,
        content_length,
        headers,
        body,
    })
}

struct ChunkState {
    file: File,
    seek_to: Option<u64>,
    remaining: u64,
    chunk_size: usize,
}

/// Stream exactly `length` bytes of `file` starting at `start`, at most
/// `chunk_size` bytes per item. A file that shrinks underneath the stream
/// ends it with `UnexpectedEof`.
pub fn chunked_body(file: File, start: u64, length: u64, chunk_size: usize) -> MediaBody {
    let state = ChunkState {
        file,
        seek_to: (start > 0).then_some(start),
        remaining: length,
        chunk_size: chunk_size.max(1),
    };

    stream::try_unfold(state, |mut state| async move {
        if let Some(offset) = state.seek_to.take() {
            state.file.seek(SeekFrom::Start(offset)).await?;
        }
        if state.remaining == 0 {
            return Ok(None);
        }

        let want = (state.chunk_size as u64).min(state.remaining) as usize;
        let mut buf = vec![0u8; want];
        let read = state.file.read(&mut buf).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "media file truncated while streaming",
            ));
        }

        buf.truncate(read);
        state.remaining -= read as u64;
        Ok(Some((Bytes::from(buf), state)))
    })
    .boxed()
}
