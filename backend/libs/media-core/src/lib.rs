//! Media streaming core
//!
//! Framework-agnostic pieces shared by every endpoint that serves stored
//! media: byte-range parsing, content-type sniffing, storage path
//! resolution and the chunked file body.

pub mod constants;
pub mod error;
pub mod kind;
pub mod range;
pub mod sniff;
pub mod stream;

pub use error::{MediaError, MediaResult};
pub use kind::{resolve_storage_path, MediaKind, MediaPaths};
pub use range::{parse_range, ByteRange, RangeError};
pub use sniff::detect_content_type;
pub use stream::{
    chunked_body, open_media, Disposition, MediaBody, MediaResponse, StreamOptions, StreamStatus,
};
