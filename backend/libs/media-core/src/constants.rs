//! Media streaming constants

/// Read size for streamed bodies (8 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Client cache lifetime advertised on media responses (24 hours)
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Bytes read from the head of a file when sniffing its content type
pub const SNIFF_LEN: usize = 64;

/// Content type served for lesson and user videos
pub const VIDEO_MP4: &str = "video/mp4";

/// Fallback content type for podcast audio
pub const AUDIO_MPEG: &str = "audio/mpeg";
