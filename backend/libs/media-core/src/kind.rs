//! Media-bearing record kinds and storage path resolution.

use mime::Mime;
use serde::Serialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::constants::{AUDIO_MPEG, VIDEO_MP4};

/// Closed set of records that own a playable media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Lesson,
    Podcast,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Lesson => "lesson",
            Self::Podcast => "podcast",
        }
    }

    /// Content type used when the file itself is not inspected, or when
    /// inspection finds nothing recognisable.
    pub fn default_content_type(&self) -> Mime {
        let raw = match self {
            Self::Video | Self::Lesson => VIDEO_MP4,
            Self::Podcast => AUDIO_MPEG,
        };
        raw.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
    }

    /// Podcasts accept several audio formats, so their type is detected
    /// from the stored file. Videos are always served as mp4.
    pub fn sniffs_content_type(&self) -> bool {
        matches!(self, Self::Podcast)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accessors every media-bearing record exposes.
pub trait MediaPaths {
    fn media_kind(&self) -> MediaKind;

    /// Storage-relative path of the playable file.
    fn primary_media_path(&self) -> Option<&str>;

    /// Storage-relative path of the thumbnail image.
    fn thumbnail_path(&self) -> Option<&str>;
}

/// Resolve a stored relative path against the public storage root.
///
/// Leading slashes and a `public/` prefix are stripped; paths that are
/// empty or try to leave the root yield `None`.
pub fn resolve_storage_path(root: &Path, stored: &str) -> Option<PathBuf> {
    let trimmed = stored.trim().trim_start_matches('/');
    let relative = trimmed.strip_prefix("public/").unwrap_or(trimmed);

    if relative.is_empty() {
        return None;
    }

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    Some(root.join(relative))
}
