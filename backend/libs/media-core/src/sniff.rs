//! Content-type detection for stored media files.
//!
//! Looks at the leading bytes first and only falls back to the file
//! extension when the signature is unknown.

use mime::Mime;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::constants::SNIFF_LEN;

/// Detect the content type of `path`, returning `fallback` when neither the
/// file signature nor the extension is recognised.
pub async fn detect_content_type(path: &Path, fallback: &Mime) -> Mime {
    match read_head(path).await {
        Ok(head) => {
            if let Some(detected) = sniff_bytes(&head) {
                return detected;
            }
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "content sniffing skipped");
        }
    }

    from_extension(path).unwrap_or_else(|| fallback.clone())
}

async fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    Ok(head)
}

/// Match well-known container and codec signatures.
pub fn sniff_bytes(head: &[u8]) -> Option<Mime> {
    let detected = if head.len() >= 12 && &head[4..8] == b"ftyp" {
        match &head[8..12] {
            b"M4A " | b"M4B " | b"M4P " => "audio/mp4",
            b"qt  " => "video/quicktime",
            _ => "video/mp4",
        }
    } else if head.starts_with(b"ID3") {
        "audio/mpeg"
    } else if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WAVE" {
        "audio/wav"
    } else if head.starts_with(b"OggS") {
        "audio/ogg"
    } else if head.starts_with(b"fLaC") {
        "audio/flac"
    } else if head.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        "video/webm"
    } else if head.len() >= 2 && head[0] == 0xFF && head[1] & 0xE0 == 0xE0 {
        // Frame sync; layer bits of 00 mean an ADTS (AAC) header.
        if head[1] & 0x06 == 0 {
            "audio/aac"
        } else {
            "audio/mpeg"
        }
    } else {
        return None;
    };

    detected.parse().ok()
}

/// Map a file extension to a media type.
pub fn from_extension(path: &Path) -> Option<Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mapped = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => return None,
    };
    mapped.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mime(s: &str) -> Mime {
        s.parse().unwrap()
    }

    #[test]
    fn test_sniff_mp4_and_m4a() {
        let mut mp4 = vec![0, 0, 0, 0x20];
        mp4.extend_from_slice(b"ftypisom");
        assert_eq!(sniff_bytes(&mp4), Some(mime("video/mp4")));

        let mut m4a = vec![0, 0, 0, 0x20];
        m4a.extend_from_slice(b"ftypM4A ");
        assert_eq!(sniff_bytes(&m4a), Some(mime("audio/mp4")));
    }

    #[test]
    fn test_sniff_mp3_variants() {
        assert_eq!(sniff_bytes(b"ID3\x04\x00"), Some(mime("audio/mpeg")));
        assert_eq!(sniff_bytes(&[0xFF, 0xFB, 0x90, 0x00]), Some(mime("audio/mpeg")));
        assert_eq!(sniff_bytes(&[0xFF, 0xF1, 0x50, 0x80]), Some(mime("audio/aac")));
    }

    #[test]
    fn test_sniff_wav_ogg_webm() {
        assert_eq!(
            sniff_bytes(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            Some(mime("audio/wav"))
        );
        assert_eq!(sniff_bytes(b"OggS\x00\x02"), Some(mime("audio/ogg")));
        assert_eq!(
            sniff_bytes(&[0x1A, 0x45, 0xDF, 0xA3, 0x01]),
            Some(mime("video/webm"))
        );
    }

    #[test]
    fn test_unknown_signature() {
        assert_eq!(sniff_bytes(b"hello world"), None);
        assert_eq!(sniff_bytes(&[]), None);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(
            from_extension(Path::new("podcasts/episode.MP3")),
            Some(mime("audio/mpeg"))
        );
        assert_eq!(from_extension(Path::new("notes.txt")), None);
        assert_eq!(from_extension(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn test_detect_prefers_signature_over_extension() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"OggS\x00\x02rest-of-page").unwrap();

        let detected = detect_content_type(file.path(), &mime("audio/mpeg")).await;
        assert_eq!(detected, mime("audio/ogg"));
    }

    #[tokio::test]
    async fn test_detect_falls_back() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"\x00\x01\x02\x03").unwrap();

        let detected = detect_content_type(file.path(), &mime("audio/mpeg")).await;
        assert_eq!(detected, mime("audio/mpeg"));

        let missing = detect_content_type(Path::new("/nonexistent/a.wav"), &mime("audio/mpeg")).await;
        assert_eq!(missing, mime("audio/wav"));
    }
}
