//! Single byte-range parsing for the HTTP `Range` request header.

use thiserror::Error;

/// Inclusive byte range within a file of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Range covering a whole file, `None` for an empty file.
    pub fn full(total: u64) -> Option<Self> {
        if total == 0 {
            return None;
        }
        Some(Self {
            start: 0,
            end: total - 1,
        })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` response header.
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("malformed range: {0}")]
    Malformed(&'static str),

    #[error("range starts beyond the end of the resource")]
    StartOutOfBounds,

    #[error("range start is after range end")]
    Inverted,

    #[error("resource is empty")]
    EmptyResource,
}

/// Parse a `Range` header value against a resource of `total` bytes.
///
/// Accepts `bytes=<start>-<end>`, `bytes=<start>-` and the suffix form
/// `bytes=-<n>`. `end` is clamped to `total - 1`. Multi-range sets and
/// units other than `bytes` are rejected.
pub fn parse_range(header: &str, total: u64) -> Result<ByteRange, RangeError> {
    let (unit, spec) = header
        .trim()
        .split_once('=')
        .ok_or(RangeError::Malformed("missing '=' after range unit"))?;

    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(RangeError::Malformed("unsupported range unit"));
    }
    if spec.contains(',') {
        return Err(RangeError::Malformed("multiple ranges are not supported"));
    }

    let (first, last) = spec
        .split_once('-')
        .ok_or(RangeError::Malformed("missing '-' in byte range"))?;
    let (first, last) = (first.trim(), last.trim());

    if total == 0 {
        return Err(RangeError::EmptyResource);
    }

    if first.is_empty() {
        let suffix = parse_offset(last)?;
        if suffix == 0 {
            return Err(RangeError::Malformed("zero-length suffix range"));
        }
        return Ok(ByteRange {
            start: total.saturating_sub(suffix),
            end: total - 1,
        });
    }

    let start = parse_offset(first)?;
    if start >= total {
        return Err(RangeError::StartOutOfBounds);
    }

    let end = if last.is_empty() {
        total - 1
    } else {
        let requested = parse_offset(last)?;
        if requested < start {
            return Err(RangeError::Inverted);
        }
        requested.min(total - 1)
    };

    Ok(ByteRange { start, end })
}

fn parse_offset(raw: &str) -> Result<u64, RangeError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed("byte offset is not a number"));
    }
    raw.parse()
        .map_err(|_| RangeError::Malformed("byte offset is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_range() {
        let range = parse_range("bytes=100-199", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 100, end: 199 });
        assert_eq!(range.len(), 100);
        assert_eq!(range.content_range(1000), "bytes 100-199/1000");
    }

    #[test]
    fn test_open_ended_range_clamps_to_last_byte() {
        let range = parse_range("bytes=900-", 1000).unwrap();
        assert_eq!(range, ByteRange { start: 900, end: 999 });
        assert_eq!(range.len(), 100);
    }

    #[test]
    fn test_end_past_eof_is_clamped() {
        let range = parse_range("bytes=500-5000", 1000).unwrap();
        assert_eq!(range.end, 999);
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range("bytes=-100", 1000).unwrap(),
            ByteRange { start: 900, end: 999 }
        );
        assert_eq!(
            parse_range("bytes=-5000", 1000).unwrap(),
            ByteRange { start: 0, end: 999 }
        );
    }

    #[test]
    fn test_single_byte_range() {
        let range = parse_range("bytes=0-0", 1).unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert_eq!(parse_range("bytes=200-100", 1000), Err(RangeError::Inverted));
    }

    #[test]
    fn test_rejects_start_past_eof() {
        assert_eq!(
            parse_range("bytes=1000-", 1000),
            Err(RangeError::StartOutOfBounds)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        for header in [
            "bytes=abc-def",
            "bytes=10",
            "bytes=+10-20",
            "bytes=-",
            "items=0-10",
            "0-10",
            "bytes=0-10,20-30",
            "bytes=-0",
        ] {
            assert!(
                matches!(parse_range(header, 1000), Err(RangeError::Malformed(_))),
                "expected {header:?} to be malformed"
            );
        }
    }

    #[test]
    fn test_empty_resource_has_no_satisfiable_range() {
        assert_eq!(parse_range("bytes=0-", 0), Err(RangeError::EmptyResource));
        assert!(ByteRange::full(0).is_none());
    }

    #[test]
    fn test_unit_is_case_insensitive_and_whitespace_tolerant() {
        let range = parse_range(" Bytes = 10 - 19 ", 100).unwrap();
        assert_eq!(range, ByteRange { start: 10, end: 19 });
    }
}
