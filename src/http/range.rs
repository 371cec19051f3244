//! HTTP Range request parsing module
//!
//! Single `bytes=start-end` ranges for seeking inside media files.
//!
//! The parser is deliberately simpler than RFC 7233: an empty start is read
//! as `0`, so `bytes=-500` means "the first 501 bytes" rather than "the last
//! 500 bytes". Players that seek send explicit starts, which is all this
//! server needs to support.

/// Inclusive byte interval inside a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position
    pub start: u64,
    /// Last byte position (inclusive)
    pub end: u64,
}

impl ByteRange {
    /// Range covering a whole resource, `None` for an empty one
    pub const fn whole(size: u64) -> Option<Self> {
        if size == 0 {
            None
        } else {
            Some(Self {
                start: 0,
                end: size - 1,
            })
        }
    }

    /// Number of bytes covered by the range
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No Range header: serve the whole resource with 200
    Full(ByteRange),
    /// Valid range request: serve it with 206
    Partial(ByteRange),
    /// Malformed or out of bounds - should return 416
    NotSatisfiable,
}

/// Parse HTTP Range header against a resource of `size` bytes
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, end clamped to `size - 1`
/// - `bytes=start-` - From start to end of resource
/// - `bytes=-end` - From the first byte to `end`
///
/// # Examples
/// ```
/// use lan_share::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=100-"), 1000);
/// assert_eq!(result, RangeParseResult::Partial(ByteRange { start: 100, end: 999 }));
///
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::Full(ByteRange { start: 0, end: 999 }));
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return ByteRange::whole(size).map_or(RangeParseResult::NotSatisfiable, RangeParseResult::Full);
    };

    if size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::NotSatisfiable;
    };

    // Multi-range lists are not supported
    if spec.contains(',') {
        return RangeParseResult::NotSatisfiable;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::NotSatisfiable;
    };

    let Some(start) = parse_bound(start_str, 0) else {
        return RangeParseResult::NotSatisfiable;
    };
    let Some(end) = parse_bound(end_str, size - 1) else {
        return RangeParseResult::NotSatisfiable;
    };
    let end = end.min(size - 1);

    if start >= size || start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Partial(ByteRange { start, end })
}

/// Parse one side of the range, using `default` when it is empty
fn parse_bound(value: &str, default: u64) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() {
        Some(default)
    } else {
        value.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(header: &str, size: u64) -> ByteRange {
        match parse_range_header(Some(header), size) {
            RangeParseResult::Partial(r) => r,
            other => panic!("Expected Partial for {header:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_no_range() {
        assert_eq!(
            parse_range_header(None, 100),
            RangeParseResult::Full(ByteRange { start: 0, end: 99 })
        );
    }

    #[test]
    fn test_standard_range() {
        let r = partial("bytes=0-9", 100);
        assert_eq!(r, ByteRange { start: 0, end: 9 });
        assert_eq!(r.len(), 10);
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        let r = partial("bytes=100-", 1000);
        assert_eq!(r, ByteRange { start: 100, end: 999 });
        assert_eq!(r.len(), 900);
    }

    #[test]
    fn test_empty_start_reads_from_zero() {
        // Not an RFC suffix range: "-50" is bytes 0..=50
        assert_eq!(partial("bytes=-50", 1000), ByteRange { start: 0, end: 50 });
        assert_eq!(partial("bytes=-5000", 1000), ByteRange { start: 0, end: 999 });
    }

    #[test]
    fn test_end_clamped() {
        assert_eq!(partial("bytes=10-5000", 100), ByteRange { start: 10, end: 99 });
    }

    #[test]
    fn test_single_byte() {
        let r = partial("bytes=99-99", 100);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_not_satisfiable() {
        for header in ["bytes=200-", "bytes=100-100", "bytes=50-10"] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
    }

    #[test]
    fn test_invalid_format() {
        for header in ["bytes=a-b", "bytes=0-9,20-29", "items=0-9", "bytes=10", ""] {
            assert_eq!(
                parse_range_header(Some(header), 100),
                RangeParseResult::NotSatisfiable,
                "{header}"
            );
        }
    }

    #[test]
    fn test_empty_resource() {
        assert_eq!(parse_range_header(None, 0), RangeParseResult::NotSatisfiable);
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(ByteRange::whole(0), None);
    }
}
