use std::str::FromStr;

use crate::StreamError;

/// The only range unit understood by this crate.
pub const BYTES_PREFIX: &str = "bytes=";

/// A single `bytes=<start>-[<end>]` request as sent by the client.
///
/// Validation is purely syntactic: `end` is not compared with `start` here,
/// that is left to [`RangeResolver`](crate::RangeResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: u64,
    pub end: Option<u64>,
}

impl RangeRequest {
    /// Parses a raw `Range` header value.
    ///
    /// Suffix ranges (`bytes=-500`) and multiple ranges are rejected along
    /// with anything else that is not one or two plain decimal positions.
    pub fn parse(value: &str) -> Result<Self, StreamError> {
        let invalid = || StreamError::invalid_range(value);

        let range_set = value.strip_prefix(BYTES_PREFIX).ok_or_else(invalid)?;
        let tokens: Vec<&str> = range_set.split('-').collect();

        match tokens.as_slice() {
            [start] | [start, ""] => Ok(RangeRequest {
                start: parse_position(start).ok_or_else(invalid)?,
                end: None,
            }),
            [start, end] => Ok(RangeRequest {
                start: parse_position(start).ok_or_else(invalid)?,
                end: Some(parse_position(end).ok_or_else(invalid)?),
            }),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for RangeRequest {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeRequest::parse(s)
    }
}

// `u64::from_str` accepts a leading `+`, so digits are checked first.
fn parse_position(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::RangeRequest;
    use crate::StreamError;

    #[test]
    fn test_parse_range_header() {
        let tests = [
            ("bytes=0-", RangeRequest { start: 0, end: None }),
            ("bytes=178000-", RangeRequest { start: 178000, end: None }),
            ("bytes=42", RangeRequest { start: 42, end: None }),
            ("bytes=0-0", RangeRequest { start: 0, end: Some(0) }),
            ("bytes=100-200", RangeRequest { start: 100, end: Some(200) }),
            // end before start is left for the resolver to deal with
            ("bytes=500-10", RangeRequest { start: 500, end: Some(10) }),
            ("bytes=007-", RangeRequest { start: 7, end: None }),
        ];

        for (i, (header, expected)) in tests.iter().enumerate() {
            let parsed = RangeRequest::parse(header);
            assert_eq!(Some(expected), parsed.as_ref().ok(), "Failed to parse range header #{i}: {header}");
        }
    }

    #[test]
    fn test_invalid_range_headers() {
        let tests = [
            "bes=0-",
            "bytes=",
            "bytes=asdw-",
            "bytes=-",
            "bytes=123-123-123",
            "bytes=-500",
            "bytes=0-100,200-300",
            "bytes=+5-",
            "bytes=-5-",
            "bytes=1.5-",
            "bytes=10-x",
            "bytes= 10-",
            "Bytes=0-",
            "bytes=99999999999999999999-",
            "",
        ];

        for header in tests {
            assert_matches!(
                RangeRequest::parse(header),
                Err(StreamError::InvalidRangeSyntax { ref value }) if value == header,
                "{header:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_str() {
        let request: RangeRequest = "bytes=1-2".parse().unwrap();
        assert_eq!(RangeRequest { start: 1, end: Some(2) }, request);
        assert!("bytes=a-b".parse::<RangeRequest>().is_err());
    }
}
