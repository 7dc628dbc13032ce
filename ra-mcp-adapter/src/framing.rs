//! Frame reader for the client → adapter stream.
//!
//! Clients may send either NDJSON (one JSON value per line) or LSP-style
//! `Content-Length` frames. The framing mode is detected again from the first
//! line of every message, so a session may switch styles between messages.
//! The reader keeps no state across calls.
//!
//! # Wire Format
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"ping"}\n
//!
//! Content-Length: <length>\r\n
//! \r\n
//! <exactly <length> bytes, no terminator>
//! ```

use std::collections::HashMap;
use std::fmt;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::FramingError;

/// Header that switches a message into length-delimited mode.
pub const CONTENT_LENGTH_HEADER: &str = "content-length";

const CONTENT_LENGTH_PREFIX: &[u8] = b"content-length:";

/// How the next message on the stream is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    /// The line itself is the whole message.
    Ndjson,
    /// A header block followed by exactly `content-length` bytes.
    ContentLength,
}

/// A header block that could not yield a payload length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAnomaly {
    /// The header block ended without a `content-length` header.
    MissingContentLength,
    /// `content-length` was present but not a non-negative integer.
    InvalidContentLength(String),
}

impl fmt::Display for HeaderAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContentLength => f.write_str("missing content-length header"),
            Self::InvalidContentLength(value) => write!(f, "invalid content-length={value:?}"),
        }
    }
}

/// Result of reading one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, header-free payload (possibly empty).
    Message(Vec<u8>),
    /// Nothing to forward: a blank or whitespace-only line.
    Skip,
    /// A header block without a usable length. The caller logs it and moves on.
    Malformed(HeaderAnomaly),
    /// The stream ended, possibly in the middle of a frame.
    Eof,
}

/// Decide the framing mode from the first line of a message.
pub fn detect_framing(line: &[u8]) -> FramingMode {
    let trimmed = line.trim_ascii_start();
    match trimmed.get(..CONTENT_LENGTH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CONTENT_LENGTH_PREFIX) => {
            FramingMode::ContentLength
        }
        _ => FramingMode::Ndjson,
    }
}

/// A line consisting of nothing but its terminator.
pub fn is_blank_line(line: &[u8]) -> bool {
    line == b"\n" || line == b"\r\n"
}

/// Split a `key: value` header line on its first colon.
///
/// The key is lower-cased; both halves are trimmed. Lines without a colon
/// yield `None`.
pub fn parse_header_line(line: &[u8]) -> Option<(String, String)> {
    let decoded = String::from_utf8_lossy(line);
    let (key, value) = decoded.trim().split_once(':')?;
    Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
}

/// Look up and parse `content-length` in a parsed header block.
pub fn content_length(headers: &HashMap<String, String>) -> Result<usize, HeaderAnomaly> {
    let value = headers
        .get(CONTENT_LENGTH_HEADER)
        .filter(|v| !v.is_empty())
        .ok_or(HeaderAnomaly::MissingContentLength)?;
    value
        .parse::<usize>()
        .map_err(|_| HeaderAnomaly::InvalidContentLength(value.clone()))
}

/// Read the next frame from `reader`.
///
/// # Returns
///
/// - `Frame::Message` with the payload bytes (trimmed in NDJSON mode)
/// - `Frame::Skip` for blank lines
/// - `Frame::Malformed` for a header block with a missing or bad length
/// - `Frame::Eof` at end of stream, including a truncated header block or body
///
/// # Errors
///
/// Returns [`FramingError::Io`] for read failures other than a clean EOF.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut first_line = Vec::new();
    if reader.read_until(b'\n', &mut first_line).await? == 0 {
        return Ok(Frame::Eof);
    }

    if is_blank_line(&first_line) {
        return Ok(Frame::Skip);
    }

    match detect_framing(&first_line) {
        FramingMode::Ndjson => {
            let payload = first_line.trim_ascii();
            if payload.is_empty() {
                Ok(Frame::Skip)
            } else {
                Ok(Frame::Message(payload.to_vec()))
            }
        }
        FramingMode::ContentLength => read_length_delimited(reader, &first_line).await,
    }
}

async fn read_length_delimited<R>(reader: &mut R, first_line: &[u8]) -> Result<Frame, FramingError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = HashMap::new();
    headers.extend(parse_header_line(first_line));

    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            tracing::debug!("client stream ended inside a header block");
            return Ok(Frame::Eof);
        }
        if is_blank_line(&line) {
            break;
        }
        headers.extend(parse_header_line(&line));
    }

    let length = match content_length(&headers) {
        Ok(n) => n,
        Err(anomaly) => return Ok(Frame::Malformed(anomaly)),
    };

    // Grow incrementally rather than trusting the declared length up front.
    let mut payload = Vec::new();
    let read = (&mut *reader)
        .take(length as u64)
        .read_to_end(&mut payload)
        .await?;
    if read < length {
        tracing::debug!(expected = length, read, "client stream ended inside a frame body");
        return Ok(Frame::Eof);
    }

    Ok(Frame::Message(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn frames(mut input: &[u8]) -> Vec<Frame> {
        let mut out = Vec::new();
        loop {
            let frame = read_frame(&mut input).await.unwrap();
            let done = frame == Frame::Eof;
            out.push(frame);
            if done {
                return out;
            }
        }
    }

    fn msg(s: &str) -> Frame {
        Frame::Message(s.as_bytes().to_vec())
    }

    // ── detect_framing ───────────────────────────────────────────────────

    #[test]
    fn test_detect_content_length_case_insensitive() {
        assert_eq!(detect_framing(b"Content-Length: 10\r\n"), FramingMode::ContentLength);
        assert_eq!(detect_framing(b"CONTENT-LENGTH:10\n"), FramingMode::ContentLength);
        assert_eq!(detect_framing(b"  content-length: 3\n"), FramingMode::ContentLength);
    }

    #[test]
    fn test_detect_ndjson() {
        assert_eq!(detect_framing(br#"{"id":1}"#), FramingMode::Ndjson);
        assert_eq!(detect_framing(b"Content-Type: json\n"), FramingMode::Ndjson);
        assert_eq!(detect_framing(b"content-length\n"), FramingMode::Ndjson);
        assert_eq!(detect_framing(b""), FramingMode::Ndjson);
    }

    // ── parse_header_line ────────────────────────────────────────────────

    #[test]
    fn test_parse_header_line() {
        assert_eq!(
            parse_header_line(b"Content-Length:  42 \r\n"),
            Some(("content-length".to_string(), "42".to_string()))
        );
        assert_eq!(
            parse_header_line(b"Content-Type: application/vscode-jsonrpc; charset=utf-8\r\n"),
            Some((
                "content-type".to_string(),
                "application/vscode-jsonrpc; charset=utf-8".to_string()
            ))
        );
        assert_eq!(parse_header_line(b"garbage\r\n"), None);
    }

    #[test]
    fn test_parse_header_splits_on_first_colon() {
        assert_eq!(
            parse_header_line(b"X-Trace: a:b:c\n"),
            Some(("x-trace".to_string(), "a:b:c".to_string()))
        );
    }

    #[test]
    fn test_content_length_lookup() {
        let mut headers = HashMap::new();
        assert_eq!(
            content_length(&headers),
            Err(HeaderAnomaly::MissingContentLength)
        );
        headers.insert("content-length".to_string(), "abc".to_string());
        assert_eq!(
            content_length(&headers),
            Err(HeaderAnomaly::InvalidContentLength("abc".to_string()))
        );
        headers.insert("content-length".to_string(), "-1".to_string());
        assert!(matches!(
            content_length(&headers),
            Err(HeaderAnomaly::InvalidContentLength(_))
        ));
        headers.insert("content-length".to_string(), "17".to_string());
        assert_eq!(content_length(&headers), Ok(17));
    }

    #[test]
    fn test_anomaly_messages() {
        assert_eq!(
            HeaderAnomaly::MissingContentLength.to_string(),
            "missing content-length header"
        );
        assert_eq!(
            HeaderAnomaly::InvalidContentLength("x".to_string()).to_string(),
            "invalid content-length=\"x\""
        );
    }

    // ── read_frame: NDJSON ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_ndjson_lines() {
        let got = frames(b"{\"id\":1}\n  {\"id\":2}  \r\n").await;
        assert_eq!(got, vec![msg(r#"{"id":1}"#), msg(r#"{"id":2}"#), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_ndjson_last_line_without_newline() {
        let got = frames(br#"{"id":1}"#).await;
        assert_eq!(got, vec![msg(r#"{"id":1}"#), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_blank_and_whitespace_lines_skip() {
        let got = frames(b"\n\r\n   \t\n{}\n").await;
        assert_eq!(
            got,
            vec![Frame::Skip, Frame::Skip, Frame::Skip, msg("{}"), Frame::Eof]
        );
    }

    #[tokio::test]
    async fn test_empty_stream_is_eof() {
        assert_eq!(frames(b"").await, vec![Frame::Eof]);
    }

    // ── read_frame: Content-Length ───────────────────────────────────────

    #[tokio::test]
    async fn test_content_length_frame() {
        let got = frames(b"Content-Length: 2\r\n\r\n{}").await;
        assert_eq!(got, vec![msg("{}"), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_content_length_with_extra_headers() {
        let body = r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#;
        let input = format!(
            "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n{body}",
            body.len()
        );
        let got = frames(input.as_bytes()).await;
        assert_eq!(got, vec![msg(body), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_content_length_body_keeps_newlines() {
        let body = "{\n  \"id\": 1\n}";
        let input = format!("Content-Length: {}\n\n{body}", body.len());
        let got = frames(input.as_bytes()).await;
        assert_eq!(got, vec![msg(body), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_content_length_zero() {
        let got = frames(b"Content-Length: 0\r\n\r\n{}\n").await;
        assert_eq!(got, vec![Frame::Message(Vec::new()), msg("{}"), Frame::Eof]);
    }

    #[tokio::test]
    async fn test_mixed_framing_in_one_session() {
        let input = b"{\"id\":1}\nContent-Length: 8\r\n\r\n{\"id\":2}{\"id\":3}\n";
        let got = frames(input).await;
        assert_eq!(
            got,
            vec![
                msg(r#"{"id":1}"#),
                msg(r#"{"id":2}"#),
                msg(r#"{"id":3}"#),
                Frame::Eof
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_content_length_skips_and_continues() {
        let got = frames(b"Content-Length: ten\r\n\r\n{\"id\":9}\n").await;
        assert_eq!(
            got,
            vec![
                Frame::Malformed(HeaderAnomaly::InvalidContentLength("ten".to_string())),
                msg(r#"{"id":9}"#),
                Frame::Eof
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_content_length_value_is_missing() {
        let got = frames(b"Content-Length:\r\n\r\n").await;
        assert_eq!(
            got,
            vec![
                Frame::Malformed(HeaderAnomaly::MissingContentLength),
                Frame::Eof
            ]
        );
    }

    #[tokio::test]
    async fn test_truncated_header_block_is_eof() {
        let got = frames(b"Content-Length: 2\r\nContent-Type: x\r\n").await;
        assert_eq!(got, vec![Frame::Eof]);
    }

    #[tokio::test]
    async fn test_truncated_body_is_eof() {
        let got = frames(b"Content-Length: 10\r\n\r\n{}").await;
        assert_eq!(got, vec![Frame::Eof]);
    }

    #[tokio::test]
    async fn test_duplicate_header_last_wins() {
        let got = frames(b"Content-Length: 99\r\ncontent-length: 2\r\n\r\n{}").await;
        assert_eq!(got, vec![msg("{}"), Frame::Eof]);
    }
}
