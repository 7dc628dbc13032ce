#![no_main]

//! Fuzz target for the client-side frame reader and normalizer.
//!
//! Attack surface: arbitrary bytes on the client stream, header blocks with
//! hostile `Content-Length` values, invalid UTF-8, embedded line terminators.
//!
//! # Goal
//! Verify that reading and normalizing frames does not:
//! - Panic
//! - Loop forever without consuming input
//! - Produce a normalized payload spanning more than one line

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ra_mcp_adapter::filter::inbound_verdict;
use ra_mcp_adapter::framing::{Frame, read_frame};
use ra_mcp_adapter::normalize::{Parsed, compact, parse_payload, sanitize};

#[derive(Arbitrary, Debug)]
struct FuzzFrameInput {
    /// Raw client stream.
    stream: Vec<u8>,
    /// Optional header block prepended to `stream`.
    header: Option<FuzzHeader>,
}

#[derive(Arbitrary, Debug)]
struct FuzzHeader {
    /// Casing/whitespace variant of the header name.
    name: HeaderName,
    /// Declared length (may disagree with the body).
    length: FuzzLength,
    /// Use CRLF (true) or bare LF (false).
    crlf: bool,
}

#[derive(Arbitrary, Debug)]
enum HeaderName {
    Canonical,
    Lower,
    Upper,
    LeadingSpace,
}

#[derive(Arbitrary, Debug)]
enum FuzzLength {
    Number(u32),
    Huge,
    Negative,
    Garbage(String),
}

fuzz_target!(|input: FuzzFrameInput| {
    let mut bytes = Vec::new();
    if let Some(header) = &input.header {
        bytes.extend_from_slice(&render_header(header));
    }
    bytes.extend_from_slice(&input.stream);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };

    let mut reader = bytes.as_slice();
    // Each frame consumes at least one byte, so this bound is never hit by
    // a correct reader.
    for _ in 0..=bytes.len() {
        let remaining = reader.len();
        let frame = match rt.block_on(read_frame(&mut reader)) {
            Ok(frame) => frame,
            Err(_) => return,
        };
        match frame {
            Frame::Eof => return,
            Frame::Skip | Frame::Malformed(_) => {}
            Frame::Message(payload) => check_single_line(&payload),
        }
        assert!(reader.len() < remaining, "frame reader made no progress");
    }
    panic!("frame reader did not reach EOF");
});

fn check_single_line(payload: &[u8]) {
    let line = match parse_payload(payload) {
        Parsed::Json(message) => {
            let _ = inbound_verdict(&message);
            compact(&message)
        }
        Parsed::Opaque(raw) => sanitize(&raw),
    };
    assert!(!line.contains(&b'\n'), "normalized payload spans lines");
}

fn render_header(header: &FuzzHeader) -> Vec<u8> {
    let name = match header.name {
        HeaderName::Canonical => "Content-Length",
        HeaderName::Lower => "content-length",
        HeaderName::Upper => "CONTENT-LENGTH",
        HeaderName::LeadingSpace => "  Content-Length",
    };
    let value = match &header.length {
        FuzzLength::Number(n) => n.to_string(),
        FuzzLength::Huge => u64::MAX.to_string(),
        FuzzLength::Negative => "-1".to_string(),
        FuzzLength::Garbage(s) => s.replace(['\r', '\n'], ""),
    };
    let eol = if header.crlf { "\r\n" } else { "\n" };
    format!("{name}: {value}{eol}{eol}").into_bytes()
}
