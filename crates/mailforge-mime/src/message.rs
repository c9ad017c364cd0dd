//! MIME message structure and rendering.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_lines, encode_charset, encode_quoted_printable};
use crate::error::Result;
use crate::header::Headers;
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Longest line allowed in a 7bit body (RFC 5322, excluding CRLF).
const MAX_SEVEN_BIT_LINE: usize = 998;

static BOUNDARY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
        }
    }
}

/// Encodes text for a body in the given charset.
///
/// Pure 7-bit text with short lines is sent as `7bit` with CRLF line
/// endings; anything else is quoted-printable.
///
/// # Errors
///
/// Returns an error if the charset is unknown or cannot represent the text.
pub fn encode_text(text: &str, charset: &str) -> Result<(TransferEncoding, Vec<u8>)> {
    let bytes = encode_charset(text, charset)?;

    let seven_bit = bytes.iter().all(|&b| b < 0x80 && b != 0)
        && bytes
            .split(|&b| b == b'\n')
            .all(|line| line.len() <= MAX_SEVEN_BIT_LINE);

    if seven_bit {
        Ok((TransferEncoding::SevenBit, normalize_line_endings(&bytes)))
    } else {
        Ok((
            TransferEncoding::QuotedPrintable,
            encode_quoted_printable(&bytes).into_bytes(),
        ))
    }
}

/// Encodes binary data for a body.
#[must_use]
pub fn encode_binary(data: &[u8]) -> (TransferEncoding, Vec<u8>) {
    (TransferEncoding::Base64, encode_base64_lines(data).into_bytes())
}

fn normalize_line_endings(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 16);
    let mut lines = bytes.split(|&b| b == b'\n').peekable();
    while let Some(line) = lines.next() {
        out.extend_from_slice(line.strip_suffix(b"\r").unwrap_or(line));
        if lines.peek().is_some() {
            out.extend_from_slice(b"\r\n");
        }
    }
    out
}

fn ensure_trailing_crlf(out: &mut Vec<u8>) {
    if !out.ends_with(b"\r\n") {
        out.extend_from_slice(b"\r\n");
    }
}

/// MIME body part of a multipart message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body, already transfer-encoded.
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part from headers and an encoded body.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Creates a text part in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the charset is unknown or cannot represent the text.
    pub fn text(text: &str, sub_type: &str, charset: &str) -> Result<Self> {
        let (encoding, body) = encode_text(text, charset)?;
        let mut headers = Headers::new();
        headers.set(
            "Content-Type",
            ContentType::new("text", sub_type)
                .with_parameter("charset", charset)
                .to_string(),
        );
        headers.set("Content-Transfer-Encoding", encoding.to_string());
        Ok(Self::new(headers, body))
    }

    /// Creates a base64 encoded attachment part.
    #[must_use]
    pub fn attachment(data: &[u8], content_type: &ContentType, filename: &str) -> Self {
        let (encoding, body) = encode_binary(data);
        let mut headers = Headers::new();
        headers.set(
            "Content-Type",
            content_type.clone().with_parameter("name", filename).to_string(),
        );
        headers.set("Content-Transfer-Encoding", encoding.to_string());
        headers.set(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        );
        Self::new(headers, body)
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        ensure_trailing_crlf(out);
    }
}

/// Multipart body with a generated boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    sub_type: String,
    boundary: String,
    parts: Vec<Part>,
}

impl Multipart {
    /// Creates an empty multipart body of the given subtype (e.g. "mixed").
    #[must_use]
    pub fn new(sub_type: impl Into<String>) -> Self {
        Self {
            sub_type: sub_type.into(),
            boundary: generate_boundary(),
            parts: Vec::new(),
        }
    }

    /// Adds a part.
    pub fn add_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// Returns the multipart subtype.
    #[must_use]
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Returns the boundary separating parts.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Returns the parts.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if there are no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the `multipart/<subtype>; boundary=...` content type.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        ContentType::multipart(self.sub_type.clone(), self.boundary.clone())
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            part.write_to(out);
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
    }
}

impl Default for Multipart {
    fn default() -> Self {
        Self::new("mixed")
    }
}

fn generate_boundary() -> String {
    let sequence = BOUNDARY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "----=_Part_{sequence}_{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

/// Message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Single-part body, already transfer-encoded.
    Single(Vec<u8>),
    /// Multipart body.
    Multipart(Multipart),
}

/// MIME message ready to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: Headers,
    body: Body,
}

impl Message {
    /// Creates a single-part message.
    #[must_use]
    pub const fn single_part(headers: Headers, body: Vec<u8>) -> Self {
        Self {
            headers,
            body: Body::Single(body),
        }
    }

    /// Creates a multipart message.
    ///
    /// The `Content-Type` header is set from the multipart boundary.
    #[must_use]
    pub fn multipart(mut headers: Headers, multipart: Multipart) -> Self {
        headers.set("Content-Type", multipart.content_type().to_string());
        Self {
            headers,
            body: Body::Multipart(multipart),
        }
    }

    /// Returns the message headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns the raw `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Renders the message as RFC 5322 bytes with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.headers.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");

        match &self.body {
            Body::Single(body) => {
                out.extend_from_slice(body);
                ensure_trailing_crlf(&mut out);
            }
            Body::Multipart(multipart) => multipart.write_to(&mut out),
        }

        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_display() {
        assert_eq!(TransferEncoding::SevenBit.to_string(), "7bit");
        assert_eq!(TransferEncoding::Base64.to_string(), "base64");
        assert_eq!(
            TransferEncoding::QuotedPrintable.to_string(),
            "quoted-printable"
        );
    }

    #[test]
    fn test_encode_text_seven_bit() {
        let (encoding, body) = encode_text("line one\nline two", "us-ascii").unwrap();
        assert_eq!(encoding, TransferEncoding::SevenBit);
        assert_eq!(body, b"line one\r\nline two");
    }

    #[test]
    fn test_encode_text_latin1_quoted_printable() {
        let (encoding, body) = encode_text("caf\u{e9}", "ISO-8859-1").unwrap();
        assert_eq!(encoding, TransferEncoding::QuotedPrintable);
        assert_eq!(body, b"caf=E9");
    }

    #[test]
    fn test_part_text() {
        let part = Part::text("Hello", "plain", "utf-8").unwrap();
        assert_eq!(
            part.headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(part.body, b"Hello");
    }

    #[test]
    fn test_part_attachment() {
        let part = Part::attachment(b"\x89PNG", &ContentType::new("image", "png"), "logo.png");
        assert_eq!(
            part.headers.get("Content-Type"),
            Some("image/png; name=logo.png")
        );
        assert_eq!(part.headers.get("Content-Transfer-Encoding"), Some("base64"));
        assert_eq!(
            part.headers.get("Content-Disposition"),
            Some("attachment; filename=\"logo.png\"")
        );
    }

    #[test]
    fn test_multipart_boundaries_unique() {
        let a = Multipart::new("mixed");
        let b = Multipart::new("mixed");
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.is_empty());
    }

    #[test]
    fn test_single_part_render() {
        let mut headers = Headers::new();
        headers.add("Subject", "Test");
        headers.add("Content-Type", "text/plain; charset=us-ascii");
        let message = Message::single_part(headers, b"Hello".to_vec());

        assert_eq!(
            message.to_bytes(),
            b"Subject: Test\r\nContent-Type: text/plain; charset=us-ascii\r\n\r\nHello\r\n"
        );
        assert_eq!(message.content_type(), Some("text/plain; charset=us-ascii"));
    }

    #[test]
    fn test_multipart_render() {
        let mut multipart = Multipart::new("alternative");
        multipart.add_part(Part::text("one", "plain", "us-ascii").unwrap());
        multipart.add_part(Part::text("<b>two</b>", "html", "us-ascii").unwrap());
        let boundary = multipart.boundary().to_string();

        let message = Message::multipart(Headers::new(), multipart);
        let rendered = String::from_utf8(message.to_bytes()).unwrap();

        assert!(
            message
                .content_type()
                .unwrap()
                .starts_with("multipart/alternative; boundary=")
        );
        assert_eq!(rendered.matches(&format!("--{boundary}\r\n")).count(), 2);
        assert!(rendered.ends_with(&format!("--{boundary}--\r\n")));
        assert!(rendered.contains("\r\n\r\n<b>two</b>\r\n"));
    }
}
