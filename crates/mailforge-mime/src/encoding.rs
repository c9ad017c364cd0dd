//! MIME encoding utilities.
//!
//! Supports Base64, Quoted-Printable, RFC 2047 header encoding and
//! conversion of text into a named charset.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::Encoding;
use std::fmt::Write as _;

/// Maximum line length for encoded bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of a single RFC 2047 encoded-word.
const MAX_ENCODED_WORD_LENGTH: usize = 75;

/// Looks up a charset label in the encoding registry.
///
/// Labels follow the WHATWG registry, so aliases such as `latin1`,
/// `ISO-8859-1` and `us-ascii` all resolve. Encodings the registry can only
/// decode (UTF-16 and the replacement labels) are not usable for output.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] if the label is unknown or cannot
/// be encoded into.
pub fn lookup_charset(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label_no_replacement(label.trim().as_bytes())
        .filter(|encoding| encoding.output_encoding() == *encoding)
        .ok_or_else(|| Error::UnsupportedCharset(label.to_string()))
}

/// Encodes text into the bytes of the named charset.
///
/// # Errors
///
/// Returns an error if the charset is unknown or cannot represent the text.
pub fn encode_charset(text: &str, charset: &str) -> Result<Vec<u8>> {
    let encoding = lookup_charset(charset)?;
    let (bytes, used, had_errors) = encoding.encode(text);
    if used != encoding {
        return Err(Error::UnsupportedCharset(charset.to_string()));
    }
    // The registry maps US-ASCII onto windows-1252.
    if had_errors || (is_ascii_label(charset) && !text.is_ascii()) {
        return Err(Error::InvalidEncoding(format!(
            "text cannot be represented in {charset}"
        )));
    }
    Ok(bytes.into_owned())
}

fn is_ascii_label(charset: &str) -> bool {
    let label = charset.trim();
    ["us-ascii", "ascii", "ansi_x3.4-1968", "iso646-us"]
        .iter()
        .any(|l| l.eq_ignore_ascii_case(label))
}

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 split into CRLF-terminated 76 column lines.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);

    // Base64 output is ASCII, so byte chunks are valid str slices.
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        result.push_str(&String::from_utf8_lossy(chunk));
        result.push_str("\r\n");
    }

    result
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (`\n` or `\r\n`) are kept as hard CRLF breaks.
/// Whitespace at the end of a line is encoded so it survives transport.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::new();
    let mut lines = data.split(|&b| b == b'\n').peekable();

    while let Some(line) = lines.next() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        encode_quoted_printable_line(line, &mut result);
        if lines.peek().is_some() {
            result.push_str("\r\n");
        }
    }

    result
}

fn encode_quoted_printable_line(line: &[u8], result: &mut String) {
    let mut line_length = 0;

    for (i, byte) in line.iter().enumerate() {
        let is_last = i + 1 == line.len();

        // Soft line break, leaving room for an escape sequence
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(char::from(*byte));
                line_length += 1;
            }
            // Whitespace is literal unless it ends the line
            b' ' | b'\t' if !is_last => {
                result.push(char::from(*byte));
                line_length += 1;
            }
            _ => {
                let _ = write!(result, "={byte:02X}");
                line_length += 3;
            }
        }
    }
}

/// Encodes a header value using RFC 2047 encoded-words.
///
/// Format: `=?charset?B?encoded-text?=`. Values that are plain ASCII and
/// contain nothing that looks like an encoded-word are returned unchanged.
/// Long values are split over several encoded-words separated by a space,
/// never splitting a character.
///
/// # Arguments
///
/// * `text` - Text to encode
/// * `charset` - Character set label (e.g., "utf-8")
///
/// # Errors
///
/// Returns an error if the charset is unknown or cannot represent the text.
pub fn encode_rfc2047(text: &str, charset: &str) -> Result<String> {
    if !needs_rfc2047(text) {
        return Ok(text.to_string());
    }

    let encoding = lookup_charset(charset)?;
    let ascii_only = is_ascii_label(charset);
    let overhead = "=??B??=".len() + charset.len();
    let max_encoded = MAX_ENCODED_WORD_LENGTH.saturating_sub(overhead).max(4);
    let max_bytes = max_encoded / 4 * 3;

    let mut words = Vec::new();
    let mut chunk: Vec<u8> = Vec::new();
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        let (bytes, used, had_errors) = encoding.encode(ch.encode_utf8(&mut buf));
        if used != encoding {
            return Err(Error::UnsupportedCharset(charset.to_string()));
        }
        if had_errors || (ascii_only && !ch.is_ascii()) {
            return Err(Error::InvalidEncoding(format!(
                "'{ch}' cannot be represented in {charset}"
            )));
        }

        if !chunk.is_empty() && chunk.len() + bytes.len() > max_bytes {
            words.push(format!("=?{charset}?B?{}?=", encode_base64(&chunk)));
            chunk.clear();
        }
        chunk.extend_from_slice(&bytes);
    }

    if !chunk.is_empty() {
        words.push(format!("=?{charset}?B?{}?=", encode_base64(&chunk)));
    }

    Ok(words.join(" "))
}

/// Returns true if a header value must be RFC 2047 encoded.
#[must_use]
pub fn needs_rfc2047(text: &str) -> bool {
    !text.is_ascii() || text.contains("=?")
}
