//! Message content and content-type negotiation.

use crate::error::Result;
use mailforge_mime::{ContentType, TransferEncoding, encode_binary, encode_text};

/// Charset used for text that is not pure ASCII and declares no charset.
const FALLBACK_CHARSET: &str = "utf-8";

/// Single-part message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Textual payload, encoded into its charset at build time.
    Text(String),
    /// Opaque bytes, sent base64 encoded.
    Binary(Vec<u8>),
}

impl Content {
    /// Returns true for textual payloads.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Content {
    fn from(data: Vec<u8>) -> Self {
        Self::Binary(data)
    }
}

impl From<&[u8]> for Content {
    fn from(data: &[u8]) -> Self {
        Self::Binary(data.to_vec())
    }
}

/// Resolves the final content type of a payload.
///
/// A blank or missing content type falls back to `text/plain` for text and
/// `application/octet-stream` for binary payloads. Text payloads with a
/// `text/*` type and no charset parameter get `default_charset`.
///
/// # Errors
///
/// Returns an error if `content_type` is not a valid `type/subtype`.
pub fn negotiate_content_type(
    content: &Content,
    content_type: Option<&str>,
    default_charset: Option<&str>,
) -> Result<ContentType> {
    let resolved = match content_type.map(str::trim).filter(|ct| !ct.is_empty()) {
        Some(raw) => ContentType::parse(raw)?,
        None if content.is_text() => ContentType::new("text", "plain"),
        None => ContentType::octet_stream(),
    };

    if !content.is_text() || !resolved.is_text() || resolved.charset().is_some() {
        return Ok(resolved);
    }

    Ok(match default_charset {
        Some(charset) => resolved.with_parameter("charset", charset),
        None => resolved,
    })
}

/// Encoded body ready to be placed in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// Final content type, charset included.
    pub content_type: ContentType,
    /// Transfer encoding applied to `data`.
    pub transfer_encoding: TransferEncoding,
    /// Transfer-encoded bytes.
    pub data: Vec<u8>,
}

/// Negotiates the content type and encodes the payload.
///
/// Text without a declared charset goes out as US-ASCII when it is pure
/// ASCII and as UTF-8 otherwise.
///
/// # Errors
///
/// Returns an error if the content type is malformed or the text cannot be
/// represented in its charset.
pub fn encode_content(
    content: &Content,
    content_type: Option<&str>,
    default_charset: Option<&str>,
) -> Result<EncodedBody> {
    let mut content_type = negotiate_content_type(content, content_type, default_charset)?;

    let (transfer_encoding, data) = match content {
        Content::Text(text) => {
            let charset = match content_type.charset() {
                Some(charset) => charset.to_string(),
                None if text.is_ascii() => "us-ascii".to_string(),
                None => {
                    if content_type.is_text() {
                        content_type = content_type.with_parameter("charset", FALLBACK_CHARSET);
                    }
                    FALLBACK_CHARSET.to_string()
                }
            };
            encode_text(text, &charset)?
        }
        Content::Binary(data) => encode_binary(data),
    };

    Ok(EncodedBody {
        content_type,
        transfer_encoding,
        data,
    })
}
