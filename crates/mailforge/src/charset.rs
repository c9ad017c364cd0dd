//! Charset name checks against the encoding registry.

use crate::error::{Error, Result};
use mailforge_mime::encoding::lookup_charset;

/// Checks that a charset name is legal and supported, returning it unchanged.
///
/// Legal names start with an ASCII letter or digit followed by letters,
/// digits, `-`, `+`, `:`, `_` or `.`.
///
/// # Errors
///
/// Returns [`Error::IllegalCharsetName`] for a malformed name and
/// [`Error::UnsupportedCharset`] for a legal name the registry does not know
/// or can only decode, such as `UTF-16`.
pub fn check_charset(name: &str) -> Result<String> {
    if !is_legal_charset_name(name) {
        return Err(Error::IllegalCharsetName(name.to_string()));
    }

    match lookup_charset(name) {
        Ok(_) => Ok(name.to_string()),
        Err(_) => Err(Error::UnsupportedCharset(name.to_string())),
    }
}

fn is_legal_charset_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || "-+:_.".contains(c))
}
