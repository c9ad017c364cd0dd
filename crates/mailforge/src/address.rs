//! Email address parsing and formatting.

use crate::charset::check_charset;
use crate::error::{Error, Result};
use mailforge_mime::encoding::{encode_rfc2047, needs_rfc2047};
use std::fmt;
use std::str::FromStr;

/// Characters that force a display name to be quoted.
const PHRASE_SPECIALS: &str = "()<>@,;:\\\".[]";

/// Characters allowed in an unquoted local part besides ASCII alphanumerics.
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

/// Email address with an optional display name and display name charset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    email: String,
    name: Option<String>,
    charset: Option<String>,
}

impl Address {
    /// Parses an address, either a bare `local@domain` or `Name <local@domain>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_address(input, "address cannot be empty"));
        }

        let (name, email) = match trimmed.strip_suffix('>') {
            Some(rest) => {
                let open = rest
                    .rfind('<')
                    .ok_or_else(|| Error::invalid_address(input, "missing '<'"))?;
                (parse_phrase(input, &rest[..open])?, rest[open + 1..].trim())
            }
            None => (None, trimmed),
        };

        validate_addr_spec(email).map_err(|reason| Error::invalid_address(input, reason))?;

        Ok(Self {
            email: email.to_string(),
            name,
            charset: None,
        })
    }

    /// Creates an address from an email and display name.
    ///
    /// An empty display name is the same as none. A display name given
    /// here replaces one parsed from `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn with_name(email: &str, name: Option<&str>) -> Result<Self> {
        let mut address = Self::parse(email)?;
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            address.name = Some(name.to_string());
        }
        Ok(address)
    }

    /// Creates an address whose display name is encoded in `charset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed, the charset name is
    /// illegal or unsupported, or the display name cannot be represented in
    /// the charset.
    pub fn with_charset(email: &str, name: Option<&str>, charset: &str) -> Result<Self> {
        let charset = check_charset(charset)?;
        let mut address = Self::with_name(email, name)?;
        if let Some(name) = &address.name {
            encode_rfc2047(name, &charset)?;
        }
        address.charset = Some(charset);
        Ok(address)
    }

    /// Returns the `local@domain` part.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the charset used to encode the display name.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Returns the domain part.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.email
            .rsplit_once('@')
            .map_or(self.email.as_str(), |(_, domain)| domain)
    }

    /// Formats the address for a header.
    ///
    /// Non-ASCII display names are RFC 2047 encoded in the address charset,
    /// falling back to `default_charset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the display name cannot be encoded.
    pub fn to_header_value(&self, default_charset: &str) -> Result<String> {
        let Some(name) = &self.name else {
            return Ok(self.email.clone());
        };

        let charset = self.charset.as_deref().unwrap_or(default_charset);
        let phrase = if needs_rfc2047(name) {
            encode_rfc2047(name, charset)?
        } else {
            quote_phrase(name)
        };
        Ok(format!("{phrase} <{}>", self.email))
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_header_value("utf-8") {
            Ok(value) => f.write_str(&value),
            Err(_) => match &self.name {
                Some(name) => write!(f, "{} <{}>", quote_phrase(name), self.email),
                None => f.write_str(&self.email),
            },
        }
    }
}

fn parse_phrase(input: &str, phrase: &str) -> Result<Option<String>> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Ok(None);
    }

    let name = match phrase.strip_prefix('"') {
        Some(rest) => rest
            .strip_suffix('"')
            .and_then(unescape_quoted)
            .ok_or_else(|| Error::invalid_address(input, "unterminated quoted display name"))?,
        None => phrase.to_string(),
    };

    Ok(Some(name).filter(|n| !n.is_empty()))
}

fn unescape_quoted(quoted: &str) -> Option<String> {
    let mut result = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push(chars.next()?),
            '"' => return None,
            _ => result.push(c),
        }
    }
    Some(result)
}

fn quote_phrase(name: &str) -> String {
    if name.chars().any(|c| PHRASE_SPECIALS.contains(c)) {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        name.to_string()
    }
}

/// Validates an RFC 5322 `addr-spec`.
fn validate_addr_spec(email: &str) -> std::result::Result<(), &'static str> {
    if email.is_empty() {
        return Err("address cannot be empty");
    }

    let (local, domain) = email.rsplit_once('@').ok_or("address must contain @")?;

    if local.is_empty() {
        return Err("local part cannot be empty");
    }
    if domain.is_empty() {
        return Err("domain cannot be empty");
    }

    if local.starts_with('"') {
        validate_quoted_local(local)?;
    } else if !is_dot_atom(local, |c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)) {
        return Err("invalid local part");
    }

    if domain.starts_with('[') {
        if !domain.ends_with(']') || domain.len() < 3 {
            return Err("unterminated domain literal");
        }
        let literal = &domain[1..domain.len() - 1];
        if literal.chars().any(|c| !c.is_ascii_graphic() || "[]\\".contains(c)) {
            return Err("invalid domain literal");
        }
    } else if !domain.split('.').all(is_domain_label) || domain.ends_with('.') {
        return Err("invalid domain");
    }

    Ok(())
}

fn validate_quoted_local(local: &str) -> std::result::Result<(), &'static str> {
    let inner = local
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .filter(|_| local.len() >= 2)
        .ok_or("unterminated quoted local part")?;

    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next().ok_or("dangling escape in local part")?;
            }
            '"' => return Err("unescaped quote in local part"),
            c if c == ' ' || c.is_ascii_graphic() => {}
            _ => return Err("invalid character in quoted local part"),
        }
    }
    Ok(())
}

fn is_dot_atom(s: &str, is_atext: impl Fn(char) -> bool) -> bool {
    s.split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(&is_atext))
}

fn is_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
