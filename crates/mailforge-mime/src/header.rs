//! MIME header handling.

use std::fmt;

/// Maximum length of a header line before it is folded.
pub const MAX_HEADER_LINE_LENGTH: usize = 76;

/// Ordered collection of email headers.
///
/// Lookups are case-insensitive; names keep the case they were added with
/// and headers render in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value, keeping any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Sets a header value, replacing any existing values.
    ///
    /// The header keeps the position of its first occurrence.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        match self.position(&name) {
            Some(index) => {
                self.headers[index] = (name.clone(), value);
                let mut seen = 0;
                self.headers.retain(|(n, _)| {
                    if n.eq_ignore_ascii_case(&name) {
                        seen += 1;
                        seen == 1
                    } else {
                        true
                    }
                });
            }
            None => self.headers.push((name, value)),
        }
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.headers[index].1.as_str())
    }

    /// Returns the number of header values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

/// Folds a header value so no line exceeds [`MAX_HEADER_LINE_LENGTH`].
///
/// `used` is the number of columns already taken on the first line,
/// normally the header name plus `": "`. Lines break at the last run of
/// whitespace that still fits; the break becomes CRLF followed by that
/// whitespace character. A value with no usable whitespace is left long.
/// Existing line breaks in the value are collapsed to spaces first, and
/// trailing whitespace is dropped.
#[must_use]
pub fn fold(used: usize, value: &str) -> String {
    let unfolded: String = value
        .split(['\r', '\n'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut rest = unfolded.trim_end_matches([' ', '\t']);

    if used + rest.len() <= MAX_HEADER_LINE_LENGTH {
        return rest.to_string();
    }

    let mut folded = String::with_capacity(rest.len() + 8);
    let mut used = used;
    let mut last = '\0';

    while used + rest.len() > MAX_HEADER_LINE_LENGTH {
        let mut break_at = None;

        for (i, c) in rest.char_indices() {
            if break_at.is_some() && used + i > MAX_HEADER_LINE_LENGTH {
                break;
            }
            if (c == ' ' || c == '\t') && !(last == ' ' || last == '\t') {
                break_at = Some(i);
            }
            last = c;
        }

        let Some(index) = break_at else {
            break;
        };

        folded.push_str(&rest[..index]);
        folded.push_str("\r\n");
        // Whitespace is ASCII, so index + 1 is a char boundary.
        last = char::from(rest.as_bytes()[index]);
        folded.push(last);
        rest = &rest[index + 1..];
        used = 1;
    }

    folded.push_str(rest);
    folded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_headers_set() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com");
        headers.add("Subject", "Hi");
        headers.add("to", "bob@example.com");
        assert_eq!(headers.len(), 3);

        headers.set("To", "charlie@example.com");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("to"), Some("charlie@example.com"));
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["To", "Subject"]);
    }

    #[test]
    fn test_headers_display_keeps_order() {
        let mut headers = Headers::new();
        headers.add("To", "recipient@example.com");
        headers.add("From", "sender@example.com");

        assert_eq!(
            headers.to_string(),
            "To: recipient@example.com\r\nFrom: sender@example.com\r\n"
        );
    }

    #[test]
    fn test_headers_from_iter_replaces() {
        let headers: Headers = [("X-Mailer", "a"), ("x-mailer", "b")].into_iter().collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("X-Mailer"), Some("b"));
    }

    #[test]
    fn test_fold_short_value_untouched() {
        assert_eq!(fold(10, "short value"), "short value");
    }

    #[test]
    fn test_fold_long_value_single_break() {
        let value = "1234567890 1234567890 123456789 01234567890 123456789 0123456789 01234567890 01234567890";
        let folded = fold("X-LongHeader".len() + 2, value);

        assert_eq!(folded.matches("\r\n").count(), 1);
        let lines: Vec<&str> = folded.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(' '));
        assert_eq!(folded.replace("\r\n", ""), value);
    }

    #[test]
    fn test_fold_without_whitespace() {
        let value = "x".repeat(120);
        assert_eq!(fold(10, &value), value);
    }

    #[test]
    fn test_fold_collapses_line_breaks() {
        assert_eq!(fold(0, "one\r\ntwo"), "one two");
    }

    proptest! {
        #[test]
        fn fold_keeps_content(words in proptest::collection::vec("[a-z0-9]{1,20}", 1..30)) {
            let value = words.join(" ");
            let folded = fold(14, &value);
            prop_assert_eq!(folded.replace("\r\n", ""), value);
        }

        #[test]
        fn fold_respects_line_limit(words in proptest::collection::vec("[a-z0-9]{1,20}", 1..30)) {
            let value = words.join(" ");
            let folded = fold(14, &value);
            let mut used = 14;
            for line in folded.split("\r\n") {
                prop_assert!(used + line.len() <= MAX_HEADER_LINE_LENGTH);
                used = 0;
            }
        }
    }
}
