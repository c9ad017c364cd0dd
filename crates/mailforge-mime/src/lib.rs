//! # mailforge-mime
//!
//! MIME building blocks for composing outgoing email.
//!
//! ## Features
//!
//! - **Headers**: Ordered, case-insensitive header store with RFC 5322 folding
//! - **Content types**: Parsing and formatting of `type/subtype; params`
//! - **Encoding**: Base64, Quoted-Printable, RFC 2047 header encoding and
//!   charset conversion through the `encoding_rs` registry
//! - **Messages**: Single-part and multipart rendering with CRLF line endings
//!
//! ## Quick Start
//!
//! ```
//! use mailforge_mime::{Headers, Message, encoding::encode_rfc2047, header::fold};
//!
//! let mut headers = Headers::new();
//! headers.add("Subject", encode_rfc2047("Grüße", "utf-8")?);
//! headers.add("X-Note", fold("X-Note".len() + 2, "a short note"));
//! headers.add("Content-Type", "text/plain; charset=us-ascii");
//!
//! let message = Message::single_part(headers, b"Hello, World!".to_vec());
//! assert!(message.to_bytes().starts_with(b"Subject: =?utf-8?B?"));
//! # Ok::<(), mailforge_mime::Error>(())
//! ```
//!
//! ### Multipart Messages
//!
//! ```
//! use mailforge_mime::{ContentType, Headers, Message, Multipart, Part};
//!
//! let mut multipart = Multipart::new("mixed");
//! multipart.add_part(Part::text("See attached.", "plain", "utf-8")?);
//! multipart.add_part(Part::attachment(b"%PDF-1.7", &ContentType::new("application", "pdf"), "doc.pdf"));
//!
//! let message = Message::multipart(Headers::new(), multipart);
//! assert!(message.content_type().unwrap_or_default().starts_with("multipart/mixed"));
//! # Ok::<(), mailforge_mime::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod message;

pub mod encoding;
pub mod header;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, Message, Multipart, Part, TransferEncoding, encode_binary, encode_text};
