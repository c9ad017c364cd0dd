//! # mailforge
//!
//! Compose email messages and hand them to an SMTP transport.
//!
//! ## Features
//!
//! - **Addresses**: RFC 5322 parsing with display names and per-name charsets
//! - **Headers**: Custom headers stored raw, encoded and folded at build time
//! - **Content negotiation**: The default charset is applied to text content
//!   types that declare none; binary types are left alone
//! - **Delivery**: SMTP through `lettre` with TLS, STARTTLS, authentication
//!   and POP-before-SMTP, behind a [`Transport`] trait for substitution
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailforge::{Email, Security};
//!
//! #[tokio::main]
//! async fn main() -> mailforge::Result<()> {
//!     let mut email = Email::new();
//!     email.set_host_name("smtp.example.com");
//!     email.set_security(Security::Tls);
//!     email.set_authentication("user@example.com", "password");
//!
//!     email.set_from_with_name("user@example.com", "User")?;
//!     email.add_to("friend@example.com")?;
//!     email.set_subject("Hello");
//!     email.set_msg("Hello, World!")?;
//!
//!     let message_id = email.send().await?;
//!     println!("sent {message_id}");
//!     Ok(())
//! }
//! ```
//!
//! ## Send Pipeline
//!
//! ```text
//! setters ──→ build_mime_message() ──→ OutgoingMessage ──→ Transport::send()
//!                  │                                          │
//!                  └─ Config / Mime errors                    └─ Error::Transport (host:port)
//! ```
//!
//! ## Modules
//!
//! - [`charset`]: Charset name checks
//! - [`config`]: Serializable delivery settings
//! - [`content`]: Content payloads and content-type negotiation
//! - [`transport`]: Transport trait, session and SMTP implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
pub mod charset;
pub mod config;
pub mod content;
mod email;
mod error;
mod message;
pub mod transport;

pub use address::Address;
pub use config::{Credentials, EmailConfig, PopBeforeSmtp, Security};
pub use content::Content;
pub use email::Email;
pub use error::{ConfigError, Error, Result, ValidationError};
pub use message::{Envelope, OutgoingMessage};
pub use transport::{MailSession, SmtpTransport, Transport, TransportError};

pub use mailforge_mime as mime;
