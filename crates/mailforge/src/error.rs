//! Error types for email composition and delivery.

use crate::transport::TransportError;
use thiserror::Error;

/// Errors that can occur while composing or sending an email.
#[derive(Debug, Error)]
pub enum Error {
    /// A setter received a value that fails validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Email address could not be parsed.
    #[error("Invalid email address {address:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Charset name contains characters no charset name may contain.
    #[error("Illegal charset name: {0:?}")]
    IllegalCharsetName(String),

    /// Charset name is legal but not known to the charset registry.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Required configuration is missing at build or send time.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MIME assembly failed.
    #[error("MIME error: {0}")]
    Mime(#[from] mailforge_mime::Error),

    /// The message was already built.
    #[error("The MIME message has already been built")]
    AlreadyBuilt,

    /// The transport failed to deliver the message.
    #[error("Sending the email to the following server failed: {server}")]
    Transport {
        /// Resolved `host:port` of the server.
        server: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },
}

impl Error {
    /// Creates an invalid address error.
    #[must_use]
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error for values passed to setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// An address list replacement was empty.
    EmptyAddressList,
    /// A header name is empty.
    EmptyHeaderName,
    /// A header value is empty.
    EmptyHeaderValue,
    /// SMTP port is outside 1-65535.
    InvalidSmtpPort,
    /// SSL SMTP port is outside 1-65535.
    InvalidSslSmtpPort,
    /// Message text is empty.
    EmptyMessage,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyAddressList => "Address list provided was invalid",
            Self::EmptyHeaderName => "Header name can not be empty",
            Self::EmptyHeaderValue => "Header value can not be empty",
            Self::InvalidSmtpPort => "SMTP port must be 1-65535",
            Self::InvalidSslSmtpPort => "SSL SMTP port must be 1-65535",
            Self::EmptyMessage => "Invalid message supplied",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyAddressList => "addresses",
            Self::EmptyHeaderName | Self::EmptyHeaderValue => "headers",
            Self::InvalidSmtpPort => "smtp_port",
            Self::InvalidSslSmtpPort => "ssl_smtp_port",
            Self::EmptyMessage => "content",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Configuration missing before a message can be built or sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No SMTP host name.
    #[error("Cannot find valid hostname for mail session")]
    MissingHostName,
    /// No from address.
    #[error("From address required")]
    MissingFrom,
    /// No To, Cc or Bcc address.
    #[error("At least one receiver address required")]
    MissingDestination,
    /// POP-before-SMTP enabled without host or username.
    #[error("POP before SMTP requires a host and a username")]
    IncompletePopBeforeSmtp,
    /// Sending was requested before the message was built.
    #[error("The MIME message has not been built yet")]
    MessageNotBuilt,
}
