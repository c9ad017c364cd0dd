//! Boundary between built messages and the mail transport.
//!
//! [`Transport`] is the seam: [`SmtpTransport`] delivers through `lettre`,
//! tests supply their own implementation.

mod pop;
mod smtp;

pub use pop::pop_login;
pub use smtp::SmtpTransport;

use crate::config::{Credentials, EmailConfig, PopBeforeSmtp, Security};
use crate::error::ConfigError;
use crate::message::OutgoingMessage;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a transport while delivering a message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// SMTP client error (connection, TLS, authentication, protocol).
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The envelope was rejected before connecting.
    #[error("Envelope error: {0}")]
    Envelope(#[from] lettre::error::Error),

    /// An address could not be converted for the SMTP client.
    #[error("Address error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// POP server refused the login.
    #[error("POP error: {0}")]
    Pop(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure reported by a transport.
    #[error("{0}")]
    Other(String),
}

/// Connection settings handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSession {
    /// SMTP server hostname.
    pub host: String,
    /// Resolved SMTP port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Log the SMTP exchange.
    pub debug: bool,
    /// SMTP authentication.
    pub credentials: Option<Credentials>,
    /// POP3 login performed before sending.
    pub pop_before_smtp: Option<PopBeforeSmtp>,
    /// Connect and I/O timeout.
    pub timeout: Duration,
}

impl MailSession {
    /// Creates a plaintext session with no authentication.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            security: Security::None,
            debug: false,
            credentials: None,
            pop_before_smtp: None,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
        }
    }

    /// Builds a session from delivery settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHostName`] if no host is set.
    pub fn from_config(config: &EmailConfig) -> Result<Self, ConfigError> {
        let host = config
            .host_name
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or(ConfigError::MissingHostName)?;

        let session = Self {
            host: host.to_string(),
            port: config.resolved_port(),
            security: config.security,
            debug: config.debug,
            credentials: config
                .credentials
                .clone()
                .filter(|c| !c.username.is_empty()),
            pop_before_smtp: config.pop_before_smtp.clone(),
            timeout: config.timeout(),
        };
        session.validate()?;
        Ok(session)
    }

    /// Returns the transport protocol name, `smtps` for implicit TLS.
    #[must_use]
    pub const fn protocol(&self) -> &'static str {
        match self.security {
            Security::Tls => "smtps",
            Security::None | Security::StartTls => "smtp",
        }
    }

    /// Returns `host:port` of the SMTP server.
    #[must_use]
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks the session is complete enough to connect.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty host or POP settings without a host or
    /// username.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHostName);
        }
        if self
            .pop_before_smtp
            .as_ref()
            .is_some_and(|p| p.host.is_empty() || p.username.is_empty())
        {
            return Err(ConfigError::IncompletePopBeforeSmtp);
        }
        Ok(())
    }
}

/// Delivers built messages.
pub trait Transport {
    /// Sends `message` using the connection settings in `session`.
    fn send(
        &self,
        session: &MailSession,
        message: &OutgoingMessage,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_config() {
        let config = EmailConfig {
            host_name: Some("smtp.example.com".to_string()),
            smtp_port: 2525,
            debug: true,
            ..EmailConfig::default()
        };
        let session = MailSession::from_config(&config).unwrap();
        assert_eq!(session.server(), "smtp.example.com:2525");
        assert_eq!(session.protocol(), "smtp");
        assert!(session.debug);
    }

    #[test]
    fn test_session_ssl_on_connect() {
        let config = EmailConfig {
            host_name: Some("smtp.example.com".to_string()),
            security: Security::Tls,
            ..EmailConfig::default()
        };
        let session = MailSession::from_config(&config).unwrap();
        assert_eq!(session.server(), "smtp.example.com:465");
        assert_eq!(session.protocol(), "smtps");
    }

    #[test]
    fn test_session_requires_host() {
        assert_eq!(
            MailSession::from_config(&EmailConfig::default()),
            Err(ConfigError::MissingHostName)
        );
        let config = EmailConfig {
            host_name: Some("  ".to_string()),
            ..EmailConfig::default()
        };
        assert_eq!(
            MailSession::from_config(&config),
            Err(ConfigError::MissingHostName)
        );
    }

    #[test]
    fn test_session_without_username_skips_auth() {
        let config = EmailConfig {
            host_name: Some("smtp.example.com".to_string()),
            credentials: Some(Credentials::new("", "")),
            ..EmailConfig::default()
        };
        let session = MailSession::from_config(&config).unwrap();
        assert!(session.credentials.is_none());
        assert_eq!(session.validate(), Ok(()));
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timed out after 5s");
        let err = TransportError::Pop("-ERR invalid password".to_string());
        assert!(err.to_string().contains("-ERR invalid password"));
    }
}
