//! Delivery configuration.

use crate::charset::check_charset;
use crate::error::{ConfigError, Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default plain SMTP port.
pub const DEFAULT_SMTP_PORT: u16 = 25;

/// Default port for SMTP over implicit TLS.
pub const DEFAULT_SSL_SMTP_PORT: u16 = 465;

/// Default POP3 port.
pub const DEFAULT_POP_PORT: u16 = 110;

/// Default connect and I/O timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Security {
    /// Plaintext connection.
    #[default]
    None,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
    /// Implicit TLS (SSL on connect).
    Tls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::StartTls => "STARTTLS",
            Self::Tls => "SSL/TLS",
        }
    }
}

/// Username and password for SMTP authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// POP3 login performed before SMTP delivery.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopBeforeSmtp {
    /// POP3 server hostname.
    pub host: String,
    /// POP3 server port.
    #[serde(default = "default_pop_port")]
    pub port: u16,
    /// Username for the POP3 login.
    pub username: String,
    /// Password for the POP3 login.
    #[serde(default)]
    pub password: String,
}

impl PopBeforeSmtp {
    /// Creates POP-before-SMTP settings on the default POP3 port.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_POP_PORT,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns `host:port` of the POP3 server.
    #[must_use]
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for PopBeforeSmtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopBeforeSmtp")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

const fn default_pop_port() -> u16 {
    DEFAULT_POP_PORT
}

/// Delivery settings shared by the emails a caller sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub host_name: Option<String>,
    /// Plain or STARTTLS SMTP port.
    pub smtp_port: u16,
    /// Port used when `security` is [`Security::Tls`].
    pub ssl_smtp_port: u16,
    /// Security mode.
    pub security: Security,
    /// Log the SMTP exchange.
    pub debug: bool,
    /// Default charset for text content and header encoding.
    pub charset: Option<String>,
    /// SMTP authentication.
    pub credentials: Option<Credentials>,
    /// POP3 login performed before sending.
    pub pop_before_smtp: Option<PopBeforeSmtp>,
    /// Envelope sender, when different from the From address.
    pub bounce_address: Option<String>,
    /// Connect and I/O timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host_name: None,
            smtp_port: DEFAULT_SMTP_PORT,
            ssl_smtp_port: DEFAULT_SSL_SMTP_PORT,
            security: Security::None,
            debug: false,
            charset: None,
            credentials: None,
            pop_before_smtp: None,
            bounce_address: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl EmailConfig {
    /// Create a new config with default ports and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the port the session connects to.
    #[must_use]
    pub const fn resolved_port(&self) -> u16 {
        match self.security {
            Security::Tls => self.ssl_smtp_port,
            Security::None | Security::StartTls => self.smtp_port,
        }
    }

    /// Returns the connect and I/O timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sets the connect and I/O timeout, rounding up to whole milliseconds.
    pub fn set_timeout(&mut self, timeout: Duration) {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
    }

    /// Checks the settings that can be checked without a message.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero port, an illegal or unsupported charset or
    /// POP settings without a host or username.
    pub fn validate(&self) -> Result<()> {
        if self.smtp_port == 0 {
            return Err(ValidationError::InvalidSmtpPort.into());
        }
        if self.ssl_smtp_port == 0 {
            return Err(ValidationError::InvalidSslSmtpPort.into());
        }
        if let Some(charset) = &self.charset {
            check_charset(charset)?;
        }
        if self
            .pop_before_smtp
            .as_ref()
            .is_some_and(|p| p.host.is_empty() || p.username.is_empty())
        {
            return Err(ConfigError::IncompletePopBeforeSmtp.into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = EmailConfig::new();
        assert_eq!(config.smtp_port, 25);
        assert_eq!(config.ssl_smtp_port, 465);
        assert_eq!(config.security, Security::None);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sub_second_timeout() {
        let mut config = EmailConfig::new();
        config.set_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout_ms, 500);
        assert_eq!(config.timeout(), Duration::from_millis(500));

        config.set_timeout(Duration::from_micros(10));
        assert_eq!(config.timeout(), Duration::from_millis(1));

        let config: EmailConfig = serde_json::from_str(r#"{ "timeout-ms": 250 }"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_resolved_port() {
        let mut config = EmailConfig {
            smtp_port: 2525,
            ..EmailConfig::default()
        };
        assert_eq!(config.resolved_port(), 2525);
        config.security = Security::StartTls;
        assert_eq!(config.resolved_port(), 2525);
        config.security = Security::Tls;
        assert_eq!(config.resolved_port(), 465);
    }

    #[test]
    fn test_deserialize_json() {
        let config: EmailConfig = serde_json::from_str(
            r#"{
                "host-name": "smtp.example.com",
                "smtp-port": 587,
                "security": "start-tls",
                "charset": "ISO-8859-1",
                "credentials": { "username": "user", "password": "secret" },
                "pop-before-smtp": { "host": "pop.example.com", "username": "user" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.host_name.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.resolved_port(), 587);
        assert_eq!(config.security, Security::StartTls);
        assert_eq!(config.ssl_smtp_port, 465);
        assert_eq!(config.timeout_ms, 60_000);
        let pop = config.pop_before_smtp.as_ref().unwrap();
        assert_eq!(pop.port, 110);
        assert_eq!(pop.server(), "pop.example.com:110");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let config = EmailConfig {
            smtp_port: 0,
            ..EmailConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Validation(ValidationError::InvalidSmtpPort))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_charset() {
        let config = EmailConfig {
            charset: Some("not a charset".to_string()),
            ..EmailConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::IllegalCharsetName(_))));
    }

    #[test]
    fn test_validate_incomplete_pop_before_smtp() {
        let config = EmailConfig {
            credentials: Some(Credentials::new("", "")),
            ..EmailConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = EmailConfig {
            pop_before_smtp: Some(PopBeforeSmtp::new("", "user", "pw")),
            ..EmailConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::IncompletePopBeforeSmtp))
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
