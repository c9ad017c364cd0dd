//! The email composition object.

use crate::address::Address;
use crate::charset::check_charset;
use crate::config::{Credentials, EmailConfig, PopBeforeSmtp, Security};
use crate::content::{Content, encode_content};
use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::message::{Envelope, OutgoingMessage};
use crate::transport::{MailSession, SmtpTransport, Transport};
use chrono::{DateTime, Utc};
use mailforge_mime::encoding::encode_rfc2047;
use mailforge_mime::header::{MAX_HEADER_LINE_LENGTH, fold};
use mailforge_mime::{Headers, Message, Multipart};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Charset for header encoding when none is configured.
const DEFAULT_HEADER_CHARSET: &str = "utf-8";

static MESSAGE_ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Body set on an [`Email`].
#[derive(Debug, Clone, Default)]
enum Body {
    #[default]
    Empty,
    Single {
        content: Content,
        content_type: Option<String>,
    },
    Multipart(Multipart),
}

/// An email under composition.
///
/// Fields mutate freely until [`Email::build_mime_message`] or
/// [`Email::send`] snapshots them into an [`OutgoingMessage`]. An `Email`
/// builds once.
///
/// # Example
///
/// ```no_run
/// use mailforge::Email;
///
/// # async fn run() -> mailforge::Result<()> {
/// let mut email = Email::new();
/// email.set_host_name("smtp.example.com");
/// email.set_smtp_port(587)?;
/// email.set_from_with_name("me@example.com", "Me")?;
/// email.add_to("you@example.com")?;
/// email.set_subject("Hello");
/// email.set_msg("Hi there")?;
/// let message_id = email.send().await?;
/// # let _ = message_id;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Email {
    config: EmailConfig,
    session: Option<MailSession>,
    from: Option<Address>,
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    reply_to: Vec<Address>,
    headers: Headers,
    subject: Option<String>,
    body: Body,
    sent_date: Option<DateTime<Utc>>,
    message: Option<OutgoingMessage>,
}

impl Email {
    /// Creates an empty email with default delivery settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty email using the given delivery settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail [`EmailConfig::validate`].
    pub fn with_config(config: EmailConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Returns the delivery settings.
    #[must_use]
    pub const fn config(&self) -> &EmailConfig {
        &self.config
    }

    // Delivery settings

    /// Sets the SMTP host name.
    pub fn set_host_name(&mut self, host_name: impl Into<String>) {
        self.config.host_name = Some(host_name.into());
    }

    /// Returns the SMTP host name, from the session override if one is set.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        match &self.session {
            Some(session) => Some(&session.host),
            None => self.config.host_name.as_deref(),
        }
    }

    /// Sets the plain or STARTTLS SMTP port.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSmtpPort`] unless the port is in
    /// `1..=65535`.
    pub fn set_smtp_port(&mut self, port: i32) -> Result<()> {
        self.config.smtp_port = checked_port(port).ok_or(ValidationError::InvalidSmtpPort)?;
        Ok(())
    }

    /// Returns the plain or STARTTLS SMTP port.
    #[must_use]
    pub const fn smtp_port(&self) -> u16 {
        self.config.smtp_port
    }

    /// Sets the port used for SSL-on-connect.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSslSmtpPort`] unless the port is in
    /// `1..=65535`.
    pub fn set_ssl_smtp_port(&mut self, port: i32) -> Result<()> {
        self.config.ssl_smtp_port =
            checked_port(port).ok_or(ValidationError::InvalidSslSmtpPort)?;
        Ok(())
    }

    /// Returns the port used for SSL-on-connect.
    #[must_use]
    pub const fn ssl_smtp_port(&self) -> u16 {
        self.config.ssl_smtp_port
    }

    /// Sets the security mode.
    pub const fn set_security(&mut self, security: Security) {
        self.config.security = security;
    }

    /// Returns the security mode.
    #[must_use]
    pub const fn security(&self) -> Security {
        self.config.security
    }

    /// Enables or disables logging of the SMTP exchange.
    pub const fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// Returns true if the SMTP exchange is logged.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.config.debug
    }

    /// Sets the default charset for text content and header encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalCharsetName`] or [`Error::UnsupportedCharset`]
    /// if the charset cannot be used.
    pub fn set_charset(&mut self, charset: &str) -> Result<()> {
        self.config.charset = Some(check_charset(charset)?);
        Ok(())
    }

    /// Returns the default charset.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.config.charset.as_deref()
    }

    /// Sets SMTP authentication credentials.
    ///
    /// With an empty username the message is sent without authenticating.
    pub fn set_authentication(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.config.credentials = Some(Credentials::new(username, password));
    }

    /// Returns the SMTP authentication credentials.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        self.config.credentials.as_ref()
    }

    /// Enables or disables a POP3 login before sending.
    pub fn set_pop_before_smtp(&mut self, pop: Option<PopBeforeSmtp>) {
        self.config.pop_before_smtp = pop;
    }

    /// Returns the POP-before-SMTP settings.
    #[must_use]
    pub const fn pop_before_smtp(&self) -> Option<&PopBeforeSmtp> {
        self.config.pop_before_smtp.as_ref()
    }

    /// Sets the envelope sender used for bounces.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn set_bounce_address(&mut self, address: &str) -> Result<()> {
        let address = Address::parse(address)?;
        self.config.bounce_address = Some(address.email().to_string());
        Ok(())
    }

    /// Returns the envelope sender used for bounces.
    #[must_use]
    pub fn bounce_address(&self) -> Option<&str> {
        self.config.bounce_address.as_deref()
    }

    /// Sets the connect and I/O timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.set_timeout(timeout);
    }

    /// Returns the connect and I/O timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Overrides the session derived from the delivery settings.
    pub fn set_mail_session(&mut self, session: MailSession) {
        self.session = Some(session);
    }

    /// Returns the session a send would use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHostName`] without a host, or
    /// [`ConfigError::IncompletePopBeforeSmtp`] for incomplete POP settings.
    pub fn mail_session(&self) -> Result<MailSession> {
        match &self.session {
            Some(session) => {
                session.validate()?;
                Ok(session.clone())
            }
            None => Ok(MailSession::from_config(&self.config)?),
        }
    }

    // Addresses

    /// Sets the From address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn set_from(&mut self, email: &str) -> Result<()> {
        self.from = Some(Address::parse(email)?);
        Ok(())
    }

    /// Sets the From address with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn set_from_with_name(&mut self, email: &str, name: &str) -> Result<()> {
        self.from = Some(self.named_address(email, name)?);
        Ok(())
    }

    /// Sets the From address with a display name in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the charset unusable.
    pub fn set_from_with_charset(&mut self, email: &str, name: &str, charset: &str) -> Result<()> {
        self.from = Some(Address::with_charset(email, Some(name), charset)?);
        Ok(())
    }

    /// Returns the From address.
    #[must_use]
    pub const fn from_address(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    /// Adds a To recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_to(&mut self, email: &str) -> Result<()> {
        self.to.push(Address::parse(email)?);
        Ok(())
    }

    /// Adds a To recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_to_with_name(&mut self, email: &str, name: &str) -> Result<()> {
        let address = self.named_address(email, name)?;
        self.to.push(address);
        Ok(())
    }

    /// Adds a To recipient with a display name in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the charset unusable.
    pub fn add_to_with_charset(&mut self, email: &str, name: &str, charset: &str) -> Result<()> {
        self.to.push(Address::with_charset(email, Some(name), charset)?);
        Ok(())
    }

    /// Adds several To recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if `emails` is empty or any address is malformed;
    /// nothing is added in that case.
    pub fn add_to_all(&mut self, emails: &[&str]) -> Result<()> {
        let parsed = parse_all(emails)?;
        self.to.extend(parsed);
        Ok(())
    }

    /// Replaces the To recipients.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddressList`] if `addresses` is empty.
    pub fn set_to(&mut self, addresses: Vec<Address>) -> Result<()> {
        self.to = non_empty(addresses)?;
        Ok(())
    }

    /// Returns the To recipients in insertion order.
    #[must_use]
    pub fn to_addresses(&self) -> &[Address] {
        &self.to
    }

    /// Adds a Cc recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_cc(&mut self, email: &str) -> Result<()> {
        self.cc.push(Address::parse(email)?);
        Ok(())
    }

    /// Adds a Cc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_cc_with_name(&mut self, email: &str, name: &str) -> Result<()> {
        let address = self.named_address(email, name)?;
        self.cc.push(address);
        Ok(())
    }

    /// Adds a Cc recipient with a display name in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the charset unusable.
    pub fn add_cc_with_charset(&mut self, email: &str, name: &str, charset: &str) -> Result<()> {
        self.cc.push(Address::with_charset(email, Some(name), charset)?);
        Ok(())
    }

    /// Adds several Cc recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if `emails` is empty or any address is malformed.
    pub fn add_cc_all(&mut self, emails: &[&str]) -> Result<()> {
        let parsed = parse_all(emails)?;
        self.cc.extend(parsed);
        Ok(())
    }

    /// Replaces the Cc recipients.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddressList`] if `addresses` is empty.
    pub fn set_cc(&mut self, addresses: Vec<Address>) -> Result<()> {
        self.cc = non_empty(addresses)?;
        Ok(())
    }

    /// Returns the Cc recipients in insertion order.
    #[must_use]
    pub fn cc_addresses(&self) -> &[Address] {
        &self.cc
    }

    /// Adds a Bcc recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_bcc(&mut self, email: &str) -> Result<()> {
        self.bcc.push(Address::parse(email)?);
        Ok(())
    }

    /// Adds a Bcc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_bcc_with_name(&mut self, email: &str, name: &str) -> Result<()> {
        let address = self.named_address(email, name)?;
        self.bcc.push(address);
        Ok(())
    }

    /// Adds a Bcc recipient with a display name in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the charset unusable.
    pub fn add_bcc_with_charset(&mut self, email: &str, name: &str, charset: &str) -> Result<()> {
        self.bcc.push(Address::with_charset(email, Some(name), charset)?);
        Ok(())
    }

    /// Adds several Bcc recipients.
    ///
    /// # Errors
    ///
    /// Returns an error if `emails` is empty or any address is malformed.
    pub fn add_bcc_all(&mut self, emails: &[&str]) -> Result<()> {
        let parsed = parse_all(emails)?;
        self.bcc.extend(parsed);
        Ok(())
    }

    /// Replaces the Bcc recipients.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddressList`] if `addresses` is empty.
    pub fn set_bcc(&mut self, addresses: Vec<Address>) -> Result<()> {
        self.bcc = non_empty(addresses)?;
        Ok(())
    }

    /// Returns the Bcc recipients in insertion order.
    #[must_use]
    pub fn bcc_addresses(&self) -> &[Address] {
        &self.bcc
    }

    /// Adds a Reply-To address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_reply_to(&mut self, email: &str) -> Result<()> {
        self.reply_to.push(Address::parse(email)?);
        Ok(())
    }

    /// Adds a Reply-To address with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed.
    pub fn add_reply_to_with_name(&mut self, email: &str, name: &str) -> Result<()> {
        let address = self.named_address(email, name)?;
        self.reply_to.push(address);
        Ok(())
    }

    /// Adds a Reply-To address with a display name in the given charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the charset unusable.
    pub fn add_reply_to_with_charset(
        &mut self,
        email: &str,
        name: &str,
        charset: &str,
    ) -> Result<()> {
        self.reply_to
            .push(Address::with_charset(email, Some(name), charset)?);
        Ok(())
    }

    /// Replaces the Reply-To addresses.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAddressList`] if `addresses` is empty.
    pub fn set_reply_to(&mut self, addresses: Vec<Address>) -> Result<()> {
        self.reply_to = non_empty(addresses)?;
        Ok(())
    }

    /// Returns the Reply-To addresses in insertion order.
    #[must_use]
    pub fn reply_to_addresses(&self) -> &[Address] {
        &self.reply_to
    }

    // Headers and content

    /// Adds a custom header, replacing an existing one with the same name.
    ///
    /// The value is stored as given and folded when the message is built.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name or value is empty.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        check_header(name, value)?;
        self.headers.set(name, value);
        Ok(())
    }

    /// Replaces all custom headers.
    ///
    /// Every pair is checked before anything is replaced.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any name or value is empty.
    pub fn set_headers<I, N, V>(&mut self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> = headers
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect();
        for (name, value) in &pairs {
            check_header(name, value)?;
        }
        self.headers = pairs.into_iter().collect();
        Ok(())
    }

    /// Returns the custom headers, unfolded.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a custom header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Sets the subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(subject.into());
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Sets a single-part body and its raw content type.
    ///
    /// The content type is kept as given; the default charset is applied
    /// when the message is built.
    pub fn set_content(&mut self, content: impl Into<Content>, content_type: Option<&str>) {
        self.body = Body::Single {
            content: content.into(),
            content_type: content_type.map(ToString::to_string),
        };
    }

    /// Sets a plain-text body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyMessage`] if `text` is empty.
    pub fn set_msg(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        self.set_content(text, Some("text/plain"));
        Ok(())
    }

    /// Sets a multipart body. Any content type set with the content is
    /// replaced by the multipart type.
    pub fn set_multipart(&mut self, multipart: Multipart) {
        self.body = Body::Multipart(multipart);
    }

    /// Removes any single-part or multipart body.
    pub fn clear_content(&mut self) {
        self.body = Body::Empty;
    }

    /// Returns the single-part body.
    #[must_use]
    pub const fn content(&self) -> Option<&Content> {
        match &self.body {
            Body::Single { content, .. } => Some(content),
            Body::Empty | Body::Multipart(_) => None,
        }
    }

    /// Returns the raw content type exactly as it was set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match &self.body {
            Body::Single { content_type, .. } => content_type.as_deref(),
            Body::Empty | Body::Multipart(_) => None,
        }
    }

    /// Returns the multipart body.
    #[must_use]
    pub const fn multipart(&self) -> Option<&Multipart> {
        match &self.body {
            Body::Multipart(multipart) => Some(multipart),
            Body::Empty | Body::Single { .. } => None,
        }
    }

    /// Sets the Date header value.
    pub const fn set_sent_date(&mut self, date: DateTime<Utc>) {
        self.sent_date = Some(date);
    }

    /// Returns the sent date, or the current time when none is set.
    #[must_use]
    pub fn sent_date(&self) -> DateTime<Utc> {
        self.sent_date.unwrap_or_else(Utc::now)
    }

    // Building and sending

    /// Returns the built message.
    #[must_use]
    pub const fn mime_message(&self) -> Option<&OutgoingMessage> {
        self.message.as_ref()
    }

    /// Assembles the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyBuilt`] on a second call, a [`ConfigError`]
    /// when the host, From address or every recipient is missing, and
    /// [`Error::Mime`] for a malformed content type or unencodable text.
    pub fn build_mime_message(&mut self) -> Result<&OutgoingMessage> {
        if self.message.is_some() {
            return Err(Error::AlreadyBuilt);
        }

        self.mail_session()?;
        let from = self.from.as_ref().ok_or(ConfigError::MissingFrom)?;
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(ConfigError::MissingDestination.into());
        }

        let charset = self.config.charset.as_deref().unwrap_or(DEFAULT_HEADER_CHARSET);
        let message_id = generate_message_id(from.domain());

        let mut headers = Headers::new();
        headers.set("Date", self.sent_date().to_rfc2822());
        headers.set("From", address_list("From", std::slice::from_ref(from), charset)?);
        for (name, list) in [("Reply-To", &self.reply_to), ("To", &self.to), ("Cc", &self.cc)] {
            if !list.is_empty() {
                headers.set(name, address_list(name, list, charset)?);
            }
        }
        if let Some(subject) = &self.subject {
            headers.set("Subject", encode_header("Subject", subject, charset)?);
        }
        headers.set("Message-ID", message_id.clone());
        headers.set("MIME-Version", "1.0");
        for (name, value) in self.headers.iter() {
            headers.set(name, encode_header(name, value, charset)?);
        }

        let message = match &self.body {
            Body::Multipart(multipart) => Message::multipart(headers, multipart.clone()),
            Body::Single {
                content,
                content_type,
            } => self.single_part(headers, content, content_type.as_deref())?,
            Body::Empty => self.single_part(headers, &Content::Text(String::new()), None)?,
        };

        let reverse_path = match &self.config.bounce_address {
            Some(bounce) => Address::parse(bounce)?,
            None => from.clone(),
        };
        let recipients = self
            .to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .cloned()
            .collect::<Vec<_>>();

        tracing::debug!(
            message_id = %message_id,
            recipients = recipients.len(),
            "Built MIME message"
        );

        let envelope = Envelope::new(reverse_path, recipients);
        Ok(self
            .message
            .insert(OutgoingMessage::new(envelope, message, message_id)))
    }

    fn single_part(
        &self,
        mut headers: Headers,
        content: &Content,
        content_type: Option<&str>,
    ) -> Result<Message> {
        let body = encode_content(content, content_type, self.config.charset.as_deref())?;
        headers.set("Content-Type", body.content_type.to_string());
        headers.set("Content-Transfer-Encoding", body.transfer_encoding.to_string());
        Ok(Message::single_part(headers, body.data))
    }

    /// Sends the built message through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MessageNotBuilt`] before a build, a
    /// [`ConfigError`] for an incomplete session, and [`Error::Transport`]
    /// naming `host:port` when delivery fails.
    pub async fn send_mime_message<T: Transport>(&self, transport: &T) -> Result<String> {
        let message = self.message.as_ref().ok_or(ConfigError::MessageNotBuilt)?;
        let session = self.mail_session()?;

        match transport.send(&session, message).await {
            Ok(()) => {
                tracing::info!(
                    server = %session.server(),
                    message_id = message.message_id(),
                    "Message sent"
                );
                Ok(message.message_id().to_string())
            }
            Err(source) => {
                tracing::warn!(server = %session.server(), error = %source, "Sending failed");
                Err(Error::Transport {
                    server: session.server(),
                    source,
                })
            }
        }
    }

    /// Builds the message and sends it through `transport`.
    ///
    /// Returns the Message-ID.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Email::build_mime_message`] or
    /// [`Email::send_mime_message`].
    pub async fn send_with<T: Transport>(&mut self, transport: &T) -> Result<String> {
        self.build_mime_message()?;
        self.send_mime_message(transport).await
    }

    /// Builds the message and sends it over SMTP.
    ///
    /// Returns the Message-ID.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Email::build_mime_message`] or
    /// [`Email::send_mime_message`].
    pub async fn send(&mut self) -> Result<String> {
        self.send_with(&SmtpTransport::new()).await
    }

    fn named_address(&self, email: &str, name: &str) -> Result<Address> {
        match &self.config.charset {
            Some(charset) => Address::with_charset(email, Some(name), charset),
            None => Address::with_name(email, Some(name)),
        }
    }
}

fn checked_port(port: i32) -> Option<u16> {
    u16::try_from(port).ok().filter(|&p| p > 0)
}

fn non_empty(addresses: Vec<Address>) -> Result<Vec<Address>> {
    if addresses.is_empty() {
        return Err(ValidationError::EmptyAddressList.into());
    }
    Ok(addresses)
}

fn parse_all(emails: &[&str]) -> Result<Vec<Address>> {
    if emails.is_empty() {
        return Err(ValidationError::EmptyAddressList.into());
    }
    emails.iter().map(|email| Address::parse(email)).collect()
}

fn check_header(name: &str, value: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyHeaderName.into());
    }
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyHeaderValue.into());
    }
    if name.chars().any(|c| !c.is_ascii_graphic() || c == ':') {
        return Err(mailforge_mime::Error::InvalidHeader(format!("invalid header name {name:?}")).into());
    }
    Ok(())
}

fn encode_header(name: &str, value: &str, charset: &str) -> Result<String> {
    Ok(fold(name.len() + 2, &encode_rfc2047(value, charset)?))
}

/// Renders an address list, breaking lines between addresses.
fn address_list(name: &str, addresses: &[Address], charset: &str) -> Result<String> {
    let mut value = String::new();
    let mut used = name.len() + 2;

    for (i, address) in addresses.iter().enumerate() {
        let rendered = address.to_header_value(charset)?;
        if i > 0 {
            value.push(',');
            used += 1;
            if used + 1 + rendered.len() > MAX_HEADER_LINE_LENGTH {
                value.push_str("\r\n ");
                used = 1;
            } else {
                value.push(' ');
                used += 1;
            }
        }
        used += rendered.len();
        value.push_str(&rendered);
    }

    Ok(value)
}

fn generate_message_id(domain: &str) -> String {
    let sequence = MESSAGE_ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "<{}.{sequence}.mailforge@{domain}>",
        Utc::now().timestamp_micros()
    )
}
