//! Built messages handed to a transport.

use crate::address::Address;
use mailforge_mime::Message;

/// SMTP envelope: reverse path and forward paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    from: Address,
    recipients: Vec<Address>,
}

impl Envelope {
    /// Creates an envelope.
    #[must_use]
    pub const fn new(from: Address, recipients: Vec<Address>) -> Self {
        Self { from, recipients }
    }

    /// Returns the reverse path (bounce address or From).
    #[must_use]
    pub const fn from(&self) -> &Address {
        &self.from
    }

    /// Returns every recipient, Bcc included.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }
}

/// Immutable message produced by a build, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    envelope: Envelope,
    message: Message,
    message_id: String,
}

impl OutgoingMessage {
    /// Creates an outgoing message.
    #[must_use]
    pub fn new(envelope: Envelope, message: Message, message_id: impl Into<String>) -> Self {
        Self {
            envelope,
            message,
            message_id: message_id.into(),
        }
    }

    /// Returns the envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the MIME message.
    #[must_use]
    pub const fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the Message-ID header value, angle brackets included.
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Gets the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.message.header(name)
    }

    /// Renders the message as it goes on the wire.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.message.to_bytes()
    }
}
