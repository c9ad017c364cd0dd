//! Production transport backed by `lettre`.

use super::{MailSession, Transport, TransportError, pop_login};
use crate::config::Security;
use crate::message::OutgoingMessage;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

/// Delivers messages over SMTP, opening a fresh connection per send.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpTransport;

impl SmtpTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn build_client(
        session: &MailSession,
        hello_name: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
        let tls = match session.security {
            Security::None => Tls::None,
            Security::StartTls => Tls::Required(TlsParameters::new(session.host.clone())?),
            Security::Tls => Tls::Wrapper(TlsParameters::new(session.host.clone())?),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&session.host)
            .hello_name(ClientId::Domain(hello_name.to_string()))
            .port(session.port)
            .tls(tls)
            .timeout(Some(session.timeout));

        if let Some(credentials) = session
            .credentials
            .as_ref()
            .filter(|c| !c.username.is_empty())
        {
            builder = builder.credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    fn build_envelope(message: &OutgoingMessage) -> Result<lettre::address::Envelope, TransportError> {
        let envelope = message.envelope();
        let from = envelope.from().email().parse::<lettre::Address>()?;
        let recipients = envelope
            .recipients()
            .iter()
            .map(|rcpt| rcpt.email().parse::<lettre::Address>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lettre::address::Envelope::new(Some(from), recipients)?)
    }
}

impl Transport for SmtpTransport {
    async fn send(
        &self,
        session: &MailSession,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        let envelope = Self::build_envelope(message)?;

        if let Some(pop) = &session.pop_before_smtp {
            pop_login(pop, session.timeout).await?;
        }

        let client = Self::build_client(session, message.envelope().from().domain())?;
        let bytes = message.to_bytes();

        tracing::info!(
            server = %session.server(),
            protocol = session.protocol(),
            recipients = envelope.to().len(),
            message_id = message.message_id(),
            "Sending message"
        );
        if session.debug {
            tracing::debug!(
                authenticated = session.credentials.is_some(),
                data = %String::from_utf8_lossy(&bytes),
                "DATA"
            );
        }

        client.send_raw(&envelope, &bytes).await?;

        tracing::debug!(server = %session.server(), "Message accepted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::message::Envelope;
    use mailforge_mime::{Headers, Message};

    fn outgoing(recipients: &[&str]) -> OutgoingMessage {
        let envelope = Envelope::new(
            Address::parse("sender@example.com").unwrap(),
            recipients.iter().map(|r| Address::parse(r).unwrap()).collect(),
        );
        OutgoingMessage::new(
            envelope,
            Message::single_part(Headers::new(), b"Hello".to_vec()),
            "<1@example.com>",
        )
    }

    #[test]
    fn test_build_envelope() {
        let envelope = SmtpTransport::build_envelope(&outgoing(&[
            "a@example.com",
            "Name <b@example.com>",
        ]))
        .unwrap();
        assert_eq!(envelope.from().map(ToString::to_string).as_deref(), Some("sender@example.com"));
        assert_eq!(envelope.to().len(), 2);
    }

    #[test]
    fn test_build_envelope_without_recipients() {
        assert!(matches!(
            SmtpTransport::build_envelope(&outgoing(&[])),
            Err(TransportError::Envelope(_))
        ));
    }

    #[tokio::test]
    async fn test_send_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let session = MailSession::new("127.0.0.1", port);
        let err = SmtpTransport::new()
            .send(&session, &outgoing(&["a@example.com"]))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Smtp(_)));
    }
}
