//! Test doubles: a fake SMTP server, a fake POP3 server and a recording
//! transport.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Mutex;

use mailforge::{MailSession, OutgoingMessage, Transport, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber; `RUST_LOG=debug` shows the SMTP exchange.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mail accepted by [`spawn_smtp_server`].
#[derive(Debug, Clone, Default)]
pub struct ReceivedMail {
    /// Argument of `MAIL FROM:`.
    pub mail_from: String,
    /// Arguments of every `RCPT TO:`.
    pub rcpt_to: Vec<String>,
    /// Message data with dot-stuffing removed.
    pub data: String,
}

/// How the fake SMTP server answers authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No AUTH extension advertised.
    None,
    /// AUTH advertised, every attempt rejected.
    Reject,
}

/// Starts a fake SMTP server on a random local port.
///
/// Each accepted message is sent on the returned channel.
pub async fn spawn_smtp_server(auth: AuthMode) -> (u16, mpsc::UnboundedReceiver<ReceivedMail>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                let mut mail = ReceivedMail::default();
                let mut line = String::new();

                write.write_all(b"220 localhost ESMTP fake\r\n").await.unwrap();

                loop {
                    line.clear();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                        break;
                    }
                    let command = line.trim_end().to_string();
                    let upper = command.to_ascii_uppercase();

                    let reply: &[u8] = if upper.starts_with("EHLO") || upper.starts_with("HELO") {
                        match auth {
                            AuthMode::None => b"250 localhost\r\n",
                            AuthMode::Reject => b"250-localhost\r\n250 AUTH PLAIN LOGIN\r\n",
                        }
                    } else if upper.starts_with("AUTH") {
                        b"535 5.7.8 Authentication credentials invalid\r\n"
                    } else if upper.starts_with("MAIL FROM:") {
                        mail.mail_from = strip_path(&command["MAIL FROM:".len()..]);
                        b"250 OK\r\n"
                    } else if upper.starts_with("RCPT TO:") {
                        mail.rcpt_to.push(strip_path(&command["RCPT TO:".len()..]));
                        b"250 OK\r\n"
                    } else if upper == "DATA" {
                        write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.unwrap();
                        mail.data = read_data(&mut reader).await;
                        let _ = tx.send(std::mem::take(&mut mail));
                        b"250 OK queued\r\n"
                    } else if upper == "QUIT" {
                        write.write_all(b"221 Bye\r\n").await.unwrap();
                        break;
                    } else if upper == "RSET" || upper == "NOOP" {
                        b"250 OK\r\n"
                    } else {
                        b"502 Command not implemented\r\n"
                    };

                    if write.write_all(reply).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (port, rx)
}

fn strip_path(arg: &str) -> String {
    let arg = arg.trim();
    let end = arg.find('>').map_or(arg.len(), |i| i + 1);
    arg[..end]
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

async fn read_data<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> String {
    let mut data = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            break;
        }
        if line == ".\r\n" || line == ".\n" {
            break;
        }
        let unstuffed = line.strip_prefix('.').unwrap_or(&line);
        data.push_str(unstuffed);
    }
    data
}

/// Starts a fake POP3 server that accepts any login.
///
/// The commands of each session are sent on the returned channel.
pub async fn spawn_pop_server() -> (u16, mpsc::UnboundedReceiver<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let (read, mut write) = socket.into_split();
            let mut reader = BufReader::new(read);
            let mut commands = Vec::new();
            let mut line = String::new();

            write.write_all(b"+OK POP3 ready\r\n").await.unwrap();
            loop {
                line.clear();
                if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                    break;
                }
                let command = line.trim_end().to_string();
                let quit = command.eq_ignore_ascii_case("QUIT");
                commands.push(command);
                write.write_all(b"+OK\r\n").await.unwrap();
                if quit {
                    break;
                }
            }
            let _ = tx.send(commands);
        }
    });

    (port, rx)
}

/// Delivery recorded by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Session the message was sent with.
    pub session: MailSession,
    /// Envelope recipients.
    pub recipients: Vec<String>,
    /// Rendered message.
    pub data: String,
}

/// Transport that records deliveries instead of connecting anywhere.
#[derive(Debug, Default)]
pub struct MockTransport {
    deliveries: Mutex<Vec<Delivery>>,
    failure: Option<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that records the attempt and then fails.
    pub fn failing(reason: &str) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send(
        &self,
        session: &MailSession,
        message: &OutgoingMessage,
    ) -> Result<(), TransportError> {
        self.deliveries.lock().unwrap().push(Delivery {
            session: session.clone(),
            recipients: message
                .envelope()
                .recipients()
                .iter()
                .map(|a| a.email().to_string())
                .collect(),
            data: String::from_utf8_lossy(&message.to_bytes()).into_owned(),
        });

        match &self.failure {
            Some(reason) => Err(TransportError::Other(reason.clone())),
            None => Ok(()),
        }
    }
}
