//! POP3 login used to authorise a following SMTP send.

use super::TransportError;
use crate::config::PopBeforeSmtp;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

type Result<T> = std::result::Result<T, TransportError>;

/// Logs in to a POP3 server and quits.
///
/// Each step, connecting included, must complete within `timeout`.
///
/// # Errors
///
/// Returns an error if the connection fails, a step times out or the server
/// answers anything other than `+OK`.
pub async fn pop_login(settings: &PopBeforeSmtp, timeout: Duration) -> Result<()> {
    tracing::debug!(server = %settings.server(), "POP before SMTP login");

    let stream = with_timeout(
        timeout,
        TcpStream::connect((settings.host.as_str(), settings.port)),
    )
    .await??;
    let mut stream = BufReader::new(stream);

    expect_ok(&mut stream, timeout).await?;
    command(&mut stream, &format!("USER {}", settings.username), timeout).await?;
    command(&mut stream, &format!("PASS {}", settings.password), timeout).await?;
    command(&mut stream, "QUIT", timeout).await?;

    tracing::debug!(username = %settings.username, "POP login accepted");
    Ok(())
}

async fn command(stream: &mut BufReader<TcpStream>, line: &str, timeout: Duration) -> Result<()> {
    let data = format!("{line}\r\n");
    with_timeout(timeout, async {
        stream.get_mut().write_all(data.as_bytes()).await?;
        stream.get_mut().flush().await
    })
    .await??;
    expect_ok(stream, timeout).await
}

async fn expect_ok(stream: &mut BufReader<TcpStream>, timeout: Duration) -> Result<()> {
    let mut line = String::new();
    let read = with_timeout(timeout, stream.read_line(&mut line)).await??;
    if read == 0 {
        return Err(TransportError::Pop("connection closed by server".to_string()));
    }

    let line = line.trim_end();
    if line.starts_with("+OK") {
        Ok(())
    } else {
        Err(TransportError::Pop(line.to_string()))
    }
}

async fn with_timeout<F: Future>(timeout: Duration, future: F) -> Result<F::Output> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| TransportError::Timeout(timeout))
}
