use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::machine::{
    MAX_REPLY_LEN, ProbeState, ReplyBuffer, ReplyTooLong, Stage, transition,
};
use super::types::{Envelope, SmtpVerificationResult};
use crate::log::Logger;

/// Duplex byte stream the probe talks over.
pub trait ProbeStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ProbeStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub type BoxedStream = Box<dyn ProbeStream>;

/// Opens the byte stream to an exchanger.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> io::Result<BoxedStream>;
}

#[async_trait]
impl<T: Connector + ?Sized> Connector for Arc<T> {
    async fn connect(&self, host: &str, port: u16) -> io::Result<BoxedStream> {
        (**self).connect(host, port).await
    }
}

/// Plain TCP, no TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> io::Result<BoxedStream> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Box::new(stream))
    }
}

/// One connection, one dialogue, bounded by `timeout`.
pub struct SmtpProbe<'a> {
    connector: &'a dyn Connector,
    logger: &'a dyn Logger,
    port: u16,
    timeout: Duration,
}

impl<'a> SmtpProbe<'a> {
    pub fn new(
        connector: &'a dyn Connector,
        logger: &'a dyn Logger,
        port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            connector,
            logger,
            port,
            timeout,
        }
    }

    /// Runs a full attempt against `exchange`. The stream is owned by the
    /// attempt future, so every exit path (including the deadline dropping
    /// the future) closes the socket exactly once.
    pub async fn run(&self, exchange: &str, envelope: &Envelope<'_>) -> SmtpVerificationResult {
        let attempt = async {
            let mut stream = match self.connector.connect(exchange, self.port).await {
                Ok(stream) => stream,
                Err(err) => {
                    self.logger
                        .error(&format!("Error connecting to SMTP server {exchange}: {err}"));
                    return SmtpVerificationResult::connection_error();
                }
            };
            self.logger.info(&format!(
                "Connection to SMTP server {exchange}:{} established",
                self.port
            ));
            drive(&mut stream, envelope, self.logger).await
        };

        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(result) => result,
            Err(_) => {
                self.logger.error(&format!(
                    "SMTP dialogue with {exchange} timed out after {} ms",
                    self.timeout.as_millis()
                ));
                SmtpVerificationResult::timed_out()
            }
        }
    }
}

/// Drives the transition function over `stream` until a terminal event.
pub async fn drive<S>(
    stream: &mut S,
    envelope: &Envelope<'_>,
    logger: &dyn Logger,
) -> SmtpVerificationResult
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let mut state = ProbeState::default();
    let mut buffer = ReplyBuffer::default();
    let mut chunk = [0u8; 1024];

    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) => {
                logger.info("Connection to SMTP server ended");
                return state.outcome_on_close();
            }
            Ok(read) => read,
            // QUIT is best effort: a reset after it does not void the answer
            Err(err) if state.stage == Stage::AwaitQuitAck => {
                logger.info(&format!("Connection dropped after QUIT: {err}"));
                return state.outcome_on_close();
            }
            Err(err) => {
                logger.error(&format!("Error reading from SMTP server: {err}"));
                return SmtpVerificationResult::connection_error();
            }
        };

        let reply = match buffer.push(&chunk[..read]) {
            Ok(Some(reply)) => reply,
            Ok(None) => continue,
            Err(ReplyTooLong) => {
                logger.error(&format!(
                    "SMTP reply exceeds {MAX_REPLY_LEN} bytes without a line feed"
                ));
                return SmtpVerificationResult::connection_error();
            }
        };
        logger.info(&format!("SMTP Response: {}", reply.text.trim_end()));

        let step = transition(state, &reply, envelope);
        state = step.state;

        if let Some(command) = step.send {
            logger.info(&format!("SMTP Command: {command}"));
            if let Err(err) = write_command(stream, &command).await {
                if state.stage == Stage::AwaitQuitAck {
                    logger.info(&format!("QUIT not delivered: {err}"));
                    return state.outcome_on_close();
                }
                logger.error(&format!("Error writing to SMTP server: {err}"));
                return SmtpVerificationResult::connection_error();
            }
        }

        if step.close {
            if let Err(err) = stream.shutdown().await {
                logger.info(&format!("Shutdown after close failed: {err}"));
            }
            logger.info("Connection to SMTP server ended");
            return state.outcome_on_close();
        }
    }
}

async fn write_command<S>(stream: &mut S, command: &str) -> io::Result<()>
where
    S: AsyncWrite + Unpin + ?Sized,
{
    let mut line = command.as_bytes().to_vec();
    line.extend_from_slice(b"\r\n");
    stream.write_all(&line).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoopLogger;
    use crate::log::testing::RecordingLogger;
    use crate::smtp::testing::{PeerScript, ScriptedConnector};
    use crate::types::ResultCode;

    const ENVELOPE: Envelope<'static> = Envelope {
        fqdn: "mail.example.org",
        sender: "name@example.org",
        recipient: "user@example.com",
    };

    async fn probe(connector: &ScriptedConnector, timeout: Duration) -> SmtpVerificationResult {
        SmtpProbe::new(connector, &NoopLogger, 2525, timeout)
            .run("mx.example.com", &ENVELOPE)
            .await
    }

    #[tokio::test]
    async fn accepted_mailbox_is_valid() {
        let connector = ScriptedConnector::always(PeerScript::accepting());
        let result = probe(&connector, Duration::from_secs(5)).await;
        assert_eq!(result, SmtpVerificationResult::accepted());
        assert_eq!(
            connector.commands(),
            [
                "EHLO mail.example.org",
                "MAIL FROM:<name@example.org>",
                "RCPT TO:<user@example.com>",
                "QUIT",
            ]
        );
        let targets = connector.targets.lock().expect("targets").clone();
        assert_eq!(targets, [("mx.example.com".to_string(), 2525)]);
        assert!(connector.all_closed(1).await, "socket left open");
    }

    #[tokio::test]
    async fn rejected_mailbox_is_invalid_and_completed() {
        let connector = ScriptedConnector::always(PeerScript::rejecting_rcpt());
        let result = probe(&connector, Duration::from_secs(5)).await;
        assert_eq!(result.code, ResultCode::Invalid);
        assert!(!result.valid);
        assert!(result.completed);
        assert!(!result.retryable);
        assert_eq!(connector.commands().last().map(String::as_str), Some("QUIT"));
        assert!(connector.all_closed(1).await, "socket left open");
    }

    #[tokio::test]
    async fn busy_banner_is_retryable() {
        let connector = ScriptedConnector::always(PeerScript::banner("450 4.7.1 try later\r\n"));
        let result = probe(&connector, Duration::from_secs(5)).await;
        assert_eq!(result.code, ResultCode::Invalid);
        assert!(result.retryable);
        assert!(!result.completed);
        assert!(connector.commands().is_empty());
        assert!(connector.all_closed(1).await, "socket left open");
    }

    #[tokio::test]
    async fn refused_connection_is_connection_error() {
        let connector = ScriptedConnector::always(PeerScript::Refuse);
        let result = probe(&connector, Duration::from_secs(5)).await;
        assert_eq!(result, SmtpVerificationResult::connection_error());
    }

    #[tokio::test]
    async fn unterminated_reply_times_out() {
        let connector = ScriptedConnector::always(PeerScript::Stall("220 never finished"));
        let result = probe(&connector, Duration::from_millis(100)).await;
        assert_eq!(result.code, ResultCode::ConnectionTimeout);
        assert!(!result.completed);
        assert!(!result.retryable);
        assert!(connector.all_closed(1).await, "socket left open");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let connector = ScriptedConnector::always(PeerScript::Stall(""));
        let result = probe(&connector, Duration::from_millis(100)).await;
        assert_eq!(result, SmtpVerificationResult::timed_out());
        assert!(connector.all_closed(1).await, "socket left open");
    }

    #[tokio::test]
    async fn reset_mid_dialogue_is_connection_error() {
        let connector = ScriptedConnector::always(PeerScript::ResetAfterBanner(
            "220 mx.example.com ESMTP\r\n",
        ));
        let result = probe(&connector, Duration::from_secs(5)).await;
        assert_eq!(result, SmtpVerificationResult::connection_error());
        assert_eq!(result.code, ResultCode::SmtpConnectionError);
        assert!(!result.completed);
    }

    #[tokio::test]
    async fn endless_reply_line_is_connection_error() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        tokio::spawn(async move {
            let junk = [b'x'; 512];
            while server.write_all(&junk).await.is_ok() {}
        });
        let result = drive(&mut client, &ENVELOPE, &NoopLogger).await;
        assert_eq!(result, SmtpVerificationResult::connection_error());
    }

    #[tokio::test]
    async fn early_hangup_is_invalid() {
        let (mut client, server) = tokio::io::duplex(256);
        drop(server);
        let result = drive(&mut client, &ENVELOPE, &NoopLogger).await;
        assert_eq!(result, SmtpVerificationResult::rejected(false));
    }

    #[tokio::test]
    async fn banner_split_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(256);
        let peer = tokio::spawn(async move {
            server.write_all(b"220 mx.exa").await?;
            server.flush().await?;
            tokio::time::sleep(Duration::from_millis(20)).await;
            server.write_all(b"mple.com\r\n").await?;
            let mut line = vec![0u8; 64];
            let n = server.read(&mut line).await?;
            server.write_all(b"554 no thanks\r\n").await?;
            io::Result::Ok(String::from_utf8_lossy(&line[..n]).into_owned())
        });
        let result = drive(&mut client, &ENVELOPE, &NoopLogger).await;
        assert_eq!(result.code, ResultCode::Invalid);
        let ehlo = peer.await.expect("peer task").expect("peer io");
        assert_eq!(ehlo, "EHLO mail.example.org\r\n");
    }

    #[tokio::test]
    async fn dialogue_is_logged() {
        let connector = ScriptedConnector::always(PeerScript::accepting());
        let logger = RecordingLogger::default();
        SmtpProbe::new(&connector, &logger, 25, Duration::from_secs(5))
            .run("mx.example.com", &ENVELOPE)
            .await;
        let lines = logger.lines();
        assert!(lines.iter().any(|l| l.contains("established")));
        assert!(lines.contains(&"INFO: SMTP Command: RCPT TO:<user@example.com>".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("INFO: SMTP Response: 250 2.1.5")));
    }
}
