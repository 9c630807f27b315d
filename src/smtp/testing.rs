use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream,
    ReadBuf,
};

use super::session::{BoxedStream, Connector};

/// What the fake server does on one connection.
#[derive(Debug, Clone)]
pub(crate) enum PeerScript {
    /// Sends `banner`, then answers each command line with the paired reply.
    Dialogue {
        banner: &'static str,
        replies: Vec<&'static str>,
    },
    /// Sends the bytes and then never speaks again.
    Stall(&'static str),
    /// Sends the banner, then every further read fails with a reset.
    ResetAfterBanner(&'static str),
    /// Connection refused.
    Refuse,
}

impl PeerScript {
    pub(crate) fn banner(banner: &'static str) -> Self {
        Self::Dialogue {
            banner,
            replies: Vec::new(),
        }
    }

    pub(crate) fn accepting() -> Self {
        Self::Dialogue {
            banner: "220 mx.example.com ESMTP\r\n",
            replies: vec![
                "250 mx.example.com\r\n",
                "250 2.1.0 Ok\r\n",
                "250 2.1.5 Ok\r\n",
                "221 2.0.0 Bye\r\n",
            ],
        }
    }

    pub(crate) fn rejecting_rcpt() -> Self {
        Self::Dialogue {
            banner: "220 mx.example.com ESMTP\r\n",
            replies: vec![
                "250 mx.example.com\r\n",
                "250 2.1.0 Ok\r\n",
                "550 5.1.1 User unknown\r\n",
                "221 2.0.0 Bye\r\n",
            ],
        }
    }
}

type ScriptFn = dyn Fn(usize) -> PeerScript + Send + Sync;

/// Connector backed by in-memory pipes; the script is chosen per attempt.
pub(crate) struct ScriptedConnector {
    script: Box<ScriptFn>,
    connects: AtomicUsize,
    closed: Arc<AtomicUsize>,
    pub commands: Arc<Mutex<Vec<String>>>,
    pub targets: Mutex<Vec<(String, u16)>>,
}

impl ScriptedConnector {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(usize) -> PeerScript + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            connects: AtomicUsize::new(0),
            closed: Arc::default(),
            commands: Default::default(),
            targets: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(script: PeerScript) -> Self {
        Self::new(move |_| script.clone())
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Connections on which the fake server has seen the client hang up.
    pub(crate) fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Waits up to one second for `expected` hang-ups.
    pub(crate) async fn all_closed(&self, expected: usize) -> bool {
        let wait = async {
            while self.closed() < expected {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .is_ok()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, host: &str, port: u16) -> io::Result<BoxedStream> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
        self.targets
            .lock()
            .expect("targets lock")
            .push((host.to_string(), port));
        match (self.script)(attempt) {
            PeerScript::Refuse => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
            PeerScript::ResetAfterBanner(banner) => Ok(Box::new(ResetAfterBanner {
                banner: banner.as_bytes(),
                delivered: false,
            })),
            script => {
                let (client, server) = tokio::io::duplex(4096);
                let commands = Arc::clone(&self.commands);
                let closed = Arc::clone(&self.closed);
                tokio::spawn(async move {
                    if serve(server, script, commands).await.is_ok() {
                        closed.fetch_add(1, Ordering::SeqCst);
                    }
                });
                Ok(Box::new(client))
            }
        }
    }
}

/// Plays `script` and returns `Ok` once the client has hung up.
async fn serve(
    server: DuplexStream,
    script: PeerScript,
    commands: Arc<Mutex<Vec<String>>>,
) -> io::Result<()> {
    let (read_half, mut write_half) = tokio::io::split(server);
    let mut reader = BufReader::new(read_half);
    match script {
        PeerScript::Refuse | PeerScript::ResetAfterBanner(_) => {
            unreachable!("handled without a pipe")
        }
        PeerScript::Stall(bytes) => {
            write_half.write_all(bytes.as_bytes()).await?;
            write_half.flush().await?;
        }
        PeerScript::Dialogue { banner, replies } => {
            write_half.write_all(banner.as_bytes()).await?;
            write_half.flush().await?;
            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).await? == 0 {
                    return Ok(());
                }
                commands
                    .lock()
                    .expect("commands lock")
                    .push(line.trim_end().to_string());
                write_half.write_all(reply.as_bytes()).await?;
                write_half.flush().await?;
            }
        }
    }
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest).await?;
    Ok(())
}

/// In-process stream whose peer resets right after greeting.
struct ResetAfterBanner {
    banner: &'static [u8],
    delivered: bool,
}

impl AsyncRead for ResetAfterBanner {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.delivered {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        let len = self.banner.len().min(buf.remaining());
        buf.put_slice(&self.banner[..len]);
        self.delivered = true;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for ResetAfterBanner {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
