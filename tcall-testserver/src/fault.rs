use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

/// How a [`FaultServer`] misbehaves after reading a full request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Close the connection without writing anything.
    KillConn,
    /// Send a 200 head and part of a chunked body, then close.
    FlushAndKill,
    /// Reply with this status code and an empty body.
    Status(u16),
    /// Never reply.
    Stall,
}

const STALL_FOR: Duration = Duration::from_secs(30);

pub struct FaultServer {
    addr: SocketAddr,
    url: String,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl FaultServer {
    pub async fn start(fault: Fault) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else {
                            continue;
                        };
                        tokio::spawn(async move {
                            let _ = serve(stream, fault).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr,
            url: format!("http://{addr}{}", crate::PATH_RPC),
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for FaultServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}

async fn serve(mut stream: TcpStream, fault: Fault) -> io::Result<()> {
    read_request(&mut stream).await?;

    match fault {
        Fault::KillConn => {}
        Fault::FlushAndKill => {
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n9\r\nsome data\r\n",
                )
                .await?;
            stream.flush().await?;
        }
        Fault::Status(code) => {
            let head = format!("HTTP/1.1 {code} Fault\r\ncontent-length: 0\r\n\r\n");
            stream.write_all(head.as_bytes()).await?;
            stream.flush().await?;
        }
        Fault::Stall => sleep(STALL_FOR).await,
    }

    Ok(())
}

/// Consumes the request head and a `content-length` body so closing the socket is a clean EOF.
async fn read_request(stream: &mut TcpStream) -> io::Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let body_len = content_length(&buf[..head_end]);
    let mut have = buf.len() - head_end;
    while have < body_len {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        have += n;
    }
    Ok(())
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| p + 4)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (k, v) = line.split_once(':')?;
            if !k.trim().eq_ignore_ascii_case("content-length") {
                return None;
            }
            v.trim().parse().ok()
        })
        .unwrap_or(0)
}
