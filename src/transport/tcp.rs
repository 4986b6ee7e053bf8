use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::{Connector, Transport};

/// Default timeout for writing one frame (30 seconds).
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size (64 KiB). Snapshots are a few hundred bytes.
const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

const LEN_PREFIX: usize = 4;

/// Length-prefixed bincode frames over TCP.
///
/// `recv` only moves bytes into its internal buffer after a completed read,
/// so dropping a pending `recv` (e.g. inside `tokio::select!`) never loses
/// part of a frame.
pub struct TcpTransport {
    stream: TcpStream,
    read_buf: Vec<u8>,
    send_timeout: Duration,
    recv_timeout: Option<Duration>,
    max_message_size: u32,
    closed: bool,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            read_buf: Vec::new(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            recv_timeout: None,
            max_message_size: MAX_MESSAGE_SIZE,
            closed: false,
        }
    }

    pub fn with_config(
        stream: TcpStream,
        send_timeout: Duration,
        recv_timeout: Option<Duration>,
        max_message_size: u32,
    ) -> Self {
        Self {
            send_timeout,
            recv_timeout,
            max_message_size,
            ..Self::new(stream)
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }

    /// Split one complete frame off the front of the read buffer.
    fn take_frame(&mut self) -> anyhow::Result<Option<Message>> {
        if self.read_buf.len() < LEN_PREFIX {
            return Ok(None);
        }
        let mut len_buf = [0u8; LEN_PREFIX];
        len_buf.copy_from_slice(&self.read_buf[..LEN_PREFIX]);
        let len = u32::from_be_bytes(len_buf);

        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let end = LEN_PREFIX + len as usize;
        if self.read_buf.len() < end {
            return Ok(None);
        }
        let msg = bincode::deserialize(&self.read_buf[LEN_PREFIX..end])
            .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e));
        self.read_buf.drain(..end);
        msg.map(Some)
    }

    async fn read_frame(&mut self) -> anyhow::Result<Message> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(msg) = self.take_frame()? {
                return Ok(msg);
            }
            let n = self.stream.read(&mut chunk).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::ConnectionReset {
                    anyhow::anyhow!("Connection reset by peer")
                } else {
                    anyhow::anyhow!("Read error: {}", e)
                }
            })?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.read_buf.extend_from_slice(&chunk[..n]);
        }
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is closed"));
        }

        let data = bincode::serialize(&msg)
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() as u32 > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                self.max_message_size
            ));
        }

        let mut frame = Vec::with_capacity(LEN_PREFIX + data.len());
        frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
        frame.extend_from_slice(&data);

        timeout(self.send_timeout, self.stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.send_timeout))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::BrokenPipe
                    || e.kind() == std::io::ErrorKind::ConnectionReset
                {
                    anyhow::anyhow!("Connection closed by peer")
                } else {
                    anyhow::anyhow!("Write error: {}", e)
                }
            })
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is closed"));
        }
        match self.recv_timeout {
            Some(limit) => timeout(limit, self.read_frame())
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))?,
            None => self.read_frame().await,
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Peer may already be gone; nothing left to flush in that case.
        let _ = self.stream.shutdown().await;
        Ok(())
    }
}

/// Dials the referee over TCP for each new channel.
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait::async_trait]
impl Connector for TcpConnector {
    async fn open(&mut self) -> anyhow::Result<Box<dyn Transport>> {
        let transport = TcpTransport::connect(self.addr.as_str()).await?;
        Ok(Box::new(transport))
    }
}
