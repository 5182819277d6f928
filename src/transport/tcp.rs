// MIT License - Copyright (c) 2026 Peter Wright
// TCP transport

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::ReaderConfig;
use crate::error::{Result, SatelError};
use crate::transport::Transport;

const READ_BUFFER_SIZE: usize = 2048;

/// Direct TCP connection to the panel's integration module.
pub struct TcpTransport {
    stream: TcpStream,
    buf: Vec<u8>,
}

impl TcpTransport {
    /// Open the connection, giving up after `connect_timeout_ms`.
    pub async fn connect(config: &ReaderConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        info!("Connecting to panel at {}", addr);

        let stream = timeout(config.connect_timeout(), TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                error!("TCP connect to {} timed out", addr);
                SatelError::ConnectionTimeout { addr: addr.clone() }
            })?
            .map_err(|e| {
                error!("TCP connect failed: {}", e);
                SatelError::Io(e)
            })?;

        // Requests are tiny and strictly request/response
        stream.set_nodelay(true)?;
        debug!("TCP socket connected");

        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            stream,
            buf: vec![0u8; READ_BUFFER_SIZE],
        }
    }
}

impl Transport for TcpTransport {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await.map_err(|e| {
            error!("Failed to write request: {}", e);
            SatelError::Io(e)
        })
    }

    async fn receive(&mut self, limit: Duration) -> Result<Vec<u8>> {
        match timeout(limit, self.stream.read(&mut self.buf)).await {
            Err(_) => Err(SatelError::RequestTimeout),
            Ok(Ok(0)) => {
                debug!("Connection closed by panel");
                Err(SatelError::Disconnected)
            }
            Ok(Ok(n)) => Ok(self.buf[..n].to_vec()),
            Ok(Err(e)) => {
                error!("Read error: {}", e);
                Err(SatelError::Io(e))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Closing panel connection");
        self.stream.shutdown().await?;
        Ok(())
    }
}
