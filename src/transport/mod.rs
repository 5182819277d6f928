// MIT License - Copyright (c) 2026 Peter Wright
// Panel transport

pub mod tcp;

use std::time::Duration;

use crate::error::Result;

pub use tcp::TcpTransport;

/// Byte-stream connection to the panel, as seen by the log reader.
///
/// Implemented by [`TcpTransport`]; tests drive the reader with scripted
/// implementations.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Write a complete request frame.
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Wait up to `timeout` for the next chunk of incoming bytes.
    ///
    /// Returns [`SatelError::RequestTimeout`](crate::error::SatelError::RequestTimeout)
    /// when nothing arrives in time and
    /// [`SatelError::Disconnected`](crate::error::SatelError::Disconnected)
    /// when the peer has closed the connection. A chunk may hold part of a
    /// frame, a whole frame or more.
    async fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    /// Shut the connection down.
    async fn close(&mut self) -> Result<()>;
}
