//! TCP session: connect once, send whole frames, block for replies.
//!
//! The session has no retry, reconnection, or timeout logic. Framing is
//! length-implicit: one `send` call conveys one request and one `receive`
//! call is assumed to return one whole response. Once the peer closes the
//! connection or a transport error occurs the session is not reused.

use bytes::Bytes;
use std::io::{Read, Write};
use std::net::TcpStream;
use tracing::{debug, info};

/// A connected session over a bidirectional byte stream.
///
/// Generic over the stream so tests can substitute an in-memory transport;
/// production code always uses `TcpStream`.
pub struct Session<S> {
    stream: S,
    recv_buf: Vec<u8>,
}

impl Session<TcpStream> {
    /// Establish the TCP connection.
    ///
    /// Failure here is fatal to the process: no request is ever sent on a
    /// session that did not open.
    pub fn open(host: &str, port: u16, capacity: usize) -> Result<Self, SessionError> {
        let stream = TcpStream::connect((host, port))
            .map_err(|e| SessionError::Connect(host.to_string(), port, e))?;
        info!(host, port, "connected");
        Ok(Self::over(stream, capacity))
    }
}

impl<S: Read + Write> Session<S> {
    /// Wrap an already-connected stream.
    pub fn over(stream: S, capacity: usize) -> Self {
        Session {
            stream,
            recv_buf: vec![0u8; capacity],
        }
    }

    /// Write one whole request frame to the transport.
    pub fn send(&mut self, frame: &[u8]) -> Result<(), SessionError> {
        self.stream.write_all(frame).map_err(SessionError::Send)?;
        debug!(len = frame.len(), "frame sent");
        Ok(())
    }

    /// Block until the peer sends something or closes the connection.
    ///
    /// An empty result signals peer closure. A non-responding peer blocks
    /// indefinitely; the protocol applies no timeout.
    pub fn receive(&mut self) -> Result<Bytes, SessionError> {
        let n = self
            .stream
            .read(&mut self.recv_buf)
            .map_err(SessionError::Receive)?;
        debug!(len = n, "payload received");
        Ok(Bytes::copy_from_slice(&self.recv_buf[..n]))
    }

    /// Get a reference to the underlying stream for testing
    #[cfg(test)]
    pub fn stream(&self) -> &S {
        &self.stream
    }
}

/// Transport-level session errors. All of them are fatal.
#[derive(Debug)]
pub enum SessionError {
    /// Connection establishment failed, refused or otherwise.
    Connect(String, u16, std::io::Error),
    /// A send did not transmit the whole frame.
    Send(std::io::Error),
    /// A receive failed for a reason other than clean closure.
    Receive(std::io::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Connect(host, port, e) => {
                write!(f, "Failed to connect to {}:{}: {}", host, port, e)
            }
            SessionError::Send(e) => write!(f, "Send failed: {}", e),
            SessionError::Receive(e) => write!(f, "Receive failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}
