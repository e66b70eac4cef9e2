//! Byte transports carrying frames to and from the broker.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::error::Error;

/// A blocking byte stream the connection reads frames from and writes
/// frames to.
///
/// Implementations report failures as [`Error::Transport`]; the
/// connection treats any transport error as fatal.
pub trait Transport {
    /// Reads available bytes into `buf`, returning how many were read.
    /// Returning 0 means the peer closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Writes all of `buf`.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error>;

    /// Shuts the stream down. Errors are reported but the stream is
    /// considered closed either way.
    fn close(&mut self) -> Result<(), Error>;
}

/// TCP transport over a blocking [`TcpStream`].
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connects to `host:port`.
    ///
    /// Resolution failures and names resolving to no address surface as
    /// [`Error::HostResolution`]. Nagle's algorithm is disabled; frames
    /// are written whole and waiting to batch them only delays RPC
    /// replies.
    pub fn connect(host: &str, port: u16) -> Result<Self, Error> {
        let mut addrs = (host, port)
            .to_socket_addrs()
            .map_err(|err| Error::HostResolution(format!("{host}: {err}")))?
            .peekable();
        if addrs.peek().is_none() {
            return Err(Error::HostResolution(format!(
                "{host}: no addresses resolved"
            )));
        }

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!(%addr, "connected");
                    return Ok(Self { stream });
                }
                Err(err) => last_err = Some(err),
            }
        }
        match last_err {
            Some(err) => Err(Error::Transport(err)),
            None => Err(Error::HostResolution(format!(
                "{host}: no addresses resolved"
            ))),
        }
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        Ok(self.stream.read(buf)?)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        Ok(self.stream.write_all(buf)?)
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(self.stream.shutdown(Shutdown::Both)?)
    }
}
