//! Connection lifecycle: protocol handshake, frame transport and the
//! buffering that keeps multiplexed channels from stealing each other's
//! frames.

use std::collections::VecDeque;
use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::constants::{DEFAULT_CHANNEL_MAX, DEFAULT_FRAME_MAX, PROTOCOL_HEADER};
use crate::error::Error;
use crate::frames::{Frame, FrameDecoder, FrameEncoder, FramePayload};
use crate::methods::{connection, Method};
use crate::pool::FramePool;
use crate::transport::Transport;
use crate::value::Table;

mod api;
mod rpc;

pub use rpc::RpcOutcome;

/// Bytes pulled from the transport per read.
const READ_CHUNK: usize = 4096;

const UNUSABLE: Error = Error::BadWireData("connection unusable after earlier failure");

/// Parameters for opening a connection.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Virtual host to open.
    pub vhost: String,
    /// Highest channel number this client wants, 0 meaning no limit.
    pub channel_max: u16,
    /// Largest frame size this client wants, 0 meaning no limit.
    pub frame_max: u32,
    /// Heartbeat delay in seconds this client wants, 0 to disable.
    pub heartbeat: u16,
    /// Message locale to select.
    pub locale: String,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            username: "guest".to_owned(),
            password: "guest".to_owned(),
            vhost: "/".to_owned(),
            channel_max: DEFAULT_CHANNEL_MAX,
            frame_max: DEFAULT_FRAME_MAX,
            heartbeat: 0,
            locale: "en_US".to_owned(),
        }
    }
}

/// One open connection to a broker, multiplexing channels over a single
/// transport.
///
/// All operations block the calling thread; the connection holds mutable
/// state with no internal synchronization, so sharing one across threads
/// needs external mutual exclusion. Any transport or framing failure
/// leaves the connection unusable: frame boundaries cannot be recovered
/// once lost, so every later call fails until the connection is dropped
/// and reopened.
#[derive(Debug)]
pub struct Connection<T> {
    transport: T,
    channel_max: u16,
    frame_max: u32,
    heartbeat: u16,
    pool: FramePool,
    decoder: FrameDecoder,
    encoder: FrameEncoder,
    outbound: BytesMut,
    /// Frames that arrived while an RPC on a different channel was
    /// waiting; later calls drain these in arrival order before reading
    /// from the transport.
    parked: VecDeque<Frame>,
    last_rpc: Option<RpcOutcome>,
    poisoned: bool,
}

fn negotiate_u16(client: u16, server: u16) -> u16 {
    match (client, server) {
        (0, server) => server,
        (client, 0) => client,
        (client, server) => client.min(server),
    }
}

fn negotiate_u32(client: u32, server: u32) -> u32 {
    match (client, server) {
        (0, server) => server,
        (client, 0) => client,
        (client, server) => client.min(server),
    }
}

/// Frame size limit as a buffer bound; 0 on the wire means unlimited.
fn effective_frame_max(frame_max: u32) -> usize {
    if frame_max == 0 {
        usize::MAX
    } else {
        frame_max as usize
    }
}

fn client_properties() -> Table {
    let mut props = Table::new();
    props.insert("product", env!("CARGO_PKG_NAME"));
    props.insert("version", env!("CARGO_PKG_VERSION"));
    props.insert("platform", "Rust");
    props
}

impl<T: Transport> Connection<T> {
    /// Opens a connection over `transport`: sends the protocol header and
    /// runs the start/tune/open handshake.
    ///
    /// Fails with [`Error::IncompatibleVersion`] if the broker answers
    /// the protocol header with its own, and [`Error::BrokerRejected`] if
    /// it refuses the credentials or virtual host.
    pub fn open(mut transport: T, options: ConnectionOptions) -> Result<Self, Error> {
        transport.write_all(&PROTOCOL_HEADER)?;
        let frame_max = effective_frame_max(options.frame_max);
        let mut conn = Self {
            transport,
            channel_max: options.channel_max,
            frame_max: options.frame_max,
            heartbeat: options.heartbeat,
            pool: FramePool::new(frame_max.saturating_add(READ_CHUNK)),
            decoder: FrameDecoder::new(frame_max),
            encoder: FrameEncoder::new(frame_max),
            outbound: BytesMut::new(),
            parked: VecDeque::new(),
            last_rpc: None,
            poisoned: false,
        };
        conn.handshake(&options)?;
        Ok(conn)
    }

    fn handshake(&mut self, options: &ConnectionOptions) -> Result<(), Error> {
        let start = match self.expect_handshake_method()? {
            Method::ConnectionStart(start) => start,
            _ => return Err(self.poison(Error::BadWireData("expected connection.start"))),
        };
        debug!(
            version_major = start.version_major,
            version_minor = start.version_minor,
            "connection.start received"
        );

        // SASL PLAIN: empty authzid, then authcid and password, NUL-separated
        let mut response = BytesMut::new();
        response.put_u8(0);
        response.put_slice(options.username.as_bytes());
        response.put_u8(0);
        response.put_slice(options.password.as_bytes());
        self.send_method(
            0,
            Method::ConnectionStartOk(connection::StartOk {
                client_properties: client_properties(),
                mechanism: Bytes::from_static(b"PLAIN"),
                response: response.freeze(),
                locale: Bytes::from(options.locale.clone()),
            }),
        )?;

        let tune = match self.expect_handshake_method()? {
            Method::ConnectionTune(tune) => tune,
            _ => return Err(self.poison(Error::BadWireData("expected connection.tune"))),
        };
        self.channel_max = negotiate_u16(options.channel_max, tune.channel_max);
        self.frame_max = negotiate_u32(options.frame_max, tune.frame_max);
        self.heartbeat = negotiate_u16(options.heartbeat, tune.heartbeat);
        let frame_max = effective_frame_max(self.frame_max);
        self.decoder.set_frame_max(frame_max);
        self.encoder.set_frame_max(frame_max);
        self.pool.set_capacity(frame_max.saturating_add(READ_CHUNK));
        debug!(
            channel_max = self.channel_max,
            frame_max = self.frame_max,
            heartbeat = self.heartbeat,
            "limits negotiated"
        );
        self.send_method(
            0,
            Method::ConnectionTuneOk(connection::TuneOk {
                channel_max: self.channel_max,
                frame_max: self.frame_max,
                heartbeat: self.heartbeat,
            }),
        )?;

        self.send_method(
            0,
            Method::ConnectionOpen(connection::Open {
                virtual_host: Bytes::from(options.vhost.clone()),
                ..Default::default()
            }),
        )?;
        match self.expect_handshake_method()? {
            Method::ConnectionOpenOk(_) => Ok(()),
            _ => Err(self.poison(Error::BadWireData("expected connection.open-ok"))),
        }
    }

    /// Pulls the next method frame on channel 0, turning a broker-side
    /// `connection.close` into [`Error::BrokerRejected`].
    fn expect_handshake_method(&mut self) -> Result<Method, Error> {
        let frame = self.recv_frame()?;
        match frame.payload {
            FramePayload::Method(Method::ConnectionClose(close)) => {
                self.poisoned = true;
                let reply_text = String::from_utf8_lossy(&close.reply_text).into_owned();
                self.last_rpc = Some(RpcOutcome::Rejected {
                    reply_code: close.reply_code,
                    reply_text: reply_text.clone(),
                    class_id: close.class_id,
                    method_id: close.method_id,
                });
                Err(Error::BrokerRejected {
                    reply_code: close.reply_code,
                    reply_text,
                    class_id: close.class_id,
                    method_id: close.method_id,
                })
            }
            FramePayload::Method(method) if frame.channel == 0 => Ok(method),
            _ => Err(self.poison(Error::BadWireData("unexpected frame during handshake"))),
        }
    }

    fn poison(&mut self, err: Error) -> Error {
        self.poisoned = true;
        err
    }

    pub(crate) fn check_usable(&self) -> Result<(), Error> {
        if self.poisoned {
            return Err(UNUSABLE);
        }
        Ok(())
    }

    pub(crate) fn mark_poisoned(&mut self) {
        self.poisoned = true;
    }

    /// Writes one frame to the transport.
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        self.check_usable()?;
        self.outbound.clear();
        self.encoder.encode(frame, &mut self.outbound)?;
        trace!(channel = frame.channel, len = self.outbound.len(), "frame sent");
        let outbound = self.outbound.split();
        match self.transport.write_all(&outbound) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.poison(err)),
        }
    }

    /// Sends one method frame on `channel`.
    pub fn send_method(&mut self, channel: u16, method: Method) -> Result<(), Error> {
        self.send_frame(&Frame {
            channel,
            payload: FramePayload::Method(method),
        })
    }

    /// Sends a heartbeat frame.
    pub fn send_heartbeat(&mut self) -> Result<(), Error> {
        self.send_frame(&Frame {
            channel: 0,
            payload: FramePayload::Heartbeat,
        })
    }

    /// Returns the next frame: the oldest parked frame if any, otherwise
    /// the next one read off the transport.
    pub fn wait_frame(&mut self) -> Result<Frame, Error> {
        if let Some(frame) = self.parked.pop_front() {
            return Ok(frame);
        }
        self.recv_frame()
    }

    /// Reads the next frame off the transport, bypassing parked frames.
    pub(crate) fn recv_frame(&mut self) -> Result<Frame, Error> {
        self.check_usable()?;
        loop {
            match self.decoder.decode(&mut self.pool) {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {
                    if let Err(err) = self.read_more() {
                        return Err(self.poison(err));
                    }
                }
                Err(err) => return Err(self.poison(err)),
            }
        }
    }

    fn read_more(&mut self) -> Result<(), Error> {
        // between frames, with nothing buffered, is the only point where
        // releasing the backing allocation cannot invalidate a frame
        if self.decoder.is_idle() && self.pool.is_empty() {
            self.pool.recycle();
        }
        let mut scratch = [0u8; READ_CHUNK];
        let n = self.transport.read(&mut scratch)?;
        if n == 0 {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            )));
        }
        self.pool.extend(&scratch[..n])
    }

    /// Negotiated channel number limit.
    pub fn channel_max(&self) -> u16 {
        self.channel_max
    }

    /// Negotiated frame size limit.
    pub fn frame_max(&self) -> u32 {
        self.frame_max
    }

    /// Negotiated heartbeat delay in seconds, 0 when disabled.
    pub fn heartbeat(&self) -> u16 {
        self.heartbeat
    }

    /// Outcome of the most recent RPC round trip, if any. Retained until
    /// the next call resolves, so a caller can re-inspect the last reply
    /// or rejection after the fact.
    pub fn last_rpc(&self) -> Option<&RpcOutcome> {
        self.last_rpc.as_ref()
    }

    /// Whether the connection can still be used. Once false it never
    /// becomes true again.
    pub fn is_usable(&self) -> bool {
        !self.poisoned
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiation_takes_the_smaller_nonzero_limit() {
        assert_eq!(negotiate_u16(2047, 1024), 1024);
        assert_eq!(negotiate_u16(1024, 2047), 1024);
        assert_eq!(negotiate_u16(0, 2047), 2047);
        assert_eq!(negotiate_u16(2047, 0), 2047);
        assert_eq!(negotiate_u32(0, 0), 0);
        assert_eq!(negotiate_u32(131_072, 4096), 4096);
    }

    #[test]
    fn zero_frame_max_means_unlimited() {
        assert_eq!(effective_frame_max(0), usize::MAX);
        assert_eq!(effective_frame_max(4096), 4096);
    }
}
