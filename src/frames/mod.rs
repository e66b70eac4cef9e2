//! Frame assembly and emission.
//!
//! On the wire every frame is a fixed 7-byte header (type, channel,
//! payload length), the payload, and a single end marker byte. The
//! decoder accumulates inbound bytes in a [`FramePool`] and yields one
//! decoded [`Frame`] at a time, returning `Ok(None)` until a complete
//! frame has arrived. Each completed payload is frozen into its own pool
//! generation, so method arguments and body fragments decoded from it
//! stay valid without copying.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::constants::{
    FRAME_BODY, FRAME_END, FRAME_FOOTER_SIZE, FRAME_HEADER, FRAME_HEADER_SIZE, FRAME_HEARTBEAT,
    FRAME_METHOD, FRAME_OVERHEAD, MAJOR, MINOR, PROTOCOL_HEADER_PREFIX, REVISION,
};
use crate::content::ContentHeader;
use crate::error::Error;
use crate::methods::Method;
use crate::pool::FramePool;
use crate::wire;

/// The 8-byte header opening a connection, naming the protocol version
/// the sender speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolHeader {
    /// Protocol major version.
    pub major: u8,
    /// Protocol minor version.
    pub minor: u8,
    /// Protocol revision.
    pub revision: u8,
}

impl Default for ProtocolHeader {
    fn default() -> Self {
        Self {
            major: MAJOR,
            minor: MINOR,
            revision: REVISION,
        }
    }
}

impl TryFrom<[u8; 8]> for ProtocolHeader {
    type Error = Error;

    fn try_from(value: [u8; 8]) -> Result<Self, Self::Error> {
        if &value[..4] != PROTOCOL_HEADER_PREFIX || value[4] != 0 {
            return Err(Error::BadWireData("malformed protocol header"));
        }
        Ok(Self {
            major: value[5],
            minor: value[6],
            revision: value[7],
        })
    }
}

impl From<ProtocolHeader> for [u8; 8] {
    fn from(value: ProtocolHeader) -> Self {
        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(PROTOCOL_HEADER_PREFIX);
        buf[5] = value.major;
        buf[6] = value.minor;
        buf[7] = value.revision;
        buf
    }
}

/// One fully assembled frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Channel the frame belongs to; 0 is the connection channel.
    pub channel: u16,
    /// Decoded frame payload.
    pub payload: FramePayload,
}

/// Payload of an assembled frame, decoded per frame type.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    /// A method with its arguments.
    Method(Method),
    /// A content header preceding body frames.
    Header(ContentHeader),
    /// One fragment of a message body.
    Body(Bytes),
    /// A heartbeat; always on channel 0 with an empty payload.
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Between frames. The only state in which the pool may be recycled.
    Idle,
    /// Fixed header consumed; collecting the payload and end marker.
    AwaitingBody {
        frame_type: u8,
        channel: u16,
        size: usize,
    },
}

/// Incremental frame assembler.
///
/// Feed inbound bytes into the pool, then call [`decode`] until it
/// returns `Ok(None)`. Any error poisons the stream: framing state is
/// unrecoverable once the peer desynchronizes, so callers must discard
/// the connection.
///
/// [`decode`]: FrameDecoder::decode
#[derive(Debug)]
pub struct FrameDecoder {
    state: DecodeState,
    frame_max: usize,
    /// Until the first frame arrives the peer may still answer our
    /// protocol header with its own, signalling a version mismatch.
    fresh: bool,
}

impl FrameDecoder {
    /// Creates a decoder accepting payloads up to `frame_max` total frame
    /// bytes, as negotiated during tuning.
    pub fn new(frame_max: usize) -> Self {
        Self {
            state: DecodeState::Idle,
            frame_max,
            fresh: true,
        }
    }

    /// Whether no frame is currently mid-assembly.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::Idle
    }

    /// Applies a renegotiated `frame-max`.
    pub fn set_frame_max(&mut self, frame_max: usize) {
        self.frame_max = frame_max;
    }

    /// Assembles the next frame from the pool's pending bytes.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Consumed payloads
    /// are frozen into their own pool generation; the fixed header and
    /// end marker are discarded.
    pub fn decode(&mut self, pool: &mut FramePool) -> Result<Option<Frame>, Error> {
        if self.state == DecodeState::Idle {
            if self.fresh && pool.pending().first() == Some(&PROTOCOL_HEADER_PREFIX[0]) {
                if pool.len() < 8 {
                    return Ok(None);
                }
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&pool.pending()[..8]);
                let header = ProtocolHeader::try_from(raw)?;
                pool.advance(8);
                self.fresh = false;
                if header != ProtocolHeader::default() {
                    // the peer only echoes a header back to refuse our version
                    return Err(Error::IncompatibleVersion {
                        major: header.major,
                        minor: header.minor,
                        revision: header.revision,
                    });
                }
                trace!("matching protocol header consumed");
            }
            if pool.len() < FRAME_HEADER_SIZE {
                return Ok(None);
            }
            let pending = pool.pending();
            let frame_type = wire::read_u8(pending, 0)?;
            let channel = wire::read_u16(pending, 1)?;
            let size = wire::read_u32(pending, 3)? as usize;
            match frame_type {
                FRAME_METHOD | FRAME_HEADER | FRAME_BODY | FRAME_HEARTBEAT => {}
                _ => return Err(Error::BadWireData("unknown frame type")),
            }
            if size + FRAME_OVERHEAD > self.frame_max {
                return Err(Error::BadWireData("frame exceeds negotiated frame-max"));
            }
            pool.advance(FRAME_HEADER_SIZE);
            self.state = DecodeState::AwaitingBody {
                frame_type,
                channel,
                size,
            };
        }

        let (frame_type, channel, size) = match self.state {
            DecodeState::AwaitingBody {
                frame_type,
                channel,
                size,
            } => (frame_type, channel, size),
            DecodeState::Idle => return Ok(None),
        };

        if pool.len() < size + FRAME_FOOTER_SIZE {
            return Ok(None);
        }
        if pool.pending()[size] != FRAME_END {
            return Err(Error::BadWireData("missing frame end marker"));
        }
        let payload = pool.freeze(size);
        pool.advance(FRAME_FOOTER_SIZE);
        self.state = DecodeState::Idle;
        self.fresh = false;

        trace!(frame_type, channel, size, "frame assembled");
        let payload = match frame_type {
            FRAME_METHOD => FramePayload::Method(Method::decode(&payload)?),
            FRAME_HEADER => FramePayload::Header(ContentHeader::decode(&payload)?),
            FRAME_BODY => FramePayload::Body(payload),
            _ => {
                if channel != 0 || !payload.is_empty() {
                    return Err(Error::BadWireData("malformed heartbeat frame"));
                }
                FramePayload::Heartbeat
            }
        };
        Ok(Some(Frame { channel, payload }))
    }
}

/// Serializes frames onto an outbound buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    frame_max: usize,
}

impl FrameEncoder {
    /// Creates an encoder refusing frames over `frame_max` total bytes.
    pub fn new(frame_max: usize) -> Self {
        Self { frame_max }
    }

    /// Applies a renegotiated `frame-max`.
    pub fn set_frame_max(&mut self, frame_max: usize) {
        self.frame_max = frame_max;
    }

    /// Appends one wire-complete frame to `dst`.
    pub fn encode(&self, frame: &Frame, dst: &mut BytesMut) -> Result<(), Error> {
        let start = dst.len();
        match &frame.payload {
            FramePayload::Method(_) => dst.put_u8(FRAME_METHOD),
            FramePayload::Header(_) => dst.put_u8(FRAME_HEADER),
            FramePayload::Body(_) => dst.put_u8(FRAME_BODY),
            FramePayload::Heartbeat => dst.put_u8(FRAME_HEARTBEAT),
        }
        dst.put_u16(frame.channel);
        let size_at = dst.len();
        dst.put_u32(0);

        let payload_at = dst.len();
        match &frame.payload {
            FramePayload::Method(method) => method.encode(dst)?,
            FramePayload::Header(header) => header.encode(dst)?,
            FramePayload::Body(body) => dst.put_slice(body),
            FramePayload::Heartbeat => {}
        }
        let size = dst.len() - payload_at;
        wire::write_u32(&mut dst[..], size_at, size as u32)?;
        dst.put_u8(FRAME_END);

        if dst.len() - start > self.frame_max {
            return Err(Error::BadWireData("frame exceeds negotiated frame-max"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_FRAME_MAX;
    use crate::methods::{channel, queue};

    fn encode_frames(frames: &[Frame]) -> Vec<u8> {
        let encoder = FrameEncoder::new(DEFAULT_FRAME_MAX as usize);
        let mut dst = BytesMut::new();
        for frame in frames {
            encoder.encode(frame, &mut dst).unwrap();
        }
        dst.to_vec()
    }

    fn sample_frames() -> Vec<Frame> {
        vec![
            Frame {
                channel: 1,
                payload: FramePayload::Method(Method::ChannelOpenOk(channel::OpenOk::default())),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Method(Method::QueueDeclareOk(queue::DeclareOk {
                    queue: Bytes::from_static(b"work"),
                    message_count: 3,
                    consumer_count: 1,
                })),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Header(ContentHeader::basic(11, Default::default())),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Body(Bytes::from_static(b"hello world")),
            },
            Frame {
                channel: 0,
                payload: FramePayload::Heartbeat,
            },
        ]
    }

    #[test]
    fn frame_sequence_roundtrips() {
        let frames = sample_frames();
        let wire = encode_frames(&frames);

        let mut pool = FramePool::new(wire.len());
        pool.extend(&wire).unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);

        let mut decoded = Vec::new();
        while let Some(frame) = decoder.decode(&mut pool).unwrap() {
            decoded.push(frame);
        }
        assert_eq!(decoded, frames);
        assert!(pool.is_empty());
        assert!(decoder.is_idle());
    }

    #[test]
    fn partial_input_yields_none_byte_at_a_time() {
        let frames = sample_frames();
        let wire = encode_frames(&frames);

        let mut pool = FramePool::new(wire.len());
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        let mut decoded = Vec::new();
        for (i, byte) in wire.iter().enumerate() {
            pool.extend(&[*byte]).unwrap();
            while let Some(frame) = decoder.decode(&mut pool).unwrap() {
                decoded.push(frame);
            }
            // a frame completes only on its end marker
            if *byte != FRAME_END || decoded.is_empty() {
                continue;
            }
            assert_eq!(i + 1, encode_frames(&frames[..decoded.len()]).len());
        }
        assert_eq!(decoded, frames);
    }

    #[test]
    fn missing_end_marker_is_rejected() {
        let mut wire = encode_frames(&sample_frames()[..1]);
        let last = wire.len() - 1;
        wire[last] = 0x00;

        let mut pool = FramePool::new(wire.len());
        pool.extend(&wire).unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        assert!(matches!(
            decoder.decode(&mut pool),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn unknown_frame_type_is_rejected() {
        let mut wire = encode_frames(&sample_frames()[..1]);
        wire[0] = 9;

        let mut pool = FramePool::new(wire.len());
        pool.extend(&wire).unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        assert!(matches!(
            decoder.decode(&mut pool),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn oversized_frame_is_rejected_before_buffering_its_payload() {
        let frame = Frame {
            channel: 1,
            payload: FramePayload::Body(Bytes::from(vec![0u8; 64])),
        };
        let encoder = FrameEncoder::new(DEFAULT_FRAME_MAX as usize);
        let mut dst = BytesMut::new();
        encoder.encode(&frame, &mut dst).unwrap();

        let mut pool = FramePool::new(dst.len());
        // only the fixed header is needed to detect the violation
        pool.extend(&dst[..FRAME_HEADER_SIZE]).unwrap();
        let mut decoder = FrameDecoder::new(32);
        assert!(matches!(
            decoder.decode(&mut pool),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn encoder_refuses_frames_over_frame_max() {
        let frame = Frame {
            channel: 1,
            payload: FramePayload::Body(Bytes::from(vec![0u8; 64])),
        };
        let encoder = FrameEncoder::new(32);
        let mut dst = BytesMut::new();
        assert!(matches!(
            encoder.encode(&frame, &mut dst),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn mismatched_protocol_header_reports_the_peer_version() {
        let mut pool = FramePool::new(16);
        pool.extend(b"AMQP\x00\x01\x00\x00").unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        assert!(matches!(
            decoder.decode(&mut pool),
            Err(Error::IncompatibleVersion {
                major: 1,
                minor: 0,
                revision: 0,
            })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn matching_protocol_header_is_consumed_without_a_frame() {
        let frames = vec![
            Frame {
                channel: 1,
                payload: FramePayload::Method(Method::BasicGet(crate::methods::basic::Get {
                    queue: Bytes::from_static(b"work"),
                    ..Default::default()
                })),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Header(ContentHeader::basic(6, Default::default())),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Body(Bytes::from_static(b"ab")),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Body(Bytes::from_static(b"cd")),
            },
            Frame {
                channel: 1,
                payload: FramePayload::Body(Bytes::from_static(b"ef")),
            },
        ];
        let mut wire = b"AMQP\x00\x00\x09\x01".to_vec();
        wire.extend(encode_frames(&frames));

        let mut pool = FramePool::new(wire.len());
        pool.extend(&wire).unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        let mut decoded = Vec::new();
        while let Some(frame) = decoder.decode(&mut pool).unwrap() {
            decoded.push(frame);
        }
        assert_eq!(decoded, frames);
        assert!(decoder.is_idle());
    }

    #[test]
    fn heartbeat_on_nonzero_channel_is_rejected() {
        let wire = [FRAME_HEARTBEAT, 0, 5, 0, 0, 0, 0, FRAME_END];
        let mut pool = FramePool::new(wire.len());
        pool.extend(&wire).unwrap();
        let mut decoder = FrameDecoder::new(DEFAULT_FRAME_MAX as usize);
        assert!(matches!(
            decoder.decode(&mut pool),
            Err(Error::BadWireData(_))
        ));
    }
}
