//! Protocol constants fixed by the AMQP 0-9-1 specification.

/// Frame type byte for method frames.
pub const FRAME_METHOD: u8 = 1;

/// Frame type byte for content header frames.
pub const FRAME_HEADER: u8 = 2;

/// Frame type byte for content body frames.
pub const FRAME_BODY: u8 = 3;

/// Frame type byte for heartbeat frames.
pub const FRAME_HEARTBEAT: u8 = 8;

/// Marker byte terminating every frame on the wire.
pub const FRAME_END: u8 = 0xCE;

/// Size of the fixed frame header: type (1) + channel (2) + payload length (4).
pub const FRAME_HEADER_SIZE: usize = 7;

/// Size of the frame end marker.
pub const FRAME_FOOTER_SIZE: usize = 1;

/// Per-frame wire overhead around the payload.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_SIZE + FRAME_FOOTER_SIZE;

/// Literal protocol header opening a fresh connection.
pub const PROTOCOL_HEADER: [u8; 8] = *b"AMQP\x00\x00\x09\x01";

/// Prefix shared by every protocol header.
pub const PROTOCOL_HEADER_PREFIX: &[u8; 4] = b"AMQP";

/// Protocol major version.
pub const MAJOR: u8 = 0;

/// Protocol minor version.
pub const MINOR: u8 = 9;

/// Protocol revision.
pub const REVISION: u8 = 1;

/// Maximum nesting depth accepted when decoding field tables and arrays.
///
/// The wire format itself places no bound on nesting, which would let an
/// adversarial peer drive unbounded recursion.
pub const MAX_NESTING_DEPTH: u8 = 32;

/// Default `frame-max` proposed during tuning.
pub const DEFAULT_FRAME_MAX: u32 = 131_072;

/// Default `channel-max` proposed during tuning.
pub const DEFAULT_CHANNEL_MAX: u16 = 2047;

/// Default port for unencrypted AMQP connections.
pub const DEFAULT_PORT: u16 = 5672;
