//! Error taxonomy shared across the crate.

use std::io;

/// Errors surfaced by the codec, framing and RPC layers.
///
/// Every variant other than [`Error::Transport`] and
/// [`Error::HostResolution`] is library-internal; the two OS-level variants
/// wrap the platform failure so callers never need platform-specific error
/// constants. See [`Error::is_os_error`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A decode buffer would exceed its configured capacity limit
    #[error("Memory limit exceeded")]
    NoMemory,

    /// Malformed wire data: bad table/array/field encoding, a frame end
    /// marker mismatch, or truncated input
    #[error("Bad AMQP data: {0}")]
    BadWireData(&'static str),

    /// A method frame referenced a class id this client does not know
    #[error("Unknown AMQP class id {0}")]
    UnknownClass(u16),

    /// A method frame referenced a method id unknown within its class
    #[error("Unknown AMQP method id {method_id} in class {class_id}")]
    UnknownMethod {
        /// Class id carried by the frame
        class_id: u16,
        /// Method id carried by the frame
        method_id: u16,
    },

    /// A read or write would touch memory past the end of a buffer view
    #[error("Offset {offset} + length {len} out of bounds for buffer of {size} bytes")]
    OffsetOutOfBounds {
        /// Offset the access started at
        offset: usize,
        /// Number of bytes the access covered
        len: usize,
        /// Length of the buffer view
        size: usize,
    },

    /// The broker host could not be resolved to an address
    #[error("Could not resolve host {0}")]
    HostResolution(String),

    /// The broker answered the protocol header with an incompatible version
    #[error("Incompatible AMQP version {major}.{minor}.{revision}")]
    IncompatibleVersion {
        /// Major version offered by the broker
        major: u8,
        /// Minor version offered by the broker
        minor: u8,
        /// Revision offered by the broker
        revision: u8,
    },

    /// The broker rejected a request with a channel or connection close.
    ///
    /// Distinct from transport failure: the connection (or channel) was
    /// closed deliberately by the peer with a reply code and text.
    #[error("Broker rejected request with code {reply_code}: {reply_text}")]
    BrokerRejected {
        /// Reply code sent by the broker (e.g. 404)
        reply_code: u16,
        /// Human-readable reply text sent by the broker
        reply_text: String,
        /// Class id of the method the broker objected to, 0 if none
        class_id: u16,
        /// Method id of the method the broker objected to, 0 if none
        method_id: u16,
    },

    /// OS or network failure reported by the transport
    #[error("Transport failure: {0}")]
    Transport(#[from] io::Error),
}

impl Error {
    /// Returns whether this error originated at the OS level rather than
    /// inside the library.
    pub fn is_os_error(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::HostResolution(_))
    }

    /// The raw OS error code, if the platform reported one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::Transport(err) => err.raw_os_error(),
            _ => None,
        }
    }
}
