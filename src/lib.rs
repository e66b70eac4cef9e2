#![deny(missing_docs, missing_debug_implementations)]

//! A client-side implementation of the AMQP 0-9-1 wire protocol: the
//! typed field value codec, frame assembly over a generation buffer
//! pool, a blocking connection with request/reply correlation across
//! multiplexed channels, and typed wrappers for the protocol methods.
//!
//! ```rust,no_run
//! use amqp091::{queue, Connection, ConnectionOptions, TcpTransport};
//!
//! fn main() -> Result<(), amqp091::Error> {
//!     let transport = TcpTransport::connect("localhost", 5672)?;
//!     let mut connection = Connection::open(transport, ConnectionOptions::default())?;
//!     connection.channel_open(1)?;
//!     let declared = connection.queue_declare(
//!         1,
//!         queue::Declare {
//!             queue: "work".into(),
//!             durable: true,
//!             ..Default::default()
//!         },
//!     )?;
//!     println!("declared {:?}", declared.queue);
//!     connection.connection_close(200)
//! }
//! ```

pub mod connection;
pub mod constants;
pub mod content;
pub mod error;
pub mod frames;
pub mod methods;
pub mod pool;
pub mod transport;
pub mod value;
pub mod wire;

pub use connection::{Connection, ConnectionOptions, RpcOutcome};
pub use content::{BasicProperties, ContentHeader};
pub use error::Error;
pub use frames::{Frame, FramePayload, ProtocolHeader};
pub use methods::{basic, channel, exchange, queue, tx, Method, MethodId};
pub use transport::{TcpTransport, Transport};
pub use value::{Array, FieldValue, Table};

/// Type alias for a frame or message body payload.
pub type Payload = bytes::Bytes;
