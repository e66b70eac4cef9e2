//! Connection class methods (class id 10): handshake, tuning and teardown.

use bytes::Bytes;

use super::args::{Reader, Writer};
use super::{Method, CLASS_CONNECTION};
use crate::error::Error;
use crate::value::Table;

/// Method id of `connection.start`.
pub const START: u16 = 10;
/// Method id of `connection.start-ok`.
pub const START_OK: u16 = 11;
/// Method id of `connection.tune`.
pub const TUNE: u16 = 30;
/// Method id of `connection.tune-ok`.
pub const TUNE_OK: u16 = 31;
/// Method id of `connection.open`.
pub const OPEN: u16 = 40;
/// Method id of `connection.open-ok`.
pub const OPEN_OK: u16 = 41;
/// Method id of `connection.close`.
pub const CLOSE: u16 = 50;
/// Method id of `connection.close-ok`.
pub const CLOSE_OK: u16 = 51;

/// `connection.start`: the broker opens version and security negotiation.
#[derive(Debug, Clone, PartialEq)]
pub struct Start {
    /// Protocol major version the broker speaks
    pub version_major: u8,
    /// Protocol minor version the broker speaks
    pub version_minor: u8,
    /// Broker capabilities and product information
    pub server_properties: Table,
    /// Space-separated SASL mechanisms offered
    pub mechanisms: Bytes,
    /// Space-separated message locales offered
    pub locales: Bytes,
}

/// `connection.start-ok`: the client selects a mechanism and responds.
#[derive(Debug, Clone, PartialEq)]
pub struct StartOk {
    /// Client capabilities and product information
    pub client_properties: Table,
    /// Selected SASL mechanism
    pub mechanism: Bytes,
    /// Opaque SASL response
    pub response: Bytes,
    /// Selected message locale
    pub locale: Bytes,
}

/// `connection.tune`: limits proposed by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tune {
    /// Highest channel number the broker accepts, 0 meaning no limit
    pub channel_max: u16,
    /// Largest frame size the broker accepts, 0 meaning no limit
    pub frame_max: u32,
    /// Heartbeat delay in seconds wanted by the broker, 0 to disable
    pub heartbeat: u16,
}

/// `connection.tune-ok`: limits the client settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuneOk {
    /// Negotiated channel number limit
    pub channel_max: u16,
    /// Negotiated frame size limit
    pub frame_max: u32,
    /// Negotiated heartbeat delay in seconds
    pub heartbeat: u16,
}

/// `connection.open`: selects a virtual host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Open {
    /// Virtual host path
    pub virtual_host: Bytes,
    /// Reserved, must be empty
    pub capabilities: Bytes,
    /// Reserved, must be false
    pub insist: bool,
}

/// `connection.open-ok`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenOk {
    /// Reserved, must be empty
    pub known_hosts: Bytes,
}

/// `connection.close`: either side shuts the connection down, citing a
/// reply code and the method that provoked it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Close {
    /// Reply code, e.g. 200 for a clean close
    pub reply_code: u16,
    /// Human-readable reason
    pub reply_text: Bytes,
    /// Class id of the offending method, 0 if none
    pub class_id: u16,
    /// Method id of the offending method, 0 if none
    pub method_id: u16,
}

pub(crate) fn decode(method_id: u16, r: &mut Reader<'_>) -> Result<Method, Error> {
    let method = match method_id {
        START => Method::ConnectionStart(Start {
            version_major: r.u8()?,
            version_minor: r.u8()?,
            server_properties: r.table()?,
            mechanisms: r.longstr()?,
            locales: r.longstr()?,
        }),
        START_OK => Method::ConnectionStartOk(StartOk {
            client_properties: r.table()?,
            mechanism: r.shortstr()?,
            response: r.longstr()?,
            locale: r.shortstr()?,
        }),
        TUNE => Method::ConnectionTune(Tune {
            channel_max: r.u16()?,
            frame_max: r.u32()?,
            heartbeat: r.u16()?,
        }),
        TUNE_OK => Method::ConnectionTuneOk(TuneOk {
            channel_max: r.u16()?,
            frame_max: r.u32()?,
            heartbeat: r.u16()?,
        }),
        OPEN => Method::ConnectionOpen(Open {
            virtual_host: r.shortstr()?,
            capabilities: r.shortstr()?,
            insist: r.bit()?,
        }),
        OPEN_OK => Method::ConnectionOpenOk(OpenOk {
            known_hosts: r.shortstr()?,
        }),
        CLOSE => Method::ConnectionClose(Close {
            reply_code: r.u16()?,
            reply_text: r.shortstr()?,
            class_id: r.u16()?,
            method_id: r.u16()?,
        }),
        CLOSE_OK => Method::ConnectionCloseOk,
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_CONNECTION,
                method_id,
            })
        }
    };
    Ok(method)
}

impl Start {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u8(self.version_major);
        w.u8(self.version_minor);
        w.table(&self.server_properties)?;
        w.longstr(&self.mechanisms)?;
        w.longstr(&self.locales)
    }
}

impl StartOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.table(&self.client_properties)?;
        w.shortstr(&self.mechanism)?;
        w.longstr(&self.response)?;
        w.shortstr(&self.locale)
    }
}

impl Tune {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.channel_max);
        w.u32(self.frame_max);
        w.u16(self.heartbeat);
        Ok(())
    }
}

impl TuneOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.channel_max);
        w.u32(self.frame_max);
        w.u16(self.heartbeat);
        Ok(())
    }
}

impl Open {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.virtual_host)?;
        w.shortstr(&self.capabilities)?;
        w.bit(self.insist);
        Ok(())
    }
}

impl OpenOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.known_hosts)
    }
}

impl Close {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.reply_code);
        w.shortstr(&self.reply_text)?;
        w.u16(self.class_id);
        w.u16(self.method_id);
        Ok(())
    }
}
