//! Channel class methods (class id 20).

use bytes::Bytes;

use super::args::{Reader, Writer};
use super::{Method, CLASS_CHANNEL};
use crate::error::Error;

/// Method id of `channel.open`.
pub const OPEN: u16 = 10;
/// Method id of `channel.open-ok`.
pub const OPEN_OK: u16 = 11;
/// Method id of `channel.close`.
pub const CLOSE: u16 = 40;
/// Method id of `channel.close-ok`.
pub const CLOSE_OK: u16 = 41;

/// `channel.open`: activates a channel number for use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Open {
    /// Reserved, must be empty
    pub out_of_band: Bytes,
}

/// `channel.open-ok`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenOk {
    /// Reserved
    pub channel_id: Bytes,
}

/// `channel.close`: either side shuts the channel down.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Close {
    /// Reply code, e.g. 404 for a missing queue
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
        OPEN => Method::ChannelOpen(Open {
            out_of_band: r.shortstr()?,
        }),
        OPEN_OK => Method::ChannelOpenOk(OpenOk {
            channel_id: r.longstr()?,
        }),
        CLOSE => Method::ChannelClose(Close {
            reply_code: r.u16()?,
            reply_text: r.shortstr()?,
            class_id: r.u16()?,
            method_id: r.u16()?,
        }),
        CLOSE_OK => Method::ChannelCloseOk,
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_CHANNEL,
                method_id,
            })
        }
    };
    Ok(method)
}

impl Open {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.out_of_band)
    }
}

impl OpenOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.longstr(&self.channel_id)
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
