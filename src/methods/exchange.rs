//! Exchange class methods (class id 40).

use bytes::Bytes;

use super::args::{Reader, Writer};
use super::{Method, CLASS_EXCHANGE};
use crate::error::Error;
use crate::value::Table;

/// Method id of `exchange.declare`.
pub const DECLARE: u16 = 10;
/// Method id of `exchange.declare-ok`.
pub const DECLARE_OK: u16 = 11;
/// Method id of `exchange.delete`.
pub const DELETE: u16 = 20;
/// Method id of `exchange.delete-ok`.
pub const DELETE_OK: u16 = 21;

/// `exchange.declare`: creates or verifies an exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declare {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Exchange name
    pub exchange: Bytes,
    /// Exchange type, e.g. `direct`, `fanout`, `topic`
    pub exchange_type: Bytes,
    /// Only verify the exchange exists instead of creating it
    pub passive: bool,
    /// Survive a broker restart
    pub durable: bool,
    /// Delete when no longer used
    pub auto_delete: bool,
    /// Not directly publishable; only bindable to other exchanges
    pub internal: bool,
    /// Do not wait for a reply
    pub nowait: bool,
    /// Implementation-specific arguments
    pub arguments: Table,
}

/// `exchange.delete`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delete {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Exchange name
    pub exchange: Bytes,
    /// Only delete if the exchange has no bindings
    pub if_unused: bool,
    /// Do not wait for a reply
    pub nowait: bool,
}

pub(crate) fn decode(method_id: u16, r: &mut Reader<'_>) -> Result<Method, Error> {
    let method = match method_id {
        DECLARE => Method::ExchangeDeclare(Declare {
            ticket: r.u16()?,
            exchange: r.shortstr()?,
            exchange_type: r.shortstr()?,
            passive: r.bit()?,
            durable: r.bit()?,
            auto_delete: r.bit()?,
            internal: r.bit()?,
            nowait: r.bit()?,
            arguments: r.table()?,
        }),
        DECLARE_OK => Method::ExchangeDeclareOk,
        DELETE => Method::ExchangeDelete(Delete {
            ticket: r.u16()?,
            exchange: r.shortstr()?,
            if_unused: r.bit()?,
            nowait: r.bit()?,
        }),
        DELETE_OK => Method::ExchangeDeleteOk,
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_EXCHANGE,
                method_id,
            })
        }
    };
    Ok(method)
}

impl Declare {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.exchange_type)?;
        w.bit(self.passive);
        w.bit(self.durable);
        w.bit(self.auto_delete);
        w.bit(self.internal);
        w.bit(self.nowait);
        w.table(&self.arguments)
    }
}

impl Delete {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.exchange)?;
        w.bit(self.if_unused);
        w.bit(self.nowait);
        Ok(())
    }
}
