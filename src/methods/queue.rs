//! Queue class methods (class id 50).

use bytes::Bytes;

use super::args::{Reader, Writer};
use super::{Method, CLASS_QUEUE};
use crate::error::Error;
use crate::value::Table;

/// Method id of `queue.declare`.
pub const DECLARE: u16 = 10;
/// Method id of `queue.declare-ok`.
pub const DECLARE_OK: u16 = 11;
/// Method id of `queue.bind`.
pub const BIND: u16 = 20;
/// Method id of `queue.bind-ok`.
pub const BIND_OK: u16 = 21;
/// Method id of `queue.purge`.
pub const PURGE: u16 = 30;
/// Method id of `queue.purge-ok`.
pub const PURGE_OK: u16 = 31;
/// Method id of `queue.delete`.
pub const DELETE: u16 = 40;
/// Method id of `queue.delete-ok`.
pub const DELETE_OK: u16 = 41;
/// Method id of `queue.unbind`.
pub const UNBIND: u16 = 50;
/// Method id of `queue.unbind-ok`.
pub const UNBIND_OK: u16 = 51;

/// `queue.declare`: creates or verifies a queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declare {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue name; empty asks the broker to generate one
    pub queue: Bytes,
    /// Only verify the queue exists instead of creating it
    pub passive: bool,
    /// Survive a broker restart
    pub durable: bool,
    /// Usable only by this connection, deleted when it closes
    pub exclusive: bool,
    /// Delete when the last consumer disconnects
    pub auto_delete: bool,
    /// Do not wait for a reply
    pub nowait: bool,
    /// Implementation-specific arguments
    pub arguments: Table,
}

/// `queue.declare-ok`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclareOk {
    /// Queue name, possibly broker-generated
    pub queue: Bytes,
    /// Messages currently in the queue
    pub message_count: u32,
    /// Active consumers on the queue
    pub consumer_count: u32,
}

/// `queue.bind`: routes messages from an exchange to a queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bind {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue name
    pub queue: Bytes,
    /// Exchange to bind to
    pub exchange: Bytes,
    /// Routing key for the binding
    pub routing_key: Bytes,
    /// Do not wait for a reply
    pub nowait: bool,
    /// Implementation-specific arguments
    pub arguments: Table,
}

/// `queue.unbind`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Unbind {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue name
    pub queue: Bytes,
    /// Exchange to unbind from
    pub exchange: Bytes,
    /// Routing key of the binding
    pub routing_key: Bytes,
    /// Implementation-specific arguments
    pub arguments: Table,
}

/// `queue.purge`: drops all messages not awaiting acknowledgment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Purge {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue name
    pub queue: Bytes,
    /// Do not wait for a reply
    pub nowait: bool,
}

/// `queue.purge-ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeOk {
    /// Messages purged
    pub message_count: u32,
}

/// `queue.delete`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delete {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue name
    pub queue: Bytes,
    /// Only delete if the queue has no consumers
    pub if_unused: bool,
    /// Only delete if the queue is empty
    pub if_empty: bool,
    /// Do not wait for a reply
    pub nowait: bool,
}

/// `queue.delete-ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOk {
    /// Messages deleted along with the queue
    pub message_count: u32,
}

pub(crate) fn decode(method_id: u16, r: &mut Reader<'_>) -> Result<Method, Error> {
    let method = match method_id {
        DECLARE => Method::QueueDeclare(Declare {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            passive: r.bit()?,
            durable: r.bit()?,
            exclusive: r.bit()?,
            auto_delete: r.bit()?,
            nowait: r.bit()?,
            arguments: r.table()?,
        }),
        DECLARE_OK => Method::QueueDeclareOk(DeclareOk {
            queue: r.shortstr()?,
            message_count: r.u32()?,
            consumer_count: r.u32()?,
        }),
        BIND => Method::QueueBind(Bind {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
            nowait: r.bit()?,
            arguments: r.table()?,
        }),
        BIND_OK => Method::QueueBindOk,
        PURGE => Method::QueuePurge(Purge {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            nowait: r.bit()?,
        }),
        PURGE_OK => Method::QueuePurgeOk(PurgeOk {
            message_count: r.u32()?,
        }),
        DELETE => Method::QueueDelete(Delete {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            if_unused: r.bit()?,
            if_empty: r.bit()?,
            nowait: r.bit()?,
        }),
        DELETE_OK => Method::QueueDeleteOk(DeleteOk {
            message_count: r.u32()?,
        }),
        UNBIND => Method::QueueUnbind(Unbind {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
            arguments: r.table()?,
        }),
        UNBIND_OK => Method::QueueUnbindOk,
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_QUEUE,
                method_id,
            })
        }
    };
    Ok(method)
}

impl Declare {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.bit(self.passive);
        w.bit(self.durable);
        w.bit(self.exclusive);
        w.bit(self.auto_delete);
        w.bit(self.nowait);
        w.table(&self.arguments)
    }
}

impl DeclareOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.queue)?;
        w.u32(self.message_count);
        w.u32(self.consumer_count);
        Ok(())
    }
}

impl Bind {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)?;
        w.bit(self.nowait);
        w.table(&self.arguments)
    }
}

impl Unbind {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)?;
        w.table(&self.arguments)
    }
}

impl Purge {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.bit(self.nowait);
        Ok(())
    }
}

impl PurgeOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u32(self.message_count);
        Ok(())
    }
}

impl Delete {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.bit(self.if_unused);
        w.bit(self.if_empty);
        w.bit(self.nowait);
        Ok(())
    }
}

impl DeleteOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u32(self.message_count);
        Ok(())
    }
}
