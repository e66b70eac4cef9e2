//! Basic class methods (class id 60): publishing and consuming messages.

use bytes::Bytes;

use super::args::{Reader, Writer};
use super::{Method, CLASS_BASIC};
use crate::error::Error;
use crate::value::Table;

/// Method id of `basic.qos`.
pub const QOS: u16 = 10;
/// Method id of `basic.qos-ok`.
pub const QOS_OK: u16 = 11;
/// Method id of `basic.consume`.
pub const CONSUME: u16 = 20;
/// Method id of `basic.consume-ok`.
pub const CONSUME_OK: u16 = 21;
/// Method id of `basic.cancel`.
pub const CANCEL: u16 = 30;
/// Method id of `basic.cancel-ok`.
pub const CANCEL_OK: u16 = 31;
/// Method id of `basic.publish`.
pub const PUBLISH: u16 = 40;
/// Method id of `basic.return`.
pub const RETURN: u16 = 50;
/// Method id of `basic.deliver`.
pub const DELIVER: u16 = 60;
/// Method id of `basic.get`.
pub const GET: u16 = 70;
/// Method id of `basic.get-ok`.
pub const GET_OK: u16 = 71;
/// Method id of `basic.get-empty`.
pub const GET_EMPTY: u16 = 72;
/// Method id of `basic.ack`.
pub const ACK: u16 = 80;
/// Method id of `basic.reject`.
pub const REJECT: u16 = 90;

/// `basic.qos`: bounds how many messages the broker sends unacknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Qos {
    /// Prefetch window in bytes, 0 meaning no limit
    pub prefetch_size: u32,
    /// Prefetch window in messages, 0 meaning no limit
    pub prefetch_count: u16,
    /// Apply to the whole connection instead of the channel
    pub global: bool,
}

/// `basic.consume`: starts a consumer on a queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Consume {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue to consume from
    pub queue: Bytes,
    /// Consumer tag; empty asks the broker to generate one
    pub consumer_tag: Bytes,
    /// Do not deliver messages published on this connection
    pub no_local: bool,
    /// Broker does not expect acknowledgments
    pub no_ack: bool,
    /// Request exclusive consumer access
    pub exclusive: bool,
    /// Do not wait for a reply
    pub nowait: bool,
    /// Implementation-specific arguments
    pub arguments: Table,
}

/// `basic.consume-ok`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsumeOk {
    /// Consumer tag, possibly broker-generated
    pub consumer_tag: Bytes,
}

/// `basic.cancel`: stops a consumer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cancel {
    /// Consumer tag to cancel
    pub consumer_tag: Bytes,
    /// Do not wait for a reply
    pub nowait: bool,
}

/// `basic.cancel-ok`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CancelOk {
    /// Cancelled consumer tag
    pub consumer_tag: Bytes,
}

/// `basic.publish`: routes a message to an exchange. Followed by a content
/// header frame and zero or more body frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Publish {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Exchange to publish to; empty selects the default exchange
    pub exchange: Bytes,
    /// Routing key
    pub routing_key: Bytes,
    /// Return the message if it cannot be routed
    pub mandatory: bool,
    /// Return the message if it cannot be delivered immediately
    pub immediate: bool,
}

/// `basic.return`: an undeliverable published message coming back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Return {
    /// Reply code explaining the return
    pub reply_code: u16,
    /// Human-readable reason
    pub reply_text: Bytes,
    /// Exchange the message was published to
    pub exchange: Bytes,
    /// Routing key the message was published with
    pub routing_key: Bytes,
}

/// `basic.deliver`: a message pushed to a consumer. Followed by a content
/// header frame and body frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deliver {
    /// Tag of the consumer receiving the message
    pub consumer_tag: Bytes,
    /// Broker-assigned delivery tag for acknowledgment
    pub delivery_tag: u64,
    /// The message was delivered before and not acknowledged
    pub redelivered: bool,
    /// Exchange the message was published to
    pub exchange: Bytes,
    /// Routing key the message was published with
    pub routing_key: Bytes,
}

/// `basic.get`: synchronously fetches one message from a queue.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Get {
    /// Reserved, must be 0
    pub ticket: u16,
    /// Queue to fetch from
    pub queue: Bytes,
    /// Broker does not expect an acknowledgment
    pub no_ack: bool,
}

/// `basic.get-ok`: the fetched message. Followed by a content header frame
/// and body frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetOk {
    /// Broker-assigned delivery tag for acknowledgment
    pub delivery_tag: u64,
    /// The message was delivered before and not acknowledged
    pub redelivered: bool,
    /// Exchange the message was published to
    pub exchange: Bytes,
    /// Routing key the message was published with
    pub routing_key: Bytes,
    /// Messages remaining in the queue
    pub message_count: u32,
}

/// `basic.get-empty`: the queue had no message to fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GetEmpty {
    /// Reserved
    pub cluster_id: Bytes,
}

/// `basic.ack`: acknowledges one or more deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ack {
    /// Delivery tag being acknowledged, 0 with `multiple` meaning all
    pub delivery_tag: u64,
    /// Acknowledge everything up to and including the tag
    pub multiple: bool,
}

/// `basic.reject`: refuses a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reject {
    /// Delivery tag being rejected
    pub delivery_tag: u64,
    /// Requeue instead of discarding
    pub requeue: bool,
}

pub(crate) fn decode(method_id: u16, r: &mut Reader<'_>) -> Result<Method, Error> {
    let method = match method_id {
        QOS => Method::BasicQos(Qos {
            prefetch_size: r.u32()?,
            prefetch_count: r.u16()?,
            global: r.bit()?,
        }),
        QOS_OK => Method::BasicQosOk,
        CONSUME => Method::BasicConsume(Consume {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            consumer_tag: r.shortstr()?,
            no_local: r.bit()?,
            no_ack: r.bit()?,
            exclusive: r.bit()?,
            nowait: r.bit()?,
            arguments: r.table()?,
        }),
        CONSUME_OK => Method::BasicConsumeOk(ConsumeOk {
            consumer_tag: r.shortstr()?,
        }),
        CANCEL => Method::BasicCancel(Cancel {
            consumer_tag: r.shortstr()?,
            nowait: r.bit()?,
        }),
        CANCEL_OK => Method::BasicCancelOk(CancelOk {
            consumer_tag: r.shortstr()?,
        }),
        PUBLISH => Method::BasicPublish(Publish {
            ticket: r.u16()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
            mandatory: r.bit()?,
            immediate: r.bit()?,
        }),
        RETURN => Method::BasicReturn(Return {
            reply_code: r.u16()?,
            reply_text: r.shortstr()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
        }),
        DELIVER => Method::BasicDeliver(Deliver {
            consumer_tag: r.shortstr()?,
            delivery_tag: r.u64()?,
            redelivered: r.bit()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
        }),
        GET => Method::BasicGet(Get {
            ticket: r.u16()?,
            queue: r.shortstr()?,
            no_ack: r.bit()?,
        }),
        GET_OK => Method::BasicGetOk(GetOk {
            delivery_tag: r.u64()?,
            redelivered: r.bit()?,
            exchange: r.shortstr()?,
            routing_key: r.shortstr()?,
            message_count: r.u32()?,
        }),
        GET_EMPTY => Method::BasicGetEmpty(GetEmpty {
            cluster_id: r.shortstr()?,
        }),
        ACK => Method::BasicAck(Ack {
            delivery_tag: r.u64()?,
            multiple: r.bit()?,
        }),
        REJECT => Method::BasicReject(Reject {
            delivery_tag: r.u64()?,
            requeue: r.bit()?,
        }),
        _ => {
            return Err(Error::UnknownMethod {
                class_id: CLASS_BASIC,
                method_id,
            })
        }
    };
    Ok(method)
}

impl Qos {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u32(self.prefetch_size);
        w.u16(self.prefetch_count);
        w.bit(self.global);
        Ok(())
    }
}

impl Consume {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.shortstr(&self.consumer_tag)?;
        w.bit(self.no_local);
        w.bit(self.no_ack);
        w.bit(self.exclusive);
        w.bit(self.nowait);
        w.table(&self.arguments)
    }
}

impl ConsumeOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.consumer_tag)
    }
}

impl Cancel {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.consumer_tag)?;
        w.bit(self.nowait);
        Ok(())
    }
}

impl CancelOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.consumer_tag)
    }
}

impl Publish {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)?;
        w.bit(self.mandatory);
        w.bit(self.immediate);
        Ok(())
    }
}

impl Return {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.reply_code);
        w.shortstr(&self.reply_text)?;
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)
    }
}

impl Deliver {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.consumer_tag)?;
        w.u64(self.delivery_tag);
        w.bit(self.redelivered);
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)
    }
}

impl Get {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u16(self.ticket);
        w.shortstr(&self.queue)?;
        w.bit(self.no_ack);
        Ok(())
    }
}

impl GetOk {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u64(self.delivery_tag);
        w.bit(self.redelivered);
        w.shortstr(&self.exchange)?;
        w.shortstr(&self.routing_key)?;
        w.u32(self.message_count);
        Ok(())
    }
}

impl GetEmpty {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.shortstr(&self.cluster_id)
    }
}

impl Ack {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u64(self.delivery_tag);
        w.bit(self.multiple);
        Ok(())
    }
}

impl Reject {
    pub(crate) fn encode(&self, w: &mut Writer<'_>) -> Result<(), Error> {
        w.u64(self.delivery_tag);
        w.bit(self.requeue);
        Ok(())
    }
}
