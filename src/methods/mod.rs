//! Typed AMQP 0-9-1 methods: request/reply argument structs per class,
//! plus dispatch between `(class_id, method_id)` pairs and decoded
//! payloads.

use bytes::{Bytes, BytesMut};

use crate::error::Error;

pub(crate) mod args;

pub mod basic;
pub mod channel;
pub mod connection;
pub mod exchange;
pub mod queue;
pub mod tx;

use args::{Reader, Writer};

/// Class id of the connection class.
pub const CLASS_CONNECTION: u16 = 10;
/// Class id of the channel class.
pub const CLASS_CHANNEL: u16 = 20;
/// Class id of the exchange class.
pub const CLASS_EXCHANGE: u16 = 40;
/// Class id of the queue class.
pub const CLASS_QUEUE: u16 = 50;
/// Class id of the basic class.
pub const CLASS_BASIC: u16 = 60;
/// Class id of the transaction class.
pub const CLASS_TX: u16 = 90;

/// A `(class_id, method_id)` pair identifying one protocol method.
pub type MethodId = (u16, u16);

/// One decoded method frame payload.
///
/// Exhaustive over the methods this client speaks; decoding any other id
/// fails with [`Error::UnknownClass`] or [`Error::UnknownMethod`] instead
/// of silently defaulting.
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    /// `connection.start`
    ConnectionStart(connection::Start),
    /// `connection.start-ok`
    ConnectionStartOk(connection::StartOk),
    /// `connection.tune`
    ConnectionTune(connection::Tune),
    /// `connection.tune-ok`
    ConnectionTuneOk(connection::TuneOk),
    /// `connection.open`
    ConnectionOpen(connection::Open),
    /// `connection.open-ok`
    ConnectionOpenOk(connection::OpenOk),
    /// `connection.close`
    ConnectionClose(connection::Close),
    /// `connection.close-ok`
    ConnectionCloseOk,
    /// `channel.open`
    ChannelOpen(channel::Open),
    /// `channel.open-ok`
    ChannelOpenOk(channel::OpenOk),
    /// `channel.close`
    ChannelClose(channel::Close),
    /// `channel.close-ok`
    ChannelCloseOk,
    /// `exchange.declare`
    ExchangeDeclare(exchange::Declare),
    /// `exchange.declare-ok`
    ExchangeDeclareOk,
    /// `exchange.delete`
    ExchangeDelete(exchange::Delete),
    /// `exchange.delete-ok`
    ExchangeDeleteOk,
    /// `queue.declare`
    QueueDeclare(queue::Declare),
    /// `queue.declare-ok`
    QueueDeclareOk(queue::DeclareOk),
    /// `queue.bind`
    QueueBind(queue::Bind),
    /// `queue.bind-ok`
    QueueBindOk,
    /// `queue.purge`
    QueuePurge(queue::Purge),
    /// `queue.purge-ok`
    QueuePurgeOk(queue::PurgeOk),
    /// `queue.delete`
    QueueDelete(queue::Delete),
    /// `queue.delete-ok`
    QueueDeleteOk(queue::DeleteOk),
    /// `queue.unbind`
    QueueUnbind(queue::Unbind),
    /// `queue.unbind-ok`
    QueueUnbindOk,
    /// `basic.qos`
    BasicQos(basic::Qos),
    /// `basic.qos-ok`
    BasicQosOk,
    /// `basic.consume`
    BasicConsume(basic::Consume),
    /// `basic.consume-ok`
    BasicConsumeOk(basic::ConsumeOk),
    /// `basic.cancel`
    BasicCancel(basic::Cancel),
    /// `basic.cancel-ok`
    BasicCancelOk(basic::CancelOk),
    /// `basic.publish`
    BasicPublish(basic::Publish),
    /// `basic.return`
    BasicReturn(basic::Return),
    /// `basic.deliver`
    BasicDeliver(basic::Deliver),
    /// `basic.get`
    BasicGet(basic::Get),
    /// `basic.get-ok`
    BasicGetOk(basic::GetOk),
    /// `basic.get-empty`
    BasicGetEmpty(basic::GetEmpty),
    /// `basic.ack`
    BasicAck(basic::Ack),
    /// `basic.reject`
    BasicReject(basic::Reject),
    /// `tx.select`
    TxSelect,
    /// `tx.select-ok`
    TxSelectOk,
    /// `tx.commit`
    TxCommit,
    /// `tx.commit-ok`
    TxCommitOk,
    /// `tx.rollback`
    TxRollback,
    /// `tx.rollback-ok`
    TxRollbackOk,
}

impl Method {
    /// The `(class_id, method_id)` pair this method encodes with.
    pub fn id(&self) -> MethodId {
        match self {
            Method::ConnectionStart(_) => (CLASS_CONNECTION, connection::START),
            Method::ConnectionStartOk(_) => (CLASS_CONNECTION, connection::START_OK),
            Method::ConnectionTune(_) => (CLASS_CONNECTION, connection::TUNE),
            Method::ConnectionTuneOk(_) => (CLASS_CONNECTION, connection::TUNE_OK),
            Method::ConnectionOpen(_) => (CLASS_CONNECTION, connection::OPEN),
            Method::ConnectionOpenOk(_) => (CLASS_CONNECTION, connection::OPEN_OK),
            Method::ConnectionClose(_) => (CLASS_CONNECTION, connection::CLOSE),
            Method::ConnectionCloseOk => (CLASS_CONNECTION, connection::CLOSE_OK),
            Method::ChannelOpen(_) => (CLASS_CHANNEL, channel::OPEN),
            Method::ChannelOpenOk(_) => (CLASS_CHANNEL, channel::OPEN_OK),
            Method::ChannelClose(_) => (CLASS_CHANNEL, channel::CLOSE),
            Method::ChannelCloseOk => (CLASS_CHANNEL, channel::CLOSE_OK),
            Method::ExchangeDeclare(_) => (CLASS_EXCHANGE, exchange::DECLARE),
            Method::ExchangeDeclareOk => (CLASS_EXCHANGE, exchange::DECLARE_OK),
            Method::ExchangeDelete(_) => (CLASS_EXCHANGE, exchange::DELETE),
            Method::ExchangeDeleteOk => (CLASS_EXCHANGE, exchange::DELETE_OK),
            Method::QueueDeclare(_) => (CLASS_QUEUE, queue::DECLARE),
            Method::QueueDeclareOk(_) => (CLASS_QUEUE, queue::DECLARE_OK),
            Method::QueueBind(_) => (CLASS_QUEUE, queue::BIND),
            Method::QueueBindOk => (CLASS_QUEUE, queue::BIND_OK),
            Method::QueuePurge(_) => (CLASS_QUEUE, queue::PURGE),
            Method::QueuePurgeOk(_) => (CLASS_QUEUE, queue::PURGE_OK),
            Method::QueueDelete(_) => (CLASS_QUEUE, queue::DELETE),
            Method::QueueDeleteOk(_) => (CLASS_QUEUE, queue::DELETE_OK),
            Method::QueueUnbind(_) => (CLASS_QUEUE, queue::UNBIND),
            Method::QueueUnbindOk => (CLASS_QUEUE, queue::UNBIND_OK),
            Method::BasicQos(_) => (CLASS_BASIC, basic::QOS),
            Method::BasicQosOk => (CLASS_BASIC, basic::QOS_OK),
            Method::BasicConsume(_) => (CLASS_BASIC, basic::CONSUME),
            Method::BasicConsumeOk(_) => (CLASS_BASIC, basic::CONSUME_OK),
            Method::BasicCancel(_) => (CLASS_BASIC, basic::CANCEL),
            Method::BasicCancelOk(_) => (CLASS_BASIC, basic::CANCEL_OK),
            Method::BasicPublish(_) => (CLASS_BASIC, basic::PUBLISH),
            Method::BasicReturn(_) => (CLASS_BASIC, basic::RETURN),
            Method::BasicDeliver(_) => (CLASS_BASIC, basic::DELIVER),
            Method::BasicGet(_) => (CLASS_BASIC, basic::GET),
            Method::BasicGetOk(_) => (CLASS_BASIC, basic::GET_OK),
            Method::BasicGetEmpty(_) => (CLASS_BASIC, basic::GET_EMPTY),
            Method::BasicAck(_) => (CLASS_BASIC, basic::ACK),
            Method::BasicReject(_) => (CLASS_BASIC, basic::REJECT),
            Method::TxSelect => (CLASS_TX, tx::SELECT),
            Method::TxSelectOk => (CLASS_TX, tx::SELECT_OK),
            Method::TxCommit => (CLASS_TX, tx::COMMIT),
            Method::TxCommitOk => (CLASS_TX, tx::COMMIT_OK),
            Method::TxRollback => (CLASS_TX, tx::ROLLBACK),
            Method::TxRollbackOk => (CLASS_TX, tx::ROLLBACK_OK),
        }
    }

    /// Class id of this method.
    pub fn class_id(&self) -> u16 {
        self.id().0
    }

    /// Method id of this method within its class.
    pub fn method_id(&self) -> u16 {
        self.id().1
    }

    /// Decodes one method frame payload.
    pub fn decode(payload: &Bytes) -> Result<Self, Error> {
        let mut r = Reader::new(payload);
        let class_id = r.u16()?;
        let method_id = r.u16()?;
        match class_id {
            CLASS_CONNECTION => connection::decode(method_id, &mut r),
            CLASS_CHANNEL => channel::decode(method_id, &mut r),
            CLASS_EXCHANGE => exchange::decode(method_id, &mut r),
            CLASS_QUEUE => queue::decode(method_id, &mut r),
            CLASS_BASIC => basic::decode(method_id, &mut r),
            CLASS_TX => tx::decode(method_id, &mut r),
            _ => Err(Error::UnknownClass(class_id)),
        }
    }

    /// Appends the method frame payload (ids + arguments) to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), Error> {
        let (class_id, method_id) = self.id();
        let mut w = Writer::new(dst);
        w.u16(class_id);
        w.u16(method_id);
        match self {
            Method::ConnectionStart(m) => m.encode(&mut w),
            Method::ConnectionStartOk(m) => m.encode(&mut w),
            Method::ConnectionTune(m) => m.encode(&mut w),
            Method::ConnectionTuneOk(m) => m.encode(&mut w),
            Method::ConnectionOpen(m) => m.encode(&mut w),
            Method::ConnectionOpenOk(m) => m.encode(&mut w),
            Method::ConnectionClose(m) => m.encode(&mut w),
            Method::ChannelOpen(m) => m.encode(&mut w),
            Method::ChannelOpenOk(m) => m.encode(&mut w),
            Method::ChannelClose(m) => m.encode(&mut w),
            Method::ExchangeDeclare(m) => m.encode(&mut w),
            Method::ExchangeDelete(m) => m.encode(&mut w),
            Method::QueueDeclare(m) => m.encode(&mut w),
            Method::QueueDeclareOk(m) => m.encode(&mut w),
            Method::QueueBind(m) => m.encode(&mut w),
            Method::QueuePurge(m) => m.encode(&mut w),
            Method::QueuePurgeOk(m) => m.encode(&mut w),
            Method::QueueDelete(m) => m.encode(&mut w),
            Method::QueueDeleteOk(m) => m.encode(&mut w),
            Method::QueueUnbind(m) => m.encode(&mut w),
            Method::BasicQos(m) => m.encode(&mut w),
            Method::BasicConsume(m) => m.encode(&mut w),
            Method::BasicConsumeOk(m) => m.encode(&mut w),
            Method::BasicCancel(m) => m.encode(&mut w),
            Method::BasicCancelOk(m) => m.encode(&mut w),
            Method::BasicPublish(m) => m.encode(&mut w),
            Method::BasicReturn(m) => m.encode(&mut w),
            Method::BasicDeliver(m) => m.encode(&mut w),
            Method::BasicGet(m) => m.encode(&mut w),
            Method::BasicGetOk(m) => m.encode(&mut w),
            Method::BasicGetEmpty(m) => m.encode(&mut w),
            Method::BasicAck(m) => m.encode(&mut w),
            Method::BasicReject(m) => m.encode(&mut w),
            // methods with no arguments
            Method::ConnectionCloseOk
            | Method::ChannelCloseOk
            | Method::ExchangeDeclareOk
            | Method::ExchangeDeleteOk
            | Method::QueueBindOk
            | Method::QueueUnbindOk
            | Method::BasicQosOk
            | Method::TxSelect
            | Method::TxSelectOk
            | Method::TxCommit
            | Method::TxCommitOk
            | Method::TxRollback
            | Method::TxRollbackOk => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(method: Method) {
        let mut dst = BytesMut::new();
        method.encode(&mut dst).unwrap();
        let decoded = Method::decode(&dst.freeze()).unwrap();
        assert_eq!(decoded, method);
    }

    #[test]
    fn queue_declare_roundtrips_with_packed_bits() {
        roundtrip(Method::QueueDeclare(queue::Declare {
            queue: Bytes::from_static(b"work"),
            durable: true,
            exclusive: true,
            arguments: {
                let mut t = crate::value::Table::new();
                t.insert("x-max-length", 1000i32);
                t
            },
            ..Default::default()
        }));
    }

    #[test]
    fn basic_deliver_roundtrips() {
        roundtrip(Method::BasicDeliver(basic::Deliver {
            consumer_tag: Bytes::from_static(b"ctag-1"),
            delivery_tag: 77,
            redelivered: true,
            exchange: Bytes::from_static(b"logs"),
            routing_key: Bytes::from_static(b"info"),
        }));
    }

    #[test]
    fn argumentless_methods_roundtrip() {
        for method in [
            Method::ConnectionCloseOk,
            Method::ChannelCloseOk,
            Method::ExchangeDeclareOk,
            Method::QueueBindOk,
            Method::TxSelect,
            Method::TxCommitOk,
            Method::TxRollback,
        ] {
            roundtrip(method);
        }
    }

    #[test]
    fn connection_start_roundtrips() {
        let mut props = crate::value::Table::new();
        props.insert("product", "RabbitMQ");
        roundtrip(Method::ConnectionStart(connection::Start {
            version_major: 0,
            version_minor: 9,
            server_properties: props,
            mechanisms: Bytes::from_static(b"PLAIN AMQPLAIN"),
            locales: Bytes::from_static(b"en_US"),
        }));
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut dst = BytesMut::new();
        let mut w = Writer::new(&mut dst);
        w.u16(170);
        w.u16(10);
        drop(w);
        assert!(matches!(
            Method::decode(&dst.freeze()),
            Err(Error::UnknownClass(170))
        ));

        let mut dst = BytesMut::new();
        let mut w = Writer::new(&mut dst);
        w.u16(CLASS_QUEUE);
        w.u16(99);
        drop(w);
        assert!(matches!(
            Method::decode(&dst.freeze()),
            Err(Error::UnknownMethod {
                class_id: CLASS_QUEUE,
                method_id: 99,
            })
        ));
    }
}
