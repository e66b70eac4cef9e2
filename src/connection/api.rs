//! Per-method wrappers over [`Connection::simple_rpc`].
//!
//! Each wrapper sends one request, waits for the matching reply and
//! unwraps it into its typed `-ok` arguments, turning a broker-side
//! close into [`Error::BrokerRejected`]. Wrappers always wait for the
//! reply, so the `nowait` flag of the argument structs is cleared before
//! sending.

use bytes::Bytes;

use crate::constants::FRAME_OVERHEAD;
use crate::content::{BasicProperties, ContentHeader};
use crate::error::Error;
use crate::frames::{Frame, FramePayload};
use crate::methods::{
    basic, channel, connection, exchange, queue, tx, Method, CLASS_BASIC, CLASS_CHANNEL,
    CLASS_CONNECTION, CLASS_EXCHANGE, CLASS_QUEUE, CLASS_TX,
};
use crate::transport::Transport;

use super::{effective_frame_max, Connection, RpcOutcome};

const UNEXPECTED_REPLY: Error = Error::BadWireData("reply method does not match the request");

impl<T: Transport> Connection<T> {
    /// Opens channel number `channel`.
    pub fn channel_open(&mut self, channel: u16) -> Result<(), Error> {
        self.simple_rpc(
            channel,
            Method::ChannelOpen(channel::Open::default()),
            &[(CLASS_CHANNEL, channel::OPEN_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Closes channel number `channel` with `reply_code`.
    pub fn channel_close(&mut self, channel: u16, reply_code: u16) -> Result<(), Error> {
        self.simple_rpc(
            channel,
            Method::ChannelClose(channel::Close {
                reply_code,
                ..Default::default()
            }),
            &[(CLASS_CHANNEL, channel::CLOSE_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Closes the connection with `reply_code` and shuts the transport
    /// down. The connection is unusable afterwards.
    pub fn connection_close(&mut self, reply_code: u16) -> Result<(), Error> {
        self.simple_rpc(
            0,
            Method::ConnectionClose(connection::Close {
                reply_code,
                ..Default::default()
            }),
            &[(CLASS_CONNECTION, connection::CLOSE_OK)],
        )?
        .reply()?;
        self.mark_poisoned();
        self.transport_mut().close()
    }

    /// Declares an exchange.
    pub fn exchange_declare(
        &mut self,
        channel: u16,
        mut args: exchange::Declare,
    ) -> Result<(), Error> {
        args.nowait = false;
        self.simple_rpc(
            channel,
            Method::ExchangeDeclare(args),
            &[(CLASS_EXCHANGE, exchange::DECLARE_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Deletes an exchange.
    pub fn exchange_delete(
        &mut self,
        channel: u16,
        mut args: exchange::Delete,
    ) -> Result<(), Error> {
        args.nowait = false;
        self.simple_rpc(
            channel,
            Method::ExchangeDelete(args),
            &[(CLASS_EXCHANGE, exchange::DELETE_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Declares a queue, returning its name and counters.
    pub fn queue_declare(
        &mut self,
        channel: u16,
        mut args: queue::Declare,
    ) -> Result<queue::DeclareOk, Error> {
        args.nowait = false;
        match self
            .simple_rpc(
                channel,
                Method::QueueDeclare(args),
                &[(CLASS_QUEUE, queue::DECLARE_OK)],
            )?
            .reply()?
        {
            Method::QueueDeclareOk(ok) => Ok(ok),
            _ => Err(UNEXPECTED_REPLY),
        }
    }

    /// Binds a queue to an exchange.
    pub fn queue_bind(&mut self, channel: u16, mut args: queue::Bind) -> Result<(), Error> {
        args.nowait = false;
        self.simple_rpc(
            channel,
            Method::QueueBind(args),
            &[(CLASS_QUEUE, queue::BIND_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Removes a queue binding.
    pub fn queue_unbind(&mut self, channel: u16, args: queue::Unbind) -> Result<(), Error> {
        self.simple_rpc(
            channel,
            Method::QueueUnbind(args),
            &[(CLASS_QUEUE, queue::UNBIND_OK)],
        )?
        .reply()?;
        Ok(())
    }

    /// Purges a queue, returning how many messages were dropped.
    pub fn queue_purge(&mut self, channel: u16, mut args: queue::Purge) -> Result<u32, Error> {
        args.nowait = false;
        match self
            .simple_rpc(
                channel,
                Method::QueuePurge(args),
                &[(CLASS_QUEUE, queue::PURGE_OK)],
            )?
            .reply()?
        {
            Method::QueuePurgeOk(ok) => Ok(ok.message_count),
            _ => Err(UNEXPECTED_REPLY),
        }
    }

    /// Deletes a queue, returning how many messages went with it.
    pub fn queue_delete(&mut self, channel: u16, mut args: queue::Delete) -> Result<u32, Error> {
        args.nowait = false;
        match self
            .simple_rpc(
                channel,
                Method::QueueDelete(args),
                &[(CLASS_QUEUE, queue::DELETE_OK)],
            )?
            .reply()?
        {
            Method::QueueDeleteOk(ok) => Ok(ok.message_count),
            _ => Err(UNEXPECTED_REPLY),
        }
    }

    /// Bounds how many messages the broker sends before acknowledgment.
    pub fn basic_qos(&mut self, channel: u16, args: basic::Qos) -> Result<(), Error> {
        self.simple_rpc(channel, Method::BasicQos(args), &[(CLASS_BASIC, basic::QOS_OK)])?
            .reply()?;
        Ok(())
    }

    /// Starts a consumer, returning its tag.
    pub fn basic_consume(
        &mut self,
        channel: u16,
        mut args: basic::Consume,
    ) -> Result<basic::ConsumeOk, Error> {
        args.nowait = false;
        match self
            .simple_rpc(
                channel,
                Method::BasicConsume(args),
                &[(CLASS_BASIC, basic::CONSUME_OK)],
            )?
            .reply()?
        {
            Method::BasicConsumeOk(ok) => Ok(ok),
            _ => Err(UNEXPECTED_REPLY),
        }
    }

    /// Stops a consumer.
    pub fn basic_cancel(
        &mut self,
        channel: u16,
        mut args: basic::Cancel,
    ) -> Result<basic::CancelOk, Error> {
        args.nowait = false;
        match self
            .simple_rpc(
                channel,
                Method::BasicCancel(args),
                &[(CLASS_BASIC, basic::CANCEL_OK)],
            )?
            .reply()?
        {
            Method::BasicCancelOk(ok) => Ok(ok),
            _ => Err(UNEXPECTED_REPLY),
        }
    }

    /// Fetches one message synchronously.
    ///
    /// Returns the raw [`RpcOutcome`] because the broker answers with
    /// either `basic.get-ok` (followed by content frames the caller must
    /// pull with [`Connection::wait_frame`]) or `basic.get-empty`.
    pub fn basic_get(&mut self, channel: u16, args: basic::Get) -> Result<RpcOutcome, Error> {
        self.simple_rpc(
            channel,
            Method::BasicGet(args),
            &[(CLASS_BASIC, basic::GET_OK), (CLASS_BASIC, basic::GET_EMPTY)],
        )
    }

    /// Acknowledges a delivery. The broker sends no reply.
    pub fn basic_ack(&mut self, channel: u16, args: basic::Ack) -> Result<(), Error> {
        self.send_method(channel, Method::BasicAck(args))
    }

    /// Rejects a delivery. The broker sends no reply.
    pub fn basic_reject(&mut self, channel: u16, args: basic::Reject) -> Result<(), Error> {
        self.send_method(channel, Method::BasicReject(args))
    }

    /// Publishes a message: the method frame, a content header and as
    /// many body frames as the negotiated frame size requires. Body
    /// fragments are zero-copy slices of `body`.
    pub fn basic_publish(
        &mut self,
        channel: u16,
        args: basic::Publish,
        properties: BasicProperties,
        body: Bytes,
    ) -> Result<(), Error> {
        self.send_method(channel, Method::BasicPublish(args))?;
        self.send_frame(&Frame {
            channel,
            payload: FramePayload::Header(ContentHeader::basic(body.len() as u64, properties)),
        })?;

        let fragment_max = effective_frame_max(self.frame_max).saturating_sub(FRAME_OVERHEAD);
        let mut at = 0;
        while at < body.len() {
            let end = body.len().min(at + fragment_max);
            self.send_frame(&Frame {
                channel,
                payload: FramePayload::Body(body.slice(at..end)),
            })?;
            at = end;
        }
        Ok(())
    }

    /// Puts the channel into transaction mode.
    pub fn tx_select(&mut self, channel: u16) -> Result<(), Error> {
        self.simple_rpc(channel, Method::TxSelect, &[(CLASS_TX, tx::SELECT_OK)])?
            .reply()?;
        Ok(())
    }

    /// Commits the current transaction.
    pub fn tx_commit(&mut self, channel: u16) -> Result<(), Error> {
        self.simple_rpc(channel, Method::TxCommit, &[(CLASS_TX, tx::COMMIT_OK)])?
            .reply()?;
        Ok(())
    }

    /// Rolls the current transaction back.
    pub fn tx_rollback(&mut self, channel: u16) -> Result<(), Error> {
        self.simple_rpc(channel, Method::TxRollback, &[(CLASS_TX, tx::ROLLBACK_OK)])?
            .reply()?;
        Ok(())
    }
}
