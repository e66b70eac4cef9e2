//! Request/reply correlation over multiplexed channels.

use tracing::{debug, trace};

use crate::error::Error;
use crate::frames::{Frame, FramePayload};
use crate::methods::{Method, MethodId};
use crate::transport::Transport;

use super::Connection;

/// How the broker answered one RPC round trip.
///
/// A rejection is a deliberate broker decision, not a failure of the
/// machinery, so it is a value rather than an error; callers that only
/// want the happy path convert with [`RpcOutcome::reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// The broker answered with one of the expected reply methods.
    Reply(Method),
    /// The broker refused the request by closing the channel or the
    /// connection.
    Rejected {
        /// Reply code sent by the broker (e.g. 404)
        reply_code: u16,
        /// Human-readable reply text sent by the broker
        reply_text: String,
        /// Class id of the method the broker objected to, 0 if none
        class_id: u16,
        /// Method id of the method the broker objected to, 0 if none
        method_id: u16,
    },
}

impl RpcOutcome {
    /// Unwraps the reply method, turning a rejection into
    /// [`Error::BrokerRejected`].
    pub fn reply(self) -> Result<Method, Error> {
        match self {
            RpcOutcome::Reply(method) => Ok(method),
            RpcOutcome::Rejected {
                reply_code,
                reply_text,
                class_id,
                method_id,
            } => Err(Error::BrokerRejected {
                reply_code,
                reply_text,
                class_id,
                method_id,
            }),
        }
    }
}

impl<T: Transport> Connection<T> {
    /// Sends `request` on `channel` and waits for one of the `expected`
    /// `(class_id, method_id)` replies on the same channel.
    ///
    /// Frames for other channels arriving in the meantime are parked in
    /// arrival order and drained by later calls, so one in-flight RPC per
    /// channel may interleave freely across channels. A `channel.close`
    /// on `channel` or a `connection.close` resolves the call as
    /// [`RpcOutcome::Rejected`]; a `connection.close` additionally leaves
    /// the connection unusable.
    pub fn simple_rpc(
        &mut self,
        channel: u16,
        request: Method,
        expected: &[MethodId],
    ) -> Result<RpcOutcome, Error> {
        self.check_usable()?;
        self.send_method(channel, request)?;

        // a frame parked by an earlier call may already resolve this one
        if let Some(at) = (0..self.parked.len()).find(|&at| resolves(&self.parked[at], channel, expected))
        {
            if let Some(frame) = self.parked.remove(at) {
                return self.conclude(frame);
            }
        }

        loop {
            let frame = self.recv_frame()?;
            if resolves(&frame, channel, expected) {
                return self.conclude(frame);
            }
            match frame.payload {
                FramePayload::Heartbeat => trace!("heartbeat skipped while awaiting reply"),
                _ => {
                    debug!(channel = frame.channel, "frame parked for a later call");
                    self.parked.push_back(frame);
                }
            }
        }
    }

    fn conclude(&mut self, frame: Frame) -> Result<RpcOutcome, Error> {
        let outcome = match frame.payload {
            FramePayload::Method(Method::ChannelClose(close)) => RpcOutcome::Rejected {
                reply_code: close.reply_code,
                reply_text: String::from_utf8_lossy(&close.reply_text).into_owned(),
                class_id: close.class_id,
                method_id: close.method_id,
            },
            FramePayload::Method(Method::ConnectionClose(close)) => {
                // the whole connection is going away with it
                self.mark_poisoned();
                RpcOutcome::Rejected {
                    reply_code: close.reply_code,
                    reply_text: String::from_utf8_lossy(&close.reply_text).into_owned(),
                    class_id: close.class_id,
                    method_id: close.method_id,
                }
            }
            FramePayload::Method(method) => RpcOutcome::Reply(method),
            _ => return Err(Error::BadWireData("non-method frame resolved an rpc")),
        };
        self.last_rpc = Some(outcome.clone());
        Ok(outcome)
    }
}

fn resolves(frame: &Frame, channel: u16, expected: &[MethodId]) -> bool {
    let method = match &frame.payload {
        FramePayload::Method(method) => method,
        _ => return false,
    };
    match method {
        Method::ChannelClose(_) => frame.channel == channel,
        Method::ConnectionClose(_) => true,
        _ => frame.channel == channel && expected.contains(&method.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::{channel, queue, CLASS_CHANNEL, CLASS_QUEUE};

    fn method_frame(ch: u16, method: Method) -> Frame {
        Frame {
            channel: ch,
            payload: FramePayload::Method(method),
        }
    }

    #[test]
    fn only_expected_methods_on_the_right_channel_resolve() {
        let expected = [(CLASS_QUEUE, queue::DECLARE_OK)];
        let ok = method_frame(1, Method::QueueDeclareOk(Default::default()));
        assert!(resolves(&ok, 1, &expected));
        assert!(!resolves(&ok, 2, &expected));

        let other = method_frame(1, Method::QueueBindOk);
        assert!(!resolves(&other, 1, &expected));
    }

    #[test]
    fn close_frames_resolve_regardless_of_expectations() {
        let expected = [(CLASS_CHANNEL, channel::OPEN_OK)];
        let channel_close = method_frame(1, Method::ChannelClose(Default::default()));
        assert!(resolves(&channel_close, 1, &expected));
        assert!(!resolves(&channel_close, 2, &expected));

        let connection_close = method_frame(0, Method::ConnectionClose(Default::default()));
        assert!(resolves(&connection_close, 1, &expected));
    }

    #[test]
    fn rejection_converts_to_an_error() {
        let outcome = RpcOutcome::Rejected {
            reply_code: 404,
            reply_text: "NOT_FOUND".to_owned(),
            class_id: CLASS_QUEUE,
            method_id: queue::DECLARE,
        };
        assert!(matches!(
            outcome.reply(),
            Err(Error::BrokerRejected { reply_code: 404, .. })
        ));
    }
}
