//! In-process transport fed through `tokio` channels.
//!
//! The host's network layer receives a [`PendingTurn`] for every opened turn
//! and pushes already-parsed events into it.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use super::{EventStream, Transport};
use crate::error::{ConverseError, Result};
use crate::types::{ConversationRequest, StreamEvent};

const DEFAULT_EVENT_BUFFER: usize = 64;

/// One opened turn waiting for the host to stream events into it.
#[derive(Debug)]
pub struct PendingTurn {
    pub request: ConversationRequest,
    pub events: mpsc::Sender<Result<StreamEvent>>,
    pub cancel: CancellationToken,
}

impl PendingTurn {
    /// Forward one event. Returns `false` once the session stopped listening
    /// or the turn was cancelled.
    pub async fn send(&self, event: StreamEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.events.send(Ok(event)).await.is_ok()
    }

    /// Report a transport-level failure.
    pub async fn fail(&self, message: impl Into<String>) -> bool {
        self.events
            .send(Err(ConverseError::transport(message)))
            .await
            .is_ok()
    }
}

/// Transport that hands each turn to the host over a channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    turns: mpsc::UnboundedSender<PendingTurn>,
    buffer: usize,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingTurn>) {
        Self::with_buffer(DEFAULT_EVENT_BUFFER)
    }

    pub fn with_buffer(buffer: usize) -> (Self, mpsc::UnboundedReceiver<PendingTurn>) {
        let (turns, rx) = mpsc::unbounded_channel();
        (
            Self {
                turns,
                buffer: buffer.max(1),
            },
            rx,
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn open(
        &self,
        request: ConversationRequest,
        cancel: CancellationToken,
    ) -> Result<EventStream> {
        let (events, rx) = mpsc::channel(self.buffer);
        let turn = PendingTurn {
            request,
            events,
            cancel: cancel.clone(),
        };
        self.turns
            .send(turn)
            .map_err(|_| ConverseError::transport("no host is receiving turns"))?;
        Ok(ReceiverStream::new(rx)
            .take_until(cancel.cancelled_owned())
            .boxed())
    }
}
