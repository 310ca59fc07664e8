//! Transport seam: whatever opens the stream and decodes frames.

pub mod channel;
pub mod replay;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::{ConversationRequest, StreamEvent};

pub use channel::{ChannelTransport, PendingTurn};
pub use replay::ReplayTransport;

/// Ordered events of one turn.
pub type EventStream = BoxStream<'static, Result<StreamEvent>>;

/// Opens one streaming turn against a backend.
///
/// Implementations yield events in delivery order, end with exactly one
/// `done` or `error`, and may stop silently once `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: ConversationRequest, cancel: CancellationToken)
        -> Result<EventStream>;
}
