//! Convenience re-exports for common use.

pub use crate::config::{static_prompt, ControllerConfig, ConverseSettings};
pub use crate::controller::ChatController;
pub use crate::error::{ConverseError, Result};
pub use crate::session::{SessionPhase, SessionResult, SessionStatus};
pub use crate::timeline::{RenderedMessage, TimelineView};
pub use crate::tools::{ToolDefinition, ToolDispatchTable, ToolInsert, ToolSchema};
pub use crate::transport::{ChannelTransport, EventStream, ReplayTransport, Transport};
pub use crate::types::{
    BackendTarget, ConversationRequest, CostTotals, Message, Role, StreamEvent, ToolUse,
};
