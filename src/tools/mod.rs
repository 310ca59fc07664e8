//! Tool schemas, client-side dispatch and server tool display.

pub mod dispatch;
pub mod display;
pub mod types;

pub use dispatch::{ToolDispatchTable, ToolHandler, ToolInsert};
pub use display::server_tool_start_text;
pub use types::{ToolDefinition, ToolSchema};
