//! Converse: streaming conversation controller for chat assistants.
//!
//! A [`controller::ChatController`] owns one message timeline. Each send
//! appends the user turn and an assistant placeholder, opens a streaming
//! turn through a [`transport::Transport`], and reconciles the ordered
//! events it yields (text deltas, client tool calls, server tool progress,
//! cost totals) into the timeline until the turn completes, fails, or is
//! cancelled.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use converse::prelude::*;
//!
//! # async fn example() {
//! let (transport, mut turns) = ChannelTransport::new();
//! tokio::spawn(async move {
//!     while let Some(turn) = turns.recv().await {
//!         turn.send(StreamEvent::text("Hi")).await;
//!         turn.send(StreamEvent::done_with_total(0.002)).await;
//!     }
//! });
//!
//! let config = ControllerConfig::builder()
//!     .backend(BackendTarget::new("https://chat.example.com/stream"))
//!     .build();
//! let controller = ChatController::new(config, Arc::new(transport));
//! controller.set_input("Hello");
//! controller.send().await;
//! assert_eq!(controller.costs().total, 0.002);
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod prelude;
pub mod presets;
pub mod session;
pub mod timeline;
pub mod tools;
pub mod transport;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
