//! Core types for converse.

pub mod cost;
pub mod event;
pub mod message;
pub mod request;

pub use cost::*;
pub use event::*;
pub use message::*;
pub use request::*;
