//! Shared types and utilities used across all waterline crates.

pub mod time;
pub mod types;

pub use types::{AgentInput, ContentBlock, InboundMessage, MediaSource, MessageContent};
