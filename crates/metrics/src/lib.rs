//! Metrics for waterline.
//!
//! This crate provides the metric names used across the workspace and
//! re-exports the `metrics` facade macros. Recording is a no-op until the host
//! process installs a recorder.
//!
//! # Usage
//!
//! ```rust,ignore
//! use waterline_metrics::{channels, counter};
//!
//! counter!(channels::MESSAGES_SENT_TOTAL, "channel" => "telegram").increment(1);
//! ```

mod definitions;

pub use definitions::*;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
