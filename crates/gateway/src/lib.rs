//! Glue between inbound batches, the agent, and outbound channels.
//!
//! A batch's watermark is only advanced once its reply has been accepted by
//! a channel (or deliberately suppressed), so a crash or send failure leads
//! to reprocessing rather than message loss.

pub mod catch_up;
pub mod delivery;
pub mod error;

pub use {
    catch_up::{FlushOutcome, flush_queue},
    delivery::{DeliveryOutcome, DeliveryPipeline, PendingBatch},
    error::{Error, Result},
};
