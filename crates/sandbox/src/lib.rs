//! Agent execution environment lifecycle.
//!
//! Agents run inside containers managed by an external runtime CLI (Apple
//! `container` by default). This crate only makes sure the runtime is up and
//! reaps containers left behind by a previous run.

pub mod error;
pub mod guard;
pub mod runtime;

pub use {
    error::{Error, Result},
    guard::{CleanupAction, CleanupOp, CleanupSummary, OpOutcome, SandboxGuard},
    runtime::{
        CliContainerRuntime, ContainerInfo, ContainerRuntime, readonly_mount_args,
        stop_container_command,
    },
};
