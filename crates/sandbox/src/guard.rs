use std::time::Duration;

use tracing::{debug, error, info, warn};

#[cfg(feature = "metrics")]
use waterline_metrics::{counter, sandbox as sandbox_metrics};

use waterline_config::SandboxConfig;

use crate::{
    CliContainerRuntime, ContainerRuntime, Error, Result, runtime::stop_container_command,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupAction {
    Stop,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Ok,
    Failed(String),
}

/// One runtime call made during orphan cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOp {
    pub container: String,
    pub action: CleanupAction,
    pub outcome: OpOutcome,
}

/// What [`SandboxGuard::cleanup_orphans`] found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// Orphans that were running.
    pub running: Vec<String>,
    /// Orphans that were already stopped.
    pub stopped: Vec<String>,
    pub results: Vec<CleanupOp>,
    /// Set when the runtime could not list containers; nothing was cleaned.
    pub enumeration_error: Option<String>,
}

impl CleanupSummary {
    pub fn total(&self) -> usize {
        self.running.len() + self.stopped.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupOp> {
        self.results
            .iter()
            .filter(|op| matches!(op.outcome, OpOutcome::Failed(_)))
    }

    /// Orphans whose removal succeeded.
    pub fn removed(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|op| op.action == CleanupAction::Remove && op.outcome == OpOutcome::Ok)
            .map(|op| op.container.as_str())
            .collect()
    }
}

/// Keeps the container runtime available and clears out containers left by
/// previous runs.
pub struct SandboxGuard<R> {
    runtime: R,
    prefix: String,
    start_timeout: Duration,
}

impl SandboxGuard<CliContainerRuntime> {
    pub fn from_config(cfg: &SandboxConfig) -> Self {
        Self::new(
            CliContainerRuntime::new(cfg.runtime_bin.clone()),
            cfg.container_prefix.clone(),
            Duration::from_secs(cfg.start_timeout_secs),
        )
    }
}

impl<R: ContainerRuntime> SandboxGuard<R> {
    pub fn new(runtime: R, prefix: impl Into<String>, start_timeout: Duration) -> Self {
        Self {
            runtime,
            prefix: prefix.into(),
            start_timeout,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Make sure the runtime service is up, starting it if needed.
    ///
    /// Returns [`Error::RuntimeUnavailable`] when the service is down and
    /// cannot be started within the configured timeout. Callers should treat
    /// that as fatal.
    pub async fn ensure_running(&self) -> Result<()> {
        let bin = self.runtime.binary();
        if self.runtime.status().await.is_ok() {
            debug!(runtime = bin, "container runtime already running");
            return Ok(());
        }

        info!(runtime = bin, "starting container runtime");
        let started = match tokio::time::timeout(self.start_timeout, self.runtime.start()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.start_timeout.as_secs_f64()
            )),
        };

        match started {
            Ok(()) => {
                info!(runtime = bin, "container runtime started");
                #[cfg(feature = "metrics")]
                counter!(sandbox_metrics::RUNTIME_STARTS_TOTAL).increment(1);
                Ok(())
            },
            Err(reason) => {
                error!(runtime = bin, %reason, "failed to start container runtime");
                let err = Error::runtime_unavailable(bin, reason);
                if let Some(banner) = err.fatal_banner() {
                    eprintln!("\n{banner}\n");
                }
                Err(err)
            },
        }
    }

    /// Stop and remove every container whose name starts with the configured
    /// prefix. Never fails: per-container errors are collected in the summary
    /// and enumeration errors are logged.
    pub async fn cleanup_orphans(&self) -> CleanupSummary {
        let listing = match self.runtime.list_all().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(error = %e, "failed to list containers for orphan cleanup");
                return CleanupSummary {
                    enumeration_error: Some(e.to_string()),
                    ..CleanupSummary::default()
                };
            },
        };

        let (running, stopped): (Vec<_>, Vec<_>) = listing
            .iter()
            .filter(|c| c.id().starts_with(self.prefix.as_str()))
            .partition(|c| c.is_running());

        let mut summary = CleanupSummary::default();
        for name in running.iter().map(|c| c.id()) {
            summary.running.push(name.to_string());
            debug!(command = %stop_container_command(self.runtime.binary(), name), "stopping orphan");
            let outcome = outcome_of(self.runtime.stop(name).await);
            summary.results.push(CleanupOp {
                container: name.to_string(),
                action: CleanupAction::Stop,
                outcome,
            });
            self.remove_orphan(name, &mut summary).await;
        }
        for name in stopped.iter().map(|c| c.id()) {
            summary.stopped.push(name.to_string());
            self.remove_orphan(name, &mut summary).await;
        }

        for op in summary.failures() {
            if let OpOutcome::Failed(reason) = &op.outcome {
                debug!(container = %op.container, action = ?op.action, %reason, "orphan cleanup step failed");
            }
        }

        #[cfg(feature = "metrics")]
        {
            counter!(sandbox_metrics::ORPHANS_REMOVED_TOTAL)
                .increment(summary.removed().len() as u64);
            counter!(sandbox_metrics::CLEANUP_FAILURES_TOTAL)
                .increment(summary.failures().count() as u64);
        }

        if summary.total() > 0 {
            info!(
                count = summary.total(),
                names = %summary.running.iter().chain(&summary.stopped).cloned().collect::<Vec<_>>().join(", "),
                "cleaned up orphaned containers"
            );
        }
        summary
    }

    async fn remove_orphan(&self, name: &str, summary: &mut CleanupSummary) {
        let outcome = outcome_of(self.runtime.remove(name).await);
        summary.results.push(CleanupOp {
            container: name.to_string(),
            action: CleanupAction::Remove,
            outcome,
        });
    }
}

fn outcome_of(result: Result<()>) -> OpOutcome {
    match result {
        Ok(()) => OpOutcome::Ok,
        Err(e) => OpOutcome::Failed(e.to_string()),
    }
}
