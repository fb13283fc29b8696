use {
    anyhow::Result,
    clap::Subcommand,
    waterline_config::WaterlineConfig,
    waterline_sandbox::{CleanupAction, CleanupSummary, OpOutcome, SandboxGuard},
};

#[derive(Subcommand)]
pub enum SandboxAction {
    /// Make sure the container runtime is running, starting it if needed.
    Ensure,
    /// Stop and remove containers left over from previous runs.
    Cleanup,
}

pub async fn handle_sandbox(action: SandboxAction, config: &WaterlineConfig) -> Result<()> {
    let guard = SandboxGuard::from_config(&config.sandbox);
    match action {
        SandboxAction::Ensure => {
            guard.ensure_running().await?;
            println!("Container runtime is running.");
        },
        SandboxAction::Cleanup => {
            let summary = guard.cleanup_orphans().await;
            for line in describe(&summary, guard.prefix()) {
                println!("{line}");
            }
        },
    }
    Ok(())
}

fn describe(summary: &CleanupSummary, prefix: &str) -> Vec<String> {
    if let Some(ref err) = summary.enumeration_error {
        return vec![format!("Could not list containers: {err}")];
    }
    if summary.total() == 0 {
        return vec![format!("No orphaned '{prefix}*' containers.")];
    }

    let mut lines = vec![format!(
        "Orphaned containers: {} running, {} stopped",
        summary.running.len(),
        summary.stopped.len()
    )];
    for op in &summary.results {
        let action = match op.action {
            CleanupAction::Stop => "stop",
            CleanupAction::Remove => "remove",
        };
        lines.push(match &op.outcome {
            OpOutcome::Ok => format!("  {action} {}: ok", op.container),
            OpOutcome::Failed(reason) => format!("  {action} {}: failed ({reason})", op.container),
        });
    }
    lines
}
