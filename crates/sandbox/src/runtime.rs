use std::process::Output;

use {async_trait::async_trait, serde::Deserialize, tracing::debug};

use crate::{Error, Result};

/// One entry of `container ls -a --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerInfo {
    pub status: String,
    pub configuration: ContainerConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerConfiguration {
    pub id: String,
}

impl ContainerInfo {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            configuration: ContainerConfiguration { id: id.into() },
        }
    }

    pub fn id(&self) -> &str {
        &self.configuration.id
    }

    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn is_stopped(&self) -> bool {
        self.status == "stopped"
    }
}

/// Container runtime control surface.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Runtime binary name, for operator messages.
    fn binary(&self) -> &str;

    /// Succeeds only when the runtime service is up.
    async fn status(&self) -> Result<()>;

    async fn start(&self) -> Result<()>;

    /// Every container known to the runtime, in any state.
    async fn list_all(&self) -> Result<Vec<ContainerInfo>>;

    async fn stop(&self, name: &str) -> Result<()>;

    async fn remove(&self, name: &str) -> Result<()>;
}

/// [`ContainerRuntime`] backed by the runtime's CLI.
#[derive(Debug, Clone)]
pub struct CliContainerRuntime {
    bin: String,
}

impl CliContainerRuntime {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        let command = format!("{} {}", self.bin, args.join(" "));
        debug!(%command, "running container runtime command");
        let output = tokio::process::Command::new(&self.bin)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Default for CliContainerRuntime {
    fn default() -> Self {
        Self::new("container")
    }
}

#[async_trait]
impl ContainerRuntime for CliContainerRuntime {
    fn binary(&self) -> &str {
        &self.bin
    }

    async fn status(&self) -> Result<()> {
        self.run(&["system", "status"]).await.map(drop)
    }

    async fn start(&self) -> Result<()> {
        self.run(&["system", "start"]).await.map(drop)
    }

    async fn list_all(&self) -> Result<Vec<ContainerInfo>> {
        let output = self.run(&["ls", "-a", "--format", "json"]).await?;
        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.run(&["stop", name]).await.map(drop)
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.run(&["rm", name]).await.map(drop)
    }
}

/// Parse `ls --format json` output. Blank output means no containers.
pub(crate) fn parse_listing(stdout: &str) -> Result<Vec<ContainerInfo>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Runtime arguments for a read-only bind mount.
pub fn readonly_mount_args(host_path: &str, container_path: &str) -> Vec<String> {
    vec![
        "--mount".to_string(),
        format!("type=bind,source={host_path},target={container_path},readonly"),
    ]
}

/// Shell command that stops the named container.
pub fn stop_container_command(bin: &str, name: &str) -> String {
    format!("{bin} stop {name}")
}
