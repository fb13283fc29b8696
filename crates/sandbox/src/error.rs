use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The runtime binary could not be spawned at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The runtime binary ran and reported failure.
    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// `ls --format json` output did not parse.
    #[error("unreadable container listing: {0}")]
    Listing(#[from] serde_json::Error),

    /// The container runtime is down and could not be started. Agents cannot
    /// run without it; the host process should exit.
    #[error("container runtime '{bin}' is required but failed to start: {reason}")]
    RuntimeUnavailable { bin: String, reason: String },
}

impl Error {
    #[must_use]
    pub fn runtime_unavailable(bin: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RuntimeUnavailable {
            bin: bin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RuntimeUnavailable { .. })
    }

    /// Operator-facing instructions for a [`Error::RuntimeUnavailable`].
    pub fn fatal_banner(&self) -> Option<String> {
        let Self::RuntimeUnavailable { bin, .. } = self else {
            return None;
        };
        let lines = [
            "FATAL: Container runtime failed to start".to_string(),
            String::new(),
            "Agents cannot run without a container runtime. To fix:".to_string(),
            format!("1. Ensure the `{bin}` runtime is installed"),
            format!("2. Run: {bin} system start"),
            "3. Restart waterline".to_string(),
        ];
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
        let mut out = format!("╔{}╗\n", "═".repeat(width));
        for line in &lines {
            let pad = width - 2 - line.chars().count();
            out.push_str(&format!("║  {line}{}║\n", " ".repeat(pad)));
        }
        out.push_str(&format!("╚{}╝", "═".repeat(width)));
        Some(out)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_only_for_fatal_errors() {
        let fatal = Error::runtime_unavailable("container", "timed out after 30s");
        assert!(fatal.is_fatal());
        let banner = fatal.fatal_banner().unwrap();
        assert!(banner.contains("FATAL: Container runtime failed to start"));
        assert!(banner.contains("2. Run: container system start"));
        assert!(banner.starts_with('╔'));
        assert!(banner.ends_with('╝'));

        let other = Error::CommandFailed {
            command: "container rm x".into(),
            status: "exit status: 1".into(),
            stderr: "not found".into(),
        };
        assert!(!other.is_fatal());
        assert!(other.fatal_banner().is_none());
    }

    #[test]
    fn banner_lines_are_aligned() {
        let banner = Error::runtime_unavailable("docker", "x").fatal_banner().unwrap();
        let widths: Vec<usize> = banner.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{banner}");
    }
}
