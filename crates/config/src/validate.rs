//! Configuration validation.
//!
//! Catches channel and sandbox settings that would only fail later at
//! routing or startup time.

use std::collections::HashSet;

use crate::schema::WaterlineConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "channels[1].name"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded config.
pub fn validate(config: &WaterlineConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let mut seen = HashSet::new();

    for (i, channel) in config.channels.iter().enumerate() {
        let path = format!("channels[{i}]");
        if channel.name.trim().is_empty() {
            result.push(Severity::Error, format!("{path}.name"), "channel name is empty");
        } else if !seen.insert(channel.name.as_str()) {
            result.push(
                Severity::Error,
                format!("{path}.name"),
                format!("duplicate channel name '{}'", channel.name),
            );
        }
        if !channel.has_ownership_rules() {
            result.push(
                Severity::Error,
                path.clone(),
                "channel owns no addresses (set owns_prefixes or owns_suffixes)",
            );
        }
        if channel
            .owns_prefixes
            .iter()
            .chain(&channel.owns_suffixes)
            .any(|rule| rule.is_empty())
        {
            result.push(
                Severity::Error,
                path,
                "empty ownership rule would claim every address",
            );
        }
    }

    if config.sandbox.start_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "sandbox.start_timeout_secs",
            "start timeout must be greater than zero",
        );
    }
    if config.sandbox.container_prefix.is_empty() {
        result.push(
            Severity::Warning,
            "sandbox.container_prefix",
            "empty prefix makes orphan cleanup remove every container",
        );
    }
    if !config.channels.is_empty() && config.channels_check.probe_jids.is_empty() {
        result.push(
            Severity::Warning,
            "channels_check.probe_jids",
            "no probe addresses configured; ownership overlap cannot be checked",
        );
    }

    result
}
