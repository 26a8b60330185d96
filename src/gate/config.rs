//! Configuration management for the gatekeeper
//!
//! Handles TOML configuration parsing and validation. Every field has a
//! default so an absent or partial file is valid; CLI flags are layered on
//! top by the caller.

use crate::constants::{
    APP_NAME, CONFIG_FILE_NAME, DEFAULT_ALLOWLIST_PATH, DEFAULT_PROC_ROOT,
    DEFAULT_VIOLATION_LOG_PATH, ESCALATION_DELAY, KERNEL_PID_THRESHOLD, POLL_INTERVAL_MAX_MS,
    POLL_INTERVAL_MIN_MS,
};
use crate::models::GateError;
use crate::monitor::registry::RegistryBackend;
use crate::monitor::terminator::TerminationMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main gatekeeper configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfiguration {
    pub policy: PolicySettings,
    pub enforcement: EnforcementSettings,
}

/// Where the allow-list is read from and violations are written to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    pub allowlist_path: PathBuf,
    /// May equal `allowlist_path` to append violators to the policy file itself
    pub violation_log_path: PathBuf,
}

/// Enforcement loop behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnforcementSettings {
    /// Delay between scans in milliseconds (0-300000, 0 = continuous)
    pub poll_interval_ms: u64,
    /// Seconds after startup before violations escalate to termination
    pub escalation_delay_secs: u64,
    /// PIDs below this value are exempt
    pub kernel_pid_threshold: u32,
    /// Actually deliver SIGKILL once escalated
    pub terminate: bool,
    pub backend: RegistryBackend,
    /// Root of the live-process registry for the procfs backend
    pub proc_root: PathBuf,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            allowlist_path: PathBuf::from(DEFAULT_ALLOWLIST_PATH),
            violation_log_path: PathBuf::from(DEFAULT_VIOLATION_LOG_PATH),
        }
    }
}

impl Default for EnforcementSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MIN_MS,
            escalation_delay_secs: ESCALATION_DELAY.as_secs(),
            kernel_pid_threshold: KERNEL_PID_THRESHOLD,
            terminate: false,
            backend: RegistryBackend::Procfs,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl GateConfiguration {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GateConfiguration = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Per-user configuration location, e.g. `~/.config/procgate/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the per-user configuration if present, otherwise defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.is_file() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), GateError> {
        validate_poll_interval(self.enforcement.poll_interval_ms)?;

        if self.policy.allowlist_path.as_os_str().is_empty() {
            return Err(GateError::InvalidConfig("allowlist_path must not be empty".to_string()));
        }
        if self.policy.violation_log_path.as_os_str().is_empty() {
            return Err(GateError::InvalidConfig("violation_log_path must not be empty".to_string()));
        }
        if self.enforcement.backend == RegistryBackend::Procfs
            && self.enforcement.proc_root.as_os_str().is_empty()
        {
            return Err(GateError::InvalidConfig("proc_root must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.enforcement.poll_interval_ms)
    }

    pub fn escalation_delay(&self) -> Duration {
        Duration::from_secs(self.enforcement.escalation_delay_secs)
    }

    pub fn termination_mode(&self) -> TerminationMode {
        TerminationMode::from_flag(self.enforcement.terminate)
    }

    /// Whether violators are appended to the policy file itself
    pub fn shares_policy_file(&self) -> bool {
        self.policy.allowlist_path == self.policy.violation_log_path
    }
}

pub fn validate_poll_interval(interval_ms: u64) -> Result<(), GateError> {
    if !(POLL_INTERVAL_MIN_MS..=POLL_INTERVAL_MAX_MS).contains(&interval_ms) {
        return Err(GateError::InvalidInterval(interval_ms));
    }
    Ok(())
}
