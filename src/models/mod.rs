//! Data models module
//!
//! Defines core data structures:
//! - ProcessRecord: A live PID and its resolved display name
//! - Verdict / ViolationAction: Outcome of one enforcement decision
//! - IterationReport: Counters for a single scan of the registry
//! - GateError: Error taxonomy shared by every component

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A live process discovered during one loop iteration.
/// Never cached: the process may already be gone by the time it is acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID (PID)
    pub pid: u32,
    /// Trimmed display name as reported by the OS
    pub name: String,
}

/// Allow-list decision for a single process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Violation,
}

/// What the enforcer did about a violating process beyond recording it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationAction {
    /// Observe-only: the notice was emitted, nothing else
    Recorded,
    /// Escalated, but termination is disabled so only the notice was emitted
    TerminationNotice,
    /// SIGKILL delivered (or the process was already gone)
    Terminated,
    /// Escalated and the kill attempt failed
    TerminationFailed,
}

/// Counters for one pass over the process registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IterationReport {
    /// PIDs whose names were resolved and checked against the allow-list
    pub evaluated: usize,
    /// PIDs that exited between enumeration and name resolution
    pub skipped_vanished: usize,
    /// PIDs whose name could not be read for another reason
    pub skipped_unreadable: usize,
    /// Processes not present in the allow-list
    pub violations: usize,
    /// Violations that produced a new line in the violation log
    pub newly_logged: usize,
    /// Violations for which SIGKILL was delivered
    pub terminated: usize,
}

impl IterationReport {
    /// Fold another report into this one (used for multi-iteration summaries)
    pub fn absorb(&mut self, other: &IterationReport) {
        self.evaluated += other.evaluated;
        self.skipped_vanished += other.skipped_vanished;
        self.skipped_unreadable += other.skipped_unreadable;
        self.violations += other.violations;
        self.newly_logged += other.newly_logged;
        self.terminated += other.terminated;
    }
}

/// Error taxonomy for the gatekeeper.
///
/// Only `AllowListUnavailable` and `InvalidConfig`/`InvalidInterval` are fatal;
/// everything else is scoped to a single iteration or PID.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("cannot load allow-list {path}: {source}")]
    AllowListUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list process registry {root}: {source}")]
    RegistryUnavailable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("process {0} exited before its name could be read")]
    ProcessVanished(u32),

    #[error("cannot read name of process {pid}: {source}")]
    NameUnreadable {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot update violation log {path}: {source}")]
    ViolationLogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Note: bounds must match POLL_INTERVAL_MIN_MS/MAX_MS in constants.rs
    #[error("Invalid poll interval: {0}ms. Must be between 0 and 300000 milliseconds")]
    InvalidInterval(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to terminate process {pid}: {source}")]
    Termination {
        pid: u32,
        #[source]
        source: nix::Error,
    },
}

impl GateError {
    /// Whether the error is the expected enumerate/resolve race
    pub fn is_vanished(&self) -> bool {
        matches!(self, GateError::ProcessVanished(_))
    }
}
