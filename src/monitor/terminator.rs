//! Forceful termination of violating processes

use crate::models::GateError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};

/// Whether escalated violations are actually killed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationMode {
    /// Emit the termination notice but never signal the process
    #[default]
    AuditOnly,
    /// Deliver SIGKILL
    Kill,
}

impl TerminationMode {
    pub fn from_flag(terminate: bool) -> Self {
        if terminate {
            TerminationMode::Kill
        } else {
            TerminationMode::AuditOnly
        }
    }

    pub fn is_live(self) -> bool {
        self == TerminationMode::Kill
    }
}

/// Outcome of a termination attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// Nothing was sent (audit-only mode)
    Skipped,
    /// SIGKILL delivered
    Killed,
    /// The process had already exited
    AlreadyGone,
}

/// Deliver SIGKILL to `pid` according to `mode`
pub fn terminate(pid: u32, mode: TerminationMode) -> Result<TerminationOutcome, GateError> {
    if !mode.is_live() {
        return Ok(TerminationOutcome::Skipped);
    }

    let raw = i32::try_from(pid).map_err(|_| GateError::Termination {
        pid,
        source: Errno::EINVAL,
    })?;

    match kill(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => Ok(TerminationOutcome::Killed),
        Err(Errno::ESRCH) => Ok(TerminationOutcome::AlreadyGone),
        Err(source) => Err(GateError::Termination { pid, source }),
    }
}
