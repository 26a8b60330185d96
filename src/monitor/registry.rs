//! Process registry backends
//!
//! Enumerates live, non-kernel PIDs and resolves each PID to its display
//! name. Both operations are fallible: enumeration failures are transient
//! for the caller, and a PID may exit between enumeration and resolution.

use crate::constants::PROC_COMM_FILE;
use crate::models::GateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Source of live processes
pub trait ProcessRegistry {
    /// Deduplicated set of PIDs eligible for enforcement
    fn list_processes(&mut self) -> Result<BTreeSet<u32>, GateError>;

    /// Trimmed display name of `pid`, or `ProcessVanished` if it has exited
    fn resolve_name(&mut self, pid: u32) -> Result<String, GateError>;
}

/// Which registry implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Read the live-process directory tree directly
    #[default]
    Procfs,
    /// Use the sysinfo crate
    Sysinfo,
}

impl std::str::FromStr for RegistryBackend {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "procfs" => Ok(RegistryBackend::Procfs),
            "sysinfo" => Ok(RegistryBackend::Sysinfo),
            other => Err(GateError::InvalidConfig(format!(
                "unknown registry backend '{}' (expected 'procfs' or 'sysinfo')",
                other
            ))),
        }
    }
}

/// Build the configured backend
pub fn open_registry(backend: RegistryBackend, root: &Path, kernel_threshold: u32) -> Box<dyn ProcessRegistry + Send> {
    match backend {
        RegistryBackend::Procfs => Box::new(ProcfsRegistry::new(root, kernel_threshold)),
        RegistryBackend::Sysinfo => Box::new(SysinfoRegistry::new(kernel_threshold)),
    }
}

/// Parse a registry entry name as an enforceable PID.
///
/// Only purely numeric names qualify, and only at or above the kernel
/// threshold. `u32::from_str` accepts a leading `+`, so digits are checked
/// explicitly first.
pub fn eligible_pid(entry_name: &str, kernel_threshold: u32) -> Option<u32> {
    if entry_name.is_empty() || !entry_name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    entry_name
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid >= kernel_threshold)
}

/// Registry backed by a procfs-style directory: one numeric directory per
/// PID, each holding a `comm` file with the display name.
#[derive(Debug, Clone)]
pub struct ProcfsRegistry {
    root: PathBuf,
    kernel_threshold: u32,
}

impl ProcfsRegistry {
    pub fn new(root: impl Into<PathBuf>, kernel_threshold: u32) -> Self {
        Self {
            root: root.into(),
            kernel_threshold,
        }
    }

    fn unavailable(&self, source: std::io::Error) -> GateError {
        GateError::RegistryUnavailable {
            root: self.root.clone(),
            source,
        }
    }
}

impl ProcessRegistry for ProcfsRegistry {
    fn list_processes(&mut self) -> Result<BTreeSet<u32>, GateError> {
        let entries = fs::read_dir(&self.root).map_err(|e| self.unavailable(e))?;

        let mut pids = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.unavailable(e))?;
            let name = entry.file_name();
            if let Some(pid) = name.to_str().and_then(|n| eligible_pid(n, self.kernel_threshold)) {
                pids.insert(pid);
            }
        }

        Ok(pids)
    }

    fn resolve_name(&mut self, pid: u32) -> Result<String, GateError> {
        let comm_path = self.root.join(pid.to_string()).join(PROC_COMM_FILE);

        // Task names are arbitrary bytes (prctl PR_SET_NAME); decode lossily
        match fs::read(&comm_path) {
            Ok(content) => Ok(String::from_utf8_lossy(&content).trim().to_string()),
            Err(e) if is_gone(&e) => Err(GateError::ProcessVanished(pid)),
            Err(source) => Err(GateError::NameUnreadable { pid, source }),
        }
    }
}

/// A dying task can report ESRCH instead of a missing entry
fn is_gone(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::NotFound || err.raw_os_error() == Some(nix::libc::ESRCH)
}

/// Portable registry using sysinfo's process table
pub struct SysinfoRegistry {
    system: System,
    kernel_threshold: u32,
}

impl SysinfoRegistry {
    pub fn new(kernel_threshold: u32) -> Self {
        Self {
            system: System::new(),
            kernel_threshold,
        }
    }
}

impl ProcessRegistry for SysinfoRegistry {
    fn list_processes(&mut self) -> Result<BTreeSet<u32>, GateError> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        Ok(self
            .system
            .processes()
            .iter()
            // Threads show up as tasks; they share their leader's name
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, _)| pid.as_u32())
            .filter(|pid| *pid >= self.kernel_threshold)
            .collect())
    }

    fn resolve_name(&mut self, pid: u32) -> Result<String, GateError> {
        let sys_pid = Pid::from_u32(pid);
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);

        self.system
            .process(sys_pid)
            .map(|process| process.name().to_string_lossy().trim().to_string())
            .ok_or(GateError::ProcessVanished(pid))
    }
}
