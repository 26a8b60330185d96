//! Structured diagnostic logging for the gatekeeper
//!
//! Events go through the `log` facade as `message | {json}` lines. The
//! backend is a tracing-subscriber fmt layer on stderr, filtered by
//! `RUST_LOG` (default `info`, `debug` with `--verbose`).

use crate::constants::{EVENT_TERMINATION, EVENT_VIOLATION};
use crate::models::ProcessRecord;
use anyhow::Result;
use log::{debug, error, info, warn};
use serde_json::json;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global log backend. Safe to call once per process.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))
}

/// Log levels for gatekeeper events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

/// Emits structured gatekeeper events
#[derive(Debug, Clone)]
pub struct GateLogger {
    level: LogLevel,
}

impl GateLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn log_startup(&self, allowlist_path: &Path, entries: usize, violation_log: &Path, terminate: bool) {
        let message = json!({
            "event": "gate_startup",
            "pid": std::process::id(),
            "allowlist_path": allowlist_path.display().to_string(),
            "allowlist_entries": entries,
            "violation_log": violation_log.display().to_string(),
            "terminate": terminate,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Gatekeeper started", &message);
    }

    pub fn log_shutdown(&self, reason: &str) {
        let message = json!({
            "event": "gate_shutdown",
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Gatekeeper shutting down", &message);
    }

    pub fn log_escalation(&self) {
        let message = json!({
            "event": "escalated",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Enforcement escalated to termination", &message);
    }

    pub fn log_violation(&self, record: &ProcessRecord, escalated: bool) {
        let message = json!({
            "event": EVENT_VIOLATION,
            "pid": record.pid,
            "process_name": record.name,
            "escalated": escalated,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Debug, &format!("Violation: {}", record.name), &message);
    }

    pub fn log_termination(&self, record: &ProcessRecord, outcome: &str) {
        let message = json!({
            "event": EVENT_TERMINATION,
            "pid": record.pid,
            "process_name": record.name,
            "outcome": outcome,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, &format!("Terminated {}", record.name), &message);
    }

    /// Transient, iteration-scoped failures
    pub fn log_warning(&self, warning: &str, context: Option<&str>) {
        let message = json!({
            "event": "warning",
            "message": warning,
            "context": context,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Warn, warning, &message);
    }

    pub fn log_error(&self, error_message: &str, context: Option<&str>) {
        let message = json!({
            "event": "error",
            "message": error_message,
            "context": context,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Error, error_message, &message);
    }

    fn log_structured(&self, level: LogLevel, message: &str, data: &serde_json::Value) {
        if !self.should_log(level) {
            return;
        }

        let full_message = format!("{} | {}", message, data);

        match level {
            LogLevel::Error => error!("{}", full_message),
            LogLevel::Warn => warn!("{}", full_message),
            LogLevel::Info => info!("{}", full_message),
            LogLevel::Debug => debug!("{}", full_message),
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.level
    }
}

impl Default for GateLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_log_respects_level() {
        let logger = GateLogger::new(LogLevel::Warn);

        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warn));
        assert!(!logger.should_log(LogLevel::Info));
        assert!(!logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_debug_level_logs_everything() {
        let logger = GateLogger::default();

        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_logging_without_backend_does_not_panic() {
        let logger = GateLogger::default();
        let record = ProcessRecord {
            pid: 2200,
            name: "evil".to_string(),
        };

        logger.log_violation(&record, true);
        logger.log_termination(&record, "killed");
        logger.log_warning("enumeration failed", Some("/proc"));
        logger.log_error("boom", None);
    }
}
