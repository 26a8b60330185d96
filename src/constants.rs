//! Global constants for procgate
//!
//! Centralized location for application-wide constants

use std::time::Duration;

/// Binary name, also used for the configuration directory
pub const APP_NAME: &str = "procgate";

/// PIDs below this value are treated as kernel or early-boot processes
/// and are never evaluated
pub const KERNEL_PID_THRESHOLD: u32 = 1000;

/// Delay after startup before enforcement escalates to termination
pub const ESCALATION_DELAY: Duration = Duration::from_secs(10);

/// Default allow-list file, relative to the working directory
pub const DEFAULT_ALLOWLIST_PATH: &str = "whitelist.txt";

/// Default violation log file, relative to the working directory
pub const DEFAULT_VIOLATION_LOG_PATH: &str = "violations.txt";

/// Root of the live-process registry
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Per-process file holding the display name
pub const PROC_COMM_FILE: &str = "comm";

/// Configuration file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Poll interval bounds in milliseconds (0 = unthrottled)
/// Note: bounds must match the message in GateError::InvalidInterval
pub const POLL_INTERVAL_MIN_MS: u64 = 0;
pub const POLL_INTERVAL_MAX_MS: u64 = 300_000;

/// Granularity at which sleeping loops re-check the shutdown flag
pub const SHUTDOWN_POLL_GRANULARITY: Duration = Duration::from_millis(100);

/// Event identifiers used in structured log lines
pub const EVENT_VIOLATION: &str = "violation_detected";
pub const EVENT_TERMINATION: &str = "process_terminated";
