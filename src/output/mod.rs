//! Console output module
//!
//! Handles:
//! - Human-readable violation and termination notices
//! - Startup banner and `--once` summary
//! - Quiet mode behavior

use crate::models::{IterationReport, ProcessRecord};
use crate::monitor::terminator::TerminationMode;
use std::io::Write;
use std::path::Path;

/// ISO 8601 timestamp for the current instant.
/// Falls back to an empty stamp if formatting fails.
pub fn timestamp_now() -> String {
    use time::format_description::well_known::Iso8601;
    use time::OffsetDateTime;

    OffsetDateTime::now_utc()
        .format(&Iso8601::DEFAULT)
        .unwrap_or_default()
}

pub fn format_violation(record: &ProcessRecord, timestamp: &str) -> String {
    format!(
        "[{}] Unauthorized process detected: {} (PID {})",
        timestamp, record.name, record.pid
    )
}

pub fn format_termination_notice(record: &ProcessRecord, timestamp: &str, mode: TerminationMode) -> String {
    match mode {
        TerminationMode::Kill => format!(
            "[{}] Sending SIGKILL to {} (PID {})",
            timestamp, record.name, record.pid
        ),
        TerminationMode::AuditOnly => format!(
            "[{}] Would send SIGKILL to {} (PID {}) (termination disabled)",
            timestamp, record.name, record.pid
        ),
    }
}

pub fn format_recorded(name: &str, log_path: &Path) -> String {
    format!("Recorded '{}' in {}", name, log_path.display())
}

pub fn format_summary(report: &IterationReport) -> String {
    let mut out = String::from("Scan Summary:\n");
    out.push_str(&format!("  Evaluated: {} processes\n", report.evaluated));
    out.push_str(&format!("  Violations: {}\n", report.violations));
    out.push_str(&format!("  Newly recorded: {}\n", report.newly_logged));
    if report.skipped_vanished > 0 {
        out.push_str(&format!("  Skipped (exited): {}\n", report.skipped_vanished));
    }
    if report.skipped_unreadable > 0 {
        out.push_str(&format!("  Skipped (unreadable): {}\n", report.skipped_unreadable));
    }
    if report.terminated > 0 {
        out.push_str(&format!("  Terminated: {}\n", report.terminated));
    }
    out
}

/// Line-oriented console writer shared by the enforcement loop
pub struct Console {
    out: Box<dyn Write + Send>,
    quiet: bool,
}

impl Console {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), quiet)
    }

    pub fn new(out: Box<dyn Write + Send>, quiet: bool) -> Self {
        Self { out, quiet }
    }

    /// Always printed: violations, termination notices
    pub fn notice(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            log::debug!("console write failed: {}", e);
        }
    }

    /// Suppressed in quiet mode: banner, bookkeeping lines
    pub fn info(&mut self, line: &str) {
        if !self.quiet {
            self.notice(line);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// In-memory console target that tests can read back
    #[derive(Clone, Default)]
    pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
