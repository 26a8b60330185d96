//! Enforcement loop
//!
//! Drives registry enumeration, name resolution and the allow-list check,
//! and reacts to violations. The decision path (allow-list lookup,
//! escalation read, violation-log append and console notice) runs under a
//! single mutex so concurrent callers can never interleave their writes.

use crate::constants::SHUTDOWN_POLL_GRANULARITY;
use crate::gate::logging::GateLogger;
use crate::models::{GateError, IterationReport, ProcessRecord, Verdict, ViolationAction};
use crate::monitor::escalation::Escalation;
use crate::monitor::registry::ProcessRegistry;
use crate::monitor::terminator::{self, TerminationMode, TerminationOutcome};
use crate::output::{self, Console};
use crate::policy::{AllowList, ViolationLog};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shared flag set by the shutdown handler
pub type ShutdownFlag = Arc<AtomicBool>;

/// Loop tuning that does not participate in decisions
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    /// Delay between iterations; zero re-scans immediately
    pub poll_interval: Duration,
    pub termination: TerminationMode,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            termination: TerminationMode::AuditOnly,
        }
    }
}

/// Result of evaluating one violating process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationOutcome {
    pub action: ViolationAction,
    /// A new line was appended to the violation log
    pub newly_logged: bool,
}

/// State touched by every enforcement decision
struct DecisionState {
    allowlist: AllowList,
    violation_log: ViolationLog,
    console: Console,
}

/// Process-wide enforcement context, constructed once at startup
pub struct EnforcementContext {
    decision: Mutex<DecisionState>,
    escalation: Escalation,
    settings: LoopSettings,
    logger: GateLogger,
    shutdown: ShutdownFlag,
    escalation_announced: AtomicBool,
}

impl EnforcementContext {
    pub fn new(
        allowlist: AllowList,
        violation_log: ViolationLog,
        escalation: Escalation,
        settings: LoopSettings,
        console: Console,
        logger: GateLogger,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            decision: Mutex::new(DecisionState {
                allowlist,
                violation_log,
                console,
            }),
            escalation,
            settings,
            logger,
            shutdown,
            escalation_announced: AtomicBool::new(false),
        }
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Print an informational line through the shared console
    pub fn announce(&self, line: &str) {
        self.lock_decision().console.info(line);
    }

    /// Print a line that is shown even in quiet mode
    pub fn notice(&self, line: &str) {
        self.lock_decision().console.notice(line);
    }

    /// Evaluate one resolved process. Returns `None` when it is allowed.
    pub fn evaluate(&self, record: &ProcessRecord) -> Option<ViolationOutcome> {
        let mut state = self.lock_decision();

        if state.allowlist.verdict(&record.name) == Verdict::Allowed {
            return None;
        }

        let timestamp = output::timestamp_now();
        state.console.notice(&output::format_violation(record, &timestamp));

        let escalated = self.escalation.is_active();
        self.logger.log_violation(record, escalated);

        let action = if escalated {
            state.console.notice(&output::format_termination_notice(
                record,
                &timestamp,
                self.settings.termination,
            ));
            self.terminate(record)
        } else {
            ViolationAction::Recorded
        };

        let newly_logged = match state.violation_log.record(&record.name) {
            Ok(appended) => {
                if appended {
                    let line = output::format_recorded(&record.name, state.violation_log.path());
                    state.console.info(&line);
                }
                appended
            }
            Err(e) => {
                self.logger.log_warning(&e.to_string(), Some(&record.name));
                false
            }
        };

        Some(ViolationOutcome { action, newly_logged })
    }

    fn terminate(&self, record: &ProcessRecord) -> ViolationAction {
        match terminator::terminate(record.pid, self.settings.termination) {
            Ok(TerminationOutcome::Skipped) => ViolationAction::TerminationNotice,
            Ok(TerminationOutcome::Killed) => {
                self.logger.log_termination(record, "killed");
                ViolationAction::Terminated
            }
            Ok(TerminationOutcome::AlreadyGone) => {
                self.logger.log_termination(record, "already_exited");
                ViolationAction::Terminated
            }
            Err(e) => {
                self.logger.log_warning(&e.to_string(), Some(&record.name));
                ViolationAction::TerminationFailed
            }
        }
    }

    /// One pass: enumerate, resolve, evaluate.
    ///
    /// Enumeration failure is returned to the caller; per-PID failures are
    /// absorbed into the report. Stops early if shutdown is requested.
    pub fn run_iteration(&self, registry: &mut dyn ProcessRegistry) -> Result<IterationReport, GateError> {
        let pids = registry.list_processes()?;
        self.announce_escalation();

        let mut report = IterationReport::default();

        for pid in pids {
            if self.shutdown_requested() {
                break;
            }

            let name = match registry.resolve_name(pid) {
                Ok(name) => name,
                Err(e) if e.is_vanished() => {
                    log::debug!("{}", e);
                    report.skipped_vanished += 1;
                    continue;
                }
                Err(e) => {
                    self.logger.log_warning(&e.to_string(), None);
                    report.skipped_unreadable += 1;
                    continue;
                }
            };

            report.evaluated += 1;

            let record = ProcessRecord { pid, name };
            if let Some(outcome) = self.evaluate(&record) {
                report.violations += 1;
                if outcome.newly_logged {
                    report.newly_logged += 1;
                }
                if outcome.action == ViolationAction::Terminated {
                    report.terminated += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run iterations until the shutdown flag is set.
    /// Returns the accumulated counters.
    pub fn run(&self, registry: &mut dyn ProcessRegistry) -> IterationReport {
        let mut total = IterationReport::default();

        while !self.shutdown_requested() {
            match self.run_iteration(registry) {
                Ok(report) => total.absorb(&report),
                Err(e) => {
                    self.logger.log_warning(&format!("Failed to list running processes: {}", e), None);
                }
            }

            self.pause();
        }

        total
    }

    /// Sleep for the poll interval, waking early on shutdown
    fn pause(&self) {
        let interval = self.settings.poll_interval;
        if interval.is_zero() {
            return;
        }

        let deadline = Instant::now() + interval;
        while !self.shutdown_requested() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(SHUTDOWN_POLL_GRANULARITY));
        }
    }

    fn announce_escalation(&self) {
        if self.escalation.is_active() && !self.escalation_announced.swap(true, Ordering::SeqCst) {
            self.logger.log_escalation();
        }
    }

    fn lock_decision(&self) -> std::sync::MutexGuard<'_, DecisionState> {
        self.decision.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
