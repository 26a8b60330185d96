//! Gatekeeper orchestration
//!
//! Wires configuration, policy, registry and enforcement loop together:
//! - Configuration loading with CLI overrides
//! - Fatal allow-list load at startup
//! - Interrupt handling (SIGINT/SIGTERM) via a shared shutdown flag
//! - Continuous or single-scan enforcement

pub mod config;
pub mod logging;

use crate::cli::CliOptions;
use crate::constants::APP_NAME;
use crate::gate::config::GateConfiguration;
use crate::gate::logging::{GateLogger, LogLevel};
use crate::monitor::enforcer::{EnforcementContext, LoopSettings, ShutdownFlag};
use crate::monitor::escalation::Escalation;
use crate::monitor::registry::open_registry;
use crate::output::{self, Console};
use crate::policy::{AllowList, ViolationLog};
use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Register SIGINT/SIGTERM handlers that set the returned flag.
///
/// A second signal while the flag is already set exits immediately with
/// success status, for the case where the loop is stuck inside a stalled
/// registry call.
pub fn install_shutdown_handler() -> Result<ShutdownFlag> {
    let flag = Arc::new(AtomicBool::new(false));

    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 0, Arc::clone(&flag))
            .with_context(|| format!("Failed to register handler for signal {}", signal))?;
        signal_hook::flag::register(signal, Arc::clone(&flag))
            .with_context(|| format!("Failed to register handler for signal {}", signal))?;
    }

    Ok(flag)
}

/// Resolve the effective configuration: file (explicit or per-user), then CLI
pub fn resolve_configuration(options: &CliOptions) -> Result<GateConfiguration> {
    let mut config = match &options.config_path {
        Some(path) => GateConfiguration::load_from_file(path)?,
        None => GateConfiguration::load_default()?,
    };

    options.apply(&mut config);
    config.validate()?;

    Ok(config)
}

/// Run the gatekeeper until interrupted (or for one scan with `--once`)
pub fn run(options: &CliOptions) -> Result<()> {
    let config = resolve_configuration(options)?;
    // The escalation clock counts from startup, before any scanning
    let escalation = Escalation::new(config.escalation_delay());

    let logger = GateLogger::new(if options.verbose { LogLevel::Debug } else { LogLevel::Info });

    let allowlist = match AllowList::load(&config.policy.allowlist_path) {
        Ok(allowlist) => allowlist,
        Err(e) => {
            logger.log_error(&e.to_string(), Some(&config.policy.allowlist_path.display().to_string()));
            return Err(e.into());
        }
    };
    let shutdown = install_shutdown_handler()?;

    logger.log_startup(
        &config.policy.allowlist_path,
        allowlist.len(),
        &config.policy.violation_log_path,
        config.enforcement.terminate,
    );

    if config.shares_policy_file() {
        logger.log_warning(
            "Violation log is the allow-list file: recorded violators become allowed on next start",
            Some(&config.policy.allowlist_path.display().to_string()),
        );
    }

    let mut registry = open_registry(
        config.enforcement.backend,
        &config.enforcement.proc_root,
        config.enforcement.kernel_pid_threshold,
    );

    if config.enforcement.terminate {
        let own_name = registry
            .resolve_name(std::process::id())
            .unwrap_or_else(|_| APP_NAME.to_string());
        if !allowlist.is_allowed(&own_name) {
            logger.log_warning(
                "Termination is enabled but the gatekeeper's own name is not allow-listed; it will kill itself once escalated",
                Some(&own_name),
            );
        }
    }

    let banner = format!(
        "Enforcing {} allowed process names (escalation in {}s, termination {})...",
        allowlist.len(),
        escalation.remaining().as_secs_f64().ceil(),
        if config.enforcement.terminate { "enabled" } else { "disabled" },
    );

    let context = EnforcementContext::new(
        allowlist,
        ViolationLog::new(&config.policy.violation_log_path),
        escalation,
        LoopSettings {
            poll_interval: config.poll_interval(),
            termination: config.termination_mode(),
        },
        Console::stdout(options.quiet),
        logger.clone(),
        shutdown,
    );

    if options.once {
        let report = match context.run_iteration(registry.as_mut()) {
            Ok(report) => report,
            Err(e) => {
                logger.log_error(&e.to_string(), None);
                return Err(e).context("Failed to scan running processes");
            }
        };
        context.announce(output::format_summary(&report).trim_end());
        return Ok(());
    }

    context.announce(&banner);
    context.announce("Press Ctrl+C to stop.");

    let total = context.run(registry.as_mut());

    context.notice("\nGatekeeper stopped.");
    log::debug!(
        "evaluated {} processes, {} violations, {} terminated",
        total.evaluated,
        total.violations,
        total.terminated
    );
    logger.log_shutdown("Received shutdown signal");

    Ok(())
}
