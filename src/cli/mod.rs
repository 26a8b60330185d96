//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Policy file locations (allow-list, violation log, config file)
//! - Enforcement tuning (poll interval, escalation delay, kernel threshold)
//! - Termination opt-in and registry backend selection
//! - Single-scan, quiet and verbose modes
//! - Help and version commands

use crate::gate::config::{validate_poll_interval, GateConfiguration};
use crate::monitor::registry::RegistryBackend;
use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Version string with the build's git hash
const VERSION: &str = concat!(env!("PROCGATE_VERSION"), " (", env!("GIT_HASH"), ")");

/// Parsed command-line options. `None` means "keep the configured value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub allowlist: Option<PathBuf>,
    pub violation_log: Option<PathBuf>,
    pub interval_ms: Option<u64>,
    pub escalation_delay_secs: Option<u64>,
    pub kernel_threshold: Option<u32>,
    pub terminate: bool,
    pub backend: Option<RegistryBackend>,
    pub proc_root: Option<PathBuf>,
    pub once: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn build_command() -> Command {
    Command::new("procgate")
        .version(VERSION)
        .about("Enforce an allow-list of process names on this host")
        .long_about(
            "Continuously scans running processes and reports any whose name is not in the \
             allow-list. After the escalation delay, violations also trigger termination \
             (audit-only unless --terminate is given).",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("allowlist")
                .short('a')
                .long("allowlist")
                .value_name("FILE")
                .help("Allow-list file, one process name per line [default: whitelist.txt]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("violation-log")
                .short('l')
                .long("violation-log")
                .value_name("FILE")
                .help("File that unauthorized process names are appended to [default: violations.txt]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Delay between scans in milliseconds, 0 for continuous scanning [default: 0]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("escalation-delay")
                .long("escalation-delay")
                .value_name("SECS")
                .help("Seconds after startup before violations escalate to termination [default: 10]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("kernel-threshold")
                .long("kernel-threshold")
                .value_name("PID")
                .help("PIDs below this value are never evaluated [default: 1000]")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("terminate")
                .long("terminate")
                .help("Send SIGKILL to violating processes once escalated")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .value_name("NAME")
                .help("Process registry backend")
                .value_parser(["procfs", "sysinfo"]),
        )
        .arg(
            Arg::new("proc-root")
                .long("proc-root")
                .value_name("DIR")
                .help("Root of the live-process registry [default: /proc]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Run a single scan, print a summary and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print violation and termination notices")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging on stderr")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliOptions> {
    from_matches(&build_command().get_matches())
}

pub fn from_matches(matches: &ArgMatches) -> Result<CliOptions> {
    let interval_ms = matches.get_one::<u64>("interval").copied();
    if let Some(interval) = interval_ms {
        validate_poll_interval(interval)?;
    }

    let backend = matches
        .get_one::<String>("backend")
        .map(|name| name.parse::<RegistryBackend>())
        .transpose()?;

    if let Some(path) = matches.get_one::<PathBuf>("config") {
        if !path.exists() {
            return Err(anyhow!("Configuration file does not exist: {}", path.display()));
        }
    }

    Ok(CliOptions {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        allowlist: matches.get_one::<PathBuf>("allowlist").cloned(),
        violation_log: matches.get_one::<PathBuf>("violation-log").cloned(),
        interval_ms,
        escalation_delay_secs: matches.get_one::<u64>("escalation-delay").copied(),
        kernel_threshold: matches.get_one::<u32>("kernel-threshold").copied(),
        terminate: matches.get_flag("terminate"),
        backend,
        proc_root: matches.get_one::<PathBuf>("proc-root").cloned(),
        once: matches.get_flag("once"),
        quiet: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
    })
}

impl CliOptions {
    /// Layer command-line overrides on top of file configuration
    pub fn apply(&self, config: &mut GateConfiguration) {
        if let Some(path) = &self.allowlist {
            config.policy.allowlist_path = path.clone();
        }
        if let Some(path) = &self.violation_log {
            config.policy.violation_log_path = path.clone();
        }
        if let Some(interval) = self.interval_ms {
            config.enforcement.poll_interval_ms = interval;
        }
        if let Some(delay) = self.escalation_delay_secs {
            config.enforcement.escalation_delay_secs = delay;
        }
        if let Some(threshold) = self.kernel_threshold {
            config.enforcement.kernel_pid_threshold = threshold;
        }
        if self.terminate {
            config.enforcement.terminate = true;
        }
        if let Some(backend) = self.backend {
            config.enforcement.backend = backend;
        }
        if let Some(root) = &self.proc_root {
            config.enforcement.proc_root = root.clone();
        }
    }
}
