//! End-to-end checks of one enforcement pass (`--once`) against a
//! fabricated process registry.

mod helpers;

use helpers::TestEnvironment;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_reference_snapshot() {
    let env = TestEnvironment::new(&["init", "bash"], &[(1, "init"), (1050, "bash"), (2200, "evil")]).unwrap();

    env.command()
        .arg("--once")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized process detected: evil (PID 2200)"))
        .stdout(predicate::str::contains("(PID 1050)").not())
        .stdout(predicate::str::contains("(PID 1)").not())
        .stdout(predicate::str::contains("SIGKILL").not())
        .stdout(predicate::str::contains("Evaluated: 2 processes"));

    assert_eq!(env.violation_log(), "evil\n");
}

#[test]
fn test_repeated_violation_recorded_once() {
    let env = TestEnvironment::new(&["bash"], &[(2200, "evil")]).unwrap();

    env.command().arg("--once").assert().success();
    env.command()
        .arg("--once")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized process detected: evil"))
        .stdout(predicate::str::contains("Newly recorded: 0"));

    assert_eq!(env.violation_log(), "evil\n");
}

#[test]
fn test_kernel_threshold_exempts_low_pids() {
    let env = TestEnvironment::new(&[], &[(1, "systemd"), (999, "kthreadd"), (1000, "agent")]).unwrap();

    env.command()
        .arg("--once")
        .assert()
        .success()
        .stdout(predicate::str::contains("agent (PID 1000)"))
        .stdout(predicate::str::contains("systemd").not())
        .stdout(predicate::str::contains("kthreadd").not());
}

#[test]
fn test_custom_kernel_threshold() {
    let env = TestEnvironment::new(&[], &[(500, "daemon")]).unwrap();

    env.command()
        .args(["--once", "--kernel-threshold", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("daemon (PID 500)"));
}

#[test]
fn test_escalated_violation_prints_termination_notice() {
    let env = TestEnvironment::new(&["bash"], &[(2200, "evil")]).unwrap();

    env.command()
        .args(["--once", "--escalation-delay", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized process detected: evil (PID 2200)"))
        .stdout(predicate::str::contains("Would send SIGKILL to evil (PID 2200)"));
}

#[test]
fn test_missing_allowlist_is_fatal() {
    let env = TestEnvironment::new(&[], &[(2200, "evil")]).unwrap();
    fs::remove_file(env.allowlist_path()).unwrap();

    env.command()
        .arg("--once")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("allow-list"))
        .stderr(predicate::str::contains(r#""event":"error""#));

    assert!(env.violation_log().is_empty());
}

#[test]
fn test_missing_registry_fails_single_scan() {
    let env = TestEnvironment::new(&[], &[]).unwrap();
    fs::remove_dir(env.proc_root()).unwrap();

    env.command()
        .arg("--once")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to scan running processes"));
}

#[test]
fn test_quiet_mode_keeps_violation_notices() {
    let env = TestEnvironment::new(&[], &[(2200, "evil")]).unwrap();

    env.command()
        .args(["--once", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized process detected: evil"))
        .stdout(predicate::str::contains("Recorded").not())
        .stdout(predicate::str::contains("Scan Summary").not());
}

#[test]
fn test_shared_policy_file_appends_to_allowlist() {
    let env = TestEnvironment::new(&["init"], &[(2200, "evil")]).unwrap();
    let allowlist = env.allowlist_path().display().to_string();

    env.command()
        .args(["--once", "--violation-log", allowlist.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized process detected: evil"));

    assert_eq!(fs::read_to_string(env.allowlist_path()).unwrap(), "init\nevil\n");

    // Once appended to the policy file the process is allowed
    env.command()
        .args(["--once", "--violation-log", allowlist.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unauthorized").not());
}

#[test]
fn test_invalid_interval_rejected() {
    let env = TestEnvironment::new(&[], &[]).unwrap();

    env.command()
        .args(["--once", "--interval", "300001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid poll interval"));
}

#[test]
fn test_non_utf8_process_name_is_reported() {
    let env = TestEnvironment::new(&["bash"], &[(1050, "bash")]).unwrap();
    let entry = env.proc_root().join("2200");
    fs::create_dir(&entry).unwrap();
    fs::write(entry.join("comm"), b"ev\xffil\n").unwrap();

    env.command()
        .arg("--once")
        .assert()
        .success()
        .stdout(predicate::str::contains("(PID 2200)"))
        .stdout(predicate::str::contains("Violations: 1"))
        .stdout(predicate::str::contains("Skipped").not());

    assert_eq!(env.violation_log(), "ev\u{FFFD}il\n");
}

#[test]
fn test_terminate_warns_when_gatekeeper_not_allowlisted() {
    let env = TestEnvironment::new(&["bash"], &[(1050, "bash")]).unwrap();

    env.command()
        .args(["--once", "--terminate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("own name is not allow-listed"));
}

#[test]
fn test_terminate_without_warning_when_gatekeeper_allowlisted() {
    let env = TestEnvironment::new(&["bash", "procgate"], &[(1050, "bash")]).unwrap();

    env.command()
        .args(["--once", "--terminate"])
        .assert()
        .success()
        .stderr(predicate::str::contains("own name is not allow-listed").not());
}
