use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test helper for running the gatekeeper against a fabricated process registry
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestEnvironment {
    /// Create an environment with the given allow-list and `(pid, name)` processes
    pub fn new(allowed: &[&str], processes: &[(u32, &str)]) -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let env = TestEnvironment { temp_dir };

        fs::create_dir(env.proc_root())?;
        for (pid, name) in processes {
            env.add_process(*pid, name)?;
        }

        let mut allowlist = allowed.join("\n");
        allowlist.push('\n');
        fs::write(env.allowlist_path(), allowlist)?;

        Ok(env)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn proc_root(&self) -> PathBuf {
        self.path().join("proc")
    }

    pub fn allowlist_path(&self) -> PathBuf {
        self.path().join("whitelist.txt")
    }

    pub fn violation_log_path(&self) -> PathBuf {
        self.path().join("violations.txt")
    }

    pub fn add_process(&self, pid: u32, name: &str) -> anyhow::Result<()> {
        let entry = self.proc_root().join(pid.to_string());
        fs::create_dir(&entry)?;
        fs::write(entry.join("comm"), format!("{}\n", name))?;
        Ok(())
    }

    pub fn violation_log(&self) -> String {
        fs::read_to_string(self.violation_log_path()).unwrap_or_default()
    }

    /// Arguments pointing the binary at this environment
    pub fn base_args(&self) -> Vec<String> {
        vec![
            "--allowlist".to_string(),
            self.allowlist_path().display().to_string(),
            "--violation-log".to_string(),
            self.violation_log_path().display().to_string(),
            "--proc-root".to_string(),
            self.proc_root().display().to_string(),
        ]
    }

    /// A command preconfigured for this environment, run from inside it
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo_bin_cmd!("procgate");
        cmd.current_dir(self.path()).args(self.base_args());
        cmd
    }
}
