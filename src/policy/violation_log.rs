//! Append-only, deduplicated record of unauthorized process names

use crate::models::GateError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Persistent violation record.
///
/// A name is appended only if it does not already occur anywhere in the file
/// (plain substring match over the whole content), which bounds file growth
/// when the same violator is seen on every iteration.
#[derive(Debug, Clone)]
pub struct ViolationLog {
    path: PathBuf,
}

impl ViolationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a violating process name.
    ///
    /// Returns `Ok(true)` when a new line was appended and `Ok(false)` when the
    /// name was already present. A missing file is treated as empty.
    pub fn record(&self, name: &str) -> Result<bool, GateError> {
        if self.contains(name)? {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_error(source))?;

        writeln!(file, "{}", name).map_err(|source| self.write_error(source))?;

        Ok(true)
    }

    /// Whether `name` already appears anywhere in the log
    pub fn contains(&self, name: &str) -> Result<bool, GateError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.contains(name)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.write_error(source)),
        }
    }

    fn write_error(&self, source: std::io::Error) -> GateError {
        GateError::ViolationLogWrite {
            path: self.path.clone(),
            source,
        }
    }
}
