//! Allow-list policy module
//!
//! Loads the administrator-supplied list of permitted process names and
//! answers membership queries. Matching is exact and case-sensitive: no
//! wildcard, prefix or substring semantics.

pub mod violation_log;

pub use violation_log::ViolationLog;

use crate::models::{GateError, Verdict};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// In-memory set of permitted process names
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    /// Load the allow-list from a line-oriented text file.
    ///
    /// Each non-empty, whitespace-trimmed line becomes one entry. A missing or
    /// unreadable file is an error: the gatekeeper cannot run without a policy.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let content = fs::read_to_string(path).map_err(|source| GateError::AllowListUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_lines(content.lines()))
    }

    /// Build an allow-list from already-split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Self { names }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn verdict(&self, name: &str) -> Verdict {
        if self.is_allowed(name) {
            Verdict::Allowed
        } else {
            Verdict::Violation
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
