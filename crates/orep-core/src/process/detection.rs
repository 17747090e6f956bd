//! Registry process detection.
//!
//! The probe never talks to the registry over the network. It reads the
//! process table through a [`ProcessLister`] and classifies what it finds.

use crate::error::{LauncherError, Result};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// One entry of a process listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    /// Process ID, when the listing carries one.
    pub pid: Option<u32>,
    /// Command line (or the raw listing line).
    pub command_line: String,
}

impl ProcessRecord {
    pub fn new(pid: Option<u32>, command_line: impl Into<String>) -> Self {
        Self {
            pid,
            command_line: command_line.into(),
        }
    }
}

/// Source of process-description records.
pub trait ProcessLister {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>>;
}

/// Whether a registry process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "count")]
pub enum RegistryStatus {
    Running,
    NotRunning,
    /// More than one candidate process; carries the count.
    Ambiguous(usize),
}

impl fmt::Display for RegistryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryStatus::Running => f.write_str("running"),
            RegistryStatus::NotRunning => f.write_str("not running"),
            RegistryStatus::Ambiguous(n) => write!(f, "ambiguous ({n} candidates)"),
        }
    }
}

/// What identifies a registry entry in a listing and what identifies the
/// scan's own entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryMatcher {
    pub token: String,
    pub self_marker: String,
    /// Our own pid; records carrying it are never counted.
    pub self_pid: Option<u32>,
}

impl RegistryMatcher {
    pub fn new(token: impl Into<String>, self_marker: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            self_marker: self_marker.into(),
            self_pid: None,
        }
    }

    pub fn with_self_pid(mut self, pid: u32) -> Self {
        self.self_pid = Some(pid);
        self
    }

    /// Whether a record is a registry process other than the scan itself.
    pub fn matches(&self, record: &ProcessRecord) -> bool {
        let line = record.command_line.trim();
        if line.is_empty() || !line.contains(&self.token) {
            return false;
        }
        if !self.self_marker.is_empty() && line.contains(&self.self_marker) {
            return false;
        }
        !(self.self_pid.is_some() && record.pid == self.self_pid)
    }

    /// Records that count as registry processes.
    pub fn candidates<'a>(&self, records: &'a [ProcessRecord]) -> Vec<&'a ProcessRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Classify a set of records.
    pub fn classify(&self, records: &[ProcessRecord]) -> RegistryStatus {
        status_from_count(self.candidates(records).len())
    }

    /// Classify raw line-oriented listing text.
    pub fn classify_listing(&self, listing: &str) -> RegistryStatus {
        let records: Vec<ProcessRecord> = listing
            .lines()
            .map(|line| ProcessRecord::new(None, line))
            .collect();
        self.classify(&records)
    }
}

fn status_from_count(count: usize) -> RegistryStatus {
    match count {
        0 => RegistryStatus::NotRunning,
        1 => RegistryStatus::Running,
        n => RegistryStatus::Ambiguous(n),
    }
}

/// Registry probe over a process lister.
pub struct RegistryProbe<'a> {
    lister: &'a dyn ProcessLister,
    matcher: RegistryMatcher,
}

impl<'a> RegistryProbe<'a> {
    pub fn new(lister: &'a dyn ProcessLister, matcher: RegistryMatcher) -> Self {
        Self { lister, matcher }
    }

    /// Enumerate processes and classify them.
    pub fn status(&self) -> Result<RegistryStatus> {
        let records = self.lister.list_processes()?;
        let status = self.matcher.classify(&records);
        debug!(
            "Registry probe saw {} processes, status: {}",
            records.len(),
            status
        );
        Ok(status)
    }

    /// Probe for a server launch.
    ///
    /// `NotRunning` is allowed through with a warning; the registry is never
    /// started on the operator's behalf. `Ambiguous` is an error.
    pub fn ensure_usable(&self) -> Result<RegistryStatus> {
        let records = self.lister.list_processes()?;
        let candidates = self.matcher.candidates(&records);

        match status_from_count(candidates.len()) {
            RegistryStatus::Running => {
                info!("{} is running", self.matcher.token);
                Ok(RegistryStatus::Running)
            }
            RegistryStatus::NotRunning => {
                warn!(
                    "{} does not appear to be running; start it before clients connect",
                    self.matcher.token
                );
                Ok(RegistryStatus::NotRunning)
            }
            RegistryStatus::Ambiguous(count) => Err(LauncherError::AmbiguousRegistryState {
                token: self.matcher.token.clone(),
                count,
                candidates: candidates
                    .iter()
                    .map(|r| r.command_line.clone())
                    .collect(),
            }),
        }
    }
}
