//! Platform-specific process table enumeration.
//!
//! Two [`ProcessLister`] adapters are provided: one scrapes the text output
//! of a process-listing tool, the other asks the OS through `sysinfo`.

use crate::error::{LauncherError, Result};
use crate::process::{ProcessLister, ProcessRecord};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::debug;

/// PID of the running orchestrator.
pub fn current_pid() -> u32 {
    std::process::id()
}

/// Lists processes by running a tool such as `ps ax`.
///
/// # Platform Behavior
/// - **Linux/macOS**: `ps ax` prints one process per line, pid first
/// - **Windows**: configure a different tool (e.g. `tasklist`); lines without
///   a leading pid are kept with `pid: None`
#[derive(Debug, Clone)]
pub struct PsProcessLister {
    program: String,
    args: Vec<String>,
}

impl PsProcessLister {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split listing text into records.
    ///
    /// Blank lines are dropped. The first whitespace-delimited field becomes
    /// the pid when it is numeric; the trimmed line is kept as the command
    /// line either way.
    pub fn parse_listing(text: &str) -> Vec<ProcessRecord> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let pid = line
                    .split_whitespace()
                    .next()
                    .and_then(|field| field.parse().ok());
                ProcessRecord {
                    pid,
                    command_line: line.to_string(),
                }
            })
            .collect()
    }
}

impl ProcessLister for PsProcessLister {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        debug!("Listing processes with {} {:?}", self.program, self.args);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| LauncherError::Launch {
                program: PathBuf::from(&self.program),
                source: e,
            })?;

        if !output.status.success() {
            return Err(LauncherError::ProcessListing {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Self::parse_listing(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Lists processes through the OS process table.
///
/// Threads are skipped, so a multi-threaded process yields one record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoProcessLister;

impl ProcessLister for SysinfoProcessLister {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new().with_cmd(UpdateKind::Always),
        );

        // On Linux every thread is listed with its parent's command line.
        let mut records: Vec<ProcessRecord> = system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                let args: Vec<String> = process.cmd().iter().map(|arg| lossy(arg)).collect();
                // Kernel threads and some zombies report no arguments.
                let command_line = if args.is_empty() {
                    lossy(process.name())
                } else {
                    args.join(" ")
                };
                ProcessRecord {
                    pid: Some(pid.as_u32()),
                    command_line,
                }
            })
            .collect();
        records.sort_by_key(|record| record.pid);

        debug!("sysinfo reported {} processes", records.len());
        Ok(records)
    }
}

fn lossy<S: AsRef<OsStr> + ?Sized>(value: &S) -> String {
    value.as_ref().to_string_lossy().into_owned()
}
