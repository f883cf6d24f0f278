//! Live process listing from `/proc`.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use nix::unistd::geteuid;
use tracing::debug;

use crate::error::{Error, Result};

const PROC_ROOT: &str = "/proc";

/// Scheduler state from the third field of `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    TracingStop,
    Zombie,
    Dead,
    Idle,
    Other(char),
}

impl From<char> for ProcessState {
    fn from(c: char) -> Self {
        match c {
            'R' => ProcessState::Running,
            'S' => ProcessState::Sleeping,
            'D' => ProcessState::DiskSleep,
            'T' => ProcessState::Stopped,
            't' => ProcessState::TracingStop,
            'Z' => ProcessState::Zombie,
            'X' | 'x' => ProcessState::Dead,
            'I' => ProcessState::Idle,
            other => ProcessState::Other(other),
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Running => f.write_str("running"),
            ProcessState::Sleeping => f.write_str("sleeping"),
            ProcessState::DiskSleep => f.write_str("disk-sleep"),
            ProcessState::Stopped => f.write_str("stopped"),
            ProcessState::TracingStop => f.write_str("tracing-stop"),
            ProcessState::Zombie => f.write_str("zombie"),
            ProcessState::Dead => f.write_str("dead"),
            ProcessState::Idle => f.write_str("idle"),
            ProcessState::Other(c) => write!(f, "unknown({c})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: i32,
    pub name: String,
    pub state: ProcessState,
}

impl fmt::Display for ProcessEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {}", self.pid, self.name, self.state)
    }
}

/// Lists every process visible under `/proc`, sorted by pid.
///
/// Processes that exit (or hide) while the listing runs are skipped.
pub fn list_processes() -> Result<Vec<ProcessEntry>> {
    let root = PathBuf::from(PROC_ROOT);
    let entries = fs::read_dir(&root).map_err(|e| Error::from_io(root.clone(), e))?;

    let mut processes = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::from_io(root.clone(), e))?;
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) else {
            continue;
        };

        let stat_path = entry.path().join("stat");
        match fs::read_to_string(&stat_path) {
            Ok(stat) => match parse_stat(&stat) {
                Some(process) => processes.push(process),
                None => debug!("Unrecognised stat line for pid {}", pid),
            },
            Err(e) => debug!("Skipping pid {}: {}", pid, e),
        }
    }

    processes.sort_by_key(|p| p.pid);
    Ok(processes)
}

/// Parses `pid (comm) state ...` from `/proc/<pid>/stat`.
///
/// `comm` may itself contain spaces and parentheses, so the name ends at the
/// last `)` on the line.
pub fn parse_stat(stat: &str) -> Option<ProcessEntry> {
    let (pid, rest) = stat.split_once(" (")?;
    let (name, rest) = rest.rsplit_once(')')?;
    let state = rest.trim_start().chars().next()?;

    Some(ProcessEntry {
        pid: pid.trim().parse().ok()?,
        name: name.to_string(),
        state: ProcessState::from(state),
    })
}

/// Whether we run with root privileges.
pub fn is_root() -> bool {
    geteuid().is_root()
}
