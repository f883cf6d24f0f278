use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::classifier::{CategorizedRegions, classify};
use crate::error::{Error, Result};
use crate::region::{ParseFailure, parse_maps};

/// Where a memory map is read from.
#[derive(Debug, Clone)]
pub enum MapsSource {
    /// `/proc/<pid>/maps` of a live process.
    Pid(i32),
    /// A saved copy of a maps file.
    File(PathBuf),
}

/// Output of one scan.
#[derive(Debug, Clone)]
pub struct Scan {
    pub categorized: CategorizedRegions,
    pub failures: Vec<ParseFailure>,
}

pub struct Scanner {
    source: MapsSource,
}

impl Scanner {
    pub fn new(pid: i32) -> Self {
        Scanner {
            source: MapsSource::Pid(pid),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Scanner {
            source: MapsSource::File(path.into()),
        }
    }

    pub fn path(&self) -> PathBuf {
        match &self.source {
            MapsSource::Pid(pid) => PathBuf::from(format!("/proc/{}/maps", pid)),
            MapsSource::File(path) => path.clone(),
        }
    }

    /// Reads the whole map into memory.
    pub fn read_maps(&self) -> Result<String> {
        let path = self.path();
        debug!("Reading {}", path.display());

        fs::read_to_string(&path).map_err(|e| match (&self.source, e.kind()) {
            (MapsSource::Pid(pid), io::ErrorKind::NotFound) => Error::ProcessNotFound(*pid),
            _ => Error::from_io(path.clone(), e),
        })
    }

    /// Reads, parses and classifies the map.
    pub fn scan(&self) -> Result<Scan> {
        let text = self.read_maps()?;
        Ok(scan_text(&text, &self.path()))
    }
}

fn scan_text(text: &str, origin: &Path) -> Scan {
    let parsed = parse_maps(text);
    let categorized = classify(parsed.regions);

    info!(
        "Scanned {}: {} regions, {} skipped lines",
        origin.display(),
        categorized.total(),
        parsed.failures.len()
    );

    Scan {
        categorized,
        failures: parsed.failures,
    }
}
