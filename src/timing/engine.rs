use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};

use crate::error::{EvalError, Result};

/// Static timing analysis engine
///
/// The engine reads the netlist file and writes `slack <node> <early|late> <value>` records
/// to the results file. It runs to completion before returning.
pub trait TimingEngine {
    /// Analyze the netlist and write the slacks
    fn run(&self, netlist: &Path, results: &Path) -> Result<()>;
}

/// Timer run as an external program: `program library netlist results`
#[derive(Clone, Debug)]
pub struct ExternalTimer {
    /// Timer executable
    pub program: PathBuf,
    /// Cell timing library
    pub library: PathBuf,
}

impl ExternalTimer {
    /// Create a new external timer
    pub fn new(program: impl Into<PathBuf>, library: impl Into<PathBuf>) -> ExternalTimer {
        ExternalTimer {
            program: program.into(),
            library: library.into(),
        }
    }
}

impl TimingEngine for ExternalTimer {
    fn run(&self, netlist: &Path, results: &Path) -> Result<()> {
        info!(
            "Running {} {} {} {}",
            self.program.display(),
            self.library.display(),
            netlist.display(),
            results.display()
        );
        let status = Command::new(&self.program)
            .arg(&self.library)
            .arg(netlist)
            .arg(results)
            .status()
            .map_err(|source| EvalError::TimerLaunch {
                program: self.program.clone(),
                source,
            })?;
        // The results file decides whether the run is usable
        if !status.success() {
            warn!("Timer {} exited with {}", self.program.display(), status);
        }
        Ok(())
    }
}
