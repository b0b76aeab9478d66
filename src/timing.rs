//! Timing analysis through an external timer
//!
//! The placed circuit, with its wire segments, is written as an RC netlist. A
//! [`TimingEngine`] analyzes it and reports slacks, which are then reduced to the worst and
//! total negative slack of the timing endpoints.
//!
//! ```no_run
//! # use std::path::Path;
//! # use placeval::circuit::generators::random;
//! use placeval::params::Parameters;
//! use placeval::timing::{measure_timing, ExternalTimer};
//!
//! let mut ckt = random::placement(50, 1);
//! let timer = ExternalTimer::new("timerFiles/timer", "timerFiles/cell.lib");
//! let metrics = measure_timing(&mut ckt, &Parameters::default(), &timer, Path::new("."));
//! ```

mod engine;
mod netlist;
mod report;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

pub use engine::{ExternalTimer, TimingEngine};
pub use netlist::{write_netlist, DRIVER_INPUT_SUFFIX, DRIVER_OUTPUT_SUFFIX};
pub use report::{read_slacks, Corner, SlackReport};

use crate::error::{EvalError, Result};
use crate::params::Parameters;
use crate::Circuit;

/// Longest node name accepted by the timer
pub const MAX_NAME_LENGTH: usize = 1023;

/// Netlist file written in the working directory
pub const NETLIST_FILE: &str = "feed.netlist";

/// Results file read from the working directory
pub const RESULTS_FILE: &str = "timing.out";

/// Check that a node name can be given to the timer
pub fn check_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(EvalError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Worst and total negative slack, for both corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimingMetrics {
    /// Worst early slack, or zero
    pub early_wns: f64,
    /// Sum of the negative early slacks
    pub early_tns: f64,
    /// Worst late slack, or zero
    pub late_wns: f64,
    /// Sum of the negative late slacks
    pub late_tns: f64,
}

impl TimingMetrics {
    /// Reduce the slacks of the timing endpoints
    ///
    /// Endpoints without a slack are ignored.
    pub fn from_slacks(circuit: &Circuit) -> TimingMetrics {
        let mut ret = TimingMetrics::default();
        for pin in circuit.pins().iter().filter(|p| p.is_endpoint()) {
            if let Some(s) = pin.early_slack {
                ret.early_wns = ret.early_wns.min(s);
                ret.early_tns += s.min(0.0);
            }
            if let Some(s) = pin.late_slack {
                ret.late_wns = ret.late_wns.min(s);
                ret.late_tns += s.min(0.0);
            }
        }
        ret
    }
}

impl fmt::Display for TimingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  early WNS, TNS  : {}, {}", self.early_wns, self.early_tns)?;
        writeln!(f, "  late  WNS, TNS  : {}, {}", self.late_wns, self.late_tns)?;
        fmt::Result::Ok(())
    }
}

/// Run the timer on the circuit and reduce its slacks
///
/// Wire segments must have been built beforehand. The netlist and the results are exchanged
/// through files in `work_dir`; a results file left by a previous run is removed first.
pub fn measure_timing(
    circuit: &mut Circuit,
    params: &Parameters,
    engine: &dyn TimingEngine,
    work_dir: &Path,
) -> Result<TimingMetrics> {
    let netlist_path = work_dir.join(NETLIST_FILE);
    let results_path = work_dir.join(RESULTS_FILE);
    if results_path.exists() {
        std::fs::remove_file(&results_path)?;
    }

    let mut w = BufWriter::new(File::create(&netlist_path)?);
    write_netlist(&mut w, circuit, params)?;
    w.flush()?;
    drop(w);
    info!(
        "Netlist file for timer is written: {}",
        netlist_path.display()
    );

    engine.run(&netlist_path, &results_path)?;

    let Ok(f) = File::open(&results_path) else {
        return Err(EvalError::NoTimingResults(results_path));
    };
    let report = read_slacks(f, circuit)?;
    if report.is_empty() {
        return Err(EvalError::NoTimingResults(results_path));
    }
    report.apply(circuit);
    Ok(TimingMetrics::from_slacks(circuit))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{measure_timing, TimingEngine, TimingMetrics, NETLIST_FILE, RESULTS_FILE};
    use crate::circuit::generators::testcases;
    use crate::error::{EvalError, Result};
    use crate::params::Parameters;
    use crate::steiner::{RectilinearSteiner, SteinerBuilder};

    /// Writes a fixed report, or nothing at all
    struct FakeTimer {
        report: Option<&'static str>,
    }

    impl TimingEngine for FakeTimer {
        fn run(&self, netlist: &Path, results: &Path) -> Result<()> {
            assert!(netlist.exists());
            if let Some(r) = self.report {
                fs::write(results, r)?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_single_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        let timer = FakeTimer {
            report: Some("slack b early -0.3\nslack b late 0.2\nslack a_drvin late -7.0\n"),
        };
        let m = measure_timing(&mut ckt, &Parameters::default(), &timer, dir.path()).unwrap();
        assert_eq!(
            m,
            TimingMetrics {
                early_wns: -0.3,
                early_tns: -0.3,
                late_wns: 0.0,
                late_tns: 0.0,
            }
        );
        let netlist = fs::read_to_string(dir.path().join(NETLIST_FILE)).unwrap();
        assert!(netlist.starts_with("input a\noutput b\n"));
    }

    #[test]
    fn test_missing_results() {
        let dir = tempfile::tempdir().unwrap();
        // Stale results from a previous run must not be read back
        fs::write(dir.path().join(RESULTS_FILE), "slack b early 1.0\n").unwrap();
        let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        let timer = FakeTimer { report: None };
        let err = measure_timing(&mut ckt, &Parameters::default(), &timer, dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::NoTimingResults(_)));
        assert!(!err.is_fatal());
        assert_eq!(ckt.pin(ckt.find_pin("b").unwrap()).early_slack, None);
    }

    #[test]
    fn test_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        let timer = FakeTimer { report: Some("\n") };
        let err = measure_timing(&mut ckt, &Parameters::default(), &timer, dir.path()).unwrap_err();
        assert!(matches!(err, EvalError::NoTimingResults(_)));
    }

    #[test]
    fn test_tns_accumulates() {
        let mut ckt = testcases::inverter_chain(2);
        let out = ckt.find_pin("out").unwrap();
        let a = ckt.find_pin("u1/a").unwrap();
        ckt.pin_mut(a).is_flop_input = true;
        ckt.pin_mut(out).late_slack = Some(-2.0);
        ckt.pin_mut(a).late_slack = Some(-3.0);
        ckt.pin_mut(a).early_slack = Some(4.0);
        let m = TimingMetrics::from_slacks(&ckt);
        assert_eq!(m.late_wns, -3.0);
        assert_eq!(m.late_tns, -5.0);
        assert_eq!(m.early_wns, 0.0);
        assert_eq!(m.early_tns, 0.0);
    }
}
