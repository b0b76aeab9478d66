//! Complete evaluation of a placement
//!
//! ```
//! # use placeval::circuit::generators::random;
//! use placeval::evaluate::Evaluator;
//! use placeval::params::Parameters;
//! use placeval::steiner::RectilinearSteiner;
//!
//! let mut ckt = random::placement(100, 1);
//! let report = Evaluator::new(Parameters::default(), &RectilinearSteiner)
//!     .evaluate(&mut ckt, 0.8)
//!     .unwrap();
//!
//! // No timer was given
//! assert!(report.timing.is_none());
//! println!("{}", report);
//! ```

use std::fmt;
use std::path::PathBuf;

use log::{info, warn};

use crate::density::{DensityMap, DensityReport};
use crate::error::{EvalError, Result};
use crate::io::write_density_plots;
use crate::params::Parameters;
use crate::slicing::{slice_long_wires, SliceSummary};
use crate::steiner::{SteinerBuilder, SteinerEstimator, SteinerSummary};
use crate::timing::{measure_timing, TimingEngine, TimingMetrics};
use crate::Circuit;

/// Metrics of a placement
#[derive(Clone, Debug)]
pub struct EvaluationReport {
    /// Maximum displacement of a movable cell, in microns
    pub displacement: f64,
    /// Density metrics
    pub density: DensityReport,
    /// Scaling of the Steiner wirelength by the density penalty
    pub alpha: f64,
    /// Half-perimeter wirelength, in microns
    pub hpwl: f64,
    /// Steiner tree construction
    pub steiner: SteinerSummary,
    /// Wire slicing
    pub slicing: SliceSummary,
    /// Clock period
    pub clock_period: f64,
    /// Slack metrics, if the timer succeeded
    pub timing: Option<TimingMetrics>,
}

impl EvaluationReport {
    /// Steiner wirelength scaled by the density penalty
    pub fn scaled_steiner_wirelength(&self) -> f64 {
        self.steiner.wirelength * (1.0 + self.alpha * self.density.penalty)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analyzing placement ..")?;
        writeln!(f, "  max displ. (um) : {}", self.displacement)?;
        write!(f, "{}", self.density)?;
        writeln!(f, "  alpha           : {}", self.alpha)?;
        writeln!(f)?;
        writeln!(f, "Analyzing timing ..")?;
        writeln!(
            f,
            "  HPWL, StWL (um) : {}, {}",
            self.hpwl, self.steiner.wirelength
        )?;
        writeln!(
            f,
            "  Scaled StWL     : {} ( {}% )",
            self.scaled_steiner_wirelength(),
            100.0 * self.alpha * self.density.penalty
        )?;
        writeln!(f, "  Clock period    : {}", self.clock_period)?;
        match &self.timing {
            Some(t) => write!(f, "{}", t)?,
            None => writeln!(
                f,
                "  WNS, TNS        : Timer failed. The values are not available."
            )?,
        }
        fmt::Result::Ok(())
    }
}

/// Runs every measurement on a placed circuit
pub struct Evaluator<'a> {
    params: Parameters,
    estimator: &'a dyn SteinerEstimator,
    engine: Option<&'a dyn TimingEngine>,
    work_dir: PathBuf,
    plot_dir: Option<PathBuf>,
    progress: bool,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator without timer
    pub fn new(params: Parameters, estimator: &'a dyn SteinerEstimator) -> Evaluator<'a> {
        params.check();
        Evaluator {
            params,
            estimator,
            engine: None,
            work_dir: PathBuf::from("."),
            plot_dir: None,
            progress: false,
        }
    }

    /// Use a timer for slack analysis
    pub fn with_engine(mut self, engine: &'a dyn TimingEngine) -> Evaluator<'a> {
        self.engine = Some(engine);
        self
    }

    /// Directory for the files exchanged with the timer
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Evaluator<'a> {
        self.work_dir = dir.into();
        self
    }

    /// Write the density plots in a directory
    pub fn with_plots(mut self, dir: impl Into<PathBuf>) -> Evaluator<'a> {
        self.plot_dir = Some(dir.into());
        self
    }

    /// Show progress bars
    pub fn with_progress(mut self, progress: bool) -> Evaluator<'a> {
        self.progress = progress;
        self
    }

    /// Evaluate the current placement of the circuit
    ///
    /// The wire segments and slacks of the circuit are rebuilt. Naming errors are returned;
    /// other timer failures only leave the timing metrics unavailable.
    pub fn evaluate(&self, circuit: &mut Circuit, target_util: f64) -> Result<EvaluationReport> {
        if target_util.is_nan() || target_util <= 0.0 {
            return Err(EvalError::TargetUtilization(target_util));
        }
        info!("Analyzing placement");
        let displacement = circuit.max_displacement();
        let map = DensityMap::build(circuit, &self.params);
        if let Some(dir) = &self.plot_dir {
            write_density_plots(dir, &map)?;
        }
        let density = map.report(target_util, &self.params);

        info!("Analyzing timing");
        let hpwl = circuit.hpwl();
        circuit.update_pin_locations();
        let steiner = SteinerBuilder::new(self.estimator, self.params.steiner_accuracy)
            .with_progress(self.progress)
            .build(circuit);
        let max_len = self.params.max_wire_segment * circuit.dist2microns();
        let slicing = slice_long_wires(circuit, max_len)?;

        let timing = match self.engine {
            None => {
                info!("No timer given, skipping timing analysis");
                None
            }
            Some(engine) => match measure_timing(circuit, &self.params, engine, &self.work_dir) {
                Ok(m) => Some(m),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Timer failed: {}", e);
                    None
                }
            },
        };

        Ok(EvaluationReport {
            displacement,
            density,
            alpha: self.params.alpha,
            hpwl,
            steiner,
            slicing,
            clock_period: circuit.clock_period(),
            timing,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::Evaluator;
    use crate::circuit::generators::{random, testcases};
    use crate::error::{EvalError, Result};
    use crate::params::Parameters;
    use crate::steiner::RectilinearSteiner;
    use crate::timing::TimingEngine;

    /// Reports the same slack on every primary output
    struct UniformTimer {
        slack: f64,
    }

    impl TimingEngine for UniformTimer {
        fn run(&self, netlist: &Path, results: &Path) -> Result<()> {
            let mut out = String::new();
            for l in fs::read_to_string(netlist)?.lines() {
                if let Some(name) = l.strip_prefix("output ") {
                    out += &format!("slack {} early {}\n", name, self.slack);
                    out += &format!("slack {} late {}\n", name, self.slack);
                }
            }
            fs::write(results, out)?;
            Ok(())
        }
    }

    /// Never produces anything
    struct BrokenTimer;

    impl TimingEngine for BrokenTimer {
        fn run(&self, _netlist: &Path, _results: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_full_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let mut ckt = random::placement(300, 5);
        let nb_outputs = ckt.nb_outputs() as f64;
        let timer = UniformTimer { slack: -1.5 };
        let report = Evaluator::new(Parameters::default(), &RectilinearSteiner)
            .with_engine(&timer)
            .with_work_dir(dir.path())
            .with_plots(dir.path())
            .evaluate(&mut ckt, 0.7)
            .unwrap();
        let timing = report.timing.unwrap();
        assert_eq!(timing.late_wns, -1.5);
        assert!((timing.late_tns + 1.5 * nb_outputs).abs() < 1e-9);
        assert!(report.hpwl > 0.0);
        assert!(report.steiner.wirelength + 1e-9 >= report.hpwl);
        assert!(report.slicing.nb_segments_after >= report.slicing.nb_segments_before);
        assert!(report.scaled_steiner_wirelength() >= report.steiner.wirelength);
        assert!(dir.path().join("grid.plt").exists());
        let text = format!("{}", report);
        assert!(text.contains("late  WNS, TNS  : -1.5"));
    }

    #[test]
    fn test_timer_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut ckt = random::placement(50, 2);
        let report = Evaluator::new(Parameters::default(), &RectilinearSteiner)
            .with_engine(&BrokenTimer)
            .with_work_dir(dir.path())
            .evaluate(&mut ckt, 0.9)
            .unwrap();
        assert!(report.timing.is_none());
        assert!(format!("{}", report).contains("The values are not available"));
        assert!(report.steiner.wirelength > 0.0);
    }

    #[test]
    fn test_scaled_wirelength() {
        let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        let mut params = Parameters::default();
        params.alpha = 2.0;
        let mut report = Evaluator::new(params, &RectilinearSteiner)
            .evaluate(&mut ckt, 1.0)
            .unwrap();
        assert_eq!(report.steiner.wirelength, 10.0);
        report.density.penalty = 0.25;
        assert_eq!(report.scaled_steiner_wirelength(), 15.0);
    }

    #[test]
    fn test_invalid_target() {
        for target in [0.0, -0.5, f64::NAN] {
            let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
            let err = Evaluator::new(Parameters::default(), &RectilinearSteiner)
                .evaluate(&mut ckt, target)
                .unwrap_err();
            assert!(matches!(err, EvalError::TargetUtilization(_)));
        }
    }

    #[test]
    fn test_fatal_naming() {
        let long = "p".repeat(1021);
        let mut ckt = testcases::two_pin((0.0, 0.0), (5000.0, 0.0));
        let sink = ckt.net(0).sinks[0];
        ckt.pin_mut(sink).name = long;
        let dir = tempfile::tempdir().unwrap();
        let err = Evaluator::new(Parameters::default(), &RectilinearSteiner)
            .with_engine(&BrokenTimer)
            .with_work_dir(dir.path())
            .evaluate(&mut ckt, 1.0)
            .unwrap_err();
        assert!(matches!(err, EvalError::NameTooLong { .. }));
    }
}
