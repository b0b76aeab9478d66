//! Evaluation parameters
//!
//! ```
//! use placeval::params::Parameters;
//!
//! // Settings of the ICCAD 2014 contest
//! let mut params = Parameters::iccad2014();
//!
//! // Coarser density grid
//! params.bin_dim = 12.0;
//! params.check();
//! println!("{}", params);
//! ```

use std::fmt;

/// Electrical and geometric constants used during evaluation
///
/// Capacitances are in fF per micron and resistances in Ohm per micron. Local wiring is used
/// for signal nets, global wiring for the clock net.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    /// Capacitance of local wires
    pub local_wire_cap: f64,
    /// Resistance of local wires
    pub local_wire_res: f64,
    /// Capacitance of global wires
    pub global_wire_cap: f64,
    /// Resistance of global wires
    pub global_wire_res: f64,
    /// Maximum length of a wire segment given to the timer, in microns
    pub max_wire_segment: f64,
    /// Side of a density bin, in row heights
    pub bin_dim: f64,
    /// Bins with a smaller fraction of the full bin area are ignored
    pub bin_area_threshold: f64,
    /// Bins with a smaller fraction of free space are skipped
    pub free_space_threshold: f64,
    /// Weights of the ABU_2, ABU_5, ABU_10 and ABU_20 overflows in the density penalty
    pub abu_weights: [f64; 4],
    /// Scaling of the Steiner wirelength by the density penalty
    pub alpha: f64,
    /// Accuracy of the Steiner tree estimation
    pub steiner_accuracy: usize,
}

impl Parameters {
    /// Parameters of the ICCAD 2014 incremental timing-driven placement contest
    pub fn iccad2014() -> Parameters {
        Parameters {
            local_wire_cap: 0.16,
            local_wire_res: 2.535,
            global_wire_cap: 0.08,
            global_wire_res: 0.845,
            max_wire_segment: 20.0,
            bin_dim: 9.0,
            bin_area_threshold: 0.2,
            free_space_threshold: 0.2,
            abu_weights: [10.0, 4.0, 2.0, 1.0],
            alpha: 1.0,
            steiner_accuracy: 3,
        }
    }

    /// Capacitance per micron, for the clock net or for other nets
    pub fn wire_cap_per_micron(&self, is_clock: bool) -> f64 {
        if is_clock {
            self.global_wire_cap
        } else {
            self.local_wire_cap
        }
    }

    /// Resistance per micron, for the clock net or for other nets
    pub fn wire_res_per_micron(&self, is_clock: bool) -> f64 {
        if is_clock {
            self.global_wire_res
        } else {
            self.local_wire_res
        }
    }

    /// Check that the parameters are usable
    pub fn check(&self) {
        assert!(self.local_wire_cap >= 0.0 && self.global_wire_cap >= 0.0);
        assert!(self.local_wire_res >= 0.0 && self.global_wire_res >= 0.0);
        assert!(self.max_wire_segment > 0.0, "Wire segments must have a positive length");
        assert!(self.bin_dim > 0.0, "Density bins must have a positive size");
        assert!((0.0..=1.0).contains(&self.bin_area_threshold));
        assert!((0.0..=1.0).contains(&self.free_space_threshold));
        assert!(self.abu_weights.iter().all(|w| *w > 0.0));
        assert!(self.alpha >= 0.0);
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::iccad2014()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Parameters:")?;
        writeln!(
            f,
            "  Local wire: {} fF/um, {} Ohm/um",
            self.local_wire_cap, self.local_wire_res
        )?;
        writeln!(
            f,
            "  Global wire: {} fF/um, {} Ohm/um",
            self.global_wire_cap, self.global_wire_res
        )?;
        writeln!(f, "  Max wire segment: {} um", self.max_wire_segment)?;
        writeln!(f, "  Bin dimension: {} rows", self.bin_dim)?;
        writeln!(
            f,
            "  Thresholds: area {}, free space {}",
            self.bin_area_threshold, self.free_space_threshold
        )?;
        writeln!(
            f,
            "  ABU weights: {}",
            self.abu_weights.map(|w| w.to_string()).join("/")
        )?;
        writeln!(f, "  Alpha: {}", self.alpha)?;
        writeln!(f, "  Steiner accuracy: {}", self.steiner_accuracy)?;
        fmt::Result::Ok(())
    }
}
