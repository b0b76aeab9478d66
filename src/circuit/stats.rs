//! Compute circuit statistics
//!
//! ```
//! # use placeval::Circuit;
//! # use placeval::geometry::Rect;
//! # let ckt = Circuit::new(Rect::new(0.0, 0.0, 100.0, 100.0), 10.0, 1.0);
//! use placeval::circuit::stats::stats;
//! let stats = stats(&ckt);
//!
//! // Check that there is no fixed cell
//! assert_eq!(stats.nb_fixed, 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::fmt;

use crate::Circuit;

/// Number of cells, pins and nets in a circuit
#[derive(Clone, Debug)]
pub struct CircuitStats {
    /// Number of primary inputs
    pub nb_inputs: usize,
    /// Number of primary outputs
    pub nb_outputs: usize,
    /// Number of movable cells
    pub nb_movable: usize,
    /// Number of fixed cells
    pub nb_fixed: usize,
    /// Number of pins
    pub nb_pins: usize,
    /// Number of timing endpoints
    pub nb_endpoints: usize,
    /// Number of nets
    pub nb_nets: usize,
    /// Fanout of nets
    pub fanout: Vec<usize>,
    /// Number of placement rows
    pub nb_rows: usize,
    /// Area of movable cells
    pub movable_area: f64,
    /// Area of fixed cells
    pub fixed_area: f64,
}

impl CircuitStats {
    /// Total number of cells
    pub fn nb_cells(&self) -> usize {
        self.nb_movable + self.nb_fixed
    }

    /// Record a new net
    fn add_net(&mut self, fanout: usize) {
        self.nb_nets += 1;
        while self.fanout.len() <= fanout {
            self.fanout.push(0);
        }
        self.fanout[fanout] += 1;
    }
}

impl fmt::Display for CircuitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Cells: {}", self.nb_cells())?;
        writeln!(f, "      movable: {}", self.nb_movable)?;
        if self.nb_fixed != 0 {
            writeln!(f, "      fixed: {}", self.nb_fixed)?;
        }
        writeln!(f, "  Pins: {}", self.nb_pins)?;
        writeln!(f, "  Endpoints: {}", self.nb_endpoints)?;
        writeln!(f, "  Nets: {}", self.nb_nets)?;
        for (i, nb) in self.fanout.iter().enumerate() {
            if *nb != 0 {
                writeln!(f, "      {}: {}", i, nb)?;
            }
        }
        writeln!(f, "  Rows: {}", self.nb_rows)?;
        writeln!(f, "  Movable area: {}", self.movable_area)?;
        if self.fixed_area != 0.0 {
            writeln!(f, "  Fixed area: {}", self.fixed_area)?;
        }
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the circuit
pub fn stats(c: &Circuit) -> CircuitStats {
    let mut ret = CircuitStats {
        nb_inputs: c.nb_inputs(),
        nb_outputs: c.nb_outputs(),
        nb_movable: 0,
        nb_fixed: 0,
        nb_pins: c.nb_pins(),
        nb_endpoints: c.pins().iter().filter(|p| p.is_endpoint()).count(),
        nb_nets: 0,
        fanout: Vec::new(),
        nb_rows: c.nb_rows(),
        movable_area: 0.0,
        fixed_area: 0.0,
    };
    for cell in c.cells() {
        if cell.is_fixed {
            ret.nb_fixed += 1;
            ret.fixed_area += cell.area();
        } else {
            ret.nb_movable += 1;
            ret.movable_area += cell.area();
        }
    }
    for net in c.nets() {
        ret.add_net(net.sinks.len());
    }
    ret
}
