//! Placement quality evaluation
//!
//! This crate measures the quality of a placed standard cell circuit, as done for the
//! ICCAD 2014 incremental timing-driven placement contest. The evaluation covers:
//! * the maximum displacement of the cells from their initial location;
//! * the density of the placement, as an ABU (average bin utilization) penalty;
//! * the half-perimeter and Steiner wirelengths;
//! * the worst and total negative slacks, computed by an external timer on an RC netlist
//!   built from the Steiner trees.
//!
//! # Usage
//!
//! ```bash
//! # Show available commands
//! placeval help
//! # Evaluate a placement, without timing analysis
//! placeval eval --cells 5000 --target-util 0.8
//! # Evaluate with a timer, using custom parameters
//! placeval eval -p ICCAD14.parm --timer timerFiles/timer --library timerFiles/cell.lib
//! # Write the netlist given to the timer
//! placeval netlist -o feed.netlist
//! ```
//!
//! # Library
//!
//! The circuit is built programmatically; file formats are left to the caller. Measurements
//! run on a [`Circuit`] in a fixed order: pin locations are resolved, Steiner trees are built
//! for every net, long wires are sliced, and the resulting netlist is handed to the timer.
//! The Steiner estimator and the timer are both behind traits, so they can be replaced.
//!
//! ```
//! use placeval::circuit::PinDirection;
//! use placeval::geometry::Rect;
//! use placeval::Circuit;
//!
//! // A die of 100x100 microns with 1000 database units per micron
//! let mut ckt = Circuit::new(Rect::new(0.0, 0.0, 100000.0, 100000.0), 2000.0, 1000.0);
//! let inv = ckt.add_lib_cell("INV", &[("a", PinDirection::Input), ("o", PinDirection::Output)]);
//! let c = ckt.add_cell("u1", inv, (10000.0, 2000.0), (400.0, 2000.0), false);
//! let a = ckt.add_pin(c, "a", (0.0, 1000.0));
//! let i = ckt.add_input("in", (0.0, 3000.0));
//! ckt.add_net("n1", i, &[a]);
//! assert_eq!(ckt.hpwl(), 10.0);
//! ```

#![warn(missing_docs)]

pub mod circuit;
pub mod density;
pub mod error;
pub mod evaluate;
pub mod geometry;
pub mod io;
pub mod params;
pub mod slicing;
pub mod steiner;
pub mod timing;

pub use circuit::{stats, Circuit};
pub use error::{EvalError, Result};
