//! Rectilinear interconnect construction
//!
//! Each net is turned into a list of wire segments between named nodes. Two-pin nets are
//! connected directly; larger nets go through a [`SteinerEstimator`], and the internal points
//! of the resulting tree receive synthetic names.
//!
//! ```
//! # use placeval::circuit::generators::random;
//! use placeval::steiner::{RectilinearSteiner, SteinerBuilder};
//!
//! let mut ckt = random::placement(50, 1);
//! let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
//! println!("Steiner wirelength: {} um", summary.wirelength);
//! ```

mod builder;
mod estimator;
mod rectilinear;

pub use builder::{classify_edge, EdgeCase, NamingContext, SteinerBuilder, SteinerSummary};
pub use estimator::{Branch, SteinerEstimator, SteinerTree};
pub use rectilinear::RectilinearSteiner;
