//! Representation of a placed circuit

mod circuit;
mod components;
pub mod generators;
pub mod stats;

pub use circuit::Circuit;
pub use components::{
    Cell, CellId, LibCell, LibCellId, Net, NetId, Pin, PinDirection, PinId, PinRole, Row,
    WireSegment,
};
