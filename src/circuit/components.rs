use std::collections::BTreeMap;
use std::fmt;

/// Index of a pin in the circuit
pub type PinId = usize;
/// Index of a cell in the circuit
pub type CellId = usize;
/// Index of a net in the circuit
pub type NetId = usize;
/// Index of a library cell in the circuit
pub type LibCellId = usize;

/// Role of a pin in the timing graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinRole {
    /// Top-level input port
    PrimaryInput,
    /// Top-level output port
    PrimaryOutput,
    /// Pin of a cell instance
    Terminal,
}

/// Direction of a library cell pin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
    /// Anything else (power, bidirectional...)
    Other,
}

/// A pin, either a top-level port or a cell terminal
#[derive(Clone, Debug)]
pub struct Pin {
    /// Unique name
    pub name: String,
    /// Role in the timing graph
    pub role: PinRole,
    /// Absolute x coordinate, recomputed by [`Circuit::update_pin_locations`](super::Circuit::update_pin_locations)
    pub x: f64,
    /// Absolute y coordinate, recomputed by [`Circuit::update_pin_locations`](super::Circuit::update_pin_locations)
    pub y: f64,
    /// Offset from the owner cell, or from the base location for unowned pins
    pub x_offset: f64,
    /// Offset from the owner cell, or from the base location for unowned pins
    pub y_offset: f64,
    /// Owner cell, absent for top-level pins
    pub owner: Option<CellId>,
    /// Pins of fixed objects do not follow their owner
    pub is_fixed: bool,
    /// Load capacitance
    pub cap: f64,
    /// Arrival time for inputs, external delay for outputs
    pub delay: f64,
    /// Rise transition time
    pub rise_transition: f64,
    /// Fall transition time
    pub fall_transition: f64,
    /// Data input of a sequential element, hence a timing endpoint
    pub is_flop_input: bool,
    /// Library cell driving a primary input
    pub driver: Option<LibCellId>,
    /// Early slack, set by timing analysis
    pub early_slack: Option<f64>,
    /// Late slack, set by timing analysis
    pub late_slack: Option<f64>,
    pub(crate) base_x: f64,
    pub(crate) base_y: f64,
}

impl Pin {
    pub(crate) fn new(name: &str, role: PinRole) -> Pin {
        Pin {
            name: name.to_string(),
            role,
            x: 0.0,
            y: 0.0,
            x_offset: 0.0,
            y_offset: 0.0,
            owner: None,
            is_fixed: false,
            cap: 0.0,
            delay: 0.0,
            rise_transition: 0.0,
            fall_transition: 0.0,
            is_flop_input: false,
            driver: None,
            early_slack: None,
            late_slack: None,
            base_x: 0.0,
            base_y: 0.0,
        }
    }

    /// Returns whether the pin is a timing endpoint: a primary output or a flip-flop input
    pub fn is_endpoint(&self) -> bool {
        self.role == PinRole::PrimaryOutput || self.is_flop_input
    }

    /// Location clamped to non-negative integer coordinates, as given to the Steiner estimator
    pub fn grid_location(&self) -> (u32, u32) {
        (self.x.max(0.0) as u32, self.y.max(0.0) as u32)
    }
}

/// A library cell: a name and the direction of its pins
#[derive(Clone, Debug)]
pub struct LibCell {
    /// Name in the timing library
    pub name: String,
    /// Pins, in library pin name order
    pub pins: BTreeMap<String, PinDirection>,
}

/// A cell instance
#[derive(Clone, Debug)]
pub struct Cell {
    /// Instance name
    pub name: String,
    /// Library cell
    pub lib_cell: LibCellId,
    /// Current x coordinate of the lower-left corner
    pub x: f64,
    /// Current y coordinate of the lower-left corner
    pub y: f64,
    /// Initial x coordinate, before placement
    pub init_x: f64,
    /// Initial y coordinate, before placement
    pub init_y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
    /// Fixed cells are not moved by the placer
    pub is_fixed: bool,
    /// Pins, by library port name
    pub ports: BTreeMap<String, PinId>,
}

impl Cell {
    /// Area of the cell
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Manhattan distance between the initial and current positions
    pub fn displacement(&self) -> f64 {
        (self.init_x - self.x).abs() + (self.init_y - self.y).abs()
    }
}

/// A piece of wire between two nodes of the timer netlist
///
/// Nodes are either pin names or synthetic names, for Steiner points and sliced wires.
#[derive(Clone, Debug, PartialEq)]
pub struct WireSegment {
    /// First node
    pub from: String,
    /// Second node
    pub to: String,
    /// Length, in database units
    pub length: f64,
}

impl WireSegment {
    /// Create a new segment
    pub fn new(from: impl Into<String>, to: impl Into<String>, length: f64) -> WireSegment {
        WireSegment {
            from: from.into(),
            to: to.into(),
            length,
        }
    }
}

impl fmt::Display for WireSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} - {}", self.from, self.to, self.length)
    }
}

/// A net, with a single source and multiple sinks
#[derive(Clone, Debug)]
pub struct Net {
    /// Name
    pub name: String,
    /// Driving pin
    pub source: PinId,
    /// Driven pins
    pub sinks: Vec<PinId>,
    /// Interconnect, rebuilt by the Steiner construction
    pub segments: Vec<WireSegment>,
}

impl Net {
    /// Number of pins on the net
    pub fn nb_terminals(&self) -> usize {
        self.sinks.len() + 1
    }

    /// Returns whether the net has no sink, and no interconnect to build
    pub fn is_degenerate(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Total length of the interconnect, in database units
    pub fn wirelength(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// A placement row
#[derive(Clone, Copy, Debug)]
pub struct Row {
    /// x coordinate of the first site
    pub origin_x: f64,
    /// y coordinate of the row
    pub origin_y: f64,
    /// Distance between sites
    pub step_x: f64,
    /// Number of sites
    pub nb_sites: usize,
}

impl Row {
    /// x coordinate of the end of the row
    pub fn end_x(&self) -> f64 {
        self.origin_x + self.nb_sites as f64 * self.step_x
    }
}
