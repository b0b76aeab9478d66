use std::collections::BTreeMap;

use fxhash::FxHashMap;

use crate::circuit::components::{
    Cell, CellId, LibCell, LibCellId, Net, NetId, Pin, PinDirection, PinId, PinRole, Row,
};
use crate::geometry::Rect;

/// A placed circuit: pins, cells, nets and rows, along with the timing context
///
/// The circuit owns everything. Wire segments are owned by the nets and rebuilt by each
/// Steiner construction.
#[derive(Debug, Clone)]
pub struct Circuit {
    die: Rect,
    row_height: f64,
    dist2microns: f64,
    lib_cells: Vec<LibCell>,
    pins: Vec<Pin>,
    cells: Vec<Cell>,
    nets: Vec<Net>,
    rows: Vec<Row>,
    inputs: Vec<PinId>,
    outputs: Vec<PinId>,
    pin_ids: FxHashMap<String, PinId>,
    clock_port: String,
    clock_period: f64,
}

impl Circuit {
    /// Create an empty circuit
    ///
    /// `dist2microns` is the number of database units per micron.
    pub fn new(die: Rect, row_height: f64, dist2microns: f64) -> Self {
        assert!(dist2microns > 0.0);
        assert!(row_height > 0.0);
        Circuit {
            die,
            row_height,
            dist2microns,
            lib_cells: Vec::new(),
            pins: Vec::new(),
            cells: Vec::new(),
            nets: Vec::new(),
            rows: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            pin_ids: FxHashMap::default(),
            clock_port: String::new(),
            clock_period: 0.0,
        }
    }

    /// Placement area
    pub fn die(&self) -> Rect {
        self.die
    }

    /// Height of the placement rows
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Number of database units per micron
    pub fn dist2microns(&self) -> f64 {
        self.dist2microns
    }

    /// Return the number of pins
    pub fn nb_pins(&self) -> usize {
        self.pins.len()
    }

    /// Return the number of cells
    pub fn nb_cells(&self) -> usize {
        self.cells.len()
    }

    /// Return the number of nets
    pub fn nb_nets(&self) -> usize {
        self.nets.len()
    }

    /// Return the number of rows
    pub fn nb_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of library cells
    pub fn nb_lib_cells(&self) -> usize {
        self.lib_cells.len()
    }

    /// Return the number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Return the number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Get the pin at index i
    pub fn pin(&self, i: PinId) -> &Pin {
        &self.pins[i]
    }

    /// Get the pin at index i for modification
    pub fn pin_mut(&mut self, i: PinId) -> &mut Pin {
        &mut self.pins[i]
    }

    /// Get the cell at index i
    pub fn cell(&self, i: CellId) -> &Cell {
        &self.cells[i]
    }

    /// Get the net at index i
    pub fn net(&self, i: NetId) -> &Net {
        &self.nets[i]
    }

    /// Get the net at index i for modification
    pub fn net_mut(&mut self, i: NetId) -> &mut Net {
        &mut self.nets[i]
    }

    /// Get the library cell at index i
    pub fn lib_cell(&self, i: LibCellId) -> &LibCell {
        &self.lib_cells[i]
    }

    /// All pins
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// All cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All nets
    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    /// All nets, for modification of their interconnect
    pub fn nets_mut(&mut self) -> &mut [Net] {
        &mut self.nets
    }

    /// All rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Primary inputs, in declaration order
    pub fn inputs(&self) -> &[PinId] {
        &self.inputs
    }

    /// Primary outputs, in declaration order
    pub fn outputs(&self) -> &[PinId] {
        &self.outputs
    }

    /// Find a pin by name
    pub fn find_pin(&self, name: &str) -> Option<PinId> {
        self.pin_ids.get(name).copied()
    }

    /// Name of the clock port; the clock net has the same name
    pub fn clock_port(&self) -> &str {
        &self.clock_port
    }

    /// Clock period
    pub fn clock_period(&self) -> f64 {
        self.clock_period
    }

    /// Set the clock port and period
    pub fn set_clock(&mut self, port: &str, period: f64) {
        self.clock_port = port.to_string();
        self.clock_period = period;
    }

    /// Returns whether the net is the clock network, routed on global wiring
    pub fn is_clock_net(&self, net: &Net) -> bool {
        !self.clock_port.is_empty() && net.name == self.clock_port
    }

    /// Returns whether the pin is a primary input other than the clock, driven through an input driver
    pub fn is_driven_input(&self, i: PinId) -> bool {
        let p = &self.pins[i];
        p.role == PinRole::PrimaryInput && p.driver.is_some() && p.name != self.clock_port
    }

    /// Add a new library cell with its pins
    pub fn add_lib_cell(&mut self, name: &str, pins: &[(&str, PinDirection)]) -> LibCellId {
        let pins = pins
            .iter()
            .map(|(n, d)| (n.to_string(), *d))
            .collect::<BTreeMap<_, _>>();
        self.lib_cells.push(LibCell {
            name: name.to_string(),
            pins,
        });
        self.lib_cells.len() - 1
    }

    /// Add a new cell instance at its initial location
    pub fn add_cell(
        &mut self,
        name: &str,
        lib_cell: LibCellId,
        (x, y): (f64, f64),
        (width, height): (f64, f64),
        is_fixed: bool,
    ) -> CellId {
        assert!(lib_cell < self.nb_lib_cells());
        self.cells.push(Cell {
            name: name.to_string(),
            lib_cell,
            x,
            y,
            init_x: x,
            init_y: y,
            width,
            height,
            is_fixed,
            ports: BTreeMap::new(),
        });
        self.cells.len() - 1
    }

    fn register_pin(&mut self, pin: Pin) -> PinId {
        let id = self.pins.len();
        let present = self.pin_ids.insert(pin.name.clone(), id).is_some();
        assert!(!present, "{} is defined twice", pin.name);
        self.pins.push(pin);
        id
    }

    /// Add a new pin on a cell port, with its offset from the cell origin
    pub fn add_pin(&mut self, cell: CellId, port: &str, (dx, dy): (f64, f64)) -> PinId {
        let name = format!("{}/{}", self.cells[cell].name, port);
        let mut pin = Pin::new(&name, PinRole::Terminal);
        pin.owner = Some(cell);
        pin.is_fixed = self.cells[cell].is_fixed;
        pin.x_offset = dx;
        pin.y_offset = dy;
        if pin.is_fixed {
            pin.base_x = self.cells[cell].x;
            pin.base_y = self.cells[cell].y;
        }
        let id = self.register_pin(pin);
        self.cells[cell].ports.insert(port.to_string(), id);
        id
    }

    /// Connect a cell port directly to an existing pin, such as a primary input
    pub fn connect_port(&mut self, cell: CellId, port: &str, pin: PinId) {
        assert!(pin < self.nb_pins());
        self.cells[cell].ports.insert(port.to_string(), pin);
    }

    /// Add a new primary input at a fixed location
    pub fn add_input(&mut self, name: &str, (x, y): (f64, f64)) -> PinId {
        let mut pin = Pin::new(name, PinRole::PrimaryInput);
        pin.is_fixed = true;
        pin.base_x = x;
        pin.base_y = y;
        let id = self.register_pin(pin);
        self.inputs.push(id);
        id
    }

    /// Add a new primary output at a fixed location
    pub fn add_output(&mut self, name: &str, (x, y): (f64, f64)) -> PinId {
        let mut pin = Pin::new(name, PinRole::PrimaryOutput);
        pin.is_fixed = true;
        pin.base_x = x;
        pin.base_y = y;
        let id = self.register_pin(pin);
        self.outputs.push(id);
        id
    }

    /// Add a new net
    pub fn add_net(&mut self, name: &str, source: PinId, sinks: &[PinId]) -> NetId {
        assert!(source < self.nb_pins());
        assert!(sinks.iter().all(|s| *s < self.nb_pins()));
        self.nets.push(Net {
            name: name.to_string(),
            source,
            sinks: sinks.to_vec(),
            segments: Vec::new(),
        });
        self.nets.len() - 1
    }

    /// Add a new placement row
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Move a movable cell; its initial location is kept to measure displacement
    pub fn move_cell(&mut self, cell: CellId, (x, y): (f64, f64)) {
        let c = &mut self.cells[cell];
        assert!(!c.is_fixed, "Fixed cell {} cannot be moved", c.name);
        c.x = x;
        c.y = y;
    }

    /// Recompute the absolute location of every pin
    ///
    /// Pins of movable cells follow their owner. Fixed and top-level pins stay at their base
    /// location plus offset, so that running this several times does not move them.
    pub fn update_pin_locations(&mut self) {
        for pin in self.pins.iter_mut() {
            match pin.owner {
                Some(c) if !pin.is_fixed => {
                    pin.x = self.cells[c].x + pin.x_offset;
                    pin.y = self.cells[c].y + pin.y_offset;
                }
                _ => {
                    pin.x = pin.base_x + pin.x_offset;
                    pin.y = pin.base_y + pin.y_offset;
                }
            }
        }
    }

    /// Half-perimeter wirelength of all nets, in microns
    pub fn hpwl(&mut self) -> f64 {
        self.update_pin_locations();
        let mut total = 0.0;
        for net in &self.nets {
            let src = &self.pins[net.source];
            let (mut min_x, mut max_x) = (src.x, src.x);
            let (mut min_y, mut max_y) = (src.y, src.y);
            for s in &net.sinks {
                let p = &self.pins[*s];
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                min_y = min_y.min(p.y);
                max_y = max_y.max(p.y);
            }
            total += (max_x - min_x) + (max_y - min_y);
        }
        total / self.dist2microns
    }

    /// Maximum Manhattan displacement of movable cells from their initial location, in microns
    pub fn max_displacement(&self) -> f64 {
        let displacement = self
            .cells
            .iter()
            .filter(|c| !c.is_fixed)
            .map(|c| c.displacement())
            .fold(0.0, f64::max);
        displacement / self.dist2microns
    }

    /// Forget the slacks of a previous timing analysis
    pub fn clear_slacks(&mut self) {
        for p in self.pins.iter_mut() {
            p.early_slack = None;
            p.late_slack = None;
        }
    }

    /// Check the consistency of the circuit
    pub fn check(&self) {
        for net in &self.nets {
            assert!(net.source < self.nb_pins());
            for s in &net.sinks {
                assert!(*s < self.nb_pins(), "Net {} has an invalid sink", net.name);
            }
        }
        for (i, p) in self.pins.iter().enumerate() {
            assert_eq!(self.pin_ids[&p.name], i);
            if let Some(c) = p.owner {
                assert!(c < self.nb_cells());
            }
            if let Some(d) = p.driver {
                assert!(d < self.nb_lib_cells());
            }
        }
        for c in &self.cells {
            assert!(c.lib_cell < self.nb_lib_cells());
            assert!(c.width >= 0.0 && c.height >= 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Circuit;
    use crate::circuit::PinDirection;
    use crate::geometry::Rect;

    fn small_circuit() -> Circuit {
        let mut ckt = Circuit::new(Rect::new(0.0, 0.0, 1000.0, 1000.0), 100.0, 100.0);
        let inv = ckt.add_lib_cell(
            "INV_X1",
            &[("a", PinDirection::Input), ("o", PinDirection::Output)],
        );
        let c = ckt.add_cell("u1", inv, (100.0, 200.0), (50.0, 100.0), false);
        ckt.add_pin(c, "a", (0.0, 50.0));
        ckt.add_pin(c, "o", (50.0, 50.0));
        ckt.add_input("in", (0.0, 300.0));
        ckt.add_output("out", (1000.0, 300.0));
        ckt
    }

    #[test]
    fn test_pin_locations() {
        let mut ckt = small_circuit();
        ckt.update_pin_locations();
        let a = ckt.find_pin("u1/a").unwrap();
        assert_eq!((ckt.pin(a).x, ckt.pin(a).y), (100.0, 250.0));
        ckt.move_cell(0, (300.0, 400.0));
        ckt.update_pin_locations();
        assert_eq!((ckt.pin(a).x, ckt.pin(a).y), (300.0, 450.0));
    }

    #[test]
    fn test_unowned_pins_do_not_drift() {
        let mut ckt = small_circuit();
        let i = ckt.find_pin("in").unwrap();
        ckt.pin_mut(i).x_offset = 10.0;
        for _ in 0..3 {
            ckt.update_pin_locations();
        }
        assert_eq!((ckt.pin(i).x, ckt.pin(i).y), (10.0, 300.0));
    }

    #[test]
    fn test_hpwl_and_displacement() {
        let mut ckt = small_circuit();
        let i = ckt.find_pin("in").unwrap();
        let a = ckt.find_pin("u1/a").unwrap();
        let o = ckt.find_pin("u1/o").unwrap();
        let out = ckt.find_pin("out").unwrap();
        ckt.add_net("n1", i, &[a]);
        ckt.add_net("n2", o, &[out]);
        // (100 + 50) + (850 + 50), in database units
        assert!((ckt.hpwl() - 10.5).abs() < 1e-9);
        assert_eq!(ckt.max_displacement(), 0.0);
        ckt.move_cell(0, (150.0, 100.0));
        assert!((ckt.max_displacement() - 1.5).abs() < 1e-9);
        ckt.check();
    }

    #[test]
    #[should_panic]
    fn test_duplicate_pin() {
        let mut ckt = small_circuit();
        ckt.add_input("in", (0.0, 0.0));
    }
}
