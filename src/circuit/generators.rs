//! Circuit generators and templates

use crate::circuit::{LibCellId, PinDirection};
use crate::Circuit;

/// Standard library cells used by the generators
struct Library {
    driver: LibCellId,
    inv: LibCellId,
    nand: LibCellId,
    dff: LibCellId,
}

impl Library {
    fn add_to(ckt: &mut Circuit) -> Library {
        use PinDirection::*;
        Library {
            driver: ckt.add_lib_cell("in01f80", &[("a", Input), ("o", Output)]),
            inv: ckt.add_lib_cell("in01f01", &[("a", Input), ("o", Output)]),
            nand: ckt.add_lib_cell("na02f01", &[("a", Input), ("b", Input), ("o", Output)]),
            dff: ckt.add_lib_cell("ms00f80", &[("ck", Input), ("d", Input), ("o", Output)]),
        }
    }
}

/// Simple generators to test functionality
pub mod testcases {
    use super::Library;
    use crate::circuit::Row;
    use crate::geometry::Rect;
    use crate::Circuit;

    /// A single net between a primary input and a primary output, with 100 units per micron
    pub fn two_pin(from: (f64, f64), to: (f64, f64)) -> Circuit {
        let hx = from.0.max(to.0) + 100.0;
        let hy = from.1.max(to.1) + 100.0;
        let mut ret = Circuit::new(Rect::new(0.0, 0.0, hx, hy), 100.0, 100.0);
        let lib = Library::add_to(&mut ret);
        let i = ret.add_input("a", from);
        let o = ret.add_output("b", to);
        ret.pin_mut(i).driver = Some(lib.driver);
        ret.add_net("n", i, &[o]);
        ret.update_pin_locations();
        ret.check();
        ret
    }

    /// A chain of inverters on a single row, between a primary input and a primary output
    pub fn inverter_chain(len: usize) -> Circuit {
        let pitch = 200.0;
        let width = (len + 2) as f64 * pitch;
        let mut ret = Circuit::new(Rect::new(0.0, 0.0, width, 100.0), 100.0, 100.0);
        let lib = Library::add_to(&mut ret);
        ret.add_row(Row {
            origin_x: 0.0,
            origin_y: 0.0,
            step_x: 10.0,
            nb_sites: (width / 10.0) as usize,
        });
        let input = ret.add_input("in", (0.0, 50.0));
        ret.pin_mut(input).driver = Some(lib.driver);
        let mut prev = input;
        for i in 0..len {
            let c = ret.add_cell(
                &format!("u{}", i),
                lib.inv,
                ((i + 1) as f64 * pitch, 0.0),
                (100.0, 100.0),
                false,
            );
            let a = ret.add_pin(c, "a", (0.0, 50.0));
            let o = ret.add_pin(c, "o", (100.0, 50.0));
            ret.add_net(&format!("n{}", i), prev, &[a]);
            prev = o;
        }
        let output = ret.add_output("out", (width, 50.0));
        ret.pin_mut(output).cap = 4.0;
        ret.add_net(&format!("n{}", len), prev, &[output]);
        ret.update_pin_locations();
        ret.check();
        ret
    }

    /// A single flip-flop, with its data port fed directly by a primary input
    ///
    /// The clock net `clk` is 10 microns long and the output net `q` is 2 microns long.
    pub fn register() -> Circuit {
        let mut ret = Circuit::new(Rect::new(0.0, 0.0, 1400.0, 400.0), 200.0, 100.0);
        let lib = Library::add_to(&mut ret);
        let clk = ret.add_input("clk", (0.0, 0.0));
        let input = ret.add_input("in", (0.0, 200.0));
        ret.pin_mut(input).driver = Some(lib.driver);
        let f = ret.add_cell("f", lib.dff, (1000.0, 0.0), (200.0, 200.0), false);
        let ck = ret.add_pin(f, "ck", (0.0, 0.0));
        ret.connect_port(f, "d", input);
        let o = ret.add_pin(f, "o", (200.0, 100.0));
        let output = ret.add_output("out", (1200.0, 300.0));
        ret.add_net("clk", clk, &[ck]);
        ret.add_net("q", o, &[output]);
        ret.set_clock("clk", 500.0);
        ret.update_pin_locations();
        ret.check();
        ret
    }
}

/// Randomized placements, used to exercise the whole evaluation
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::Library;
    use crate::circuit::{PinId, Row};
    use crate::geometry::Rect;
    use crate::Circuit;

    /// Database units per micron
    const DIST2MICRONS: f64 = 1000.0;
    /// Height of a row
    const ROW_HEIGHT: f64 = 2000.0;
    /// Width of a site
    const SITE_WIDTH: f64 = 200.0;
    /// Clock port and net name
    const CLOCK: &str = "iccad_clk";

    /// A random sequential circuit placed on rows, with a few fixed blocks
    ///
    /// Cells are spread randomly with small displacements from their initial location,
    /// and may overlap. The combinational logic is acyclic.
    pub fn placement(nb_cells: usize, seed: u64) -> Circuit {
        let mut rng = SmallRng::seed_from_u64(seed);

        // Size the die for roughly 60% utilization
        let cell_area = 2.5 * SITE_WIDTH * ROW_HEIGHT * nb_cells.max(1) as f64;
        let side = (cell_area / 0.6).sqrt();
        let nb_rows = (side / ROW_HEIGHT).ceil().max(4.0) as usize;
        let nb_sites = (side / SITE_WIDTH).ceil().max(40.0) as usize;
        let (w, h) = (nb_sites as f64 * SITE_WIDTH, nb_rows as f64 * ROW_HEIGHT);

        let mut ret = Circuit::new(Rect::new(0.0, 0.0, w, h), ROW_HEIGHT, DIST2MICRONS);
        let lib = Library::add_to(&mut ret);
        for r in 0..nb_rows {
            ret.add_row(Row {
                origin_x: 0.0,
                origin_y: r as f64 * ROW_HEIGHT,
                step_x: SITE_WIDTH,
                nb_sites,
            });
        }

        // Fixed blocks
        for i in 0..nb_cells / 50 {
            let (bw, bh) = (20.0 * SITE_WIDTH, 4.0 * ROW_HEIGHT);
            let x = rng.gen_range(0..=nb_sites - 20) as f64 * SITE_WIDTH;
            let y = rng.gen_range(0..=nb_rows - 4) as f64 * ROW_HEIGHT;
            ret.add_cell(&format!("block{}", i), lib.inv, (x, y), (bw, bh), true);
        }

        // Ports
        let clock = ret.add_input(CLOCK, (0.0, 0.0));
        ret.set_clock(CLOCK, 500.0);
        let nb_ports = (nb_cells / 10).max(2);
        let mut drivers: Vec<PinId> = Vec::new();
        for i in 0..nb_ports {
            let y = h * (i as f64 + 0.5) / nb_ports as f64;
            let p = ret.add_input(&format!("i{}", i), (0.0, y));
            let pin = ret.pin_mut(p);
            pin.driver = Some(lib.driver);
            pin.delay = rng.gen_range(0.0..20.0);
            pin.rise_transition = 10.0;
            pin.fall_transition = 10.0;
            drivers.push(p);
        }
        let mut outputs = Vec::new();
        for i in 0..nb_ports {
            let y = h * (i as f64 + 0.5) / nb_ports as f64;
            let p = ret.add_output(&format!("o{}", i), (w, y));
            let pin = ret.pin_mut(p);
            pin.cap = 4.0;
            pin.delay = rng.gen_range(0.0..50.0);
            outputs.push(p);
        }

        // Standard cells; each input picks a driver among the ports and previous cells,
        // flip-flop outputs are available to everyone
        let mut sinks: Vec<(PinId, usize)> = Vec::new();
        let mut clock_sinks = Vec::new();
        let mut flop_drivers = Vec::new();
        let mut cell_drivers = Vec::new();
        for i in 0..nb_cells {
            let kind = rng.gen_range(0..10);
            let (lc, width) = match kind {
                0 | 1 => (lib.dff, 5.0),
                2..=5 => (lib.nand, 2.0),
                _ => (lib.inv, 1.0),
            };
            let width = width * SITE_WIDTH;
            let x = rng.gen_range(0..nb_sites - 5) as f64 * SITE_WIDTH;
            let y = rng.gen_range(0..nb_rows) as f64 * ROW_HEIGHT;
            let c = ret.add_cell(&format!("g{}", i), lc, (x, y), (width, ROW_HEIGHT), false);
            let dx = rng.gen_range(-3..=3) as f64 * SITE_WIDTH;
            ret.move_cell(c, ((x + dx).clamp(0.0, w - width), y));

            let o = ret.add_pin(c, "o", (width, 0.5 * ROW_HEIGHT));
            if lc == lib.dff {
                let ck = ret.add_pin(c, "ck", (0.0, 0.25 * ROW_HEIGHT));
                let d = ret.add_pin(c, "d", (0.0, 0.75 * ROW_HEIGHT));
                ret.pin_mut(d).is_flop_input = true;
                clock_sinks.push(ck);
                sinks.push((d, drivers.len() + cell_drivers.len()));
                flop_drivers.push(o);
            } else {
                let a = ret.add_pin(c, "a", (0.0, 0.25 * ROW_HEIGHT));
                sinks.push((a, drivers.len() + cell_drivers.len()));
                if lc == lib.nand {
                    let b = ret.add_pin(c, "b", (0.0, 0.75 * ROW_HEIGHT));
                    sinks.push((b, drivers.len() + cell_drivers.len()));
                }
                cell_drivers.push(o);
            }
        }
        drivers.extend(cell_drivers);
        let nb_comb_drivers = drivers.len();
        drivers.extend(flop_drivers);
        for o in outputs {
            sinks.push((o, nb_comb_drivers));
        }

        // Group the sinks per driver
        let mut fanouts = vec![Vec::new(); drivers.len()];
        for (s, nb_allowed) in sinks {
            let choice = rng.gen_range(0..nb_allowed + drivers.len() - nb_comb_drivers);
            let d = if choice < nb_allowed {
                choice
            } else {
                nb_comb_drivers + choice - nb_allowed
            };
            fanouts[d].push(s);
        }
        for (i, (d, f)) in drivers.iter().zip(fanouts.iter()).enumerate() {
            if !f.is_empty() {
                ret.add_net(&format!("n{}", i), *d, f);
            }
        }
        if !clock_sinks.is_empty() {
            ret.add_net(CLOCK, clock, &clock_sinks);
        }
        ret.update_pin_locations();
        ret.check();
        ret
    }
}
