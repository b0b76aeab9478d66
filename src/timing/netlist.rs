use std::borrow::Cow;
use std::io::Write;

use fxhash::{FxHashMap, FxHashSet};

use crate::circuit::PinDirection;
use crate::error::Result;
use crate::params::Parameters;
use crate::timing::check_name;
use crate::Circuit;

/// Suffix of the node between a primary input and its driver
pub const DRIVER_INPUT_SUFFIX: &str = "_drvin";
/// Suffix of the node at the output of an input driver
pub const DRIVER_OUTPUT_SUFFIX: &str = "_drvout";

/// Name of the node for a pin or a synthetic node in the netlist
///
/// Primary inputs with a driver are seen by the rest of the netlist through the driver output.
fn node_name<'a>(circuit: &Circuit, name: &'a str) -> Result<Cow<'a, str>> {
    let ret = match circuit.find_pin(name) {
        Some(p) if circuit.is_driven_input(p) => {
            Cow::Owned(format!("{}{}", name, DRIVER_OUTPUT_SUFFIX))
        }
        _ => Cow::Borrowed(name),
    };
    check_name(&ret)?;
    Ok(ret)
}

/// Write the RC netlist read by the timer
///
/// The netlist declares the ports, the input drivers and cell instances, the wires with their
/// lumped capacitances and resistances, then the timing constraints. Each wire segment puts
/// half of its capacitance on each of its ends; the capacitance of a node is written once,
/// with the contribution of every segment touching it.
pub fn write_netlist<W: Write>(w: &mut W, circuit: &Circuit, params: &Parameters) -> Result<()> {
    let d2m = circuit.dist2microns();
    let mut node_cap: FxHashMap<&str, f64> = FxHashMap::default();

    // Ports
    for &i in circuit.inputs() {
        let name = &circuit.pin(i).name;
        check_name(name)?;
        writeln!(w, "input {}", name)?;
    }
    for &o in circuit.outputs() {
        let pin = circuit.pin(o);
        check_name(&pin.name)?;
        writeln!(w, "output {}", pin.name)?;
        node_cap.insert(&pin.name, pin.cap);
    }

    // Input drivers
    for &i in circuit.inputs() {
        if !circuit.is_driven_input(i) {
            continue;
        }
        let pin = circuit.pin(i);
        let Some(driver) = pin.driver else {
            continue;
        };
        let lib = circuit.lib_cell(driver);
        write!(w, "instance {}", lib.name)?;
        for (port, dir) in &lib.pins {
            let suffix = match dir {
                PinDirection::Input => DRIVER_INPUT_SUFFIX,
                PinDirection::Output => DRIVER_OUTPUT_SUFFIX,
                PinDirection::Other => continue,
            };
            let node = format!("{}{}", pin.name, suffix);
            check_name(&node)?;
            write!(w, " {}:{}", port, node)?;
        }
        writeln!(w)?;
    }

    // Cell instances
    for cell in circuit.cells() {
        if cell.ports.is_empty() {
            continue;
        }
        write!(w, "instance {}", circuit.lib_cell(cell.lib_cell).name)?;
        for (port, &p) in &cell.ports {
            write!(w, " {}:{}", port, node_name(circuit, &circuit.pin(p).name)?)?;
        }
        writeln!(w)?;
    }

    // Lumped capacitances of the wires
    for net in circuit.nets() {
        let cap = params.wire_cap_per_micron(circuit.is_clock_net(net));
        for s in &net.segments {
            let half = 0.5 * s.length / d2m * cap;
            *node_cap.entry(&s.from).or_default() += half;
            *node_cap.entry(&s.to).or_default() += half;
        }
    }

    // Ideal wires between the inputs and their driver
    for &i in circuit.inputs() {
        if !circuit.is_driven_input(i) {
            continue;
        }
        let name = &circuit.pin(i).name;
        writeln!(w, "wire {} {}{}", name, name, DRIVER_INPUT_SUFFIX)?;
        writeln!(
            w,
            "  res {} {}{} {:.5e}",
            name, name, DRIVER_INPUT_SUFFIX, 0.0
        )?;
    }

    // Wires
    let mut cap_written: FxHashSet<&str> = FxHashSet::default();
    for net in circuit.nets() {
        let res = params.wire_res_per_micron(circuit.is_clock_net(net));
        write!(w, "wire {}", node_name(circuit, &circuit.pin(net.source).name)?)?;
        for &s in &net.sinks {
            write!(w, " {}", node_name(circuit, &circuit.pin(s).name)?)?;
        }
        writeln!(w)?;
        for s in &net.segments {
            let from = node_name(circuit, &s.from)?;
            let to = node_name(circuit, &s.to)?;
            if cap_written.insert(&s.from) {
                writeln!(w, "  cap {} {:.5e}", from, node_cap[s.from.as_str()])?;
            }
            writeln!(w, "  res {} {} {:.5e}", from, to, s.length / d2m * res)?;
            if cap_written.insert(&s.to) {
                writeln!(w, "  cap {} {:.5e}", to, node_cap[s.to.as_str()])?;
            }
        }
    }

    // Constraints
    let period = circuit.clock_period();
    if !circuit.clock_port().is_empty() {
        writeln!(w, "clock {} {:.5e}", circuit.clock_port(), period)?;
    }
    for &i in circuit.inputs() {
        let pin = circuit.pin(i);
        writeln!(
            w,
            "at {} {:.5e} {:.5e} {:.5e} {:.5e}",
            pin.name, pin.delay, pin.delay, pin.delay, pin.delay
        )?;
        writeln!(
            w,
            "slew {} {:.5e} {:.5e}",
            pin.name, pin.fall_transition, pin.rise_transition
        )?;
    }
    for &o in circuit.outputs() {
        let pin = circuit.pin(o);
        let required = period - pin.delay;
        writeln!(w, "rat {} early {:.5e} {:.5e}", pin.name, 0.0, 0.0)?;
        writeln!(
            w,
            "rat {} late {:.5e} {:.5e}",
            pin.name, required, required
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_netlist;
    use crate::circuit::generators::{random, testcases};
    use crate::circuit::WireSegment;
    use crate::error::EvalError;
    use crate::params::Parameters;
    use crate::slicing::slice_long_wires;
    use crate::steiner::{RectilinearSteiner, SteinerBuilder};

    fn netlist_lines(ckt: &crate::Circuit) -> Vec<String> {
        let mut buf = Vec::new();
        write_netlist(&mut buf, ckt, &Parameters::default()).unwrap();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn test_two_pin_netlist() {
        let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        ckt.set_clock("clk", 100.0);
        SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        slice_long_wires(&mut ckt, 500.0).unwrap();
        let lines = netlist_lines(&ckt);
        let expected = [
            "input a",
            "output b",
            "instance in01f80 a:a_drvin o:a_drvout",
            "wire a a_drvin",
            "  res a a_drvin 0.00000e0",
            "wire a_drvout b",
            "  cap a_drvout 4.00000e-1",
            "  res a_drvout a_b_0 1.26750e1",
            "  cap a_b_0 8.00000e-1",
            "  res a_b_0 b 1.26750e1",
            "  cap b 4.00000e-1",
            "clock clk 1.00000e2",
            "at a 0.00000e0 0.00000e0 0.00000e0 0.00000e0",
            "slew a 0.00000e0 0.00000e0",
            "rat b early 0.00000e0 0.00000e0",
            "rat b late 1.00000e2 1.00000e2",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_caps_written_once() {
        let mut ckt = random::placement(100, 7);
        SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        slice_long_wires(&mut ckt, 20000.0).unwrap();
        let lines = netlist_lines(&ckt);
        let mut caps = std::collections::HashSet::new();
        let mut res_nodes = std::collections::HashSet::new();
        for l in &lines {
            let tokens: Vec<&str> = l.split_whitespace().collect();
            match tokens[0] {
                "cap" => assert!(caps.insert(tokens[1].to_string()), "{} twice", tokens[1]),
                "res" => {
                    if tokens[3] != "0.00000e0" || !tokens[2].ends_with("_drvin") {
                        res_nodes.insert(tokens[1].to_string());
                        res_nodes.insert(tokens[2].to_string());
                    }
                }
                _ => (),
            }
        }
        assert_eq!(caps, res_nodes);
        // The clock is not driven
        assert!(lines.iter().any(|l| l.starts_with("wire iccad_clk ")));
        assert!(!lines.iter().any(|l| l.contains("iccad_clk_drv")));
    }

    #[test]
    fn test_register_netlist() {
        let mut ckt = testcases::register();
        SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        let lines = netlist_lines(&ckt);
        let expected = [
            "input clk",
            "input in",
            "output out",
            "instance in01f80 a:in_drvin o:in_drvout",
            "instance ms00f80 ck:f/ck d:in_drvout o:f/o",
            "wire in in_drvin",
            "  res in in_drvin 0.00000e0",
            "wire clk f/ck",
            "  cap clk 4.00000e-1",
            "  res clk f/ck 8.45000e0",
            "  cap f/ck 4.00000e-1",
            "wire f/o out",
            "  cap f/o 1.60000e-1",
            "  res f/o out 5.07000e0",
            "  cap out 1.60000e-1",
            "clock clk 5.00000e2",
            "at clk 0.00000e0 0.00000e0 0.00000e0 0.00000e0",
            "slew clk 0.00000e0 0.00000e0",
            "at in 0.00000e0 0.00000e0 0.00000e0 0.00000e0",
            "slew in 0.00000e0 0.00000e0",
            "rat out early 0.00000e0 0.00000e0",
            "rat out late 5.00000e2 5.00000e2",
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_port_on_clock() {
        let mut ckt = testcases::register();
        let clk = ckt.find_pin("clk").unwrap();
        let dff = ckt.cells()[0].lib_cell;
        let g = ckt.add_cell("g", dff, (400.0, 0.0), (200.0, 200.0), false);
        ckt.connect_port(g, "ck", clk);
        let lines = netlist_lines(&ckt);
        assert!(lines.iter().any(|l| l == "instance ms00f80 ck:clk"));
        assert!(!lines.iter().any(|l| l.contains("clk_drv")));
    }

    #[test]
    fn test_no_clock() {
        let ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
        let lines = netlist_lines(&ckt);
        assert!(!lines.iter().any(|l| l.starts_with("clock")));
        assert!(lines.iter().any(|l| l == "rat b late 0.00000e0 0.00000e0"));
    }

    #[test]
    fn test_long_name() {
        let mut ckt = testcases::two_pin((0.0, 0.0), (10.0, 0.0));
        ckt.net_mut(0).segments = vec![WireSegment::new("a", "y".repeat(2000), 10.0)];
        let mut buf = Vec::new();
        let err = write_netlist(&mut buf, &ckt, &Parameters::default()).unwrap_err();
        assert!(matches!(err, EvalError::NameTooLong { .. }));
    }
}
