use std::io::Read;

use fxhash::FxHashMap;

use crate::circuit::PinId;
use crate::error::{EvalError, Result};
use crate::Circuit;

/// Timing corner of a slack record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    /// Hold analysis
    Early,
    /// Setup analysis
    Late,
}

/// Slacks read from the timer, by pin
///
/// Records on nodes that are not pins of the circuit (driver and slicing nodes) are counted
/// but their values are dropped.
#[derive(Clone, Debug, Default)]
pub struct SlackReport {
    early: FxHashMap<PinId, f64>,
    late: FxHashMap<PinId, f64>,
    nb_records: usize,
}

impl SlackReport {
    /// Number of records read, including those on internal nodes
    pub fn nb_records(&self) -> usize {
        self.nb_records
    }

    /// Returns whether the report contains no record at all
    pub fn is_empty(&self) -> bool {
        self.nb_records == 0
    }

    /// Slack of a pin for a corner
    pub fn slack(&self, pin: PinId, corner: Corner) -> Option<f64> {
        match corner {
            Corner::Early => self.early.get(&pin).copied(),
            Corner::Late => self.late.get(&pin).copied(),
        }
    }

    /// Store the slacks in the pins of the circuit, replacing previous values
    pub fn apply(&self, circuit: &mut Circuit) {
        circuit.clear_slacks();
        for (&p, &s) in &self.early {
            circuit.pin_mut(p).early_slack = Some(s);
        }
        for (&p, &s) in &self.late {
            circuit.pin_mut(p).late_slack = Some(s);
        }
    }
}

/// Read the slack records written by the timer
///
/// The report is a flat sequence of `slack <node> <early|late> <value>` records, separated by
/// any whitespace.
pub fn read_slacks<R: Read>(mut r: R, circuit: &Circuit) -> Result<SlackReport> {
    let mut contents = String::new();
    r.read_to_string(&mut contents)?;
    let mut ret = SlackReport::default();
    let mut tokens = contents.split_whitespace();
    while let Some(keyword) = tokens.next() {
        let record = ret.nb_records;
        let malformed = |message: String| EvalError::MalformedTimingReport { record, message };
        if keyword != "slack" {
            return Err(malformed(format!("expected slack, got {}", keyword)));
        }
        let (Some(node), Some(corner), Some(value)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(malformed("truncated record".to_string()));
        };
        let corner = match corner {
            "early" => Corner::Early,
            "late" => Corner::Late,
            _ => return Err(malformed(format!("unknown corner {}", corner))),
        };
        ret.nb_records += 1;
        let Some(pin) = circuit.find_pin(node) else {
            continue;
        };
        let value: f64 = value
            .parse()
            .map_err(|_| malformed(format!("invalid slack {} for {}", value, node)))?;
        match corner {
            Corner::Early => ret.early.insert(pin, value),
            Corner::Late => ret.late.insert(pin, value),
        };
    }
    Ok(ret)
}
