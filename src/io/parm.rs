//! Parameter files

use std::io::{BufRead, BufReader, Read};

use log::warn;

use crate::error::{EvalError, Result};
use crate::params::Parameters;

fn parse_value<T: std::str::FromStr>(line: usize, key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| EvalError::Parameters {
        line,
        message: format!("invalid value {} for {}", value, key),
    })
}

/// Read evaluation parameters, starting from the ICCAD 2014 defaults
///
/// Each line holds a key and its value:
/// ```text
///     # Wire characteristics
///     LOCAL_WIRE_CAP_PER_MICRON   0.16
///     LOCAL_WIRE_RES_PER_MICRON   2.535
///     GLOBAL_WIRE_CAP_PER_MICRON  0.08
///     GLOBAL_WIRE_RES_PER_MICRON  0.845
///     MAX_WIRE_SEGMENT_IN_MICRON  20
///     BIN_DIM                     9    // in row heights
///     ALPHA                       1
///     STEINER_ACCURACY            3
/// ```
/// Unknown keys are ignored with a warning.
pub fn read_parameters<R: Read>(r: R) -> Result<Parameters> {
    let mut ret = Parameters::iccad2014();
    for (i, l) in BufReader::new(r).lines().enumerate() {
        let l = l?;
        let line = i + 1;
        let content = l.split('#').next().unwrap_or("");
        let content = content.split("//").next().unwrap_or("");
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let (key, value) = match tokens.as_slice() {
            [] => continue,
            [key, value] => (*key, *value),
            _ => {
                return Err(EvalError::Parameters {
                    line,
                    message: format!("expected a key and a value, got {}", l.trim()),
                })
            }
        };
        match key {
            "LOCAL_WIRE_CAP_PER_MICRON" => ret.local_wire_cap = parse_value(line, key, value)?,
            "LOCAL_WIRE_RES_PER_MICRON" => ret.local_wire_res = parse_value(line, key, value)?,
            "GLOBAL_WIRE_CAP_PER_MICRON" => ret.global_wire_cap = parse_value(line, key, value)?,
            "GLOBAL_WIRE_RES_PER_MICRON" => ret.global_wire_res = parse_value(line, key, value)?,
            "MAX_WIRE_SEGMENT_IN_MICRON" => ret.max_wire_segment = parse_value(line, key, value)?,
            "BIN_DIM" => ret.bin_dim = parse_value(line, key, value)?,
            "ALPHA" => ret.alpha = parse_value(line, key, value)?,
            "STEINER_ACCURACY" => ret.steiner_accuracy = parse_value(line, key, value)?,
            _ => warn!("Ignoring unknown parameter {} at line {}", key, line),
        }
    }
    Ok(ret)
}
