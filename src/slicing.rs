//! Subdivision of long wire segments
//!
//! The timer models each wire segment as a single RC element. Segments longer than a maximum
//! length are split into equal pieces, chained through synthetic nodes named after the two
//! original ends: a segment `a - b` split in three becomes `a - a_b_0`, `a_b_0 - a_b_1` and
//! `a_b_1 - b`.

use fxhash::FxHashSet;
use log::info;

use crate::circuit::WireSegment;
use crate::error::{EvalError, Result};
use crate::timing::check_name;
use crate::Circuit;

/// Wire segment counts of a slicing pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SliceSummary {
    /// Number of segments before slicing
    pub nb_segments_before: usize,
    /// Number of segments after slicing
    pub nb_segments_after: usize,
    /// Number of segments that were split
    pub nb_sliced: usize,
}

/// Split the segments of one net so that none is longer than `max_len`
///
/// A segment of length exactly `max_len` is kept. `is_taken` tells whether a name is already
/// used outside of the net. Returns the number of segments that were split.
pub fn slice_segments(
    net_name: &str,
    segments: &mut Vec<WireSegment>,
    max_len: f64,
    is_taken: impl Fn(&str) -> bool,
) -> Result<usize> {
    assert!(max_len > 0.0);
    let mut nodes: FxHashSet<String> = segments
        .iter()
        .flat_map(|s| [s.from.clone(), s.to.clone()])
        .collect();
    let mut nb_sliced = 0;
    for i in 0..segments.len() {
        let length = segments[i].length;
        if length <= max_len {
            continue;
        }
        let nb_pieces = (length / max_len).ceil() as usize;
        let piece = (length / nb_pieces as f64).min(max_len);
        let from = segments[i].from.clone();
        let to = segments[i].to.clone();

        let mut prev = from.clone();
        for k in 0..nb_pieces - 1 {
            let name = format!("{}_{}_{}", from, to, k);
            check_name(&name)?;
            if is_taken(&name) || !nodes.insert(name.clone()) {
                return Err(EvalError::NameCollision {
                    name,
                    net: net_name.to_string(),
                });
            }
            if k == 0 {
                segments[i].to = name.clone();
                segments[i].length = piece;
            } else {
                segments.push(WireSegment::new(prev, name.clone(), piece));
            }
            prev = name;
        }
        segments.push(WireSegment::new(prev, to, piece));
        nb_sliced += 1;
    }
    Ok(nb_sliced)
}

/// Split the long wire segments of every net; `max_len` is in database units
pub fn slice_long_wires(circuit: &mut Circuit, max_len: f64) -> Result<SliceSummary> {
    let mut ret = SliceSummary::default();
    for i in 0..circuit.nb_nets() {
        let mut segments = std::mem::take(&mut circuit.net_mut(i).segments);
        ret.nb_segments_before += segments.len();
        let sliced = slice_segments(&circuit.net(i).name, &mut segments, max_len, |s| {
            circuit.find_pin(s).is_some()
        });
        ret.nb_segments_after += segments.len();
        circuit.net_mut(i).segments = segments;
        ret.nb_sliced += sliced?;
    }
    info!(
        "Slicing wire segments: {} --> {} ( < {} um )",
        ret.nb_segments_before,
        ret.nb_segments_after,
        max_len / circuit.dist2microns()
    );
    Ok(ret)
}
