use kdam::{tqdm, BarExt};
use log::info;

use fxhash::{FxHashMap, FxHashSet};

use crate::circuit::{Net, WireSegment};
use crate::steiner::SteinerEstimator;
use crate::Circuit;

/// Prefix of the synthetic Steiner point names
const STEINER_POINT_PREFIX: &str = "sp_";

/// Totals of a Steiner construction pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SteinerSummary {
    /// Total Steiner wirelength, in microns
    pub wirelength: f64,
    /// Number of internal Steiner points named
    pub nb_steiner_points: usize,
    /// Longest single segment of the clock net, in microns
    pub longest_clock_segment: f64,
}

/// Source of fresh Steiner point names for a construction pass
///
/// Names are `sp_<k>` with a counter that only increases, so a name is never given twice
/// during the pass. Names already used by a pin of the circuit are skipped.
#[derive(Clone, Debug, Default)]
pub struct NamingContext {
    counter: usize,
    nb_names: usize,
}

impl NamingContext {
    /// Create a new naming context
    pub fn new() -> NamingContext {
        NamingContext::default()
    }

    /// Number of names given so far
    pub fn nb_names(&self) -> usize {
        self.nb_names
    }

    /// Obtain a new Steiner point name
    pub fn fresh(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.counter += 1;
            let name = format!("{}{}", STEINER_POINT_PREFIX, self.counter);
            if !is_taken(&name) {
                self.nb_names += 1;
                return name;
            }
        }
    }
}

/// Classification of a tree edge after its endpoints have been named
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeCase {
    /// Endpoints have different names
    Distinct(String, String),
    /// Endpoints share a name, but another pin lies at the same location and takes its place
    CoincidentRecoverable(String, String),
    /// Endpoints denote the same node; the edge is dropped
    CoincidentUnrecoverable,
}

impl EdgeCase {
    /// Wire segment to emit, if any
    pub fn into_segment(self, length: f64) -> Option<WireSegment> {
        match self {
            EdgeCase::Distinct(a, b) | EdgeCase::CoincidentRecoverable(a, b) => {
                Some(WireSegment::new(a, b, length))
            }
            EdgeCase::CoincidentUnrecoverable => None,
        }
    }
}

/// Decide what to do with an edge between two named nodes
///
/// When both ends resolve to the same name, `candidates` (the sinks of the net with their
/// grid locations) are searched for another pin at `location` whose pairing with the first
/// name has not been emitted yet.
pub fn classify_edge(
    first: String,
    second: String,
    location: (u32, u32),
    candidates: &[(&str, (u32, u32))],
    covered: &FxHashSet<(String, String)>,
) -> EdgeCase {
    if first != second {
        return EdgeCase::Distinct(first, second);
    }
    let substitute = candidates.iter().find(|(name, loc)| {
        *name != first && *loc == location && !covered.contains(&(first.clone(), name.to_string()))
    });
    match substitute {
        Some((name, _)) => EdgeCase::CoincidentRecoverable(first, name.to_string()),
        None => EdgeCase::CoincidentUnrecoverable,
    }
}

/// Interconnect of a single net
struct NetTopology {
    segments: Vec<WireSegment>,
    length: f64,
    longest_segment: f64,
}

/// Builds the wire segments of every net from a Steiner estimator
///
/// ```
/// # use placeval::circuit::generators::testcases;
/// use placeval::steiner::{RectilinearSteiner, SteinerBuilder};
/// let mut ckt = testcases::two_pin((0.0, 0.0), (1000.0, 0.0));
/// let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
/// assert_eq!(summary.wirelength, 10.0);
/// ```
pub struct SteinerBuilder<'a> {
    estimator: &'a dyn SteinerEstimator,
    accuracy: usize,
    progress: bool,
}

impl<'a> SteinerBuilder<'a> {
    /// Create a builder using the given estimator and accuracy
    pub fn new(estimator: &'a dyn SteinerEstimator, accuracy: usize) -> SteinerBuilder<'a> {
        SteinerBuilder {
            estimator,
            accuracy,
            progress: false,
        }
    }

    /// Show a progress bar over the nets
    pub fn with_progress(mut self, progress: bool) -> SteinerBuilder<'a> {
        self.progress = progress;
        self
    }

    /// Rebuild the wire segments of all nets from the current pin locations
    ///
    /// Pin locations are expected to be up to date.
    pub fn build(&self, circuit: &mut Circuit) -> SteinerSummary {
        let mut naming = NamingContext::new();
        let mut total = 0.0;
        let mut longest_clock = 0.0f64;
        let mut progress = tqdm!(total = circuit.nb_nets(), disable = !self.progress);
        progress.set_description("Steiner trees");
        for i in 0..circuit.nb_nets() {
            let net = circuit.net(i);
            let topo = self.build_net(circuit, net, &mut naming);
            total += topo.length;
            if circuit.is_clock_net(net) {
                longest_clock = longest_clock.max(topo.longest_segment);
            }
            circuit.net_mut(i).segments = topo.segments;
            progress.update(1).ok();
        }
        let d2m = circuit.dist2microns();
        let ret = SteinerSummary {
            wirelength: total / d2m,
            nb_steiner_points: naming.nb_names(),
            longest_clock_segment: longest_clock / d2m,
        };
        info!(
            "Total {} internal Steiner points are found",
            ret.nb_steiner_points
        );
        info!(
            "Longest clock wire segment: {} um",
            ret.longest_clock_segment
        );
        ret
    }

    fn build_net(&self, circuit: &Circuit, net: &Net, naming: &mut NamingContext) -> NetTopology {
        if net.is_degenerate() {
            return NetTopology {
                segments: Vec::new(),
                length: 0.0,
                longest_segment: 0.0,
            };
        }
        let source = circuit.pin(net.source);
        if net.nb_terminals() == 2 {
            let sink = circuit.pin(net.sinks[0]);
            let length = (source.x - sink.x).abs() + (source.y - sink.y).abs();
            return NetTopology {
                segments: vec![WireSegment::new(&source.name, &sink.name, length)],
                length,
                longest_segment: length,
            };
        }

        // Terminal locations; a sink overrides the name of a previous terminal at the same place
        let mut x = Vec::with_capacity(net.nb_terminals());
        let mut y = Vec::with_capacity(net.nb_terminals());
        let mut names: FxHashMap<(u32, u32), String> = FxHashMap::default();
        let mut candidates = Vec::with_capacity(net.sinks.len());
        for p in std::iter::once(net.source).chain(net.sinks.iter().copied()) {
            let pin = circuit.pin(p);
            let loc = pin.grid_location();
            x.push(loc.0);
            y.push(loc.1);
            names.insert(loc, pin.name.clone());
            if p != net.source {
                candidates.push((pin.name.as_str(), loc));
            }
        }

        let tree = self.estimator.estimate(&x, &y, self.accuracy);
        let mut ret = NetTopology {
            segments: Vec::new(),
            length: 0.0,
            longest_segment: 0.0,
        };
        let mut covered = FxHashSet::default();
        for (j, n) in tree.edges() {
            let length = tree.edge_length(j, n) as f64;
            ret.length += length;
            ret.longest_segment = ret.longest_segment.max(length);
            let (bj, bn) = (tree.branches[j], tree.branches[n]);
            let mut name_of = |loc: (u32, u32)| -> String {
                names
                    .entry(loc)
                    .or_insert_with(|| naming.fresh(|s| circuit.find_pin(s).is_some()))
                    .clone()
            };
            let first = name_of((bj.x, bj.y));
            let second = name_of((bn.x, bn.y));
            let case = classify_edge(first, second, (bj.x, bj.y), &candidates, &covered);
            let pair = match &case {
                EdgeCase::Distinct(a, b) | EdgeCase::CoincidentRecoverable(a, b) => {
                    (a.clone(), b.clone())
                }
                EdgeCase::CoincidentUnrecoverable => continue,
            };
            covered.insert(pair);
            ret.segments.extend(case.into_segment(length));
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use fxhash::FxHashSet;

    use super::{classify_edge, EdgeCase, NamingContext, SteinerBuilder};
    use crate::circuit::generators::{random, testcases};
    use crate::circuit::PinDirection;
    use crate::geometry::Rect;
    use crate::steiner::RectilinearSteiner;
    use crate::Circuit;

    #[test]
    fn test_two_pin_length() {
        for (from, to) in [
            ((0.0, 0.0), (1000.0, 0.0)),
            ((12.5, 40.0), (3.0, 7.25)),
            ((500.0, 500.0), (500.0, 500.0)),
        ] {
            let mut ckt = testcases::two_pin(from, to);
            let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
            let expected = (from.0 - to.0).abs() + (from.1 - to.1).abs();
            let net = ckt.net(0);
            assert_eq!(net.segments.len(), 1);
            assert_eq!(net.segments[0].length, expected);
            assert_eq!(net.segments[0].from, "a");
            assert_eq!(net.segments[0].to, "b");
            assert_eq!(summary.wirelength, expected / 100.0);
            assert_eq!(summary.nb_steiner_points, 0);
        }
    }

    #[test]
    fn test_classify() {
        let mut covered = FxHashSet::default();
        let candidates = [("a", (0, 0)), ("b", (5, 5)), ("c", (5, 5))];
        assert_eq!(
            classify_edge("x".into(), "y".into(), (0, 0), &candidates, &covered),
            EdgeCase::Distinct("x".into(), "y".into())
        );
        assert_eq!(
            classify_edge("c".into(), "c".into(), (5, 5), &candidates, &covered),
            EdgeCase::CoincidentRecoverable("c".into(), "b".into())
        );
        covered.insert(("c".to_string(), "b".to_string()));
        assert_eq!(
            classify_edge("c".into(), "c".into(), (5, 5), &candidates, &covered),
            EdgeCase::CoincidentUnrecoverable
        );
        assert_eq!(
            classify_edge("a".into(), "a".into(), (0, 0), &candidates, &covered),
            EdgeCase::CoincidentUnrecoverable
        );
        assert!(EdgeCase::CoincidentUnrecoverable.into_segment(1.0).is_none());
    }

    #[test]
    fn test_naming_skips_pins() {
        let mut naming = NamingContext::new();
        assert_eq!(naming.fresh(|_| false), "sp_1");
        assert_eq!(naming.fresh(|s| s == "sp_2"), "sp_3");
        assert_eq!(naming.nb_names(), 2);
    }

    /// A net with three sinks around a source, requiring one Steiner point
    fn star() -> Circuit {
        let mut ckt = Circuit::new(Rect::new(0.0, 0.0, 100.0, 100.0), 10.0, 10.0);
        let lib = ckt.add_lib_cell("buf", &[("a", PinDirection::Input)]);
        let src = ckt.add_input("src", (0.0, 0.0));
        let mut sinks = Vec::new();
        for (i, loc) in [(10.0, 0.0), (5.0, 5.0)].iter().enumerate() {
            let c = ckt.add_cell(&format!("u{}", i), lib, *loc, (1.0, 1.0), true);
            sinks.push(ckt.add_pin(c, "a", (0.0, 0.0)));
        }
        ckt.add_net("n", src, &sinks);
        ckt.update_pin_locations();
        ckt
    }

    #[test]
    fn test_steiner_point() {
        let mut ckt = star();
        let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        assert_eq!(summary.nb_steiner_points, 1);
        assert_eq!(summary.wirelength, 1.5);
        let net = ckt.net(0);
        assert_eq!(net.segments.len(), 3);
        assert_eq!(net.wirelength(), 15.0);
        assert!(net.segments.iter().all(|s| s.from != s.to));
        assert!(net
            .segments
            .iter()
            .any(|s| s.from == "sp_1" || s.to == "sp_1"));
    }

    #[test]
    fn test_coincident_pins() {
        let mut ckt = Circuit::new(Rect::new(0.0, 0.0, 100.0, 100.0), 10.0, 1.0);
        let lib = ckt.add_lib_cell("buf", &[("a", PinDirection::Input)]);
        let src = ckt.add_input("src", (0.0, 0.0));
        let mut sinks = Vec::new();
        for (i, loc) in [(20.0, 0.0), (20.0, 0.0)].iter().enumerate() {
            let c = ckt.add_cell(&format!("u{}", i), lib, *loc, (1.0, 1.0), true);
            sinks.push(ckt.add_pin(c, "a", (0.0, 0.0)));
        }
        ckt.add_net("n", src, &sinks);
        ckt.update_pin_locations();
        let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
        assert_eq!(summary.wirelength, 20.0);
        let net = ckt.net(0);
        // Both stacked sinks are connected, through a zero-length segment
        assert_eq!(net.segments.len(), 2);
        assert!(net.segments.iter().any(|s| s.length == 0.0));
        for name in ["u0/a", "u1/a", "src"] {
            assert!(net.segments.iter().any(|s| s.from == name || s.to == name));
        }
    }

    #[test]
    fn test_random_circuits() {
        for seed in [1, 2] {
            let mut ckt = random::placement(200, seed);
            let summary = SteinerBuilder::new(&RectilinearSteiner, 3).build(&mut ckt);
            let total: f64 = ckt.nets().iter().map(|n| n.wirelength()).sum();
            assert!(summary.wirelength > 0.0);
            assert!(total / ckt.dist2microns() <= summary.wirelength + 1e-6);
            assert!(summary.longest_clock_segment > 0.0);
            for net in ckt.nets() {
                assert!(!net.segments.is_empty() || net.is_degenerate());
                assert!(net.segments.iter().all(|s| s.length >= 0.0));
            }
        }
    }
}
