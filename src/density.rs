//! Placement density and ABU penalty
//!
//! The die is divided in square bins, several rows high. The utilization of a bin is the
//! area of movable cells it contains divided by its free space: the area covered by rows
//! and not occupied by fixed cells. The ABU (average bin utilization) metrics average the
//! most utilized bins, and their excess over the target utilization gives the penalty.
//!
//! ```
//! # use placeval::circuit::generators::random;
//! use placeval::density::DensityMap;
//! use placeval::params::Parameters;
//!
//! let ckt = random::placement(100, 1);
//! let params = Parameters::default();
//! let report = DensityMap::build(&ckt, &params).report(0.8, &params);
//! println!("ABU penalty: {}", report.penalty);
//! ```

use std::fmt;

use log::info;

use crate::geometry::Rect;
use crate::params::Parameters;
use crate::Circuit;

/// Fractions of the bins averaged by the ABU_1, ABU_2, ABU_5, ABU_10 and ABU_20 metrics
pub const ABU_FRACTIONS: [f64; 5] = [0.01, 0.02, 0.05, 0.10, 0.20];

/// A density bin
#[derive(Clone, Copy, Debug, Default)]
pub struct DensityBin {
    /// Bin boundary, clipped to the die
    pub rect: Rect,
    /// Area covered by rows, then minus the fixed area once utilization is computed
    pub free_space: f64,
    /// Area of fixed cells in the bin
    pub fixed_area: f64,
    /// Area of movable cells in the bin
    pub movable_area: f64,
}

impl DensityBin {
    /// Area of the bin
    pub fn area(&self) -> f64 {
        self.rect.area()
    }
}

/// Bin grid with the utilization of each bin
#[derive(Clone, Debug)]
pub struct DensityMap {
    die: Rect,
    bin_size: f64,
    nb_x: usize,
    nb_y: usize,
    bins: Vec<DensityBin>,
    utilization: Vec<f64>,
    nb_skipped: usize,
}

impl DensityMap {
    /// Compute the density map of a circuit
    pub fn build(circuit: &Circuit, params: &Parameters) -> DensityMap {
        let die = circuit.die();
        let bin_size = params.bin_dim * circuit.row_height();
        let nb_x = (die.width() / bin_size).ceil().max(0.0) as usize;
        let nb_y = (die.height() / bin_size).ceil().max(0.0) as usize;
        info!("numBins: {} ( {} x {} )", nb_x * nb_y, nb_x, nb_y);
        info!("bin dimension: {} x {}", bin_size, bin_size);

        let mut bins = Vec::with_capacity(nb_x * nb_y);
        for j in 0..nb_y {
            for k in 0..nb_x {
                let rect = Rect::from_size(
                    die.lx + k as f64 * bin_size,
                    die.ly + j as f64 * bin_size,
                    bin_size,
                    bin_size,
                );
                bins.push(DensityBin {
                    rect: rect.clip(&die),
                    ..Default::default()
                });
            }
        }
        let mut ret = DensityMap {
            die,
            bin_size,
            nb_x,
            nb_y,
            bins,
            utilization: Vec::new(),
            nb_skipped: 0,
        };

        // Free space from the rows; overlapping rows do not count twice
        for row in circuit.rows() {
            let r = Rect::new(
                row.origin_x,
                row.origin_y,
                row.end_x(),
                row.origin_y + circuit.row_height(),
            );
            for b in ret.covered_bins(&r) {
                let bin = &mut ret.bins[b];
                bin.free_space = (bin.free_space + bin.rect.overlap_area(&r)).min(bin.area());
            }
        }

        // Occupancy
        for cell in circuit.cells() {
            let r = Rect::from_size(cell.x, cell.y, cell.width, cell.height);
            for b in ret.covered_bins(&r) {
                let bin = &mut ret.bins[b];
                let common = bin.rect.overlap_area(&r);
                if cell.is_fixed {
                    bin.fixed_area += common;
                } else {
                    bin.movable_area += common;
                }
            }
        }

        // Utilization; slivers at the boundary and bins without enough free space are ignored
        let min_area = bin_size * bin_size * params.bin_area_threshold;
        ret.utilization = vec![0.0; ret.bins.len()];
        for (bin, util) in ret.bins.iter_mut().zip(ret.utilization.iter_mut()) {
            if bin.area() <= min_area {
                continue;
            }
            bin.free_space -= bin.fixed_area;
            if bin.free_space > params.free_space_threshold * bin.area() {
                *util = bin.movable_area / bin.free_space;
            } else {
                ret.nb_skipped += 1;
            }
        }
        ret
    }

    /// Indices of the bins a rectangle may overlap
    fn covered_bins(&self, r: &Rect) -> Vec<usize> {
        if self.bins.is_empty() {
            return Vec::new();
        }
        let index = |v: f64, origin: f64, nb: usize| -> i64 {
            (((v - origin) / self.bin_size).floor() as i64).clamp(-1, nb as i64)
        };
        let lcol = index(r.lx, self.die.lx, self.nb_x).max(0);
        let rcol = index(r.hx, self.die.lx, self.nb_x).min(self.nb_x as i64 - 1);
        let brow = index(r.ly, self.die.ly, self.nb_y).max(0);
        let trow = index(r.hy, self.die.ly, self.nb_y).min(self.nb_y as i64 - 1);
        let mut ret = Vec::new();
        for j in brow..=trow {
            for k in lcol..=rcol {
                ret.push(j as usize * self.nb_x + k as usize);
            }
        }
        ret
    }

    /// Number of bins
    pub fn nb_bins(&self) -> usize {
        self.bins.len()
    }

    /// Number of bins in x
    pub fn nb_x(&self) -> usize {
        self.nb_x
    }

    /// Number of bins in y
    pub fn nb_y(&self) -> usize {
        self.nb_y
    }

    /// Side of a full bin
    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// Number of bins excluded because they have too little free space
    pub fn nb_skipped(&self) -> usize {
        self.nb_skipped
    }

    /// Bin at column k and row j
    pub fn bin(&self, k: usize, j: usize) -> &DensityBin {
        &self.bins[j * self.nb_x + k]
    }

    /// Utilization of the bin at column k and row j; zero for excluded bins
    pub fn utilization(&self, k: usize, j: usize) -> f64 {
        self.utilization[j * self.nb_x + k]
    }

    /// Average utilization of the given fraction of the bins, most utilized first
    ///
    /// The fraction applies to the bins that are not skipped. If it amounts to no bin at all,
    /// the highest utilization is returned.
    pub fn abu(&self, fraction: f64) -> f64 {
        let mut sorted = self.utilization.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        abu_of_sorted(&sorted, self.nb_bins() - self.nb_skipped, fraction)
    }

    /// Compute the ABU metrics and the density penalty for a target utilization
    pub fn report(&self, target_util: f64, params: &Parameters) -> DensityReport {
        assert!(target_util > 0.0, "Target utilization must be positive");
        let mut sorted = self.utilization.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let nb_counted = self.nb_bins() - self.nb_skipped;
        let abu = ABU_FRACTIONS.map(|f| abu_of_sorted(&sorted, nb_counted, f));
        let overflow = abu.map(|a| (a / target_util - 1.0).max(0.0));
        let weights = &params.abu_weights;
        let penalty = weights
            .iter()
            .zip(&overflow[1..])
            .map(|(w, o)| w * o)
            .sum::<f64>()
            / weights.iter().sum::<f64>();
        info!("target util: {}", target_util);
        info!(
            "ABU_2,5,10,20: {}, {}, {}, {}",
            abu[1], abu[2], abu[3], abu[4]
        );
        DensityReport {
            target_util,
            abu,
            overflow,
            penalty,
            nb_bins: self.nb_bins(),
            nb_skipped: self.nb_skipped,
        }
    }
}

/// Average of the top bins, with utilizations sorted in decreasing order
fn abu_of_sorted(sorted: &[f64], nb_counted: usize, fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let nb = (fraction * nb_counted as f64).floor() as usize;
    if nb == 0 {
        sorted[0]
    } else {
        sorted[..nb].iter().sum::<f64>() / nb as f64
    }
}

/// ABU metrics and density penalty
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityReport {
    /// Target utilization
    pub target_util: f64,
    /// ABU_1, ABU_2, ABU_5, ABU_10 and ABU_20
    pub abu: [f64; 5],
    /// Relative excess of each ABU over the target utilization
    pub overflow: [f64; 5],
    /// Weighted average of the overflows of ABU_2 to ABU_20
    pub penalty: f64,
    /// Number of bins
    pub nb_bins: usize,
    /// Number of bins skipped for lack of free space
    pub nb_skipped: usize,
}

impl fmt::Display for DensityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  bins            : {} ({} skipped)",
            self.nb_bins, self.nb_skipped
        )?;
        writeln!(f, "  target util     : {}", self.target_util)?;
        writeln!(
            f,
            "  ABU_2,5,10,20   : {}, {}, {}, {}",
            self.abu[1], self.abu[2], self.abu[3], self.abu[4]
        )?;
        writeln!(f, "  ABU penalty     : {}", self.penalty)?;
        fmt::Result::Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{abu_of_sorted, DensityMap};
    use crate::circuit::generators::random;
    use crate::circuit::{PinDirection, Row};
    use crate::geometry::Rect;
    use crate::params::Parameters;
    use crate::Circuit;

    /// A die of the given width, one row of height 10, bins of 10x10
    fn strip(width: f64) -> (Circuit, Parameters) {
        let mut ckt = Circuit::new(Rect::new(0.0, 0.0, width, 10.0), 10.0, 1.0);
        ckt.add_lib_cell("blk", &[("a", PinDirection::Input)]);
        ckt.add_row(Row {
            origin_x: 0.0,
            origin_y: 0.0,
            step_x: 1.0,
            nb_sites: width as usize,
        });
        let mut params = Parameters::default();
        params.bin_dim = 1.0;
        (ckt, params)
    }

    #[test]
    fn test_single_bin() {
        let (mut ckt, params) = strip(10.0);
        ckt.add_cell("c", 0, (0.0, 0.0), (5.0, 10.0), false);
        let map = DensityMap::build(&ckt, &params);
        assert_eq!(map.nb_bins(), 1);
        assert_eq!(map.bin(0, 0).free_space, 100.0);
        assert_eq!(map.utilization(0, 0), 0.5);
        let report = map.report(1.0, &params);
        assert_eq!(report.abu, [0.5; 5]);
        assert_eq!(report.penalty, 0.0);
        let report = map.report(0.25, &params);
        assert_eq!(report.overflow[1], 1.0);
        assert_eq!(report.penalty, 1.0);
    }

    #[test]
    fn test_overlapping_rows() {
        let (mut ckt, params) = strip(10.0);
        ckt.add_row(Row {
            origin_x: 0.0,
            origin_y: 0.0,
            step_x: 1.0,
            nb_sites: 10,
        });
        let map = DensityMap::build(&ckt, &params);
        assert_eq!(map.bin(0, 0).free_space, 100.0);
    }

    #[test]
    fn test_clipped_bins() {
        let (mut ckt, params) = strip(25.0);
        ckt.add_cell("c", 0, (20.0, 0.0), (5.0, 10.0), false);
        let map = DensityMap::build(&ckt, &params);
        assert_eq!((map.nb_x(), map.nb_y()), (3, 1));
        assert_eq!(map.bin(2, 0).rect.hx, 25.0);
        assert_eq!(map.bin(2, 0).area(), 50.0);
        assert_eq!(map.utilization(2, 0), 1.0);

        // Slivers are ignored without being skipped
        let (mut ckt, params) = strip(21.0);
        ckt.add_cell("c", 0, (20.0, 0.0), (1.0, 10.0), false);
        let map = DensityMap::build(&ckt, &params);
        assert_eq!(map.nb_bins(), 3);
        assert_eq!(map.utilization(2, 0), 0.0);
        assert_eq!(map.nb_skipped(), 0);
    }

    #[test]
    fn test_skipped_bins() {
        let (mut ckt, params) = strip(30.0);
        ckt.add_cell("blk", 0, (0.0, 0.0), (10.0, 10.0), true);
        ckt.add_cell("c", 0, (10.0, 0.0), (2.0, 10.0), false);
        let map = DensityMap::build(&ckt, &params);
        assert_eq!(map.nb_skipped(), 1);
        assert_eq!(map.utilization(0, 0), 0.0);
        assert_eq!(map.utilization(1, 0), 0.2);
        // Two bins counted, no fraction reaches a whole bin: the maximum is used
        assert_eq!(map.abu(0.2), 0.2);
    }

    #[test]
    fn test_abu_of_sorted() {
        let sorted: Vec<f64> = (0..100).rev().map(|i| i as f64 / 100.0).collect();
        assert_eq!(abu_of_sorted(&sorted, 100, 0.01), 0.99);
        assert!((abu_of_sorted(&sorted, 100, 0.02) - 0.985).abs() < 1e-12);
        assert!((abu_of_sorted(&sorted, 50, 0.02) - 0.99).abs() < 1e-12);
        assert_eq!(abu_of_sorted(&[], 0, 0.02), 0.0);
    }

    #[test]
    fn test_monotonic() {
        for seed in [1, 2, 3] {
            let ckt = random::placement(2000, seed);
            let params = Parameters::default();
            let report = DensityMap::build(&ckt, &params).report(0.7, &params);
            for i in 1..5 {
                assert!(report.abu[i - 1] >= report.abu[i]);
            }
            assert!(report.penalty >= 0.0);
        }
    }

    #[test]
    fn test_no_movable_area() {
        let (mut ckt, params) = strip(40.0);
        ckt.add_cell("blk", 0, (0.0, 0.0), (10.0, 5.0), true);
        let map = DensityMap::build(&ckt, &params);
        for target in [0.01, 0.5, 1.0] {
            assert_eq!(map.report(target, &params).penalty, 0.0);
        }
    }
}
