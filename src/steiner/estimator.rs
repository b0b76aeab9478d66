/// A node of a Steiner tree
///
/// Terminals come first, in the order they were given to the estimator, followed by Steiner
/// points. Each node links to its parent; the root links to itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    /// x coordinate
    pub x: u32,
    /// y coordinate
    pub y: u32,
    /// Index of the parent node
    pub n: usize,
}

/// A rectilinear Steiner tree, as a list of branches
#[derive(Clone, Debug, Default)]
pub struct SteinerTree {
    /// Number of terminals
    pub deg: usize,
    /// Terminals then Steiner points
    pub branches: Vec<Branch>,
}

impl SteinerTree {
    /// Edges of the tree, as pairs of branch indices
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.branches
            .iter()
            .enumerate()
            .filter(|(j, b)| *j != b.n)
            .map(|(j, b)| (j, b.n))
    }

    /// Manhattan length of the edge between two branches
    pub fn edge_length(&self, i: usize, j: usize) -> u64 {
        let (a, b) = (&self.branches[i], &self.branches[j]);
        a.x.abs_diff(b.x) as u64 + a.y.abs_diff(b.y) as u64
    }

    /// Total length of the tree
    pub fn length(&self) -> u64 {
        self.edges().map(|(i, j)| self.edge_length(i, j)).sum()
    }

    /// Check that the tree is well-formed: every node reaches the root
    pub fn check(&self) {
        let nb = self.branches.len();
        assert!(nb >= self.deg);
        let roots = (0..nb).filter(|j| self.branches[*j].n == *j).count();
        if nb != 0 {
            assert_eq!(roots, 1, "A tree has a single root");
        }
        for start in 0..nb {
            let mut j = start;
            for _ in 0..=nb {
                j = self.branches[j].n;
            }
            assert_eq!(self.branches[j].n, j, "Node {} does not reach the root", start);
        }
    }
}

/// Rectilinear Steiner tree estimation
///
/// Implementors get the terminal coordinates and return a tree connecting them, possibly
/// through additional Steiner points. Higher accuracy trades runtime for shorter trees.
pub trait SteinerEstimator {
    /// Build a tree connecting the points; `x` and `y` have the same length
    fn estimate(&self, x: &[u32], y: &[u32], accuracy: usize) -> SteinerTree;
}
