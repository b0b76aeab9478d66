//! In-process rectilinear Steiner tree heuristic
//!
//! The tree starts as a rectilinear minimum spanning tree. Each pass then looks at every
//! pair of edges sharing a node, and reroutes them through the median point of their three
//! endpoints when this shortens the tree. The accuracy is the maximum number of passes.

use std::collections::VecDeque;

use itertools::Itertools;

use crate::steiner::{Branch, SteinerEstimator, SteinerTree};

type Point = (u32, u32);

fn dist(a: Point, b: Point) -> i64 {
    a.0.abs_diff(b.0) as i64 + a.1.abs_diff(b.1) as i64
}

fn median(a: u32, b: u32, c: u32) -> u32 {
    a.max(b).min(a.min(b).max(c))
}

/// Spanning tree followed by median Steiner point insertion
#[derive(Clone, Copy, Debug, Default)]
pub struct RectilinearSteiner;

/// Working state of the heuristic: points and adjacency lists
struct Topology {
    points: Vec<Point>,
    adj: Vec<Vec<usize>>,
}

/// A local improvement around a node
struct Move {
    node: usize,
    a: usize,
    b: usize,
    median: Point,
    gain: i64,
}

impl Topology {
    /// Prim's algorithm on the Manhattan distance
    fn spanning_tree(points: Vec<Point>) -> Topology {
        let nb = points.len();
        let mut adj = vec![Vec::new(); nb];
        let mut in_tree = vec![false; nb];
        let mut best = vec![i64::MAX; nb];
        let mut parent = vec![0; nb];
        if nb != 0 {
            best[0] = 0;
        }
        for _ in 0..nb {
            let Some(v) = (0..nb).filter(|i| !in_tree[*i]).min_by_key(|i| best[*i]) else {
                break;
            };
            in_tree[v] = true;
            if v != 0 {
                adj[v].push(parent[v]);
                adj[parent[v]].push(v);
            }
            for u in 0..nb {
                if !in_tree[u] {
                    let d = dist(points[u], points[v]);
                    if d < best[u] {
                        best[u] = d;
                        parent[u] = v;
                    }
                }
            }
        }
        Topology { points, adj }
    }

    fn connect(&mut self, a: usize, b: usize) {
        self.adj[a].push(b);
        self.adj[b].push(a);
    }

    fn disconnect(&mut self, a: usize, b: usize) {
        self.adj[a].retain(|x| *x != b);
        self.adj[b].retain(|x| *x != a);
    }

    /// Best median rerouting around a node, if any improves the tree
    fn best_move(&self, v: usize) -> Option<Move> {
        let pv = self.points[v];
        let mut ret: Option<Move> = None;
        for (&a, &b) in self.adj[v].iter().tuple_combinations() {
            let (pa, pb) = (self.points[a], self.points[b]);
            let m = (median(pv.0, pa.0, pb.0), median(pv.1, pa.1, pb.1));
            let gain = dist(pv, pa) + dist(pv, pb) - (dist(pv, m) + dist(m, pa) + dist(m, pb));
            if gain <= 0 || ret.as_ref().is_some_and(|r| r.gain >= gain) {
                continue;
            }
            // Never stack a new point on an unrelated node
            if m != pa && m != pb && self.points.contains(&m) {
                continue;
            }
            ret = Some(Move {
                node: v,
                a,
                b,
                median: m,
                gain,
            });
        }
        ret
    }

    fn apply(&mut self, mv: Move) {
        let Move { node, a, b, median, .. } = mv;
        if median == self.points[a] {
            self.disconnect(node, b);
            self.connect(a, b);
        } else if median == self.points[b] {
            self.disconnect(node, a);
            self.connect(b, a);
        } else {
            let s = self.points.len();
            self.points.push(median);
            self.adj.push(Vec::new());
            self.disconnect(node, a);
            self.disconnect(node, b);
            self.connect(node, s);
            self.connect(s, a);
            self.connect(s, b);
        }
    }

    /// Run improvement passes; return the number of moves applied
    fn improve(&mut self, nb_passes: usize) -> usize {
        let mut nb_moves = 0;
        for _ in 0..nb_passes {
            let mut improved = false;
            let mut v = 0;
            while v < self.points.len() {
                if let Some(mv) = self.best_move(v) {
                    self.apply(mv);
                    nb_moves += 1;
                    improved = true;
                }
                v += 1;
            }
            if !improved {
                break;
            }
        }
        nb_moves
    }

    /// Orient the tree from the first terminal
    fn into_tree(self, deg: usize) -> SteinerTree {
        let nb = self.points.len();
        let mut parent = vec![usize::MAX; nb];
        let mut queue = VecDeque::new();
        if nb != 0 {
            parent[0] = 0;
            queue.push_back(0);
        }
        while let Some(v) = queue.pop_front() {
            for &u in &self.adj[v] {
                if parent[u] == usize::MAX {
                    parent[u] = v;
                    queue.push_back(u);
                }
            }
        }
        let branches = self
            .points
            .iter()
            .zip(parent)
            .map(|(p, n)| Branch { x: p.0, y: p.1, n })
            .collect();
        SteinerTree { deg, branches }
    }
}

impl SteinerEstimator for RectilinearSteiner {
    fn estimate(&self, x: &[u32], y: &[u32], accuracy: usize) -> SteinerTree {
        assert_eq!(x.len(), y.len());
        let points = x.iter().copied().zip(y.iter().copied()).collect();
        let mut topo = Topology::spanning_tree(points);
        topo.improve(accuracy.max(1));
        topo.into_tree(x.len())
    }
}
