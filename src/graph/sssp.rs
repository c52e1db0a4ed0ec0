//! Single-source shortest paths on the constructed CSR.
//!
//! Label-correcting wavefront relaxation rather than a priority-queue
//! Dijkstra: each round relaxes every outgoing edge of the open
//! vertices in one bulk phase, reduces the candidates per destination,
//! and commits improvements. With non-negative weights the committed
//! distances match Dijkstra's; the `dijkstra_*` names are kept for API
//! compatibility with the original library.

use crate::bulk;
use crate::error::{GeomError, Result};
use crate::graph::Graph;
use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-vertex shortest-path state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SsspResult {
    /// Distance from the start vertex; `f32::INFINITY` while unreached
    pub shortest_distance: f32,
    /// Predecessor on the shortest path; `-1` while unreached
    pub prev_index: i32,
}

impl SsspResult {
    /// Unreached state: infinite distance, no predecessor
    #[inline]
    pub fn unreached() -> Self {
        Self {
            shortest_distance: f32::INFINITY,
            prev_index: -1,
        }
    }

    /// True once a finite distance has been committed
    #[inline]
    pub fn is_reached(&self) -> bool {
        self.prev_index >= 0
    }
}

impl Default for SsspResult {
    fn default() -> Self {
        Self::unreached()
    }
}

impl Graph {
    /// Shortest distances and predecessors from `start` to every vertex.
    ///
    /// Requires the constructed state; weights must be non-negative.
    ///
    /// # Panics
    /// Panics if `start` is not a valid vertex index.
    pub fn dijkstra_paths(&self, start: usize) -> Result<Vec<SsspResult>> {
        self.relax_to_fixpoint(start, None)
    }

    /// Like [`Graph::dijkstra_paths`] but stops as soon as no open
    /// vertex can still improve the distance of `end`.
    ///
    /// # Panics
    /// Panics if `start` or `end` is not a valid vertex index.
    pub fn dijkstra_paths_to(&self, start: usize, end: usize) -> Result<Vec<SsspResult>> {
        self.relax_to_fixpoint(start, Some(end))
    }

    /// Vertex sequence from `start` to `end`, inclusive.
    ///
    /// Empty when `end` is unreachable from `start`.
    pub fn dijkstra_path(&self, start: usize, end: usize) -> Result<Vec<usize>> {
        let results = self.dijkstra_paths_to(start, end)?;
        Ok(walk_predecessors(&results, start, end))
    }

    fn relax_to_fixpoint(&self, start: usize, end: Option<usize>) -> Result<Vec<SsspResult>> {
        if !self.is_constructed() {
            return Err(GeomError::NotConstructed);
        }
        let n = self.points.len();
        let m = self.lines.len();
        assert!(start < n, "start vertex {start} out of range ({n} vertices)");
        if let Some(t) = end {
            assert!(t < n, "end vertex {t} out of range ({n} vertices)");
        }

        // Permutation from src-sorted edge rows to dst-sorted positions,
        // plus CSR-style offsets over destinations. Stable sort keeps
        // the rows of one destination in source order, which is what
        // makes the min-reduce tie-break deterministic (first wins).
        let rows_by_dst = bulk::sort_permutation(m, |j| self.lines[j].dst);
        let sorted_dsts: Vec<u32> = rows_by_dst.iter().map(|&j| self.lines[j as usize].dst).collect();
        let dst_offsets = bulk::segment_offsets(&sorted_dsts, n);

        let mut results = vec![SsspResult::unreached(); n];
        results[start] = SsspResult {
            shortest_distance: 0.0,
            prev_index: start as i32,
        };
        let mut open = vec![false; n];
        open[start] = true;

        debug!("[Dijkstra] start={start} end={end:?} n={n} m={m}");

        let mut iterations = 0usize;
        while iterations < n {
            if !open.iter().any(|&f| f) {
                break;
            }
            // Targeted mode: stop once nothing open can still undercut
            // the committed distance of the target.
            if let Some(t) = end {
                let bound = results[t].shortest_distance;
                let improving = open
                    .par_iter()
                    .zip(results.par_iter())
                    .any(|(&f, r)| f && r.shortest_distance < bound);
                if !improving {
                    break;
                }
            }

            // Relax: one candidate per edge row, written at the row's
            // dst-sorted slot. Closed sources contribute unreached
            // sentinels, which the reduction ignores.
            let res_tmp: Vec<SsspResult> = (0..m)
                .into_par_iter()
                .map(|r| {
                    let j = rows_by_dst[r] as usize;
                    let u = self.lines[j].src as usize;
                    if open[u] {
                        SsspResult {
                            shortest_distance: results[u].shortest_distance
                                + self.edge_weights[j],
                            prev_index: u as i32,
                        }
                    } else {
                        SsspResult::unreached()
                    }
                })
                .collect();

            // Segmented min-reduce by destination. Strict `<` keeps the
            // first candidate of a tie.
            let res_tmp_s: Vec<SsspResult> = (0..n)
                .into_par_iter()
                .map(|v| {
                    let mut best = SsspResult::unreached();
                    for r in dst_offsets[v]..dst_offsets[v + 1] {
                        if res_tmp[r].shortest_distance < best.shortest_distance {
                            best = res_tmp[r];
                        }
                    }
                    best
                })
                .collect();

            // Commit improvements and reopen their vertices.
            let mut next_open = vec![false; n];
            results
                .par_iter_mut()
                .zip(res_tmp_s.par_iter())
                .zip(next_open.par_iter_mut())
                .for_each(|((current, candidate), flag)| {
                    if candidate.shortest_distance < current.shortest_distance {
                        *current = *candidate;
                        *flag = true;
                    }
                });
            open = next_open;
            iterations += 1;
        }

        trace!("[Dijkstra] converged after {iterations} iterations");
        Ok(results)
    }
}

/// Walk `prev_index` links from `end` back to `start`.
fn walk_predecessors(results: &[SsspResult], start: usize, end: usize) -> Vec<usize> {
    if !results[end].is_reached() {
        return Vec::new();
    }
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        let prev = results[current].prev_index;
        if prev < 0 || path.len() > results.len() {
            return Vec::new();
        }
        current = prev as usize;
        path.push(current);
    }
    path.reverse();
    path
}
