//! Weighted graph over 3D vertices with CSR adjacency.
//!
//! The edge list and its side arrays (weights, colors) form one logical
//! tuple sequence: every mutator permutes, extends and truncates them
//! together, then rebuilds the CSR offsets with [`Graph::construct`].
//! Queries that need adjacency ([`Graph::dijkstra_paths`] and friends)
//! require the constructed state and fail with
//! [`GeomError::NotConstructed`](crate::GeomError::NotConstructed)
//! otherwise.

mod sssp;

pub use sssp::SsspResult;

use crate::bulk;
use crate::core::{Color, Point3, TriangleMesh};
use crate::error::{GeomError, Result};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed edge as a pair of vertex indices.
///
/// The derived ordering is lexicographic (source, then destination),
/// which is the canonical edge-list order after [`Graph::construct`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Edge {
    /// Source vertex index
    pub src: u32,
    /// Destination vertex index
    pub dst: u32,
}

impl Edge {
    /// Create an edge from source to destination
    #[inline]
    pub fn new(src: u32, dst: u32) -> Self {
        Self { src, dst }
    }

    /// The same edge with endpoints swapped
    #[inline]
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

/// Weighted graph embedded in 3D.
///
/// Undirected graphs materialize every logical edge twice, as `(a, b)`
/// and `(b, a)` with equal weight; the mutators maintain that pairing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Graph {
    points: Vec<Point3>,
    lines: Vec<Edge>,
    edge_weights: Vec<f32>,
    /// Per-edge colors; empty means the attribute is absent
    edge_colors: Vec<Color>,
    /// Per-vertex colors; empty means the attribute is absent
    node_colors: Vec<Color>,
    /// CSR offsets: edges with source `v` occupy
    /// `edge_index_offsets[v]..edge_index_offsets[v + 1]`
    edge_index_offsets: Vec<usize>,
    is_directed: bool,
}

impl Graph {
    /// Create an empty undirected graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directed graph
    pub fn new_directed() -> Self {
        Self {
            is_directed: true,
            ..Self::default()
        }
    }

    /// Create an undirected graph over the given vertices.
    ///
    /// No edges are added and no CSR is built; call the edge mutators
    /// (which construct implicitly) or [`Graph::construct`] afterwards.
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Create a directed graph over the given vertices.
    pub fn from_points_directed(points: Vec<Point3>) -> Self {
        Self {
            points,
            is_directed: true,
            ..Self::default()
        }
    }

    /// Build an undirected graph from the edges of a triangle mesh.
    ///
    /// Vertices are the mesh vertices; each triangle contributes its
    /// three edges, canonicalized and deduplicated before insertion so
    /// shared triangle edges appear once per direction.
    pub fn create_from_triangle_mesh(mesh: &TriangleMesh) -> Result<Self> {
        let mut edges: Vec<Edge> = Vec::with_capacity(mesh.triangles.len() * 3);
        for tri in &mesh.triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.push(if a <= b { Edge::new(a, b) } else { Edge::new(b, a) });
            }
        }
        edges.par_sort_unstable();
        edges.dedup();

        let mut graph = Self::from_points(mesh.vertices.clone());
        graph.add_edges(&edges, &[])?;
        Ok(graph)
    }

    // === Accessors ===

    /// Vertex positions
    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Edge list (sorted lexicographically once constructed)
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.lines
    }

    /// Per-edge weights, row-aligned with [`Graph::edges`]
    #[inline]
    pub fn edge_weights(&self) -> &[f32] {
        &self.edge_weights
    }

    /// Replace the weight array wholesale.
    ///
    /// A length mismatch leaves the graph unconstructed until the next
    /// [`Graph::construct`], which resets weights to 1.0.
    pub fn set_edge_weights(&mut self, weights: Vec<f32>) {
        self.edge_weights = weights;
    }

    /// CSR offsets (length `vertex_count() + 1` once constructed)
    #[inline]
    pub fn edge_index_offsets(&self) -> &[usize] {
        &self.edge_index_offsets
    }

    /// Replace the CSR offsets wholesale (trusted, no validation)
    pub fn set_edge_index_offsets(&mut self, offsets: Vec<usize>) {
        self.edge_index_offsets = offsets;
    }

    /// Per-edge colors; empty when the attribute was never painted
    #[inline]
    pub fn edge_colors(&self) -> &[Color] {
        &self.edge_colors
    }

    /// Per-vertex colors; empty when the attribute was never painted
    #[inline]
    pub fn node_colors(&self) -> &[Color] {
        &self.node_colors
    }

    /// True when edge colors are materialized
    #[inline]
    pub fn has_edge_colors(&self) -> bool {
        !self.edge_colors.is_empty()
    }

    /// True when node colors are materialized
    #[inline]
    pub fn has_node_colors(&self) -> bool {
        !self.node_colors.is_empty()
    }

    /// Whether reverse pairs are maintained by the mutators
    #[inline]
    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    /// True when the CSR state matches the current edge list
    pub fn is_constructed(&self) -> bool {
        !self.lines.is_empty()
            && self.edge_weights.len() == self.lines.len()
            && self.edge_index_offsets.len() == self.points.len() + 1
            && self.edge_index_offsets.first() == Some(&0)
            && self.edge_index_offsets.last() == Some(&self.lines.len())
    }

    // === Construction ===

    /// Sort the edge list and rebuild the CSR offsets.
    ///
    /// Idempotent; every structural mutator ends by calling this. Side
    /// arrays are permuted by the same stable permutation as the edge
    /// list, so rows stay aligned across equal keys. Missing weights are
    /// filled with 1.0.
    pub fn construct(&mut self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(GeomError::EmptyGraph);
        }
        let n = self.points.len();
        debug_assert!(
            self.lines.iter().all(|e| (e.src as usize) < n && (e.dst as usize) < n),
            "edge references vertex beyond {n}"
        );

        let perm = bulk::sort_permutation(self.lines.len(), |i| self.lines[i]);
        self.lines = bulk::gather(&perm, &self.lines);

        if self.edge_weights.len() == self.lines.len() {
            self.edge_weights = bulk::gather(&perm, &self.edge_weights);
        } else {
            self.edge_weights = vec![1.0; self.lines.len()];
        }
        if !self.edge_colors.is_empty() {
            if self.edge_colors.len() == self.lines.len() {
                self.edge_colors = bulk::gather(&perm, &self.edge_colors);
            } else {
                self.edge_colors = vec![Color::WHITE; self.lines.len()];
            }
        }

        let sources: Vec<u32> = self.lines.iter().map(|e| e.src).collect();
        self.edge_index_offsets = bulk::segment_offsets(&sources, n);

        debug!(
            "[Graph] constructed: {} vertices, {} edge rows",
            n,
            self.lines.len()
        );
        Ok(())
    }

    // === Mutators ===

    /// Append one edge (and its reverse when undirected), then rebuild.
    pub fn add_edge(&mut self, edge: Edge, weight: f32) -> Result<()> {
        self.align_side_arrays();
        self.push_row(edge, weight);
        if !self.is_directed {
            self.push_row(edge.reversed(), weight);
        }
        self.construct()
    }

    /// Append a batch of edges, then rebuild.
    ///
    /// An empty `weights` slice means every new edge weighs 1.0; a
    /// non-empty slice must match `edges` in length.
    pub fn add_edges(&mut self, edges: &[Edge], weights: &[f32]) -> Result<()> {
        if !weights.is_empty() && weights.len() != edges.len() {
            return Err(GeomError::SizeMismatch {
                expected: edges.len(),
                actual: weights.len(),
            });
        }
        self.align_side_arrays();
        for (i, &edge) in edges.iter().enumerate() {
            let w = if weights.is_empty() { 1.0 } else { weights[i] };
            self.push_row(edge, w);
            if !self.is_directed {
                self.push_row(edge.reversed(), w);
            }
        }
        self.construct()
    }

    /// Remove every occurrence of one edge (and its reverse when
    /// undirected), then rebuild. Removing an absent edge is a no-op
    /// that still reconstructs.
    pub fn remove_edge(&mut self, edge: Edge) -> Result<()> {
        self.remove_edges(std::slice::from_ref(&edge))
    }

    /// Remove a batch of edges as a set difference against the rows.
    ///
    /// Rows of the edge list and all side arrays are dropped together.
    /// Removing the last row fails with `EmptyGraph` and leaves the
    /// graph unchanged.
    pub fn remove_edges(&mut self, edges: &[Edge]) -> Result<()> {
        if self.lines.is_empty() {
            return Err(GeomError::EmptyGraph);
        }

        let removal = self.removal_set(edges);
        let keep: Vec<bool> = self
            .lines
            .par_iter()
            .map(|e| removal.binary_search(e).is_err())
            .collect();

        if keep.iter().all(|&k| !k) {
            return Err(GeomError::EmptyGraph);
        }

        self.align_side_arrays();
        self.lines = compact(&self.lines, &keep);
        self.edge_weights = compact(&self.edge_weights, &keep);
        if !self.edge_colors.is_empty() {
            self.edge_colors = compact(&self.edge_colors, &keep);
        }
        self.construct()
    }

    /// Paint one edge (and its reverse when undirected).
    pub fn paint_edge_color(&mut self, edge: Edge, color: Color) {
        self.paint_edges_color(std::slice::from_ref(&edge), color);
    }

    /// Paint every row matching one of `edges` (reverse rows too when
    /// undirected), materializing an all-white color array on first use.
    /// Structure is untouched; no rebuild happens.
    pub fn paint_edges_color(&mut self, edges: &[Edge], color: Color) {
        if self.edge_colors.len() != self.lines.len() {
            self.edge_colors = vec![Color::WHITE; self.lines.len()];
        }
        let targets = self.removal_set(edges);
        self.edge_colors
            .par_iter_mut()
            .zip(self.lines.par_iter())
            .for_each(|(c, e)| {
                if targets.binary_search(e).is_ok() {
                    *c = color;
                }
            });
    }

    /// Paint one vertex.
    pub fn paint_node_color(&mut self, node: usize, color: Color) {
        self.paint_nodes_color(std::slice::from_ref(&node), color);
    }

    /// Paint the listed vertices, materializing an all-white color
    /// array on first use. Out-of-range indices are skipped.
    pub fn paint_nodes_color(&mut self, nodes: &[usize], color: Color) {
        if self.node_colors.len() != self.points.len() {
            self.node_colors = vec![Color::WHITE; self.points.len()];
        }
        for &i in nodes {
            if i < self.node_colors.len() {
                self.node_colors[i] = color;
            }
        }
    }

    /// Set each edge weight to the Euclidean distance between its
    /// endpoints. Symmetric rows get symmetric weights by construction.
    pub fn set_edge_weights_from_distance(&mut self) {
        let points = &self.points;
        self.edge_weights = self
            .lines
            .par_iter()
            .map(|e| points[e.src as usize].distance(&points[e.dst as usize]))
            .collect();
    }

    // === Internal helpers ===

    /// Push one row across the edge list and its side arrays.
    fn push_row(&mut self, edge: Edge, weight: f32) {
        self.lines.push(edge);
        self.edge_weights.push(weight);
        if !self.edge_colors.is_empty() {
            self.edge_colors.push(Color::WHITE);
        }
    }

    /// Re-establish side-array alignment before structural edits.
    ///
    /// Raw setters can leave weights or colors at a stale length; the
    /// defaults (1.0, white) fill the gap so subsequent pushes and
    /// compactions stay row-aligned.
    fn align_side_arrays(&mut self) {
        if self.edge_weights.len() != self.lines.len() {
            self.edge_weights.resize(self.lines.len(), 1.0);
        }
        if !self.edge_colors.is_empty() && self.edge_colors.len() != self.lines.len() {
            self.edge_colors.resize(self.lines.len(), Color::WHITE);
        }
    }

    /// Sorted, deduplicated match set for removal and painting,
    /// including reverse pairs when undirected.
    fn removal_set(&self, edges: &[Edge]) -> Vec<Edge> {
        let mut set: Vec<Edge> = edges.to_vec();
        if !self.is_directed {
            set.extend(edges.iter().map(|e| e.reversed()));
        }
        set.sort_unstable();
        set.dedup();
        set
    }
}

/// Keep the rows whose mask entry is true.
fn compact<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|&(_, &k)| k)
        .map(|(v, _)| v.clone())
        .collect()
}
