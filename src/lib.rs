//! # Drishti-Geom: 3D Perception Geometry Cores
//!
//! Data-parallel geometry primitives for 3D perception pipelines:
//!
//! - **[`Graph`]**: a weighted graph embedded in 3D with incremental
//!   mutation, CSR adjacency rebuilt after every structural change, and
//!   single-source shortest paths via bulk wavefront relaxation
//! - **[`OccupancyGrid`]**: a fixed-resolution probabilistic voxel grid
//!   that integrates range-sensor returns with log-odds updates along
//!   free-space ray segments
//!
//! ## Quick Start
//!
//! ```rust
//! use drishti_geom::{Edge, Graph, Point3};
//!
//! let mut graph = Graph::from_points(vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]);
//! graph.add_edges(&[Edge::new(0, 1), Edge::new(1, 2)], &[]).unwrap();
//! graph.set_edge_weights_from_distance();
//!
//! let path = graph.dijkstra_path(0, 2).unwrap();
//! assert_eq!(path, vec![0, 1, 2]);
//! ```
//!
//! ```rust
//! use drishti_geom::{OccupancyGrid, OccupancyGridConfig, Point3};
//!
//! let mut grid = OccupancyGrid::new(OccupancyGridConfig::new(0.1, 64));
//! grid.insert(
//!     &[Point3::new(1.0, 0.0, 0.0)],
//!     &Point3::new(-1.0, 0.0, 0.0),
//!     -1.0,
//! );
//! assert!(grid.is_occupied(&Point3::new(1.0, 0.0, 0.0)));
//! assert!(!grid.is_occupied(&Point3::new(0.0, 0.0, 0.0)));
//! ```
//!
//! ## Execution Model
//!
//! Bulk operations (sorts, scans, reductions, per-element transforms)
//! run as parallel phases on the rayon pool; a phase completes before
//! the next begins, and no other ordering is observable. The crate
//! never installs a logger or touches the filesystem.

pub mod bulk;
pub mod core;
pub mod error;
pub mod graph;
pub mod grid;

// Re-export main types at crate root
pub use crate::core::{Aabb, Color, GridCoord, Point3, PointCloud, TriangleMesh};
pub use error::{GeomError, Result};
pub use graph::{Edge, Graph, SsspResult};
pub use grid::{InsertStats, OccupancyGrid, OccupancyGridConfig, OccupancyVoxel};
