//! Minimal collaborator types produced by external pipelines.
//!
//! Mesh loading and point-cloud construction live outside this crate;
//! these types carry just the fields the geometry cores consume.

use crate::core::Point3;
use serde::{Deserialize, Serialize};

/// Triangle mesh: shared vertices plus index triples.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Mesh vertices
    pub vertices: Vec<Point3>,
    /// Counter-clockwise vertex index triples
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a mesh from vertices and triangles
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }
}

/// Unorganized 3D point cloud.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PointCloud {
    /// Cloud points in world coordinates
    pub points: Vec<Point3>,
}

impl PointCloud {
    /// Create a cloud from points
    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the cloud has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
