//! Core types for drishti-geom.
//!
//! This module provides fundamental geometric types:
//! - [`Point3`]: 3D world point/vector
//! - [`GridCoord`]: integer voxel coordinate
//! - [`Color`]: RGB attribute
//! - [`Aabb`]: axis-aligned bounding box with segment intersection
//! - [`TriangleMesh`] / [`PointCloud`]: external collaborator contracts

pub mod aabb;
pub mod color;
pub mod mesh;
pub mod point;

pub use aabb::Aabb;
pub use color::Color;
pub use mesh::{PointCloud, TriangleMesh};
pub use point::{GridCoord, Point3};
