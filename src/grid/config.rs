//! Configuration for the occupancy grid.

use crate::core::Point3;
use serde::{Deserialize, Serialize};

/// Occupancy grid configuration.
///
/// The grid is a cube of `resolution³` voxels centered on `origin`;
/// the dense array is allocated up-front and never resized except by
/// an explicit reconstruction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OccupancyGridConfig {
    /// Voxel side length in meters
    pub voxel_size: f32,

    /// Number of voxels per axis
    pub resolution: i32,

    /// World position of the grid center
    pub origin: Point3,
}

impl Default for OccupancyGridConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.05, // 5cm voxels
            resolution: 512,  // 25.6m cube at 5cm
            origin: Point3::ZERO,
        }
    }
}

impl OccupancyGridConfig {
    /// Create a configuration with the grid centered at the origin
    pub fn new(voxel_size: f32, resolution: i32) -> Self {
        Self {
            voxel_size,
            resolution,
            origin: Point3::ZERO,
        }
    }

    /// Total voxel count
    pub fn voxel_count(&self) -> usize {
        let r = self.resolution as usize;
        r * r * r
    }

    /// Memory footprint of the dense arrays in bytes.
    ///
    /// 4 bytes of log-odds plus 12 bytes of color per voxel; the
    /// default 512³ grid weighs roughly 2 GiB, so size deliberately.
    pub fn memory_bytes(&self) -> usize {
        self.voxel_count() * (4 + 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OccupancyGridConfig::default();
        assert_eq!(config.voxel_size, 0.05);
        assert_eq!(config.resolution, 512);
        assert_eq!(config.origin, Point3::ZERO);
    }

    #[test]
    fn test_memory_estimate() {
        let config = OccupancyGridConfig::new(1.0, 4);
        assert_eq!(config.voxel_count(), 64);
        assert_eq!(config.memory_bytes(), 64 * 16);
    }
}
