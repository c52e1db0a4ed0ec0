//! Axis-aligned bounding boxes and segment intersection.

use crate::core::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3,
    /// Maximum corner
    pub max: Point3,
}

impl Aabb {
    /// Create a box from its two corners
    #[inline]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Cubic box of side `size` centered at `center`
    #[inline]
    pub fn cube(center: Point3, size: f32) -> Self {
        let half = size * 0.5;
        let h = Point3::new(half, half, half);
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Check whether a point lies inside the box (closed bounds)
    #[inline]
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Check whether the segment from `a` to `b` intersects the box.
    ///
    /// Slab test over the segment parameter interval `[0, 1]`. An
    /// axis-parallel segment is rejected as soon as its fixed component
    /// lies outside that axis slab.
    pub fn intersects_segment(&self, a: &Point3, b: &Point3) -> bool {
        let dir = *b - *a;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        let axes = [
            (a.x, dir.x, self.min.x, self.max.x),
            (a.y, dir.y, self.min.y, self.max.y),
            (a.z, dir.z, self.min.z, self.max.z),
        ];

        for (start, d, lo, hi) in axes {
            if d.abs() < f32::EPSILON {
                if start < lo || start > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - start) * inv;
            let mut t1 = (hi - start) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::ZERO, Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_contains() {
        let b = unit_box();
        assert!(b.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(b.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(!b.contains(&Point3::new(1.5, 0.5, 0.5)));
    }

    #[test]
    fn test_segment_through_box() {
        let b = unit_box();
        let a = Point3::new(-1.0, 0.5, 0.5);
        let c = Point3::new(2.0, 0.5, 0.5);
        assert!(b.intersects_segment(&a, &c));
    }

    #[test]
    fn test_segment_misses_box() {
        let b = unit_box();
        let a = Point3::new(-1.0, 2.0, 0.5);
        let c = Point3::new(2.0, 2.0, 0.5);
        assert!(!b.intersects_segment(&a, &c));
    }

    #[test]
    fn test_segment_stops_short() {
        let b = unit_box();
        let a = Point3::new(-2.0, 0.5, 0.5);
        let c = Point3::new(-1.0, 0.5, 0.5);
        assert!(!b.intersects_segment(&a, &c));
    }

    #[test]
    fn test_segment_fully_inside() {
        let b = unit_box();
        let a = Point3::new(0.25, 0.25, 0.25);
        let c = Point3::new(0.75, 0.75, 0.75);
        assert!(b.intersects_segment(&a, &c));
    }

    #[test]
    fn test_diagonal_clip() {
        // Clips a corner without containing either endpoint or any sample
        // on the segment midpoints' voxel centers.
        let b = Aabb::cube(Point3::new(1.5, 0.5, 0.5), 1.0);
        let a = Point3::new(0.9, -0.2, 0.5);
        let c = Point3::new(1.2, 2.0, 0.5);
        assert!(b.intersects_segment(&a, &c));
    }

    #[test]
    fn test_axis_parallel_outside_slab() {
        let b = unit_box();
        // Parallel to X, fixed y outside the box
        let a = Point3::new(-1.0, 1.5, 0.5);
        let c = Point3::new(2.0, 1.5, 0.5);
        assert!(!b.intersects_segment(&a, &c));
    }
}
