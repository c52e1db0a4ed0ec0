//! Range-sensor insertion pipeline.
//!
//! Each insertion runs a fixed sequence of bulk phases: range clamping,
//! free-voxel candidate generation along every ray, compaction of the
//! candidate set, occupied-voxel extraction, conflict resolution and
//! finally the log-odds updates. A phase completes before the next one
//! starts; within a phase the per-point work is independent.

use crate::bulk;
use crate::core::{Aabb, GridCoord, Point3, PointCloud};
use crate::grid::OccupancyGrid;
use log::debug;
use rayon::prelude::*;

/// Voxel counts touched by one insertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertStats {
    /// Deduplicated free voxels updated with a miss
    pub free_voxels: usize,
    /// Deduplicated occupied voxels updated with a hit
    pub occupied_voxels: usize,
}

/// A point after range clamping.
#[derive(Clone, Copy)]
struct RangedPoint {
    point: Point3,
    range: f32,
    /// False when the original return was truncated to `max_range`;
    /// such points carve free space but mark no surface.
    hit: bool,
}

impl OccupancyGrid {
    /// Integrate a point set observed from `viewpoint`.
    ///
    /// Points farther than `max_range` from the viewpoint are clamped
    /// onto the range sphere and treated as misses; a negative
    /// `max_range` disables clamping. Free space is carved along every
    /// ray; voxels holding a surface return win over any concurrent
    /// free observation in the same insertion.
    pub fn insert(&mut self, points: &[Point3], viewpoint: &Point3, max_range: f32) -> InsertStats {
        if points.is_empty() {
            return InsertStats::default();
        }

        // Range clamping.
        let ranged: Vec<RangedPoint> = points
            .par_iter()
            .map(|p| {
                let d = p.distance(viewpoint);
                if max_range < 0.0 || d <= max_range {
                    RangedPoint {
                        point: *p,
                        range: d,
                        hit: true,
                    }
                } else {
                    RangedPoint {
                        point: *viewpoint + (*p - *viewpoint) * (max_range / d),
                        range: max_range,
                        hit: false,
                    }
                }
            })
            .collect();

        let max_dist = ranged
            .par_iter()
            .map(|rp| rp.range)
            .reduce(|| 0.0f32, f32::max);
        let n_div = (max_dist / self.voxel_size()).ceil() as i32;

        // Free-voxel sweep. Degenerate insertions (every point at the
        // viewpoint) skip free space entirely.
        let mut free_keys: Vec<u64> = if n_div > 0 {
            ranged
                .par_iter()
                .map(|rp| self.ray_free_candidates(rp, viewpoint, n_div))
                .flatten()
                .collect()
        } else {
            Vec::new()
        };
        free_keys.par_sort_unstable();
        free_keys.dedup();

        // Occupied voxels from actual surface returns.
        let mut occupied_keys: Vec<u64> = ranged
            .par_iter()
            .filter(|rp| rp.hit)
            .filter_map(|rp| {
                let coord = self.point_to_grid(&rp.point);
                coord.is_valid().then(|| self.index_of(coord) as u64)
            })
            .collect();
        occupied_keys.par_sort_unstable();
        occupied_keys.dedup();

        // A hit beats a concurrent miss on the same voxel.
        let free_keys = bulk::sorted_set_difference(&free_keys, &occupied_keys);

        let free_coords: Vec<GridCoord> = free_keys
            .par_iter()
            .map(|&k| self.coord_of(k as usize))
            .collect();
        let occupied_coords: Vec<GridCoord> = occupied_keys
            .par_iter()
            .map(|&k| self.coord_of(k as usize))
            .collect();

        self.add_voxels(&free_coords, false);
        self.add_voxels(&occupied_coords, true);

        debug!(
            "[Insert] {} points -> {} free, {} occupied voxels (n_div={n_div})",
            points.len(),
            free_coords.len(),
            occupied_coords.len()
        );

        InsertStats {
            free_voxels: free_coords.len(),
            occupied_voxels: occupied_coords.len(),
        }
    }

    /// [`OccupancyGrid::insert`] over a point cloud collaborator.
    pub fn insert_point_cloud(
        &mut self,
        cloud: &PointCloud,
        viewpoint: &Point3,
        max_range: f32,
    ) -> InsertStats {
        self.insert(&cloud.points, viewpoint, max_range)
    }

    /// Linearized free-voxel candidates for one ray.
    ///
    /// Samples the segment at `n_div + 1` evenly spaced points and, for
    /// the sample's voxel plus its six face neighbors, keeps every
    /// voxel whose box the segment actually crosses. The neighbor sweep
    /// catches voxels the segment clips between consecutive samples.
    fn ray_free_candidates(
        &self,
        rp: &RangedPoint,
        viewpoint: &Point3,
        n_div: i32,
    ) -> Vec<u64> {
        let mut keys = Vec::with_capacity((n_div as usize + 1) * 7);
        let voxel_size = self.voxel_size();
        let resolution = self.resolution();
        let half = resolution / 2;
        let origin = self.origin();
        let step = (rp.point - *viewpoint) * (1.0 / n_div as f32);

        for j in 0..=n_div {
            let sample = *viewpoint + step * j as f32;
            let base = (sample - origin).div_scalar(voxel_size).floor();
            for offset in GridCoord::SWEEP_OFFSETS {
                // Unshifted voxel coordinate; kept in i64 until the
                // range check so far-away samples cannot wrap.
                let hx = base.x as i64 + offset.x as i64;
                let hy = base.y as i64 + offset.y as i64;
                let hz = base.z as i64 + offset.z as i64;
                let gx = hx + half as i64;
                let gy = hy + half as i64;
                let gz = hz + half as i64;
                if gx < 0
                    || gy < 0
                    || gz < 0
                    || gx >= resolution as i64
                    || gy >= resolution as i64
                    || gz >= resolution as i64
                {
                    continue;
                }
                let center = origin
                    + Point3::new(
                        (hx as f32 + 0.5) * voxel_size,
                        (hy as f32 + 0.5) * voxel_size,
                        (hz as f32 + 0.5) * voxel_size,
                    );
                if Aabb::cube(center, voxel_size).intersects_segment(viewpoint, &rp.point) {
                    let coord = GridCoord::new(gx as i32, gy as i32, gz as i32);
                    keys.push(self.index_of(coord) as u64);
                }
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OccupancyGridConfig;

    fn small_grid() -> OccupancyGrid {
        OccupancyGrid::new(OccupancyGridConfig::new(1.0, 4))
    }

    #[test]
    fn test_axis_ray_marks_free_then_occupied() {
        let mut grid = small_grid();
        let stats = grid.insert(
            &[Point3::new(1.5, 0.5, 0.5)],
            &Point3::new(-1.5, 0.5, 0.5),
            -1.0,
        );
        assert_eq!(stats.occupied_voxels, 1);
        assert_eq!(stats.free_voxels, 3);

        // The ray crosses x-voxels 0..3 of row (y=2, z=2); the endpoint
        // voxel is occupied, the rest free.
        let occ = grid.extract_occupied_voxel_indices();
        assert_eq!(occ, vec![GridCoord::new(3, 2, 2)]);
        let free = grid.extract_free_voxel_indices();
        assert_eq!(
            free,
            vec![
                GridCoord::new(0, 2, 2),
                GridCoord::new(1, 2, 2),
                GridCoord::new(2, 2, 2),
            ]
        );
        assert!(grid.is_occupied(&Point3::new(1.5, 0.5, 0.5)));
        assert!(!grid.is_unknown(&Point3::new(-1.5, 0.5, 0.5)));
    }

    #[test]
    fn test_max_range_clamps_and_suppresses_hit() {
        let mut grid = small_grid();
        grid.insert(
            &[Point3::new(1.5, 0.5, 0.5)],
            &Point3::new(-1.5, 0.5, 0.5),
            1.0,
        );
        // Clamped endpoint at (-0.5, 0.5, 0.5): free space reaches
        // voxel (1, 2, 2), nothing is occupied, the rest of the ray
        // stays unknown.
        assert_eq!(grid.count_occupied_voxels(), 0);
        let free = grid.extract_free_voxel_indices();
        assert_eq!(
            free,
            vec![GridCoord::new(0, 2, 2), GridCoord::new(1, 2, 2)]
        );
        assert!(grid.is_unknown(&Point3::new(0.5, 0.5, 0.5)));
        assert!(grid.is_unknown(&Point3::new(1.5, 0.5, 0.5)));
    }

    #[test]
    fn test_degenerate_insert_at_viewpoint() {
        let mut grid = small_grid();
        let vp = Point3::new(0.5, 0.5, 0.5);
        let stats = grid.insert(&[vp], &vp, -1.0);
        assert_eq!(stats.free_voxels, 0);
        assert_eq!(stats.occupied_voxels, 1);
        assert!(grid.is_occupied(&vp));
    }

    #[test]
    fn test_repeat_insert_accumulates_log_odds() {
        let mut grid = small_grid();
        let points = [Point3::new(1.5, 0.5, 0.5)];
        let vp = Point3::new(-1.5, 0.5, 0.5);
        grid.insert(&points, &vp, -1.0);
        grid.insert(&points, &vp, -1.0);
        let i = grid.voxel_index(&points[0]).unwrap();
        assert!((grid.prob_log[i] - 2.0 * grid.prob_hit_log).abs() < 1e-6);
    }

    #[test]
    fn test_clamping_caps_repeated_inserts() {
        let mut grid = small_grid();
        let points = [Point3::new(1.5, 0.5, 0.5)];
        let vp = Point3::new(-1.5, 0.5, 0.5);
        for _ in 0..10 {
            grid.insert(&points, &vp, -1.0);
        }
        let i = grid.voxel_index(&points[0]).unwrap();
        assert!((grid.prob_log[i] - grid.clamping_thres_max).abs() < 1e-6);
        // Every known voxel stays inside the clamp band.
        for v in grid.extract_known_voxels() {
            assert!(v.prob_log >= grid.clamping_thres_min);
            assert!(v.prob_log <= grid.clamping_thres_max);
        }
    }

    #[test]
    fn test_hit_wins_over_concurrent_miss() {
        let mut grid = small_grid();
        // Two rays from the same viewpoint: one ends inside the voxel
        // the other passes through.
        let vp = Point3::new(-1.5, 0.5, 0.5);
        let near = Point3::new(0.5, 0.5, 0.5);
        let far = Point3::new(1.5, 0.5, 0.5);
        grid.insert(&[near, far], &vp, -1.0);

        // (2, 2, 2) holds the near return and lies on the far ray; the
        // hit must win within the single insertion.
        let i = grid.voxel_index(&near).unwrap();
        assert!((grid.prob_log[i] - grid.prob_hit_log).abs() < 1e-6);
        assert!(grid.is_occupied(&near));
    }

    #[test]
    fn test_out_of_grid_points_are_absorbed() {
        let mut grid = small_grid();
        let stats = grid.insert(
            &[Point3::new(40.0, 0.5, 0.5)],
            &Point3::new(-1.5, 0.5, 0.5),
            -1.0,
        );
        // The endpoint is off-grid; only the on-grid part of the ray
        // becomes free.
        assert_eq!(stats.occupied_voxels, 0);
        assert!(stats.free_voxels > 0);
        assert!(grid.is_unknown(&Point3::new(40.0, 0.5, 0.5)));
    }

    #[test]
    fn test_empty_insert_is_noop() {
        let mut grid = small_grid();
        let stats = grid.insert(&[], &Point3::ZERO, -1.0);
        assert_eq!(stats, InsertStats::default());
        assert_eq!(grid.count_known_voxels(), 0);
    }

    #[test]
    fn test_insert_point_cloud_delegates() {
        let mut grid = small_grid();
        let cloud = PointCloud::from_points(vec![Point3::new(1.5, 0.5, 0.5)]);
        let stats = grid.insert_point_cloud(&cloud, &Point3::new(-1.5, 0.5, 0.5), -1.0);
        assert_eq!(stats.occupied_voxels, 1);
    }

    #[test]
    fn test_diagonal_ray_has_no_gaps() {
        // A diagonal ray must produce a 26-connected free corridor:
        // consecutive crossed voxels never differ by more than one per
        // axis, and the corridor reaches the endpoint voxel.
        let mut grid = OccupancyGrid::new(OccupancyGridConfig::new(0.5, 16));
        let vp = Point3::new(-3.0, -3.0, -3.0);
        let end = Point3::new(3.0, 2.5, 2.0);
        grid.insert(&[end], &vp, -1.0);

        let occ = grid.extract_occupied_voxel_indices();
        assert_eq!(occ.len(), 1);
        assert_eq!(occ[0], grid.point_to_grid(&end));

        // Walk the exact segment at fine granularity: every voxel the
        // segment passes through must be known.
        let steps = 4000;
        let dir = end - vp;
        for s in 0..steps {
            let t = s as f32 / steps as f32;
            let p = vp + dir * t;
            assert!(
                !grid.is_unknown(&p),
                "gap at t={t}: voxel {:?}",
                grid.point_to_grid(&p)
            );
        }
    }
}
