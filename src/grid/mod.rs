//! Probabilistic 3D occupancy grid.
//!
//! Dense cubic voxel array updated with log-odds evidence. Uses a
//! Structure-of-Arrays layout: the log-odds and color of each voxel
//! live in separate contiguous arrays and [`OccupancyVoxel`] values are
//! reconstructed on read. A voxel is *unknown* until first observed
//! (log-odds NaN), then *free* or *occupied* depending on which side of
//! the occupancy threshold its clamped log-odds falls.

mod config;
mod insert;

pub use config::OccupancyGridConfig;
pub use insert::InsertStats;

use crate::core::{Color, GridCoord, Point3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One voxel's reconstructed state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyVoxel {
    /// Integer grid coordinate in `[0, resolution)³`
    pub grid_index: GridCoord,
    /// Log-odds of occupancy; NaN while unobserved
    pub prob_log: f32,
    /// Voxel color, white unless painted
    pub color: Color,
}

/// Dense probabilistic occupancy grid.
///
/// World mapping: a point `p` falls in the voxel
/// `floor((p − origin) / voxel_size) + resolution/2`; the half-
/// resolution shift centers the grid on `origin`. Points outside
/// `[0, resolution)³` map to [`GridCoord::INVALID`] and are absorbed
/// silently: they are "unknown", never an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OccupancyGrid {
    voxel_size: f32,
    resolution: i32,
    origin: Point3,
    /// Log-odds per voxel, NaN = unobserved
    prob_log: Vec<f32>,
    /// Color per voxel
    colors: Vec<Color>,

    /// Lower log-odds clamp
    pub clamping_thres_min: f32,
    /// Upper log-odds clamp
    pub clamping_thres_max: f32,
    /// Log-odds increment for an observed-occupied voxel
    pub prob_hit_log: f32,
    /// Log-odds increment for an observed-free voxel
    pub prob_miss_log: f32,
    /// Threshold separating free from occupied among known voxels
    pub occ_prob_thres_log: f32,
    /// Hint to renderers; carried, not interpreted
    pub visualize_free_area: bool,
}

impl OccupancyGrid {
    /// Create a grid from a configuration; all voxels start unknown.
    pub fn new(config: OccupancyGridConfig) -> Self {
        let count = config.voxel_count();
        Self {
            voxel_size: config.voxel_size,
            resolution: config.resolution,
            origin: config.origin,
            prob_log: vec![f32::NAN; count],
            colors: vec![Color::WHITE; count],
            clamping_thres_min: -2.0,
            clamping_thres_max: 3.5,
            prob_hit_log: 0.85,
            prob_miss_log: -0.4,
            occ_prob_thres_log: 0.0,
            visualize_free_area: true,
        }
    }

    // === Geometry ===

    /// Voxel side length in meters
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Voxels per axis
    #[inline]
    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    /// World position of the grid center
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Linearize a grid coordinate: `x + y·R + z·R²`.
    ///
    /// The coordinate must lie in `[0, resolution)³`.
    #[inline]
    pub fn index_of(&self, coord: GridCoord) -> usize {
        let r = self.resolution as usize;
        coord.x as usize + coord.y as usize * r + coord.z as usize * r * r
    }

    /// Invert [`OccupancyGrid::index_of`].
    #[inline]
    pub fn coord_of(&self, index: usize) -> GridCoord {
        let r = self.resolution as usize;
        GridCoord::new(
            (index % r) as i32,
            ((index / r) % r) as i32,
            (index / (r * r)) as i32,
        )
    }

    /// Map a world point to its voxel coordinate.
    ///
    /// Out-of-grid points yield [`GridCoord::INVALID`].
    pub fn point_to_grid(&self, point: &Point3) -> GridCoord {
        let rel = (*point - self.origin).div_scalar(self.voxel_size).floor();
        let half = (self.resolution / 2) as i64;
        let r = self.resolution as i64;
        let x = (rel.x as i64).saturating_add(half);
        let y = (rel.y as i64).saturating_add(half);
        let z = (rel.z as i64).saturating_add(half);
        if x < 0 || y < 0 || z < 0 || x >= r || y >= r || z >= r {
            return GridCoord::INVALID;
        }
        GridCoord::new(x as i32, y as i32, z as i32)
    }

    /// World position of a voxel's center.
    pub fn voxel_center(&self, coord: GridCoord) -> Point3 {
        let half = self.resolution / 2;
        let c = coord - GridCoord::new(half, half, half);
        self.origin
            + Point3::new(
                (c.x as f32 + 0.5) * self.voxel_size,
                (c.y as f32 + 0.5) * self.voxel_size,
                (c.z as f32 + 0.5) * self.voxel_size,
            )
    }

    // === Voxel state ===

    /// True when the dense array is allocated
    #[inline]
    pub fn has_voxels(&self) -> bool {
        !self.prob_log.is_empty()
    }

    /// Colors are always materialized (white by default)
    #[inline]
    pub fn has_colors(&self) -> bool {
        true
    }

    /// Reconstruct the voxel stored at a linear index.
    #[inline]
    pub fn voxel_at(&self, index: usize) -> OccupancyVoxel {
        OccupancyVoxel {
            grid_index: self.coord_of(index),
            prob_log: self.prob_log[index],
            color: self.colors[index],
        }
    }

    /// The voxel containing a world point, if the point is on the grid.
    pub fn get_voxel(&self, point: &Point3) -> Option<OccupancyVoxel> {
        self.voxel_index(point).map(|i| self.voxel_at(i))
    }

    /// Linear index of the voxel containing a world point.
    pub fn voxel_index(&self, point: &Point3) -> Option<usize> {
        let coord = self.point_to_grid(point);
        coord.is_valid().then(|| self.index_of(coord))
    }

    /// True when the point's voxel is known and above the occupancy
    /// threshold. Out-of-grid points are unknown, hence not occupied.
    pub fn is_occupied(&self, point: &Point3) -> bool {
        match self.voxel_index(point) {
            Some(i) => occupied(self.prob_log[i], self.occ_prob_thres_log),
            None => false,
        }
    }

    /// True when the point's voxel has never been observed, including
    /// every point outside the grid.
    pub fn is_unknown(&self, point: &Point3) -> bool {
        match self.voxel_index(point) {
            Some(i) => self.prob_log[i].is_nan(),
            None => true,
        }
    }

    // === Log-odds updates ===

    /// Apply one observation to one voxel.
    pub fn add_voxel(&mut self, coord: GridCoord, occupied: bool) {
        self.add_voxels(std::slice::from_ref(&coord), occupied);
    }

    /// Apply one observation to each listed voxel.
    ///
    /// An unknown voxel seeds at log-odds 0 before the increment; the
    /// result is clamped into `[clamping_thres_min, clamping_thres_max]`.
    /// Callers must deduplicate the list for one observation per voxel;
    /// the insertion pipeline guarantees that. Invalid and out-of-grid
    /// coordinates are skipped.
    pub fn add_voxels(&mut self, voxels: &[GridCoord], occupied: bool) {
        let increment = if occupied {
            self.prob_hit_log
        } else {
            self.prob_miss_log
        };
        for &coord in voxels {
            if !coord.is_valid() || !coord.in_resolution(self.resolution) {
                continue;
            }
            let i = self.index_of(coord);
            let base = if self.prob_log[i].is_nan() {
                0.0
            } else {
                self.prob_log[i]
            };
            self.prob_log[i] =
                (base + increment).clamp(self.clamping_thres_min, self.clamping_thres_max);
        }
    }

    /// Reallocate the dense array at a new size and resolution; every
    /// voxel returns to unknown.
    pub fn reconstruct_voxels(&mut self, voxel_size: f32, resolution: i32) {
        let count = OccupancyGridConfig {
            voxel_size,
            resolution,
            origin: self.origin,
        }
        .voxel_count();
        self.voxel_size = voxel_size;
        self.resolution = resolution;
        self.prob_log = vec![f32::NAN; count];
        self.colors = vec![Color::WHITE; count];
    }

    // === Counting and extraction ===

    /// Number of observed voxels
    pub fn count_known_voxels(&self) -> usize {
        self.prob_log.par_iter().filter(|p| !p.is_nan()).count()
    }

    /// Number of observed voxels at or below the occupancy threshold
    pub fn count_free_voxels(&self) -> usize {
        let thres = self.occ_prob_thres_log;
        self.prob_log.par_iter().filter(|p| free(**p, thres)).count()
    }

    /// Number of observed voxels above the occupancy threshold
    pub fn count_occupied_voxels(&self) -> usize {
        let thres = self.occ_prob_thres_log;
        self.prob_log
            .par_iter()
            .filter(|p| occupied(**p, thres))
            .count()
    }

    /// All observed voxels, in linear-index order
    pub fn extract_known_voxels(&self) -> Vec<OccupancyVoxel> {
        self.extract_voxels(|p, _| !p.is_nan())
    }

    /// All observed voxels at or below the occupancy threshold
    pub fn extract_free_voxels(&self) -> Vec<OccupancyVoxel> {
        self.extract_voxels(free)
    }

    /// All observed voxels above the occupancy threshold
    pub fn extract_occupied_voxels(&self) -> Vec<OccupancyVoxel> {
        self.extract_voxels(occupied)
    }

    /// Grid coordinates of all observed voxels, in linear-index order
    pub fn extract_known_voxel_indices(&self) -> Vec<GridCoord> {
        self.extract_indices(|p, _| !p.is_nan())
    }

    /// Grid coordinates of all free voxels
    pub fn extract_free_voxel_indices(&self) -> Vec<GridCoord> {
        self.extract_indices(free)
    }

    /// Grid coordinates of all occupied voxels
    pub fn extract_occupied_voxel_indices(&self) -> Vec<GridCoord> {
        self.extract_indices(occupied)
    }

    fn extract_voxels(&self, predicate: fn(f32, f32) -> bool) -> Vec<OccupancyVoxel> {
        let thres = self.occ_prob_thres_log;
        self.prob_log
            .par_iter()
            .enumerate()
            .filter(|(_, p)| predicate(**p, thres))
            .map(|(i, _)| self.voxel_at(i))
            .collect()
    }

    fn extract_indices(&self, predicate: fn(f32, f32) -> bool) -> Vec<GridCoord> {
        let thres = self.occ_prob_thres_log;
        self.prob_log
            .par_iter()
            .enumerate()
            .filter(|(_, p)| predicate(**p, thres))
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    // === Bounds ===

    /// World position of the first known voxel in linear order, or the
    /// origin when nothing is known.
    pub fn min_bound(&self) -> Point3 {
        match self.prob_log.iter().position(|p| !p.is_nan()) {
            Some(i) => {
                let half = self.resolution / 2;
                let c = self.coord_of(i) - GridCoord::new(half, half, half);
                self.origin + c.to_point() * self.voxel_size
            }
            None => self.origin,
        }
    }

    /// World position of the last known voxel in linear order, or the
    /// origin when nothing is known.
    ///
    /// Shifts by `resolution/2 − 1` where [`OccupancyGrid::min_bound`]
    /// shifts by `resolution/2`, matching the original consumer-facing
    /// convention.
    pub fn max_bound(&self) -> Point3 {
        match self.prob_log.iter().rposition(|p| !p.is_nan()) {
            Some(i) => {
                let half = self.resolution / 2 - 1;
                let c = self.coord_of(i) - GridCoord::new(half, half, half);
                self.origin + c.to_point() * self.voxel_size
            }
            None => self.origin,
        }
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::new(OccupancyGridConfig::default())
    }
}

#[inline]
fn free(prob_log: f32, thres: f32) -> bool {
    !prob_log.is_nan() && prob_log <= thres
}

#[inline]
fn occupied(prob_log: f32, thres: f32) -> bool {
    !prob_log.is_nan() && prob_log > thres
}
