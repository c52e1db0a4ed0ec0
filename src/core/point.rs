//! Point and coordinate types for 3D geometry.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// World coordinates (meters, f32)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
    /// Z coordinate in meters
    pub z: f32,
}

impl Point3 {
    /// Create a new world point
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero point (origin)
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point3) -> f32 {
        (*self - *other).norm()
    }

    /// Length (magnitude) of this point as a vector from the origin
    #[inline]
    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    /// Squared length (faster, avoids sqrt)
    #[inline]
    pub fn norm_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Dot product with another point (as vectors)
    #[inline]
    pub fn dot(&self, other: &Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Component-wise floor
    #[inline]
    pub fn floor(&self) -> Point3 {
        Point3::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    /// Component-wise scale by `1.0 / s`
    #[inline]
    pub fn div_scalar(&self, s: f32) -> Point3 {
        Point3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Point3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Point3::new(-self.x, -self.y, -self.z)
    }
}

/// Grid coordinates (integer voxel indices)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    /// X index (fastest-varying axis in the linearized array)
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index (slowest-varying axis)
    pub z: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Sentinel for points that fall outside the grid.
    ///
    /// Candidates equal to this value are discarded by every consumer;
    /// out-of-range geometry never becomes an error.
    pub const INVALID: GridCoord = GridCoord {
        x: i32::MIN,
        y: i32::MIN,
        z: i32::MIN,
    };

    /// True unless this is the out-of-grid sentinel
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// True when every component lies in `[0, resolution)`
    #[inline]
    pub fn in_resolution(&self, resolution: i32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.z >= 0
            && self.x < resolution
            && self.y < resolution
            && self.z < resolution
    }

    /// Convert to world coordinates (component-wise, no scaling)
    #[inline]
    pub fn to_point(self) -> Point3 {
        Point3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    /// The six face neighbors plus the coordinate itself.
    ///
    /// Ray insertion sweeps this stencil: point samples alone miss voxels
    /// a segment clips across diagonally.
    pub const SWEEP_OFFSETS: [GridCoord; 7] = [
        GridCoord { x: 0, y: 0, z: 0 },
        GridCoord { x: 1, y: 0, z: 0 },
        GridCoord { x: -1, y: 0, z: 0 },
        GridCoord { x: 0, y: 1, z: 0 },
        GridCoord { x: 0, y: -1, z: 0 },
        GridCoord { x: 0, y: 0, z: 1 },
        GridCoord { x: 0, y: 0, z: -1 },
    ];
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridCoord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridCoord::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}
