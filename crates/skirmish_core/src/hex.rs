//! Axial hex coordinates and grid geometry.
//!
//! Cells are addressed by an axial pair `(q, r)`; the implicit cube
//! coordinate is `s = -q - r`. All math is exact integer arithmetic, so
//! coordinates can be used directly as map keys.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A hex cell in axial coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct HexCoord {
    /// Column axis.
    pub q: i32,
    /// Row axis.
    pub r: i32,
}

/// The six unit direction vectors, indexed by direction `0..6`.
pub const DIRECTIONS: [HexCoord; 6] = [
    HexCoord::new(1, 0),  // East
    HexCoord::new(1, -1), // Northeast
    HexCoord::new(0, -1), // Northwest
    HexCoord::new(-1, 0), // West
    HexCoord::new(-1, 1), // Southwest
    HexCoord::new(0, 1),  // Southeast
];

impl HexCoord {
    /// The map center.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a coordinate from its axial components.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third cube component.
    #[inline]
    #[must_use]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Cube distance between two cells.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + (dq + dr).abs() + dr.abs()) / 2
    }

    /// Distance from the map center.
    #[inline]
    #[must_use]
    pub fn length(self) -> i32 {
        self.distance(Self::ORIGIN)
    }

    /// Neighbor in `direction` (taken modulo 6).
    #[inline]
    #[must_use]
    pub fn neighbor(self, direction: usize) -> Self {
        self + DIRECTIONS[direction % 6]
    }

    /// All six neighbors in direction order.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        DIRECTIONS.into_iter().map(move |d| self + d)
    }

    /// The cells at exactly distance `k`, starting from the southwest corner
    /// and walking the ring in direction order.
    ///
    /// Empty when `k <= 0`.
    #[must_use]
    pub fn ring(self, k: i32) -> Vec<Self> {
        if k <= 0 {
            return Vec::new();
        }
        let mut cells = Vec::with_capacity(6 * k as usize);
        let mut hex = self + DIRECTIONS[4] * k;
        for direction in 0..6 {
            for _ in 0..k {
                cells.push(hex);
                hex = hex.neighbor(direction);
            }
        }
        cells
    }

    /// Rings `1..=radius` concatenated. The center is not included.
    #[must_use]
    pub fn spiral(self, radius: i32) -> Vec<Self> {
        (1..=radius).flat_map(|k| self.ring(k)).collect()
    }

    /// Every cell of the radius-`radius` disc, generated by coordinate offset.
    ///
    /// Offsets whose cube sum `|dq| + |dr| + |dq + dr|` is at most `radius`
    /// come first, followed by the offsets whose sum exceeds it. The center is
    /// included.
    #[must_use]
    pub fn tiles_in_radius_inclusive(self, radius: i32) -> Vec<Self> {
        let offsets = disc_offsets(radius);
        let (near, far): (Vec<_>, Vec<_>) = offsets
            .into_iter()
            .partition(|&(dq, dr)| cube_sum(dq, dr) <= radius);
        near.into_iter()
            .chain(far)
            .map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
            .collect()
    }

    /// The outer band of the radius-`radius` disc: offsets whose cube sum
    /// `|dq| + |dr| + |dq + dr|` strictly exceeds `radius`.
    ///
    /// Used as the threat footprint of area-fire units when planning
    /// approach routes.
    #[must_use]
    pub fn tiles_in_radius_at_least(self, radius: i32) -> Vec<Self> {
        disc_offsets(radius)
            .into_iter()
            .filter(|&(dq, dr)| cube_sum(dq, dr) > radius)
            .map(|(dq, dr)| Self::new(self.q + dq, self.r + dr))
            .collect()
    }
}

/// Offsets of the radius disc in q-major order.
fn disc_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for dq in -radius..=radius {
        let lo = (-radius).max(-dq - radius);
        let hi = radius.min(-dq + radius);
        for dr in lo..=hi {
            offsets.push((dq, dr));
        }
    }
    offsets
}

#[inline]
fn cube_sum(dq: i32, dr: i32) -> i32 {
    dq.abs() + dr.abs() + (dq + dr).abs()
}

impl Add for HexCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for HexCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl Mul<i32> for HexCoord {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.q * rhs, self.r * rhs)
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
