//! Static board layout: bounds, obstacles and special cells.
//!
//! A [`MapLayout`] is plain serde data loaded from configuration; a
//! [`Board`] is the indexed, read-only form the engine queries during play.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::unit::UnitKind;

/// Built-in obstacle arrangements, or a custom coordinate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObstacleLayout {
    /// Six long walls along the axes, each with a gap near the center.
    Full,
    /// Short wall stubs next to the capture zone.
    Sparse,
    /// Three pairs of pillars in front of the spawn edges.
    #[default]
    Stage4,
    /// Walls concentrated around the first player's edge.
    UnfairTesting,
    /// Explicit obstacle cells.
    Custom(Vec<HexCoord>),
    /// No obstacles.
    Open,
}

impl ObstacleLayout {
    /// Obstacle cells for this layout.
    #[must_use]
    pub fn cells(&self) -> Vec<HexCoord> {
        let raw: &[(i32, i32)] = match self {
            Self::Full => &[
                (0, -2), (0, -3), (0, -5), (0, -6), (0, -7), (0, -8), (0, -9), (0, -10),
                (2, -2), (3, -3), (5, -5), (6, -6), (7, -7), (8, -8), (9, -9), (10, -10),
                (0, 2), (0, 3), (0, 5), (0, 6), (0, 7), (0, 8), (0, 9), (0, 10),
                (-2, 2), (-3, 3), (-5, 5), (-6, 6), (-7, 7), (-8, 8), (-9, 9), (-10, 10),
                (-2, 0), (-3, 0), (-5, 0), (-6, 0), (-7, 0), (-8, 0), (-9, 0), (-10, 0),
                (2, 0), (3, 0), (5, 0), (6, 0), (7, 0), (8, 0), (9, 0), (10, 0),
            ],
            Self::Sparse => &[
                (0, -2), (0, -3), (2, -2), (3, -3), (0, 2), (0, 3),
                (-2, 2), (-3, 3), (-2, 0), (-3, 0), (2, 0), (3, 0),
            ],
            Self::Stage4 => &[(-5, -3), (-3, -5), (-5, 8), (-3, 8), (8, -3), (8, -5)],
            Self::UnfairTesting => &[
                (10, -2), (9, -2), (9, -4), (9, -6), (9, -7), (8, -2), (7, -2), (7, -3),
                (7, -4), (7, -5), (7, -6), (7, -7), (7, -8), (2, -2), (3, -3), (0, 2),
                (0, 3), (-2, 2), (-3, 3), (-2, 0), (-3, 0), (2, 0), (3, 0),
            ],
            Self::Custom(cells) => return cells.clone(),
            Self::Open => &[],
        };
        raw.iter().copied().map(HexCoord::from).collect()
    }
}

/// Serializable board description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapLayout {
    /// Largest legal distance from the origin.
    pub radius: i32,
    /// Blocking cells.
    pub obstacles: ObstacleLayout,
    /// Cells that accrue capture points.
    pub capture_zone: Vec<HexCoord>,
    /// Stations that heal Medium Tanks.
    pub light_repair_stations: Vec<HexCoord>,
    /// Stations that heal Heavy Tanks and Tank Destroyers.
    pub heavy_repair_stations: Vec<HexCoord>,
    /// Cells granting extended firing range.
    pub catapults: Vec<HexCoord>,
}

impl Default for MapLayout {
    fn default() -> Self {
        let cells = |raw: &[(i32, i32)]| raw.iter().copied().map(HexCoord::from).collect();
        Self {
            radius: 10,
            obstacles: ObstacleLayout::Stage4,
            capture_zone: cells(&[(0, 0), (1, 0), (-1, 1), (0, 1), (1, -1), (-1, 0), (0, -1)]),
            light_repair_stations: cells(&[(-3, -3), (-3, 6), (6, -3)]),
            heavy_repair_stations: cells(&[(-2, -2), (4, -2), (-2, 4)]),
            catapults: cells(&[(3, -6), (-6, 3), (3, 3)]),
        }
    }
}

/// Indexed, read-only board used during play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    radius: i32,
    obstacles: HashSet<HexCoord>,
    capture_zone: Vec<HexCoord>,
    capture_set: HashSet<HexCoord>,
    light_repair_stations: HashSet<HexCoord>,
    heavy_repair_stations: HashSet<HexCoord>,
    catapults: HashSet<HexCoord>,
    layout: MapLayout,
}

impl Board {
    /// Build the indexed board from a layout.
    #[must_use]
    pub fn new(layout: MapLayout) -> Self {
        Self {
            radius: layout.radius,
            obstacles: layout.obstacles.cells().into_iter().collect(),
            capture_zone: layout.capture_zone.clone(),
            capture_set: layout.capture_zone.iter().copied().collect(),
            light_repair_stations: layout.light_repair_stations.iter().copied().collect(),
            heavy_repair_stations: layout.heavy_repair_stations.iter().copied().collect(),
            catapults: layout.catapults.iter().copied().collect(),
            layout,
        }
    }

    /// Map radius.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// The layout this board was built from.
    #[must_use]
    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    /// Whether `cell` lies on the map.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, cell: HexCoord) -> bool {
        cell.length() <= self.radius
    }

    /// Whether `cell` holds an obstacle.
    #[inline]
    #[must_use]
    pub fn is_obstacle(&self, cell: HexCoord) -> bool {
        self.obstacles.contains(&cell)
    }

    /// In bounds and not an obstacle.
    #[inline]
    #[must_use]
    pub fn is_open(&self, cell: HexCoord) -> bool {
        self.in_bounds(cell) && !self.is_obstacle(cell)
    }

    /// Whether `cell` is part of the capture zone.
    #[inline]
    #[must_use]
    pub fn in_capture_zone(&self, cell: HexCoord) -> bool {
        self.capture_set.contains(&cell)
    }

    /// Capture zone cells in layout order.
    #[must_use]
    pub fn capture_zone(&self) -> &[HexCoord] {
        &self.capture_zone
    }

    /// Whether `cell` is a catapult.
    #[inline]
    #[must_use]
    pub fn is_catapult(&self, cell: HexCoord) -> bool {
        self.catapults.contains(&cell)
    }

    /// Whether entering `cell` restores a unit of `kind` to full health.
    #[must_use]
    pub fn repairs(&self, cell: HexCoord, kind: UnitKind) -> bool {
        match kind {
            UnitKind::HeavyTank | UnitKind::TankDestroyer => {
                self.heavy_repair_stations.contains(&cell)
            }
            UnitKind::MediumTank => self.light_repair_stations.contains(&cell),
            UnitKind::Spg | UnitKind::LightTank => false,
        }
    }

    /// Obstacle cells in layout order.
    #[must_use]
    pub fn obstacles(&self) -> Vec<HexCoord> {
        self.layout.obstacles.cells()
    }

    /// Light repair stations in layout order.
    #[must_use]
    pub fn light_repair_stations(&self) -> &[HexCoord] {
        &self.layout.light_repair_stations
    }

    /// Heavy repair stations in layout order.
    #[must_use]
    pub fn heavy_repair_stations(&self) -> &[HexCoord] {
        &self.layout.heavy_repair_stations
    }

    /// Catapults in layout order.
    #[must_use]
    pub fn catapults(&self) -> &[HexCoord] {
        &self.layout.catapults
    }

    /// Every in-bounds cell, q-major.
    #[must_use]
    pub fn cells(&self) -> Vec<HexCoord> {
        let mut cells = HexCoord::ORIGIN.tiles_in_radius_inclusive(self.radius);
        cells.sort_unstable();
        cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(MapLayout::default())
    }
}
