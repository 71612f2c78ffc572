//! Unit kinds, their stat profiles and per-unit state.
//!
//! The roster is a closed set: each [`UnitKind`] carries a fixed stat block
//! and a [`FirePattern`] that selects how combat computes its threatened
//! cells. Combat code switches on the pattern rather than on the kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;

/// Index of a unit in the engine's unit list. Stable for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub usize);

/// Index of a player, `0..player_count`.
pub type PlayerId = usize;

/// Vehicle types available to every player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Self-propelled gun: long area reach, fragile and slow.
    Spg,
    /// Fast scout with a short area reach.
    LightTank,
    /// Slow and durable; reaches one ring further than its range stat.
    HeavyTank,
    /// Balanced all-rounder.
    MediumTank,
    /// Fires along the six hex axes and pierces every enemy on the ray.
    TankDestroyer,
}

/// Base stats for a unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Starting and maximum hit points.
    pub hp: i32,
    /// Movement budget per action, in edges.
    pub speed: i32,
    /// Damage dealt per hit.
    pub damage: i32,
    /// Kill points awarded to whoever destroys the unit.
    pub destruction_points: u32,
    /// Nominal firing range.
    pub shooting_range: i32,
}

/// How a unit projects fire onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirePattern {
    /// Threatens the ring at `reach` (and `reach + 1` with extended range).
    Area {
        /// Ring radius actually threatened.
        reach: i32,
    },
    /// Threatens six axis rays of `length` cells (one more with extended
    /// range), each truncated at the first obstacle.
    Ray {
        /// Cells per ray.
        length: i32,
    },
}

impl UnitKind {
    /// Roster order used by the standard placement.
    pub const ROSTER: [Self; 5] = [
        Self::Spg,
        Self::LightTank,
        Self::HeavyTank,
        Self::MediumTank,
        Self::TankDestroyer,
    ];

    /// Stat block for this kind.
    #[must_use]
    pub const fn stats(self) -> UnitStats {
        let (hp, speed, damage, destruction_points, shooting_range) = match self {
            Self::Spg => (1, 1, 1, 1, 3),
            Self::LightTank => (1, 3, 1, 1, 2),
            Self::HeavyTank => (3, 1, 1, 3, 1),
            Self::MediumTank => (2, 2, 1, 2, 2),
            Self::TankDestroyer => (2, 1, 1, 2, 3),
        };
        UnitStats {
            hp,
            speed,
            damage,
            destruction_points,
            shooting_range,
        }
    }

    /// Fire pattern derived from the range stat.
    #[must_use]
    pub const fn fire_pattern(self) -> FirePattern {
        let range = self.stats().shooting_range;
        match self {
            Self::TankDestroyer => FirePattern::Ray { length: range },
            Self::HeavyTank => FirePattern::Area { reach: range + 1 },
            Self::Spg | Self::LightTank | Self::MediumTank => FirePattern::Area { reach: range },
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Spg => "SPG",
            Self::LightTank => "Light Tank",
            Self::HeavyTank => "Heavy Tank",
            Self::MediumTank => "Medium Tank",
            Self::TankDestroyer => "Tank Destroyer",
        }
    }

    /// Single-character glyph for text rendering.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Spg => 'S',
            Self::LightTank => 'L',
            Self::HeavyTank => 'H',
            Self::MediumTank => 'M',
            Self::TankDestroyer => 'D',
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A unit's pending command for the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservedAction {
    /// Move to the given cell.
    Move(HexCoord),
    /// Fire at the given cell.
    Shoot(HexCoord),
}

/// A vehicle on the board.
///
/// Units are never removed: a destroyed unit keeps its slot and is reset to
/// its spawn cell and spawn hit points when its owner's phase ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Engine-wide identifier.
    pub id: UnitId,
    /// Vehicle type.
    pub kind: UnitKind,
    /// Owning player.
    pub owner: PlayerId,
    /// Slot in the owner's roster, which is also its turn order.
    pub roster_index: usize,
    /// Current cell.
    pub position: HexCoord,
    /// Respawn cell.
    pub spawn_position: HexCoord,
    /// Current hit points.
    pub hp: i32,
    /// Respawn hit points.
    pub spawn_hp: i32,
    /// Movement budget per action.
    pub speed: i32,
    /// Damage per hit.
    pub damage: i32,
    /// Kill points awarded to the destroyer.
    pub destruction_points: u32,
    /// Nominal firing range.
    pub shooting_range: i32,
    /// Set on entering a catapult, cleared after firing from any other cell.
    pub extended_range: bool,
    /// Consecutive rounds spent in the capture zone.
    pub capture_points: u32,
    /// Pending command for this round.
    pub reserved: Option<ReservedAction>,
    /// Human-readable description of the last action, for renderers.
    pub last_action: Option<String>,
}

impl Unit {
    /// Create a unit with the stat block of `kind`.
    #[must_use]
    pub fn new(
        id: UnitId,
        kind: UnitKind,
        owner: PlayerId,
        roster_index: usize,
        spawn: HexCoord,
    ) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            owner,
            roster_index,
            position: spawn,
            spawn_position: spawn,
            hp: stats.hp,
            spawn_hp: stats.hp,
            speed: stats.speed,
            damage: stats.damage,
            destruction_points: stats.destruction_points,
            shooting_range: stats.shooting_range,
            extended_range: false,
            capture_points: 0,
            reserved: None,
            last_action: None,
        }
    }

    /// Whether the unit has been destroyed and awaits respawn.
    #[inline]
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.hp <= 0
    }

    /// Reset position and health to spawn values.
    pub fn respawn(&mut self) {
        self.position = self.spawn_position;
        self.hp = self.spawn_hp;
    }
}
