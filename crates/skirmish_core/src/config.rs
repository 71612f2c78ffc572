//! Game configuration loaded from RON.
//!
//! Every field has a default reproducing the classic three-player board, so a
//! configuration file only needs to name what it changes:
//!
//! ```ron
//! (
//!     learning_player: Some(0),
//!     max_rounds: 30,
//!     map: (radius: 10, obstacles: Sparse),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::map::MapLayout;
use crate::pathfinding::SearchLimits;
use crate::placement;
use crate::unit::PlayerId;

/// Smallest supported number of players.
pub const MIN_PLAYERS: usize = 2;
/// Largest supported number of players.
pub const MAX_PLAYERS: usize = 3;

/// Seat description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name.
    pub name: String,
    /// RGB color, used only by renderers.
    pub color: [u8; 3],
}

impl PlayerConfig {
    /// Create a seat description.
    #[must_use]
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Reward values, seen from the learning player.
///
/// `move_base` scales the learning player's move rewards: illegal length
/// costs one base, closing 3/2/1 on the map center earns 10/5/2 bases,
/// moving away costs 4, staying in place costs half a base and keeping the
/// same distance earns a tenth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardTable {
    /// Game won (negated when another player wins).
    pub win: i32,
    /// Game drawn (negated for players outside the draw).
    pub draw: i32,
    /// Per enemy unit damaged.
    pub hit: i32,
    /// Per enemy unit destroyed, replacing `hit`.
    pub destroying_hit: i32,
    /// Per own unit gaining a capture point.
    pub capture: i32,
    /// Base unit of the move rewards.
    pub move_base: i32,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            win: 400,
            draw: 200,
            hit: 8,
            destroying_hit: 20,
            capture: 30,
            move_base: 2,
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seats in turn order.
    pub players: Vec<PlayerConfig>,
    /// Seat driven by action codes; every other seat plays the heuristic.
    pub learning_player: Option<PlayerId>,
    /// Player phases before the game is decided on kill points.
    pub max_rounds: u32,
    /// Capture points a player needs to win.
    pub capture_points_to_win: u32,
    /// Capture points at which heuristic players stop avoiding enemy fire.
    pub urgency_capture_threshold: u32,
    /// Reward values.
    pub rewards: RewardTable,
    /// Search iteration caps.
    pub search: SearchLimits,
    /// Board layout.
    pub map: MapLayout,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: vec![
                PlayerConfig::new("Player1", [255, 0, 0]),
                PlayerConfig::new("Player2", [0, 255, 0]),
                PlayerConfig::new("Player3", [0, 0, 255]),
            ],
            learning_player: None,
            max_rounds: 45,
            capture_points_to_win: 5,
            urgency_capture_threshold: 3,
            rewards: RewardTable::default(),
            search: SearchLimits::default(),
            map: MapLayout::default(),
        }
    }
}

impl GameConfig {
    /// Load and validate a configuration from a RON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, does not parse or fails
    /// [`GameConfig::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&contents).map_err(|e| GameError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from a RON string.
    ///
    /// # Errors
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        let config: Self = ron::from_str(contents).map_err(|e| GameError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidConfig(e.to_string()))
    }

    /// Check that the configuration describes a playable game.
    ///
    /// # Errors
    /// Returns [`GameError::UnsupportedPlayerCount`] for player counts the
    /// standard placement cannot seat, and [`GameError::InvalidConfig`] for
    /// any other unusable value.
    pub fn validate(&self) -> Result<()> {
        let count = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::UnsupportedPlayerCount {
                requested: count,
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
            });
        }
        if self.max_rounds == 0 {
            return Err(GameError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.capture_points_to_win == 0 {
            return Err(GameError::InvalidConfig(
                "capture_points_to_win must be at least 1".to_string(),
            ));
        }
        if let Some(seat) = self.learning_player {
            if seat >= count {
                return Err(GameError::InvalidConfig(format!(
                    "learning_player {seat} is not a seat of a {count}-player game"
                )));
            }
        }
        if self.map.radius < placement::MIN_RADIUS {
            return Err(GameError::InvalidConfig(format!(
                "map radius {} is below the placement minimum {}",
                self.map.radius,
                placement::MIN_RADIUS
            )));
        }
        if self.map.capture_zone.is_empty() {
            return Err(GameError::InvalidConfig(
                "capture zone must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
