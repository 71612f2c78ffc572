//! # Skirmish Core
//!
//! Deterministic engine for a turn-based tank skirmish on a hex grid.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No randomness
//! - No floating-point math (rewards are fixed-point)
//! - No IO beyond loading configuration and replay files on request
//!
//! The same configuration and action sequence always produce the same game,
//! which is what makes replays and training runs reproducible.
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial coordinates, rings and discs
//! - [`map`] - Board layout and special cells
//! - [`unit`] - Unit kinds and per-unit state
//! - [`pathfinding`] - Reachability and move-level path search
//! - [`combat`] - Threatened cells, neutrality and shot resolution
//! - [`strategy`] - Per-round planning for heuristic seats
//! - [`simulation`] - The turn/round state machine
//! - [`action`] - Discrete action codes for the learning seat
//! - [`replay`] - Recording and verifying games

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod combat;
pub mod config;
pub mod error;
pub mod hex;
pub mod map;
pub mod math;
pub mod pathfinding;
pub mod placement;
pub mod replay;
pub mod simulation;
pub mod strategy;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{ActionCode, ACTION_COUNT, FIRE_CODE};
    pub use crate::combat::{BattleView, FireControl, FireOption, NeutralityMatrix};
    pub use crate::config::{GameConfig, PlayerConfig, RewardTable};
    pub use crate::error::{GameError, Result};
    pub use crate::hex::HexCoord;
    pub use crate::map::{Board, MapLayout, ObstacleLayout};
    pub use crate::math::{Fixed, Reward};
    pub use crate::pathfinding::SearchLimits;
    pub use crate::placement::Deployment;
    pub use crate::replay::Replay;
    pub use crate::simulation::{
        EndReason, Game, GameOutcome, GameOver, MoveRejection, Player, StepOutcome, TurnCursor,
    };
    pub use crate::strategy::{HeuristicStrategy, Strategy};
    pub use crate::unit::{PlayerId, Unit, UnitId, UnitKind};
}
