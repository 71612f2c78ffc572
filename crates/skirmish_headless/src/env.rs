//! Step/reset training environment around a single learning seat.
//!
//! The environment owns a [`Game`] and hides the heuristic seats: every
//! call to [`SkirmishEnv::step`] first lets the heuristic players act until
//! one of the learning seat's units is up, then applies the given action
//! code to that unit. Rewards collected on the way are summed and returned
//! as `f64`, the only place fixed-point rewards leave the engine.

use serde::{Deserialize, Serialize};
use skirmish_core::action::{ActionCode, ACTION_COUNT};
use skirmish_core::config::GameConfig;
use skirmish_core::error::GameError;
use skirmish_core::math::Fixed;
use skirmish_core::simulation::{Game, GameOver};
use thiserror::Error;
use tracing::debug;

/// Seat driven by the environment when the configuration names none.
pub const DEFAULT_LEARNING_PLAYER: usize = 0;

/// Values per unit in the observation vector.
pub const UNIT_FEATURES: usize = 7;

/// Environment failures.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The engine rejected the configuration or the action code.
    #[error(transparent)]
    Game(#[from] GameError),

    /// `step` was called after the game ended.
    #[error("the game is over; call reset")]
    GameOver,
}

/// Result of one [`SkirmishEnv::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Observation after the step.
    pub observation: Vec<i32>,
    /// Reward summed over every engine step taken.
    pub reward: f64,
    /// Whether the game has ended.
    pub done: bool,
    /// Descriptions of every engine step taken, in order.
    pub events: Vec<String>,
}

/// A resettable game seen from the learning seat.
#[derive(Debug, Clone)]
pub struct SkirmishEnv {
    config: GameConfig,
    game: Game,
}

impl SkirmishEnv {
    /// Build an environment, defaulting the learning seat to player 0.
    ///
    /// # Errors
    /// Returns [`EnvError::Game`] if the configuration cannot start a game.
    pub fn new(mut config: GameConfig) -> Result<Self, EnvError> {
        config.learning_player.get_or_insert(DEFAULT_LEARNING_PLAYER);
        let game = Game::new(config.clone())?;
        Ok(Self { config, game })
    }

    /// Start a fresh game and return its observation.
    ///
    /// # Errors
    /// Returns [`EnvError::Game`] if the game cannot be rebuilt.
    pub fn reset(&mut self) -> Result<Vec<i32>, EnvError> {
        self.game = Game::new(self.config.clone())?;
        debug!(players = self.game.players().len(), "environment reset");
        Ok(self.observation())
    }

    /// Play heuristic turns until the learning seat acts, then apply `code`.
    ///
    /// If the game ends before the learning seat's turn comes up, `code` is
    /// not used.
    ///
    /// # Errors
    /// Returns [`EnvError::GameOver`] once the game has ended and
    /// [`EnvError::Game`] for codes outside the action space.
    pub fn step(&mut self, code: u8) -> Result<Transition, EnvError> {
        if self.game.is_over() {
            return Err(EnvError::GameOver);
        }
        let action = ActionCode::from_index(code)?;

        let mut reward = Fixed::ZERO;
        let mut events = Vec::new();
        while !self.game.is_over() && !self.game.is_learning_turn() {
            let outcome = self.game.step(ActionCode::Fire);
            reward += outcome.reward;
            events.push(outcome.description);
        }
        if !self.game.is_over() {
            let outcome = self.game.step(action);
            reward += outcome.reward;
            events.push(outcome.description);
        }

        Ok(Transition {
            observation: self.observation(),
            reward: reward.to_num::<f64>(),
            done: self.game.is_over(),
            events,
        })
    }

    /// Current observation vector. See [`observe`].
    #[must_use]
    pub fn observation(&self) -> Vec<i32> {
        observe(&self.game)
    }

    /// Underlying game.
    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Configuration used on every reset.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Terminal record, once the game has ended.
    #[must_use]
    pub fn game_over(&self) -> Option<&GameOver> {
        self.game.game_over()
    }

    /// Size of the discrete action space.
    #[must_use]
    pub const fn action_count(&self) -> usize {
        ACTION_COUNT
    }
}

/// Flatten the game state into a fixed-layout vector.
///
/// Layout, in order: for every unit `(q, r, owner, roster index, hp, speed,
/// capture points)`; kill points of every player; the row-major neutrality
/// matrix; the active player; the active unit slot.
#[must_use]
pub fn observe(game: &Game) -> Vec<i32> {
    let players = game.players().len();
    let mut values = Vec::with_capacity(observation_len(game.units().len(), players));

    for unit in game.units() {
        values.extend([
            unit.position.q,
            unit.position.r,
            unit.owner as i32,
            unit.roster_index as i32,
            unit.hp,
            unit.speed,
            unit.capture_points as i32,
        ]);
    }
    values.extend(game.players().iter().map(|p| p.kill_points as i32));
    values.extend(game.neutrality().flattened().into_iter().map(i32::from));

    let cursor = game.cursor();
    values.push(cursor.player as i32);
    values.push(cursor.unit_slot as i32);
    values
}

/// Length of [`observe`]'s output for the given table size.
#[must_use]
pub const fn observation_len(units: usize, players: usize) -> usize {
    units * UNIT_FEATURES + players + players * players + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_learning_seat() {
        let env = SkirmishEnv::new(GameConfig::default()).unwrap();
        assert_eq!(env.config().learning_player, Some(DEFAULT_LEARNING_PLAYER));
        assert_eq!(env.action_count(), 37);
    }

    #[test]
    fn test_observation_layout() {
        let env = SkirmishEnv::new(GameConfig::default()).unwrap();
        let obs = env.observation();
        assert_eq!(obs.len(), observation_len(15, 3));

        let first = &env.game().units()[0];
        assert_eq!(obs[0], first.position.q);
        assert_eq!(obs[1], first.position.r);
        assert_eq!(obs[4], first.hp);
        // cursor sits at the first seat, first slot
        assert_eq!(&obs[obs.len() - 2..], &[0, 0]);
    }

    #[test]
    fn test_invalid_code() {
        let mut env = SkirmishEnv::new(GameConfig::default()).unwrap();
        assert!(matches!(
            env.step(99),
            Err(EnvError::Game(GameError::InvalidActionCode(99)))
        ));
    }
}
