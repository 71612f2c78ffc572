//! Replay recording and verification.
//!
//! A game is fully determined by its configuration and the action codes fed
//! to [`Game::step`], so a replay stores exactly those plus the final state
//! hash. Replays are encoded with `bincode`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::action::ActionCode;
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::simulation::Game;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// A recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Configuration the game was started with.
    pub config: GameConfig,
    /// Raw action code of every step, in order.
    pub actions: Vec<u8>,
    /// State hash after the last step.
    pub final_hash: u64,
}

impl Replay {
    /// Start an empty recording.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            config,
            actions: Vec::new(),
            final_hash: 0,
        }
    }

    /// Record the code passed to one step.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayCodec`] if the action has no code.
    pub fn record_action(&mut self, action: ActionCode) -> Result<()> {
        let code = action
            .to_index()
            .ok_or_else(|| GameError::ReplayCodec(format!("action {action} has no code")))?;
        self.actions.push(code);
        Ok(())
    }

    /// Seal the recording with the final state.
    pub fn finalize(&mut self, game: &Game) {
        self.final_hash = game.state_hash();
    }

    /// Play a whole game, asking `policy` on the learning seat's turns, and
    /// return the recording with the finished game.
    ///
    /// # Errors
    /// Returns an error if the game cannot be created or an action cannot be
    /// recorded.
    pub fn record(
        config: GameConfig,
        mut policy: impl FnMut(&Game) -> ActionCode,
    ) -> Result<(Self, Game)> {
        let mut game = Game::new(config.clone())?;
        let mut replay = Self::new(config);
        while !game.is_over() {
            let action = if game.is_learning_turn() {
                policy(&game)
            } else {
                ActionCode::Fire
            };
            replay.record_action(action)?;
            game.step(action);
        }
        replay.finalize(&game);
        Ok((replay, game))
    }

    /// Re-run the recorded actions from a fresh game.
    ///
    /// Stops early if the game ends before the recording does.
    ///
    /// # Errors
    /// Returns an error if the game cannot be created or a code is invalid.
    pub fn playback(&self) -> Result<Game> {
        let mut game = Game::new(self.config.clone())?;
        for &code in &self.actions {
            if game.is_over() {
                break;
            }
            game.step(ActionCode::from_index(code)?);
        }
        Ok(game)
    }

    /// Re-run the replay and check the final state hash.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayMismatch`] if the re-run diverges, or any
    /// error of [`Replay::playback`].
    pub fn verify(&self) -> Result<Game> {
        let game = self.playback()?;
        let actual = game.state_hash();
        if actual != self.final_hash {
            return Err(GameError::ReplayMismatch {
                actions: self.actions.len(),
                expected: self.final_hash,
                actual,
            });
        }
        Ok(game)
    }

    /// Encode to bytes.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayCodec`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::ReplayCodec(format!("Failed to serialize replay: {e}")))
    }

    /// Decode from bytes.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayCodec`] if the bytes do not decode or the
    /// version does not match.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::ReplayCodec(format!("Failed to deserialize replay: {e}")))?;
        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayCodec(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }
        Ok(replay)
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if reading or decoding fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::decode(&std::fs::read(path)?)
    }
}
