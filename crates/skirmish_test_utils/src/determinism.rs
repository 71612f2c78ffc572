//! Determinism testing utilities.
//!
//! The engine must produce bit-identical games from identical inputs, or
//! replays and training runs stop being reproducible. Sources of drift to
//! watch for:
//!
//! - **Floating-point math**: rewards use [`skirmish_core::math::Fixed`].
//! - **HashMap iteration order**: hashed collections are only used for
//!   membership tests, never iterated into results.
//! - **System randomness**: the engine has none.

use skirmish_core::action::ActionCode;
use skirmish_core::config::GameConfig;
use skirmish_core::simulation::Game;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash of each run.
    pub hashes: Vec<u64>,
    /// Steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// All unique hashes (one for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine several times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of independent runs
/// * `steps` - Steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Hashes the final state
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play `config` to completion `runs` times with the same policy and
/// compare the final hashes.
///
/// # Panics
///
/// Panics if the configuration does not produce a game.
pub fn verify_game_determinism<P>(runs: usize, config: &GameConfig, policy: P) -> DeterminismResult
where
    P: Fn(&Game) -> ActionCode,
{
    let mut hashes = Vec::with_capacity(runs);
    let mut steps = 0;

    for _ in 0..runs {
        let mut game = Game::new(config.clone()).expect("config must build a game");
        while !game.is_over() {
            let action = policy(&game);
            game.step(action);
        }
        steps = game.steps();
        hashes.push(game.state_hash());
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_determinism_counter() {
        let result = verify_determinism(3, 10, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![10, 10, 10]);
        result.assert_deterministic();
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_detects_divergence() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            steps: 1,
        };
        result.assert_deterministic();
    }

    #[test]
    fn test_full_heuristic_game_is_deterministic() {
        let config = GameConfig {
            max_rounds: 10,
            ..GameConfig::default()
        };
        let result = verify_game_determinism(3, &config, |_| ActionCode::Fire);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }
}
