//! Parallel batch runs of heuristic-only games.
//!
//! The engine has no randomness, so a batch varies the obstacle layout and
//! the number of seats instead of a seed. Each job may be repeated; repeats
//! must end on the same state hash, which doubles as a determinism check.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skirmish_core::action::ActionCode;
use skirmish_core::config::GameConfig;
use skirmish_core::error::GameError;
use skirmish_core::map::ObstacleLayout;
use skirmish_core::simulation::{EndReason, Game};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::protocol::GameResult;

/// Batch failures.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Reading or writing the results file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The results file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A game could not be set up.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Settings shared by every game; its map layout's obstacles are
    /// replaced per job.
    pub base: GameConfig,
    /// Obstacle layouts to play.
    pub layouts: Vec<ObstacleLayout>,
    /// Seat counts to play.
    pub player_counts: Vec<usize>,
    /// Games per (layout, seat count) pair.
    pub repeats: u32,
    /// Maximum parallel games (0 = use rayon default).
    pub parallel_games: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            base: GameConfig::default(),
            layouts: vec![
                ObstacleLayout::Stage4,
                ObstacleLayout::Sparse,
                ObstacleLayout::Full,
                ObstacleLayout::UnfairTesting,
                ObstacleLayout::Open,
            ],
            player_counts: vec![2, 3],
            repeats: 1,
            parallel_games: 0,
        }
    }
}

impl BatchConfig {
    /// Every job of the batch, in a stable order.
    #[must_use]
    pub fn jobs(&self) -> Vec<BatchJob> {
        let mut jobs = Vec::new();
        for layout in &self.layouts {
            for &players in &self.player_counts {
                for repeat in 0..self.repeats {
                    jobs.push(BatchJob {
                        index: jobs.len(),
                        layout: layout.clone(),
                        players,
                        repeat,
                    });
                }
            }
        }
        jobs
    }
}

/// One game of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    /// Position in the batch.
    pub index: usize,
    /// Obstacle layout.
    pub layout: ObstacleLayout,
    /// Seat count.
    pub players: usize,
    /// Repeat number of this (layout, seats) pair.
    pub repeat: u32,
}

impl BatchJob {
    /// Game configuration for this job.
    #[must_use]
    pub fn config(&self, base: &GameConfig) -> GameConfig {
        let mut config = base.clone();
        config.map.obstacles = self.layout.clone();
        config.players.truncate(self.players);
        config.learning_player = None;
        config
    }
}

/// Metrics of one finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Job that produced the game.
    pub job: BatchJob,
    /// Final result.
    pub result: GameResult,
    /// Engine steps taken.
    pub steps: u64,
    /// Kill points per seat.
    pub kill_points: Vec<u32>,
    /// Capture points per seat.
    pub capture_points: Vec<u32>,
    /// Final state hash.
    pub final_hash: u64,
}

/// A job that could not be played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    /// Job that failed.
    pub job: BatchJob,
    /// Error message.
    pub message: String,
}

/// Aggregate statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games played to the end.
    pub games: usize,
    /// Outright wins per seat.
    pub wins: Vec<u32>,
    /// Games ending in a draw.
    pub draws: u32,
    /// Games decided by capture.
    pub capture_endings: u32,
    /// Games stopped by the round cap.
    pub round_limit_endings: u32,
    /// Mean completed player phases.
    pub average_rounds: f64,
    /// Whether every repeat of a job ended on the same hash.
    pub deterministic: bool,
}

impl BatchSummary {
    /// Aggregate finished games.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        let seats = games.iter().map(|g| g.job.players).max().unwrap_or(0);
        let mut summary = Self {
            games: games.len(),
            wins: vec![0; seats],
            deterministic: true,
            ..Self::default()
        };

        let mut total_rounds = 0u64;
        for game in games {
            match game.result.winner {
                Some(seat) => summary.wins[seat] += 1,
                None => summary.draws += 1,
            }
            if game.result.reason == "capture" {
                summary.capture_endings += 1;
            } else {
                summary.round_limit_endings += 1;
            }
            total_rounds += u64::from(game.result.round);
        }
        if !games.is_empty() {
            summary.average_rounds = total_rounds as f64 / games.len() as f64;
        }

        summary.deterministic = games.iter().all(|a| {
            games
                .iter()
                .filter(|b| b.job.layout == a.job.layout && b.job.players == a.job.players)
                .all(|b| b.final_hash == a.final_hash)
        });
        summary
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Finished games, in job order.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Jobs that could not be played.
    pub failures: Vec<JobFailure>,
}

impl BatchResults {
    /// Save results to a JSON file, creating parent directories.
    ///
    /// # Errors
    /// Returns [`BatchError`] if serialization or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), BatchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from a JSON file.
    ///
    /// # Errors
    /// Returns [`BatchError`] if reading or parsing fails.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Default file name inside an output directory.
    #[must_use]
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join("batch.json")
    }
}

/// Play one job to the end.
///
/// # Errors
/// Returns [`BatchError::Game`] if the job's configuration cannot start a
/// game.
pub fn run_job(job: &BatchJob, base: &GameConfig) -> Result<GameMetrics, BatchError> {
    let mut game = Game::new(job.config(base))?;
    let over = loop {
        if let Some(over) = game.game_over() {
            break over.clone();
        }
        game.step(ActionCode::Fire);
    };

    let round_limit = over.reason == EndReason::RoundLimit;
    let result = GameResult::new(&over.outcome, over.reason, over.round);
    debug!(index = job.index, rounds = result.round, round_limit, "job finished");

    Ok(GameMetrics {
        job: job.clone(),
        result,
        steps: game.steps(),
        kill_points: game.players().iter().map(|p| p.kill_points).collect(),
        capture_points: game.players().iter().map(|p| p.capture_points).collect(),
        final_hash: game.state_hash(),
    })
}

/// Run every job of `config` in parallel.
#[must_use]
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let jobs = config.jobs();
    info!("Starting batch run: {} games", jobs.len());

    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, JobFailure>> = jobs
        .par_iter()
        .map(|job| {
            run_job(job, &config.base).map_err(|e| {
                warn!("Game {} failed: {}", job.index, e);
                JobFailure {
                    job: job.clone(),
                    message: e.to_string(),
                }
            })
        })
        .collect();

    let (games, failures): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let failures: Vec<JobFailure> = failures.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        "Batch complete: {} games, {} failures in {:.1}s",
        games.len(),
        failures.len(),
        duration_seconds
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        failures,
    }
}
