//! Headless skirmish runner.
//!
//! # Usage
//!
//! ```bash
//! # Serve the JSON-lines protocol on stdin/stdout
//! cargo run -p skirmish_headless -- serve --config game.ron
//!
//! # Play one heuristic game, rendering after every player phase
//! cargo run -p skirmish_headless -- run --render --record game.replay
//!
//! # Run every layout and seat count in parallel
//! cargo run -p skirmish_headless -- batch --repeats 2 --output results/
//!
//! # Re-run a replay and compare the final hash
//! cargo run -p skirmish_headless -- replay --file game.replay
//! ```
//!
//! Logs go to stderr so stdout stays clean for the protocol. `RUST_LOG`
//! overrides the default filter.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skirmish_core::{action::ActionCode, config::GameConfig, replay::Replay, simulation::Game};
use skirmish_headless::{
    ascii::{render_ascii, render_legend, AsciiConfig},
    batch::{run_batch, BatchConfig, BatchResults},
    runner::HeadlessRunner,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless hex skirmish runner for agents, batch runs and replays")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game with heuristic players only
    Run {
        /// RON game configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the board after every player phase
        #[arg(long)]
        render: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Write a replay of the game
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Serve the JSON-lines protocol on stdin/stdout
    Serve {
        /// RON game configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run every layout and seat count in parallel
    Batch {
        /// RON game configuration used as the base of every job
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Games per layout and seat count
        #[arg(short, long, default_value = "1")]
        repeats: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Verify a recorded replay
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Print the final board
        #[arg(long)]
        render: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            config,
            render,
            no_color,
            record,
        }) => cmd_run(config.as_deref(), render, !no_color, record.as_deref()),
        Some(Commands::Serve { config }) => cmd_serve(config.as_deref()),
        Some(Commands::Batch {
            config,
            repeats,
            parallel,
            output,
        }) => cmd_batch(config.as_deref(), repeats, parallel, &output),
        Some(Commands::Replay { file, render }) => cmd_replay(&file, render),
        // Default: protocol session with the default configuration
        None => cmd_serve(None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig, String> {
    match path {
        Some(path) => GameConfig::load(path).map_err(|e| e.to_string()),
        None => Ok(GameConfig::default()),
    }
}

/// Play one heuristic game
fn cmd_run(
    config: Option<&Path>,
    render: bool,
    use_color: bool,
    record: Option<&Path>,
) -> Result<(), String> {
    let mut config = load_config(config)?;
    config.learning_player = None;
    let mut game = Game::new(config.clone()).map_err(|e| e.to_string())?;
    let mut replay = Replay::new(config);
    let ascii = AsciiConfig {
        use_color,
        show_legend: true,
    };

    tracing::info!(players = game.players().len(), "Starting game");
    while !game.is_over() {
        let round = game.round();
        replay.record_action(ActionCode::Fire).map_err(|e| e.to_string())?;
        game.step(ActionCode::Fire);
        if render && game.round() != round {
            println!("{}", render_ascii(&game, &ascii));
        }
    }
    replay.finalize(&game);

    print!("{}", render_legend(&game));
    if let Some(path) = record {
        replay.save(path).map_err(|e| e.to_string())?;
        tracing::info!("Replay written to {}", path.display());
    }
    Ok(())
}

/// Serve the protocol on stdin/stdout
fn cmd_serve(config: Option<&Path>) -> Result<(), String> {
    let config = load_config(config)?;
    let mut runner = HeadlessRunner::new(config).map_err(|e| e.to_string())?;
    runner
        .run(io::stdin().lock(), io::stdout().lock())
        .map_err(|e| e.to_string())
}

/// Run a batch and write the JSON summary
fn cmd_batch(config: Option<&Path>, repeats: u32, parallel: usize, output: &Path) -> Result<(), String> {
    let batch = BatchConfig {
        base: load_config(config)?,
        repeats,
        parallel_games: parallel,
        ..BatchConfig::default()
    };
    let results = run_batch(batch);

    let path = BatchResults::default_path(output);
    results.save(&path).map_err(|e| e.to_string())?;

    let summary = &results.summary;
    println!("Games: {} ({} failed)", summary.games, results.failures.len());
    println!("Wins per seat: {:?}, draws: {}", summary.wins, summary.draws);
    println!(
        "Capture endings: {}, round limit endings: {}, average rounds: {:.1}",
        summary.capture_endings, summary.round_limit_endings, summary.average_rounds
    );
    println!("Deterministic: {}", summary.deterministic);
    println!("Results written to {}", path.display());
    Ok(())
}

/// Verify a recorded replay
fn cmd_replay(file: &Path, render: bool) -> Result<(), String> {
    let replay = Replay::load(file).map_err(|e| e.to_string())?;
    let game = replay.verify().map_err(|e| e.to_string())?;
    println!(
        "Replay OK: {} actions, final hash {:#018x}",
        replay.actions.len(),
        replay.final_hash
    );
    if render {
        println!("{}", render_ascii(&game, &AsciiConfig::default()));
    }
    Ok(())
}
