//! Headless surfaces for the skirmish engine.
//!
//! This crate wraps `skirmish_core` for use without a user interface:
//!
//! - **Training**: [`SkirmishEnv`] exposes reset/step with a flat
//!   observation vector for a single learning seat
//! - **Remote control**: a JSON-lines protocol over stdin/stdout, so an
//!   agent in another process can play
//! - **Review**: an ASCII board renderer
//! - **Batch runs**: many heuristic games in parallel with a JSON summary
//!
//! # Protocol
//!
//! - **stdin**: Commands from the controller (reset, step, query, ...)
//! - **stdout**: Responses (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Serve the protocol
//! echo '{"cmd":"step","action":36}' | cargo run -p skirmish_headless -- serve
//!
//! # Watch one heuristic game
//! cargo run -p skirmish_headless -- run --render
//!
//! # Verify a replay
//! cargo run -p skirmish_headless -- replay --file game.replay
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ascii;
pub mod batch;
pub mod env;
pub mod protocol;
pub mod runner;

pub use ascii::{render_ascii, AsciiConfig};
pub use batch::{run_batch, BatchConfig, BatchError, BatchResults, BatchSummary, GameMetrics};
pub use env::{observe, EnvError, SkirmishEnv, Transition};
pub use protocol::{Command, ProtocolError, Response};
pub use runner::HeadlessRunner;
