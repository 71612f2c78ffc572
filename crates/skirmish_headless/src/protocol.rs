//! JSON-lines protocol for driving the environment from another process.
//!
//! **Input (stdin):** one command per line
//! **Output (stdout):** one response per line
//! **Logs (stderr):** human-readable diagnostics
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Controller sends `reset`, then `step` commands with action codes
//! 3. Every `step` is answered with an observation, the summed reward and
//!    the termination flag
//! 4. `quit` is answered with `bye` and ends the session
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","action_count":37,"observation_len":119}
//! -> {"cmd":"reset"}
//! <- {"type":"observation","observation":[...],"reward":0.0,"done":false,"events":[]}
//! -> {"cmd":"step","action":36}
//! <- {"type":"observation","observation":[...],"reward":8.0,"done":false,"events":["Tank shot at (7, -3)"]}
//! -> {"cmd":"quit"}
//! <- {"type":"bye"}
//! ```

use serde::{Deserialize, Serialize};
use skirmish_core::simulation::{EndReason, GameOutcome};
use thiserror::Error;

use crate::env::EnvError;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands accepted by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Start a fresh game.
    Reset,

    /// Apply an action code for the learning seat.
    Step {
        /// Raw code in `0..37`.
        action: u8,
    },

    /// Report the current state without advancing.
    Query,

    /// Render the board as ASCII text.
    Render {
        /// Emit ANSI colors.
        #[serde(default)]
        color: bool,
    },

    /// Report the deterministic state hash.
    Hash,

    /// End the session.
    Quit,
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses written by the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
        /// Size of the action space.
        action_count: usize,
        /// Length of every observation vector.
        observation_len: usize,
    },

    /// Observation after `reset` or `step`.
    Observation {
        /// Flattened state.
        observation: Vec<i32>,
        /// Reward summed since the previous command.
        reward: f64,
        /// Whether the game has ended.
        done: bool,
        /// Descriptions of the engine steps taken.
        events: Vec<String>,
    },

    /// Current state summary.
    State {
        /// Completed player phases.
        round: u32,
        /// Engine steps so far.
        steps: u64,
        /// Active seat.
        active_player: usize,
        /// Active roster slot.
        active_slot: usize,
        /// Kill points per seat.
        kill_points: Vec<u32>,
        /// Capture points per seat.
        capture_points: Vec<u32>,
        /// Final result, once the game has ended.
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<GameResult>,
    },

    /// ASCII rendering.
    Render {
        /// Board and legend.
        text: String,
    },

    /// State hash for determinism checks.
    StateHash {
        /// Engine steps so far.
        steps: u64,
        /// Hash of the mutable state.
        hash: u64,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Command that failed, if it parsed.
        #[serde(skip_serializing_if = "Option::is_none")]
        cmd: Option<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

/// Terminal result as reported over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winning seat, if one player won outright.
    pub winner: Option<usize>,
    /// Seats sharing a draw.
    pub draw: Vec<usize>,
    /// `capture` or `round_limit`.
    pub reason: String,
    /// Completed player phases at the end.
    pub round: u32,
}

impl GameResult {
    /// Convert from the engine's terminal record.
    #[must_use]
    pub fn new(outcome: &GameOutcome, reason: EndReason, round: u32) -> Self {
        let (winner, draw) = match outcome {
            GameOutcome::Winner(id) => (Some(*id), Vec::new()),
            GameOutcome::Draw(ids) => (None, ids.clone()),
        };
        let reason = match reason {
            EndReason::Capture => "capture",
            EndReason::RoundLimit => "round_limit",
        };
        Self {
            winner,
            draw,
            reason: reason.to_string(),
            round,
        }
    }
}

/// Failures of a protocol session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading or writing the stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line was not a valid command.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The environment rejected the command.
    #[error(transparent)]
    Env(#[from] EnvError),
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(action_count: usize, observation_len: usize) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            action_count,
            observation_len,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Parse`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Command name for error reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Step { .. } => "step",
            Self::Query => "query",
            Self::Render { .. } => "render",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_command() {
        let cmd = Command::from_json(r#"{"cmd":"step","action":36}"#).unwrap();
        assert_eq!(cmd, Command::Step { action: 36 });
        assert_eq!(cmd.name(), "step");
    }

    #[test]
    fn test_render_color_defaults_off() {
        let cmd = Command::from_json(r#"{"cmd":"render"}"#).unwrap();
        assert_eq!(cmd, Command::Render { color: false });
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(matches!(
            Command::from_json(r#"{"cmd":"tick","count":60}"#),
            Err(ProtocolError::Parse(_))
        ));
    }

    #[test]
    fn test_serialize_observation_response() {
        let resp = Response::Observation {
            observation: vec![1, -2],
            reward: 8.0,
            done: false,
            events: vec!["Nothing to shoot".to_string()],
        };
        let json = resp.to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"observation""#));
        assert!(json.contains(r#""observation":[1,-2]"#));
    }

    #[test]
    fn test_error_response_omits_missing_cmd() {
        let json = Response::error("bad", None).to_json_line();
        assert_eq!(json, "{\"type\":\"error\",\"message\":\"bad\"}\n");
    }

    #[test]
    fn test_game_result_from_draw() {
        let result = GameResult::new(&GameOutcome::Draw(vec![0, 2]), EndReason::RoundLimit, 45);
        assert_eq!(result.winner, None);
        assert_eq!(result.draw, vec![0, 2]);
        assert_eq!(result.reason, "round_limit");
    }
}
