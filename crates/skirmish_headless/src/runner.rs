//! Line-oriented session loop over any reader/writer pair.

use std::io::{BufRead, Write};

use skirmish_core::config::GameConfig;
use tracing::{debug, info, warn};

use crate::ascii::{render_ascii, AsciiConfig};
use crate::env::{observation_len, EnvError, SkirmishEnv};
use crate::protocol::{Command, GameResult, ProtocolError, Response};

/// Serves one [`SkirmishEnv`] over the JSON-lines protocol.
#[derive(Debug)]
pub struct HeadlessRunner {
    env: SkirmishEnv,
}

impl HeadlessRunner {
    /// Create a runner for `config`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Env`] if the configuration cannot start a
    /// game.
    pub fn new(config: GameConfig) -> Result<Self, ProtocolError> {
        Ok(Self {
            env: SkirmishEnv::new(config)?,
        })
    }

    /// The environment being served.
    #[must_use]
    pub fn env(&self) -> &SkirmishEnv {
        &self.env
    }

    /// The `ready` greeting for this environment.
    #[must_use]
    pub fn ready(&self) -> Response {
        let game = self.env.game();
        Response::ready(
            self.env.action_count(),
            observation_len(game.units().len(), game.players().len()),
        )
    }

    /// Execute one command.
    pub fn handle(&mut self, command: &Command) -> Response {
        let result = match command {
            Command::Reset => self.env.reset().map(|observation| Response::Observation {
                observation,
                reward: 0.0,
                done: false,
                events: Vec::new(),
            }),
            Command::Step { action } => self.env.step(*action).map(|t| Response::Observation {
                observation: t.observation,
                reward: t.reward,
                done: t.done,
                events: t.events,
            }),
            Command::Query => Ok(self.state()),
            Command::Render { color } => {
                let config = AsciiConfig {
                    use_color: *color,
                    show_legend: true,
                };
                Ok(Response::Render {
                    text: render_ascii(self.env.game(), &config),
                })
            }
            Command::Hash => {
                let game = self.env.game();
                Ok(Response::StateHash {
                    steps: game.steps(),
                    hash: game.state_hash(),
                })
            }
            Command::Quit => Ok(Response::Bye),
        };

        result.unwrap_or_else(|e: EnvError| {
            warn!(cmd = command.name(), error = %e, "command failed");
            Response::error(e.to_string(), Some(command.name()))
        })
    }

    fn state(&self) -> Response {
        let game = self.env.game();
        let cursor = game.cursor();
        Response::State {
            round: game.round(),
            steps: game.steps(),
            active_player: cursor.player,
            active_slot: cursor.unit_slot,
            kill_points: game.players().iter().map(|p| p.kill_points).collect(),
            capture_points: game.players().iter().map(|p| p.capture_points).collect(),
            result: game
                .game_over()
                .map(|over| GameResult::new(&over.outcome, over.reason, over.round)),
        }
    }

    /// Run the session until `quit` or end of input.
    ///
    /// Malformed lines are answered with an error response and the session
    /// continues.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Io`] if reading or writing fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<(), ProtocolError> {
        info!("Starting protocol session");
        output.write_all(self.ready().to_json_line().as_bytes())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (response, quit) = match Command::from_json(line) {
                Ok(command) => {
                    debug!(cmd = command.name(), "command received");
                    (self.handle(&command), command == Command::Quit)
                }
                Err(e) => (Response::error(e.to_string(), None), false),
            };
            output.write_all(response.to_json_line().as_bytes())?;
            output.flush()?;
            if quit {
                info!("Session closed by controller");
                return Ok(());
            }
        }

        info!("Input closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_reports_sizes() {
        let runner = HeadlessRunner::new(GameConfig::default()).unwrap();
        assert_eq!(
            runner.ready(),
            Response::Ready {
                version: "1.0".to_string(),
                action_count: 37,
                observation_len: 119,
            }
        );
    }

    #[test]
    fn test_query_before_any_step() {
        let mut runner = HeadlessRunner::new(GameConfig::default()).unwrap();
        let Response::State { round, steps, result, .. } = runner.handle(&Command::Query) else {
            panic!("expected state");
        };
        assert_eq!((round, steps, result), (0, 0, None));
    }

    #[test]
    fn test_bad_action_is_an_error_response() {
        let mut runner = HeadlessRunner::new(GameConfig::default()).unwrap();
        let response = runner.handle(&Command::Step { action: 40 });
        assert!(matches!(response, Response::Error { cmd: Some(ref c), .. } if c == "step"));
    }
}
