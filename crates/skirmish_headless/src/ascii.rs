//! ASCII board renderer for terminal review.
//!
//! Rows are drawn from `r = -R` to `r = R`, each shifted right by half a
//! cell per step away from the middle row, so neighbouring cells line up
//! the way they do on the hex grid. Rendering never mutates the game.

use std::fmt::Write as _;

use skirmish_core::hex::HexCoord;
use skirmish_core::map::Board;
use skirmish_core::simulation::{Game, GameOutcome};
use skirmish_core::unit::UnitKind;

/// ASCII rendering options.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Tint unit glyphs with the owner's color (ANSI 24-bit).
    pub use_color: bool,
    /// Append scores and per-unit status below the board.
    pub show_legend: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_legend: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Glyphs for terrain.
pub mod glyphs {
    /// Plain open cell.
    pub const EMPTY: char = '.';
    /// Blocking cell.
    pub const OBSTACLE: char = '#';
    /// Capture zone cell.
    pub const CAPTURE: char = '+';
    /// Light repair station.
    pub const LIGHT_REPAIR: char = 'r';
    /// Heavy repair station.
    pub const HEAVY_REPAIR: char = 'R';
    /// Catapult.
    pub const CATAPULT: char = '^';
}

fn terrain_glyph(board: &Board, cell: HexCoord) -> char {
    if board.is_obstacle(cell) {
        glyphs::OBSTACLE
    } else if board.is_catapult(cell) {
        glyphs::CATAPULT
    } else if board.heavy_repair_stations().contains(&cell) {
        glyphs::HEAVY_REPAIR
    } else if board.light_repair_stations().contains(&cell) {
        glyphs::LIGHT_REPAIR
    } else if board.in_capture_zone(cell) {
        glyphs::CAPTURE
    } else {
        glyphs::EMPTY
    }
}

fn tint(color: [u8; 3]) -> String {
    format!("{}\x1b[38;2;{};{};{}m", colors::BOLD, color[0], color[1], color[2])
}

/// Render the board, and optionally the legend, as text.
#[must_use]
pub fn render_ascii(game: &Game, config: &AsciiConfig) -> String {
    let board = game.board();
    let radius = board.radius();
    let mut output = String::new();

    for r in -radius..=radius {
        let q_min = (-radius).max(-r - radius);
        let q_max = radius.min(-r + radius);
        output.push_str(&" ".repeat(r.unsigned_abs() as usize));

        for q in q_min..=q_max {
            let cell = HexCoord::new(q, r);
            let occupant = game
                .units()
                .iter()
                .find(|u| u.position == cell && !u.is_destroyed());
            match occupant {
                Some(unit) if config.use_color => {
                    let color = game.players()[unit.owner].color;
                    let _ = write!(output, "{}{}{}", tint(color), unit.kind.glyph(), colors::RESET);
                }
                Some(unit) => output.push(unit.kind.glyph()),
                None => {
                    let glyph = terrain_glyph(board, cell);
                    if config.use_color && glyph == glyphs::EMPTY {
                        let _ = write!(output, "{}{glyph}{}", colors::GRAY, colors::RESET);
                    } else {
                        output.push(glyph);
                    }
                }
            }
            if q < q_max {
                output.push(' ');
            }
        }
        output.push('\n');
    }

    if config.show_legend {
        output.push_str(&render_legend(game));
    }
    output
}

/// Scores, outcome and per-unit status lines.
#[must_use]
pub fn render_legend(game: &Game) -> String {
    let mut legend = String::new();
    let _ = writeln!(
        legend,
        "Round {}/{}",
        game.round(),
        game.config().max_rounds
    );

    for player in game.players() {
        let _ = writeln!(
            legend,
            "{}: kill points {}, capture points {}",
            player.name, player.kill_points, player.capture_points
        );
        for id in &player.units {
            let unit = game.unit(*id);
            let _ = writeln!(
                legend,
                "  {} {} {} hp {}/{}: {}",
                unit.kind.glyph(),
                unit.kind,
                unit.position,
                unit.hp.max(0),
                unit.spawn_hp,
                unit.last_action.as_deref().unwrap_or("-")
            );
        }
    }

    if let Some(over) = game.game_over() {
        let result = match &over.outcome {
            GameOutcome::Winner(id) => format!("{} wins", game.players()[*id].name),
            GameOutcome::Draw(ids) => {
                let names: Vec<&str> = ids.iter().map(|&id| game.players()[id].name.as_str()).collect();
                format!("Draw between {}", names.join(", "))
            }
        };
        let _ = writeln!(legend, "{result} ({:?}, round {})", over.reason, over.round);
    }

    let keys: Vec<String> = UnitKind::ROSTER
        .iter()
        .map(|kind| format!("{}={kind}", kind.glyph()))
        .collect();
    let _ = writeln!(
        legend,
        "{} {}=obstacle {}=capture {}=light repair {}=heavy repair {}=catapult",
        keys.join(" "),
        glyphs::OBSTACLE,
        glyphs::CAPTURE,
        glyphs::LIGHT_REPAIR,
        glyphs::HEAVY_REPAIR,
        glyphs::CATAPULT
    );
    legend
}
