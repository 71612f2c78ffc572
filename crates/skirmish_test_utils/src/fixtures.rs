//! Fixture boards, rosters and game drivers.

use skirmish_core::action::ActionCode;
use skirmish_core::config::GameConfig;
use skirmish_core::hex::HexCoord;
use skirmish_core::map::{Board, MapLayout, ObstacleLayout};
use skirmish_core::placement::Deployment;
use skirmish_core::simulation::{Game, StepOutcome};
use skirmish_core::unit::{PlayerId, UnitKind};

/// Default layout with every obstacle removed.
#[must_use]
pub fn open_layout() -> MapLayout {
    MapLayout {
        obstacles: ObstacleLayout::Open,
        ..MapLayout::default()
    }
}

/// Default layout with the given obstacle cells only.
#[must_use]
pub fn layout_with_obstacles(cells: &[(i32, i32)]) -> MapLayout {
    MapLayout {
        obstacles: ObstacleLayout::Custom(cells.iter().copied().map(HexCoord::from).collect()),
        ..MapLayout::default()
    }
}

/// Indexed open board.
#[must_use]
pub fn open_board() -> Board {
    Board::new(open_layout())
}

/// Configuration on the open board for the first `players` seats.
#[must_use]
pub fn open_config(players: usize, learning_player: Option<PlayerId>) -> GameConfig {
    let mut config = GameConfig {
        learning_player,
        map: open_layout(),
        ..GameConfig::default()
    };
    config.players.truncate(players);
    config
}

/// Build a roster from `(kind, (q, r))` pairs.
#[must_use]
pub fn roster(units: &[(UnitKind, (i32, i32))]) -> Vec<Deployment> {
    units
        .iter()
        .map(|&(kind, at)| Deployment::new(kind, HexCoord::from(at)))
        .collect()
}

/// A game with explicit rosters.
///
/// # Panics
///
/// Panics if the rosters do not fit the configuration.
#[must_use]
pub fn custom_game(config: GameConfig, rosters: Vec<Vec<Deployment>>) -> Game {
    Game::with_deployments(config, rosters).expect("fixture rosters must be valid")
}

/// Step until the game ends, asking `policy` for every action.
pub fn play_to_end(game: &mut Game, mut policy: impl FnMut(&Game) -> ActionCode) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    while !game.is_over() {
        let action = policy(game);
        let outcome = game.step(action);
        tracing::trace!(step = game.steps(), description = %outcome.description, "fixture step");
        outcomes.push(outcome);
    }
    outcomes
}

/// Step until `player`'s `slot` unit is the next to act.
///
/// Other turns receive [`ActionCode::Fire`].
///
/// # Panics
///
/// Panics if the game ends first.
pub fn advance_to(game: &mut Game, player: PlayerId, slot: usize) {
    while game.cursor().player != player || game.cursor().unit_slot != slot {
        assert!(!game.is_over(), "game ended before reaching the turn");
        game.step(ActionCode::Fire);
    }
}
