//! The turn/round state machine.
//!
//! [`Game::step`] is the single entry point that mutates the game. Each call
//! makes exactly one unit act (or ends the game at the round limit) and
//! returns the learning seat's reward for that step together with a
//! human-readable description.
//!
//! ## Turn order
//!
//! Players take phases in seat order; within a phase every unit acts once in
//! roster order. When a player's phase starts, its neutrality row is cleared
//! and, for heuristic seats, the whole phase is planned at once. When a phase
//! ends, destroyed units respawn and the round counter advances, so the
//! counter and the round cap count player phases. After the last seat's
//! phase capture points are scored and the capture win is checked.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ActionCode;
use crate::combat::{best_fire_option, BattleView, FireControl, NeutralityMatrix, ShotResolution};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::hex::HexCoord;
use crate::map::Board;
use crate::math::{ratio, Fixed, Reward};
use crate::pathfinding::{reachable_set, Mover};
use crate::placement::{standard_deployments, Deployment};
use crate::strategy::{HeuristicStrategy, PlanningContext, Strategy};
use crate::unit::{FirePattern, PlayerId, ReservedAction, Unit, UnitId};

/// Why a move was not carried out. Rejected moves are no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// The offset is longer than the unit's speed.
    #[error("move of {length} exceeds speed {speed}")]
    TooFar {
        /// Edges requested.
        length: i32,
        /// Unit speed.
        speed: i32,
    },
    /// Destination lies off the map.
    #[error("{0} is out of bounds")]
    OutOfBounds(HexCoord),
    /// Destination is an obstacle.
    #[error("{0} is an obstacle")]
    Obstacle(HexCoord),
    /// Another unit stands on the destination.
    #[error("{0} is occupied")]
    Occupied(HexCoord),
    /// No route of at most `speed` edges leads there.
    #[error("{0} is not reachable this turn")]
    Unreachable(HexCoord),
}

/// A seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Seat index.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Render color.
    pub color: [u8; 3],
    /// Units in roster (turn) order.
    pub units: Vec<UnitId>,
    /// Destruction points of every enemy unit this player destroyed.
    pub kill_points: u32,
    /// Sum of the capture points of this player's units.
    pub capture_points: u32,
}

/// Whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TurnCursor {
    /// Active seat.
    pub player: PlayerId,
    /// Active slot in that seat's roster.
    pub unit_slot: usize,
    /// Completed player phases.
    pub round: u32,
}

/// Final result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// A single player won.
    Winner(PlayerId),
    /// These players tied on kill points.
    Draw(Vec<PlayerId>),
}

impl GameOutcome {
    /// Whether `player` won outright.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, Self::Winner(w) if *w == player)
    }
}

/// What ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// Someone reached the capture threshold.
    Capture,
    /// The round limit was reached.
    RoundLimit,
}

/// Terminal state record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOver {
    /// Who won.
    pub outcome: GameOutcome,
    /// Why the game ended.
    pub reason: EndReason,
    /// Completed player phases when it ended.
    pub round: u32,
}

/// Result of one [`Game::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Reward for the learning seat (zero without one).
    pub reward: Reward,
    /// What happened.
    pub description: String,
    /// Unit that acted, if any.
    pub actor: Option<UnitId>,
    /// Whether the game is now over.
    pub done: bool,
}

/// The game engine.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    units: Vec<Unit>,
    players: Vec<Player>,
    neutrality: NeutralityMatrix,
    cursor: TurnCursor,
    over: Option<GameOver>,
    catapult_history: Vec<HexCoord>,
    steps: u64,
}

impl Game {
    /// Start a game with the standard placement.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the map cannot
    /// seat every roster.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let board = Board::new(config.map.clone());
        let deployments = standard_deployments(&board, config.player_count())?;
        Self::with_deployments(config, deployments)
    }

    /// Start a game with explicit rosters, one list per seat.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the roster count
    /// does not match the seats, a roster is empty, or a spawn cell is off
    /// the map, blocked or shared.
    pub fn with_deployments(config: GameConfig, deployments: Vec<Vec<Deployment>>) -> Result<Self> {
        config.validate()?;
        let board = Board::new(config.map.clone());

        if deployments.len() != config.player_count() {
            return Err(GameError::InvalidConfig(format!(
                "{} rosters for {} players",
                deployments.len(),
                config.player_count()
            )));
        }

        let mut units = Vec::new();
        let mut players = Vec::with_capacity(deployments.len());
        let mut taken = HashSet::new();

        for (id, (seat, roster)) in config.players.iter().zip(deployments).enumerate() {
            if roster.is_empty() {
                return Err(GameError::InvalidConfig(format!("player {id} has no units")));
            }
            let mut ids = Vec::with_capacity(roster.len());
            for (slot, deployment) in roster.into_iter().enumerate() {
                if !board.is_open(deployment.spawn) {
                    return Err(GameError::InvalidConfig(format!(
                        "spawn {} of player {id} is not an open cell",
                        deployment.spawn
                    )));
                }
                if !taken.insert(deployment.spawn) {
                    return Err(GameError::InvalidConfig(format!(
                        "spawn {} is used twice",
                        deployment.spawn
                    )));
                }
                let unit_id = UnitId(units.len());
                units.push(Unit::new(unit_id, deployment.kind, id, slot, deployment.spawn));
                ids.push(unit_id);
            }
            players.push(Player {
                id,
                name: seat.name.clone(),
                color: seat.color,
                units: ids,
                kill_points: 0,
                capture_points: 0,
            });
        }

        Ok(Self {
            neutrality: NeutralityMatrix::new(players.len()),
            config,
            board,
            units,
            players,
            cursor: TurnCursor::default(),
            over: None,
            catapult_history: Vec::new(),
            steps: 0,
        })
    }

    /// Configuration the game was built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Static board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Every unit, indexed by [`UnitId`].
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// A single unit.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this game.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    /// Seats in turn order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Engagements of the current round.
    #[must_use]
    pub fn neutrality(&self) -> &NeutralityMatrix {
        &self.neutrality
    }

    /// Turn cursor.
    #[must_use]
    pub const fn cursor(&self) -> TurnCursor {
        self.cursor
    }

    /// Completed player phases.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.cursor.round
    }

    /// Number of successful [`Game::step`] calls.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether the game has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.over.is_some()
    }

    /// Terminal record, once the game has ended.
    #[must_use]
    pub fn game_over(&self) -> Option<&GameOver> {
        self.over.as_ref()
    }

    /// Every cell a shot was fired from while on a catapult, in order.
    #[must_use]
    pub fn catapult_history(&self) -> &[HexCoord] {
        &self.catapult_history
    }

    /// Seat driven by action codes, if any.
    #[must_use]
    pub const fn learning_player(&self) -> Option<PlayerId> {
        self.config.learning_player
    }

    /// Unit that acts on the next step.
    #[must_use]
    pub fn active_unit(&self) -> UnitId {
        self.players[self.cursor.player].units[self.cursor.unit_slot]
    }

    /// Whether the next step consumes the action code.
    #[must_use]
    pub fn is_learning_turn(&self) -> bool {
        self.config.learning_player == Some(self.cursor.player)
    }

    /// Read-only combat snapshot.
    #[must_use]
    pub fn view(&self) -> BattleView<'_> {
        BattleView {
            board: &self.board,
            units: &self.units,
            neutrality: &self.neutrality,
        }
    }

    /// Advance the game by one unit action.
    ///
    /// On the learning seat's turns `action` decides what the active unit
    /// does; on every other turn it is ignored and the unit plays its
    /// reserved action.
    ///
    /// # Panics
    /// Panics if the game is already over. Callers must stop once a step
    /// reports `done`.
    pub fn step(&mut self, action: ActionCode) -> StepOutcome {
        assert!(self.over.is_none(), "step called on a finished game");
        self.steps += 1;

        if self.cursor.round >= self.config.max_rounds {
            let candidates: Vec<PlayerId> = (0..self.players.len()).collect();
            let reward = self.finish(&candidates, EndReason::RoundLimit);
            return StepOutcome {
                reward,
                description: "Round limit reached".to_string(),
                actor: None,
                done: true,
            };
        }

        let player = self.cursor.player;
        if self.cursor.unit_slot == 0 {
            self.neutrality.reset_row(player);
            if !self.is_learning_turn() {
                self.plan_phase(player, &HeuristicStrategy);
            }
        }

        let actor = self.active_unit();
        let (description, mut reward) = if self.is_learning_turn() {
            self.apply_code(actor, action)
        } else {
            self.apply_reservation(actor)
        };
        self.units[actor.0].last_action = Some(description.clone());

        reward += self.advance_cursor();

        StepOutcome {
            reward,
            description,
            actor: Some(actor),
            done: self.over.is_some(),
        }
    }

    /// Plan `player`'s phase with `strategy` and store the reservations.
    ///
    /// Previous reservations of that player are discarded.
    pub fn plan_phase(&mut self, player: PlayerId, strategy: &impl Strategy) {
        for unit in self.units.iter_mut().filter(|u| u.owner == player) {
            unit.reserved = None;
        }

        let capture_points: Vec<u32> = self.players.iter().map(|p| p.capture_points).collect();
        let ctx = PlanningContext {
            view: self.view(),
            player,
            capture_points: &capture_points,
            urgency_threshold: self.config.urgency_capture_threshold,
            limits: self.config.search,
        };
        let reservations = strategy.plan(&ctx);

        tracing::trace!(player, strategy = strategy.name(), count = reservations.len(), "phase planned");
        for reservation in reservations {
            self.units[reservation.unit.0].reserved = Some(reservation.action);
        }
    }

    /// Capture points every unit would hold after scoring the current
    /// positions, indexed like [`Game::units`].
    ///
    /// Pure: calling it twice without moving anything yields the same result.
    #[must_use]
    pub fn capture_scores(&self) -> Vec<u32> {
        score_capture(&self.board, &self.units, self.players.len())
    }

    /// Deterministic hash of the mutable game state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cursor.hash(&mut hasher);
        self.units.len().hash(&mut hasher);
        for unit in &self.units {
            unit.position.hash(&mut hasher);
            unit.hp.hash(&mut hasher);
            unit.extended_range.hash(&mut hasher);
            unit.capture_points.hash(&mut hasher);
            unit.reserved.hash(&mut hasher);
        }
        for player in &self.players {
            player.kill_points.hash(&mut hasher);
            player.capture_points.hash(&mut hasher);
        }
        self.neutrality.hash(&mut hasher);
        self.over.hash(&mut hasher);
        self.catapult_history.hash(&mut hasher);
        hasher.finish()
    }

    fn apply_reservation(&mut self, id: UnitId) -> (String, Reward) {
        match self.units[id.0].reserved.take() {
            Some(ReservedAction::Move(target)) => match self.try_move(id, target) {
                Ok(()) => (
                    format!("Tank moved to position {}", self.units[id.0].position),
                    Fixed::ZERO,
                ),
                Err(rejection) => {
                    tracing::debug!(unit = id.0, %rejection, "reserved move rejected");
                    (self.stay_description(id), Fixed::ZERO)
                }
            },
            Some(ReservedAction::Shoot(target)) => {
                let shot = self.units[id.0].resolve_shot(target, &self.view());
                let reward = self.apply_shot(id, &shot);
                (format!("Tank shot at {target}"), reward)
            }
            None => (self.stay_description(id), Fixed::ZERO),
        }
    }

    fn apply_code(&mut self, id: UnitId, action: ActionCode) -> (String, Reward) {
        match action {
            ActionCode::Fire => {
                let view = self.view();
                let options = self.units[id.0].fire_options(&view);
                let Some(target) = best_fire_option(&options, &view).map(|o| o.target) else {
                    return ("Nothing to shoot".to_string(), Fixed::ZERO);
                };
                let shot = self.units[id.0].resolve_shot(target, &view);
                let reward = self.apply_shot(id, &shot);
                (format!("Tank shot at {target}"), reward)
            }
            ActionCode::Move(offset) => {
                let base = Fixed::from_num(self.config.rewards.move_base);
                let unit = &self.units[id.0];
                let length = offset.length();
                if length > unit.speed {
                    let rejection = MoveRejection::TooFar {
                        length,
                        speed: unit.speed,
                    };
                    tracing::debug!(unit = id.0, %rejection, "illegal move code");
                    return ("Tank didn't move, illegal action".to_string(), -base);
                }

                let before = unit.position;
                let target = before + offset;
                if let Err(rejection) = self.try_move(id, target) {
                    tracing::debug!(unit = id.0, %rejection, "move rejected");
                    return (self.stay_description(id), -base * ratio(1, 2));
                }

                let after = self.units[id.0].position;
                let closer = before.length() - after.length();
                let reward = match closer {
                    3.. => base * 10,
                    2 => base * 5,
                    1 => base * 2,
                    0 => base * ratio(1, 10),
                    _ => -base * 4,
                };
                (format!("Tank moved to position {after}"), reward)
            }
        }
    }

    fn stay_description(&self, id: UnitId) -> String {
        format!("Tank didn't move from position {}", self.units[id.0].position)
    }

    /// Validate and perform a move, applying board effects of the
    /// destination.
    fn try_move(&mut self, id: UnitId, target: HexCoord) -> std::result::Result<(), MoveRejection> {
        let unit = &self.units[id.0];
        if !self.board.in_bounds(target) {
            return Err(MoveRejection::OutOfBounds(target));
        }
        if self.board.is_obstacle(target) {
            return Err(MoveRejection::Obstacle(target));
        }
        let occupied: HashSet<HexCoord> = self
            .units
            .iter()
            .filter(|u| u.id != id)
            .map(|u| u.position)
            .collect();
        if occupied.contains(&target) {
            return Err(MoveRejection::Occupied(target));
        }
        let mover = Mover {
            position: unit.position,
            speed: unit.speed,
        };
        let reachable = reachable_set(mover, &self.board, &occupied, self.config.search.reachability);
        if !reachable.contains(&target) {
            return Err(MoveRejection::Unreachable(target));
        }

        let unit = &mut self.units[id.0];
        unit.position = target;
        if self.board.is_catapult(target) {
            unit.extended_range = true;
        }
        if self.board.repairs(target, unit.kind) {
            unit.hp = unit.spawn_hp;
        }
        Ok(())
    }

    /// Apply a resolved shot and return the learning seat's reward for it.
    fn apply_shot(&mut self, attacker: UnitId, shot: &ShotResolution) -> Reward {
        let owner = self.units[attacker.0].owner;
        let rewards = self.config.rewards;
        let learning = self.config.learning_player == Some(owner);
        let mut reward = Fixed::ZERO;

        for hit in &shot.hits {
            self.units[hit.unit.0].hp -= hit.damage;
            self.neutrality.record_hit(owner, hit.owner);
            tracing::debug!(attacker = attacker.0, target = hit.unit.0, damage = hit.damage, "hit");
            if hit.destroys {
                self.players[owner].kill_points += hit.destruction_points;
                tracing::debug!(
                    player = owner,
                    target = hit.unit.0,
                    points = hit.destruction_points,
                    "unit destroyed"
                );
            }
            if learning {
                let value = if hit.destroys { rewards.destroying_hit } else { rewards.hit };
                reward += Fixed::from_num(value);
            }
        }

        // an area shot into an empty cell leaves the catapult state alone
        let unit = &mut self.units[attacker.0];
        if shot.hits.is_empty() && matches!(unit.kind.fire_pattern(), FirePattern::Area { .. }) {
            return reward;
        }
        if shot.from_catapult {
            self.catapult_history.push(unit.position);
        } else {
            unit.extended_range = false;
        }
        reward
    }

    /// Move the cursor past the unit that just acted, closing the phase and
    /// scoring capture after the last seat.
    fn advance_cursor(&mut self) -> Reward {
        let player = self.cursor.player;
        self.cursor.unit_slot += 1;
        if self.cursor.unit_slot < self.players[player].units.len() {
            return Fixed::ZERO;
        }

        self.cursor.unit_slot = 0;
        self.cursor.round += 1;
        self.respawn_destroyed();

        let mut reward = Fixed::ZERO;
        if player + 1 == self.players.len() {
            reward += self.close_round();
        }
        self.cursor.player = (player + 1) % self.players.len();
        reward
    }

    fn respawn_destroyed(&mut self) {
        for unit in self.units.iter_mut().filter(|u| u.is_destroyed()) {
            tracing::debug!(unit = unit.id.0, spawn = %unit.spawn_position, "respawn");
            unit.respawn();
        }
    }

    /// Score capture points, then check the capture win.
    fn close_round(&mut self) -> Reward {
        let scores = self.capture_scores();
        let learning = self.config.learning_player;
        let mut scoring_units = 0;
        for (unit, score) in self.units.iter_mut().zip(scores) {
            if score > unit.capture_points && Some(unit.owner) == learning {
                scoring_units += 1;
            }
            unit.capture_points = score;
        }
        for player in &mut self.players {
            player.capture_points = player
                .units
                .iter()
                .map(|id| self.units[id.0].capture_points)
                .sum();
        }

        tracing::debug!(
            round = self.cursor.round,
            capture = ?self.players.iter().map(|p| p.capture_points).collect::<Vec<_>>(),
            kills = ?self.players.iter().map(|p| p.kill_points).collect::<Vec<_>>(),
            "round closed"
        );

        let mut reward = Fixed::from_num(self.config.rewards.capture * scoring_units);
        let threshold = self.config.capture_points_to_win;
        let winners: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.capture_points >= threshold)
            .map(|p| p.id)
            .collect();
        if !winners.is_empty() {
            reward += self.finish(&winners, EndReason::Capture);
        }
        reward
    }

    /// End the game among `candidates`: strict maximum of kill points wins,
    /// a shared maximum is a draw between those players.
    fn finish(&mut self, candidates: &[PlayerId], reason: EndReason) -> Reward {
        let best = candidates
            .iter()
            .map(|&p| self.players[p].kill_points)
            .max()
            .unwrap_or(0);
        let top: Vec<PlayerId> = candidates
            .iter()
            .copied()
            .filter(|&p| self.players[p].kill_points == best)
            .collect();
        let outcome = match top.as_slice() {
            [winner] => GameOutcome::Winner(*winner),
            _ => GameOutcome::Draw(top),
        };

        tracing::info!(?outcome, ?reason, round = self.cursor.round, "game over");

        let rewards = self.config.rewards;
        let reward = match (self.config.learning_player, &outcome) {
            (None, _) => 0,
            (Some(seat), GameOutcome::Winner(w)) => {
                if *w == seat {
                    rewards.win
                } else {
                    -rewards.win
                }
            }
            (Some(seat), GameOutcome::Draw(drawn)) => {
                if drawn.contains(&seat) {
                    rewards.draw
                } else {
                    -rewards.draw
                }
            }
        };

        self.over = Some(GameOver {
            outcome,
            reason,
            round: self.cursor.round,
        });
        Fixed::from_num(reward)
    }
}

/// Capture points each unit holds after one round of scoring.
///
/// Units outside the zone drop to zero. Units inside gain a point unless
/// every player has a unit in the zone, in which case they keep what they
/// have. Destroyed units are ignored when deciding whether the zone is
/// contested.
#[must_use]
pub fn score_capture(board: &Board, units: &[Unit], player_count: usize) -> Vec<u32> {
    let present: HashSet<PlayerId> = units
        .iter()
        .filter(|u| !u.is_destroyed() && board.in_capture_zone(u.position))
        .map(|u| u.owner)
        .collect();
    let contested = present.len() >= player_count;

    units
        .iter()
        .map(|u| {
            if !board.in_capture_zone(u.position) {
                0
            } else if contested {
                u.capture_points
            } else {
                u.capture_points + 1
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapLayout, ObstacleLayout};
    use crate::unit::UnitKind;

    fn open_config(players: usize, learning: Option<PlayerId>) -> GameConfig {
        let mut config = GameConfig {
            learning_player: learning,
            map: MapLayout {
                obstacles: ObstacleLayout::Open,
                ..MapLayout::default()
            },
            ..GameConfig::default()
        };
        config.players.truncate(players);
        config
    }

    fn deploy(raw: &[(UnitKind, (i32, i32))]) -> Vec<Deployment> {
        raw.iter()
            .map(|&(kind, at)| Deployment::new(kind, HexCoord::from(at)))
            .collect()
    }

    #[test]
    fn test_new_game_uses_standard_placement() {
        let game = Game::new(GameConfig::default()).unwrap();
        assert_eq!(game.units().len(), 15);
        assert_eq!(game.players().len(), 3);
        assert_eq!(game.unit(UnitId(0)).position, HexCoord::new(10, -7));
        assert_eq!(game.cursor(), TurnCursor::default());
        assert!(!game.is_over());
    }

    #[test]
    fn test_rejects_bad_rosters() {
        let config = open_config(2, None);
        assert!(Game::with_deployments(config.clone(), vec![deploy(&[])]).is_err());
        let clash = deploy(&[(UnitKind::Spg, (5, 0))]);
        assert!(Game::with_deployments(config.clone(), vec![clash.clone(), clash]).is_err());
        let off_map = deploy(&[(UnitKind::Spg, (11, 0))]);
        let fine = deploy(&[(UnitKind::Spg, (-5, 0))]);
        assert!(Game::with_deployments(config, vec![off_map, fine]).is_err());
    }

    #[test]
    fn test_cursor_walks_rosters_and_rounds() {
        let config = open_config(2, None);
        let rosters = vec![
            deploy(&[(UnitKind::HeavyTank, (9, 0)), (UnitKind::HeavyTank, (9, -1))]),
            deploy(&[(UnitKind::HeavyTank, (-9, 0))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        game.step(ActionCode::Fire);
        assert_eq!(game.cursor(), TurnCursor { player: 0, unit_slot: 1, round: 0 });
        game.step(ActionCode::Fire);
        assert_eq!(game.cursor(), TurnCursor { player: 1, unit_slot: 0, round: 1 });
        game.step(ActionCode::Fire);
        assert_eq!(game.cursor(), TurnCursor { player: 0, unit_slot: 0, round: 2 });
    }

    #[test]
    fn test_round_cap_counts_player_phases() {
        let mut config = GameConfig::default();
        config.max_rounds = 1;
        let mut game = Game::new(config).unwrap();

        let mut steps = 0;
        loop {
            steps += 1;
            if game.step(ActionCode::Fire).done {
                break;
            }
        }
        // first seat's five units, then the cap step
        assert_eq!(steps, 6);
        let over = game.game_over().unwrap();
        assert_eq!(over.reason, EndReason::RoundLimit);
        assert_eq!(over.round, 1);
        // no seat finished a full round, so nothing was scored
        assert!(game.players().iter().all(|p| p.capture_points == 0));
    }

    #[test]
    fn test_learning_move_rewards() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::LightTank, (8, 0))]),
            deploy(&[(UnitKind::Spg, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        // three closer
        let out = game.step(ActionCode::Move(HexCoord::new(-3, 0)));
        assert_eq!(out.reward, Fixed::from_num(20));
        assert_eq!(out.description, "Tank moved to position (5, 0)");
        assert_eq!(out.actor, Some(UnitId(0)));

        game.step(ActionCode::Fire);

        // sideways keeps the distance
        let out = game.step(ActionCode::Move(HexCoord::new(0, -1)));
        assert_eq!(out.reward, Fixed::from_num(2) * ratio(1, 10));

        game.step(ActionCode::Fire);

        // farther
        let out = game.step(ActionCode::Move(HexCoord::new(1, 0)));
        assert_eq!(out.reward, Fixed::from_num(-8));
    }

    #[test]
    fn test_illegal_and_rejected_moves() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::HeavyTank, (10, -5))]),
            deploy(&[(UnitKind::Spg, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        // heavy has speed 1
        let out = game.step(ActionCode::Move(HexCoord::new(-2, 0)));
        assert_eq!(out.reward, Fixed::from_num(-2));
        assert_eq!(out.description, "Tank didn't move, illegal action");

        game.step(ActionCode::Fire);

        // off the map
        let out = game.step(ActionCode::Move(HexCoord::new(1, 0)));
        assert_eq!(out.reward, Fixed::from_num(-1));
        assert_eq!(out.description, "Tank didn't move from position (10, -5)");
        assert_eq!(game.unit(UnitId(0)).position, HexCoord::new(10, -5));
    }

    #[test]
    fn test_nothing_to_shoot() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::Spg, (9, 0))]),
            deploy(&[(UnitKind::Spg, (-9, 0))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();
        let out = game.step(ActionCode::Fire);
        assert_eq!(out.description, "Nothing to shoot");
        assert_eq!(out.reward, Fixed::ZERO);
    }

    #[test]
    fn test_learning_fire_scores_hits_and_kills() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::TankDestroyer, (5, 0))]),
            deploy(&[(UnitKind::LightTank, (4, 0)), (UnitKind::MediumTank, (3, 0))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        let out = game.step(ActionCode::Fire);
        assert_eq!(out.description, "Tank shot at (4, 0)");
        // light destroyed (20) and medium damaged (8)
        assert_eq!(out.reward, Fixed::from_num(28));
        assert_eq!(game.players()[0].kill_points, 1);
        assert!(game.neutrality().get(0, 1));
        // respawned when the phase ended
        assert_eq!(game.unit(UnitId(1)).hp, 1);
        assert_eq!(game.unit(UnitId(1)).position, HexCoord::new(4, 0));
        assert_eq!(game.unit(UnitId(2)).hp, 1);
    }

    #[test]
    fn test_catapult_grants_and_keeps_range() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::Spg, (3, 2))]),
            deploy(&[(UnitKind::HeavyTank, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        game.step(ActionCode::Move(HexCoord::new(0, 1)));
        assert_eq!(game.unit(UnitId(0)).position, HexCoord::new(3, 3));
        assert!(game.unit(UnitId(0)).extended_range);
    }

    #[test]
    fn test_area_shot_into_empty_cell_keeps_catapult_state() {
        let config = open_config(2, None);
        let rosters = vec![
            deploy(&[(UnitKind::Spg, (3, 3)), (UnitKind::LightTank, (6, 0))]),
            deploy(&[(UnitKind::HeavyTank, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();
        game.units[0].extended_range = true;
        game.units[1].extended_range = true;

        // on the catapult, nothing in the blast cell
        let shot = game.unit(UnitId(0)).resolve_shot(HexCoord::new(3, 0), &game.view());
        assert!(shot.hits.is_empty());
        assert!(shot.from_catapult);
        game.apply_shot(UnitId(0), &shot);
        assert!(game.catapult_history().is_empty());
        assert!(game.unit(UnitId(0)).extended_range);

        // off the catapult, a miss keeps the flag too
        let shot = game.unit(UnitId(1)).resolve_shot(HexCoord::new(4, 0), &game.view());
        assert!(shot.hits.is_empty());
        game.apply_shot(UnitId(1), &shot);
        assert!(game.unit(UnitId(1)).extended_range);
    }

    #[test]
    fn test_ray_shot_clears_range_even_when_it_misses() {
        let config = open_config(2, None);
        let rosters = vec![
            deploy(&[(UnitKind::TankDestroyer, (6, 0))]),
            deploy(&[(UnitKind::HeavyTank, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();
        game.units[0].extended_range = true;

        let shot = game.unit(UnitId(0)).resolve_shot(HexCoord::new(5, 0), &game.view());
        assert!(shot.hits.is_empty());
        game.apply_shot(UnitId(0), &shot);
        assert!(!game.unit(UnitId(0)).extended_range);
    }

    #[test]
    fn test_repair_station_heals_compatible_kind() {
        let config = open_config(2, Some(0));
        let rosters = vec![
            deploy(&[(UnitKind::HeavyTank, (-2, -1))]),
            deploy(&[(UnitKind::Spg, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();
        game.units[0].hp = 1;

        game.step(ActionCode::Move(HexCoord::new(0, -1)));
        assert_eq!(game.unit(UnitId(0)).position, HexCoord::new(-2, -2));
        assert_eq!(game.unit(UnitId(0)).hp, 3);
    }

    #[test]
    fn test_capture_scoring_is_pure_and_contested() {
        let board = Board::default();
        let mut units = vec![
            Unit::new(UnitId(0), UnitKind::Spg, 0, 0, HexCoord::new(0, 0)),
            Unit::new(UnitId(1), UnitKind::Spg, 1, 0, HexCoord::new(1, 0)),
            Unit::new(UnitId(2), UnitKind::Spg, 2, 0, HexCoord::new(6, 0)),
        ];
        units[0].capture_points = 2;
        units[2].capture_points = 4;

        let first = score_capture(&board, &units, 3);
        assert_eq!(first, score_capture(&board, &units, 3));
        assert_eq!(first, vec![3, 1, 0]);

        // all three present: nobody scores, nobody resets
        units[2].position = HexCoord::new(0, 1);
        assert_eq!(score_capture(&board, &units, 3), vec![2, 0, 4]);
    }

    #[test]
    fn test_capture_win_ends_game() {
        let mut config = open_config(2, Some(0));
        config.capture_points_to_win = 2;
        let rosters = vec![
            deploy(&[(UnitKind::HeavyTank, (0, 0))]),
            deploy(&[(UnitKind::Spg, (-9, 9))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();

        // hold the zone: heavy cannot reach anything, so firing is a no-op
        let mut total = Fixed::ZERO;
        let mut last = None;
        while !game.is_over() {
            let out = game.step(ActionCode::Fire);
            total += out.reward;
            last = Some(out);
        }
        let last = last.unwrap();
        assert!(last.done);
        assert_eq!(
            game.game_over().unwrap(),
            &GameOver {
                outcome: GameOutcome::Winner(0),
                reason: EndReason::Capture,
                round: 4,
            }
        );
        // two capture rewards plus the win
        assert_eq!(total, Fixed::from_num(30 + 30 + 400));
    }

    #[test]
    fn test_round_limit_draw_on_equal_kills() {
        let mut config = open_config(2, Some(1));
        config.max_rounds = 2;
        let rosters = vec![
            deploy(&[(UnitKind::HeavyTank, (9, 0))]),
            deploy(&[(UnitKind::HeavyTank, (-9, 0))]),
        ];
        let mut game = Game::with_deployments(config, rosters).unwrap();
        game.step(ActionCode::Fire);
        game.step(ActionCode::Fire);
        assert!(!game.is_over());

        let out = game.step(ActionCode::Fire);
        assert!(out.done);
        assert_eq!(out.actor, None);
        assert_eq!(out.reward, Fixed::from_num(200));
        assert_eq!(
            game.game_over().unwrap().outcome,
            GameOutcome::Draw(vec![0, 1])
        );
    }

    #[test]
    #[should_panic(expected = "finished game")]
    fn test_step_after_game_over_panics() {
        let mut config = open_config(2, None);
        config.max_rounds = 1;
        let mut game = Game::new(config).unwrap();
        while !game.step(ActionCode::Fire).done {}
        game.step(ActionCode::Fire);
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let game = Game::new(GameConfig::default()).unwrap();
        let copy = game.clone();
        assert_eq!(game.state_hash(), copy.state_hash());

        let mut moved = game.clone();
        moved.step(ActionCode::Fire);
        assert_ne!(game.state_hash(), moved.state_hash());
    }
}
