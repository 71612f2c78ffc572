//! Per-round decision making for non-learning seats.
//!
//! A strategy sees a read-only snapshot when a player's phase begins and
//! returns one [`Reservation`] per unit that should do something this
//! round. The simulation stores the reservations and plays them out one
//! unit per step; units without a reservation hold position.

use std::collections::HashSet;

use tracing::trace;

use crate::combat::{best_fire_option, threat_footprint, BattleView, FireControl};
use crate::hex::HexCoord;
use crate::pathfinding::{shortest_path_multi_goal, Mover, SearchLimits};
use crate::unit::{PlayerId, ReservedAction, Unit, UnitId};

/// Everything a strategy may look at when planning.
#[derive(Debug, Clone, Copy)]
pub struct PlanningContext<'a> {
    /// Board, units and neutrality at the start of the phase.
    pub view: BattleView<'a>,
    /// Player being planned for.
    pub player: PlayerId,
    /// Current capture points of every player.
    pub capture_points: &'a [u32],
    /// Capture points at which fire avoidance is dropped.
    pub urgency_threshold: u32,
    /// Search iteration caps.
    pub limits: SearchLimits,
}

impl PlanningContext<'_> {
    /// The planned player's units in roster order.
    pub fn own_units(&self) -> impl Iterator<Item = &Unit> {
        let player = self.player;
        self.view.units.iter().filter(move |u| u.owner == player)
    }

    /// Whether any player is close enough to winning that caution is
    /// abandoned.
    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.capture_points
            .iter()
            .any(|&points| points >= self.urgency_threshold)
    }
}

/// A unit's command for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Unit that will act.
    pub unit: UnitId,
    /// What it will do.
    pub action: ReservedAction,
}

/// A per-round decision policy.
pub trait Strategy {
    /// Short identifier for logs and reports.
    fn name(&self) -> &'static str;

    /// Decide this round's actions for `ctx.player`.
    fn plan(&self, ctx: &PlanningContext<'_>) -> Vec<Reservation>;
}

/// The baseline policy: shoot what you can, otherwise head for the zone.
///
/// 1. Every unit with a legal target reserves its preferred shot (see
///    [`best_fire_option`]).
/// 2. Every remaining unit outside the capture zone reserves the first step
///    of the shortest route into it. Cells the enemy can fire on within the
///    unit's movement disc are avoided unless the game is urgent, and cells
///    already claimed by a teammate's move are always avoided.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl Strategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn plan(&self, ctx: &PlanningContext<'_>) -> Vec<Reservation> {
        let view = &ctx.view;
        let mut reservations = Vec::new();
        let mut shooters = HashSet::new();

        for unit in ctx.own_units().filter(|u| !u.is_destroyed()) {
            let options = unit.fire_options(view);
            if let Some(option) = best_fire_option(&options, view) {
                trace!(unit = unit.id.0, target = %option.target, hits = option.hits.len(), "reserve shot");
                shooters.insert(unit.id);
                reservations.push(Reservation {
                    unit: unit.id,
                    action: ReservedAction::Shoot(option.target),
                });
            }
        }

        let goals: HashSet<HexCoord> = view.board.capture_zone().iter().copied().collect();
        let occupied: HashSet<HexCoord> = view.units.iter().map(|u| u.position).collect();
        let enemy_fire: HashSet<HexCoord> = if ctx.is_urgent() {
            HashSet::new()
        } else {
            view.units
                .iter()
                .filter(|u| u.owner != ctx.player && !u.is_destroyed())
                .flat_map(|u| threat_footprint(u, view.board))
                .collect()
        };
        let mut claimed: Vec<HexCoord> = Vec::new();

        for unit in ctx.own_units() {
            if unit.is_destroyed()
                || shooters.contains(&unit.id)
                || view.board.in_capture_zone(unit.position)
            {
                continue;
            }

            let mut avoid: HashSet<HexCoord> = unit
                .position
                .tiles_in_radius_inclusive(unit.speed)
                .into_iter()
                .filter(|cell| enemy_fire.contains(cell))
                .collect();
            avoid.extend(claimed.iter().copied());

            let mover = Mover {
                position: unit.position,
                speed: unit.speed,
            };
            let path = shortest_path_multi_goal(
                mover,
                &goals,
                view.board,
                &occupied,
                &avoid,
                ctx.limits.multi_goal,
            );
            if let Some(&step) = path.as_ref().and_then(|p| p.get(1)) {
                trace!(unit = unit.id.0, to = %step, "reserve move");
                claimed.push(step);
                reservations.push(Reservation {
                    unit: unit.id,
                    action: ReservedAction::Move(step),
                });
            }
        }

        reservations
    }
}
