//! Fire resolution: threatened cells, target legality and shot outcomes.
//!
//! Everything here is a pure function of a read-only [`BattleView`]. The
//! simulation applies the returned [`ShotResolution`]; nothing in this
//! module mutates units or scores.
//!
//! Two fire patterns exist:
//! - **Area** units threaten a single ring and hit whatever enemy stands in
//!   the chosen cell. Obstacles do not block them.
//! - **Ray** units threaten the six hex axes. A ray stops before the first
//!   obstacle, and a shot down a ray hits every eligible enemy on it.
//!
//! Target legality within a round is gated by the [`NeutralityMatrix`].

use serde::{Deserialize, Serialize};

use crate::hex::{HexCoord, DIRECTIONS};
use crate::map::Board;
use crate::unit::{FirePattern, PlayerId, Unit, UnitId};

/// Per-round record of which player has struck which.
///
/// `get(a, t)` is true once player `a` damaged player `t` this round. Row
/// `a` is cleared when player `a` starts its phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeutralityMatrix {
    size: usize,
    flags: Vec<bool>,
}

impl NeutralityMatrix {
    /// All-clear matrix for `players` players.
    #[must_use]
    pub fn new(players: usize) -> Self {
        Self {
            size: players,
            flags: vec![false; players * players],
        }
    }

    /// Number of players.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether `attacker` has struck `target` this round.
    #[must_use]
    pub fn get(&self, attacker: PlayerId, target: PlayerId) -> bool {
        self.flags[attacker * self.size + target]
    }

    /// Mark that `attacker` damaged `target`.
    pub fn record_hit(&mut self, attacker: PlayerId, target: PlayerId) {
        self.flags[attacker * self.size + target] = true;
    }

    /// Forget everything `player` struck.
    pub fn reset_row(&mut self, player: PlayerId) {
        let start = player * self.size;
        self.flags[start..start + self.size].fill(false);
    }

    /// Whether anyone has struck `target` this round.
    #[must_use]
    pub fn was_struck(&self, target: PlayerId) -> bool {
        (0..self.size).any(|attacker| self.get(attacker, target))
    }

    /// Neutrality predicate.
    ///
    /// Retaliation is always legal (the target struck the attacker this
    /// round), and so is a first strike on a target nobody has struck yet.
    /// Joining someone else's engagement is not.
    #[must_use]
    pub fn may_fire(&self, attacker: PlayerId, target: PlayerId) -> bool {
        self.get(target, attacker) || !self.was_struck(target)
    }

    /// Row-major 0/1 flags.
    #[must_use]
    pub fn flattened(&self) -> Vec<u8> {
        self.flags.iter().map(|&f| u8::from(f)).collect()
    }
}

/// Read-only snapshot combat resolves against.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    /// Static layout.
    pub board: &'a Board,
    /// Every unit, indexed by [`UnitId`].
    pub units: &'a [Unit],
    /// Engagements of the current round.
    pub neutrality: &'a NeutralityMatrix,
}

impl BattleView<'_> {
    /// Living units standing on `cell`.
    pub fn units_at(&self, cell: HexCoord) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .filter(move |u| u.position == cell && !u.is_destroyed())
    }

    /// Whether `attacker` may hit `target` right now.
    #[must_use]
    pub fn is_legal_target(&self, attacker: &Unit, target: &Unit) -> bool {
        target.owner != attacker.owner
            && !target.is_destroyed()
            && self.neutrality.may_fire(attacker.owner, target.owner)
    }
}

/// A cell a unit could fire at and the units that shot would hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireOption {
    /// Cell to fire at.
    pub target: HexCoord,
    /// Units hit, in ray or scan order.
    pub hits: Vec<UnitId>,
}

/// Damage dealt to one unit by a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// Unit hit.
    pub unit: UnitId,
    /// Its owner.
    pub owner: PlayerId,
    /// Hit points removed.
    pub damage: i32,
    /// Whether this hit destroys the unit.
    pub destroys: bool,
    /// Kill points awarded when it does.
    pub destruction_points: u32,
}

/// Outcome of firing at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotResolution {
    /// Cell fired at.
    pub target: HexCoord,
    /// Units hit.
    pub hits: Vec<Hit>,
    /// Whether the shooter fired from a catapult.
    pub from_catapult: bool,
}

/// Shared fire interface over the closed set of unit kinds.
pub trait FireControl {
    /// Cells this unit threatens from where it stands.
    fn threatened_cells(&self, board: &Board) -> Vec<HexCoord>;

    /// Every legal shot with at least one hit.
    fn fire_options(&self, view: &BattleView<'_>) -> Vec<FireOption>;

    /// Resolve a shot at `target`. Cells outside the threatened set, and
    /// cells shadowed by an obstacle, produce no hits.
    fn resolve_shot(&self, target: HexCoord, view: &BattleView<'_>) -> ShotResolution;
}

impl FireControl for Unit {
    fn threatened_cells(&self, board: &Board) -> Vec<HexCoord> {
        match self.kind.fire_pattern() {
            FirePattern::Area { reach } => {
                let mut cells = self.position.ring(reach);
                if self.extended_range {
                    cells.extend(self.position.ring(reach + 1));
                }
                cells
            }
            FirePattern::Ray { .. } => self.rays(board).into_iter().flatten().collect(),
        }
    }

    fn fire_options(&self, view: &BattleView<'_>) -> Vec<FireOption> {
        match self.kind.fire_pattern() {
            FirePattern::Area { .. } => self
                .threatened_cells(view.board)
                .into_iter()
                .filter_map(|cell| {
                    let hits = self.area_hits(cell, view);
                    (!hits.is_empty()).then_some(FireOption { target: cell, hits })
                })
                .collect(),
            FirePattern::Ray { .. } => self
                .rays(view.board)
                .into_iter()
                .filter_map(|ray| {
                    let hits = self.ray_hits(&ray, view);
                    let target = *ray.first()?;
                    (!hits.is_empty()).then_some(FireOption { target, hits })
                })
                .collect(),
        }
    }

    fn resolve_shot(&self, target: HexCoord, view: &BattleView<'_>) -> ShotResolution {
        let hit_ids = match self.kind.fire_pattern() {
            FirePattern::Area { .. } => {
                if self.threatened_cells(view.board).contains(&target) {
                    self.area_hits(target, view)
                } else {
                    Vec::new()
                }
            }
            FirePattern::Ray { .. } => self
                .rays(view.board)
                .into_iter()
                .find(|ray| ray.contains(&target))
                .map(|ray| self.ray_hits(&ray, view))
                .unwrap_or_default(),
        };

        let hits = hit_ids
            .into_iter()
            .map(|id| {
                let victim = &view.units[id.0];
                Hit {
                    unit: id,
                    owner: victim.owner,
                    damage: self.damage,
                    destroys: victim.hp > 0 && victim.hp - self.damage <= 0,
                    destruction_points: victim.destruction_points,
                }
            })
            .collect();

        ShotResolution {
            target,
            hits,
            from_catapult: view.board.is_catapult(self.position),
        }
    }
}

impl Unit {
    /// The six axis rays, each truncated before its first obstacle.
    fn rays(&self, board: &Board) -> Vec<Vec<HexCoord>> {
        let FirePattern::Ray { length } = self.kind.fire_pattern() else {
            return Vec::new();
        };
        let length = if self.extended_range { length + 1 } else { length };

        DIRECTIONS
            .iter()
            .map(|&direction| {
                (1..=length)
                    .map(|step| self.position + direction * step)
                    .take_while(|&cell| !board.is_obstacle(cell))
                    .collect()
            })
            .collect()
    }

    fn area_hits(&self, cell: HexCoord, view: &BattleView<'_>) -> Vec<UnitId> {
        view.units_at(cell)
            .filter(|target| view.is_legal_target(self, target))
            .map(|target| target.id)
            .collect()
    }

    fn ray_hits(&self, ray: &[HexCoord], view: &BattleView<'_>) -> Vec<UnitId> {
        ray.iter()
            .flat_map(|&cell| view.units_at(cell))
            .filter(|target| view.is_legal_target(self, target))
            .map(|target| target.id)
            .collect()
    }
}

/// Cells an enemy is considered dangerous on when planning approach moves.
///
/// Area units project the outer band of their range disc; ray units
/// project their truncated rays.
#[must_use]
pub fn threat_footprint(unit: &Unit, board: &Board) -> Vec<HexCoord> {
    match unit.kind.fire_pattern() {
        FirePattern::Area { .. } => unit.position.tiles_in_radius_at_least(unit.shooting_range),
        FirePattern::Ray { .. } => unit.threatened_cells(board),
    }
}

/// Pick the preferred shot among `options`.
///
/// A shot hitting several enemies wins outright (first such option).
/// Otherwise targets inside the capture zone beat targets outside it, and
/// lower hit points beat higher; earlier options win ties.
#[must_use]
pub fn best_fire_option<'o>(
    options: &'o [FireOption],
    view: &BattleView<'_>,
) -> Option<&'o FireOption> {
    if let Some(multi) = options.iter().find(|o| o.hits.len() > 1) {
        return Some(multi);
    }

    let rank = |option: &FireOption| {
        let target = &view.units[option.hits[0].0];
        (view.board.in_capture_zone(target.position), -target.hp)
    };

    let mut best: Option<&FireOption> = None;
    for option in options.iter().filter(|o| !o.hits.is_empty()) {
        match best {
            Some(current) if rank(option) <= rank(current) => {}
            _ => best = Some(option),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MapLayout, ObstacleLayout};
    use crate::unit::UnitKind;

    fn board_with(obstacles: &[(i32, i32)]) -> Board {
        Board::new(MapLayout {
            obstacles: ObstacleLayout::Custom(
                obstacles.iter().copied().map(HexCoord::from).collect(),
            ),
            ..MapLayout::default()
        })
    }

    fn unit(id: usize, kind: UnitKind, owner: PlayerId, at: (i32, i32)) -> Unit {
        Unit::new(UnitId(id), kind, owner, id, HexCoord::from(at))
    }

    #[test]
    fn test_neutrality_first_strike_is_free() {
        let matrix = NeutralityMatrix::new(3);
        for a in 0..3 {
            for t in 0..3 {
                assert!(matrix.may_fire(a, t));
            }
        }
    }

    #[test]
    fn test_neutrality_retaliation_and_claims() {
        let mut matrix = NeutralityMatrix::new(3);
        // A (0) hits B (1)
        matrix.record_hit(0, 1);

        // B may retaliate against A
        assert!(matrix.may_fire(1, 0));
        // C (2) may not pile onto B
        assert!(!matrix.may_fire(2, 1));
        // B is already struck and has not struck A, so A waits too
        assert!(!matrix.may_fire(0, 1));

        // C mid-engagement elsewhere does not stop B retaliating
        matrix.record_hit(2, 0);
        assert!(matrix.may_fire(1, 0));

        // Once B strikes C, C may fire back at B
        matrix.record_hit(1, 2);
        assert!(matrix.may_fire(2, 1));
    }

    #[test]
    fn test_neutrality_row_reset() {
        let mut matrix = NeutralityMatrix::new(3);
        matrix.record_hit(0, 1);
        matrix.record_hit(2, 1);
        matrix.reset_row(0);
        assert!(!matrix.get(0, 1));
        assert!(matrix.get(2, 1));
        assert_eq!(matrix.flattened(), vec![0, 0, 0, 0, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn test_area_threat_is_a_ring() {
        let board = Board::default();
        let spg = unit(0, UnitKind::Spg, 0, (0, 0));
        let cells = spg.threatened_cells(&board);
        assert_eq!(cells.len(), 18);
        assert!(cells.iter().all(|c| c.length() == 3));
    }

    #[test]
    fn test_heavy_tank_threatens_one_past_range() {
        let board = Board::default();
        let mut heavy = unit(0, UnitKind::HeavyTank, 0, (0, 0));
        assert!(heavy.threatened_cells(&board).iter().all(|c| c.length() == 2));

        heavy.extended_range = true;
        let cells = heavy.threatened_cells(&board);
        assert_eq!(cells.len(), 12 + 18);
        assert!(cells.iter().any(|c| c.length() == 3));
    }

    #[test]
    fn test_extended_range_adds_outer_ring() {
        let board = Board::default();
        let mut medium = unit(0, UnitKind::MediumTank, 0, (0, 0));
        medium.extended_range = true;
        assert_eq!(medium.threatened_cells(&board).len(), 12 + 18);
    }

    #[test]
    fn test_area_shot_hits_enemy_in_cell() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::LightTank, 0, (0, 0)),
            unit(1, UnitKind::MediumTank, 1, (2, 0)),
            unit(2, UnitKind::MediumTank, 0, (0, 2)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };

        let options = units[0].fire_options(&view);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].target, HexCoord::new(2, 0));

        let shot = units[0].resolve_shot(HexCoord::new(2, 0), &view);
        assert_eq!(shot.hits.len(), 1);
        assert_eq!(shot.hits[0].unit, UnitId(1));
        assert!(!shot.hits[0].destroys);

        // friendly cell yields nothing
        let shot = units[0].resolve_shot(HexCoord::new(0, 2), &view);
        assert!(shot.hits.is_empty());
    }

    #[test]
    fn test_area_shot_outside_ring_misses() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::LightTank, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (1, 0)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        assert!(units[0].resolve_shot(HexCoord::new(1, 0), &view).hits.is_empty());
    }

    #[test]
    fn test_ray_truncated_by_obstacle() {
        // obstacle at distance 2 east of the destroyer
        let board = board_with(&[(2, 0)]);
        let units = vec![
            unit(0, UnitKind::TankDestroyer, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (3, 0)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };

        let shot = units[0].resolve_shot(HexCoord::new(3, 0), &view);
        assert!(shot.hits.is_empty());
        assert!(units[0].fire_options(&view).is_empty());
        assert!(!units[0].threatened_cells(&board).contains(&HexCoord::new(2, 0)));
    }

    #[test]
    fn test_ray_hits_before_obstacle() {
        let board = board_with(&[(2, 0)]);
        let units = vec![
            unit(0, UnitKind::TankDestroyer, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (1, 0)),
            unit(2, UnitKind::LightTank, 1, (3, 0)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };

        let shot = units[0].resolve_shot(HexCoord::new(1, 0), &view);
        let hit: Vec<_> = shot.hits.iter().map(|h| h.unit).collect();
        assert_eq!(hit, vec![UnitId(1)]);
    }

    #[test]
    fn test_ray_pierces_every_enemy() {
        let board = board_with(&[]);
        let units = vec![
            unit(0, UnitKind::TankDestroyer, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (0, -1)),
            unit(2, UnitKind::HeavyTank, 2, (0, -3)),
            unit(3, UnitKind::Spg, 0, (0, -2)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };

        // aiming anywhere on the ray hits both enemies, not the friendly
        let shot = units[0].resolve_shot(HexCoord::new(0, -3), &view);
        let hit: Vec<_> = shot.hits.iter().map(|h| h.unit).collect();
        assert_eq!(hit, vec![UnitId(1), UnitId(2)]);

        let options = units[0].fire_options(&view);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].target, HexCoord::new(0, -1));
        assert_eq!(options[0].hits.len(), 2);
    }

    #[test]
    fn test_ray_length_grows_with_extended_range() {
        let board = board_with(&[]);
        let mut destroyer = unit(0, UnitKind::TankDestroyer, 0, (0, 0));
        assert_eq!(destroyer.threatened_cells(&board).len(), 18);
        destroyer.extended_range = true;
        assert_eq!(destroyer.threatened_cells(&board).len(), 24);
    }

    #[test]
    fn test_neutrality_gates_targets() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::LightTank, 2, (0, 0)),
            unit(1, UnitKind::MediumTank, 1, (2, 0)),
        ];
        let mut matrix = NeutralityMatrix::new(3);
        matrix.record_hit(0, 1);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        assert!(units[0].fire_options(&view).is_empty());
        assert!(units[0].resolve_shot(HexCoord::new(2, 0), &view).hits.is_empty());
    }

    #[test]
    fn test_destroyed_units_are_not_targets() {
        let board = Board::default();
        let mut units = vec![
            unit(0, UnitKind::LightTank, 0, (0, 0)),
            unit(1, UnitKind::MediumTank, 1, (2, 0)),
        ];
        units[1].hp = 0;
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        assert!(units[0].fire_options(&view).is_empty());
    }

    #[test]
    fn test_destroying_hit_is_flagged() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::Spg, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (3, 0)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        let shot = units[0].resolve_shot(HexCoord::new(3, 0), &view);
        assert!(shot.hits[0].destroys);
        assert_eq!(shot.hits[0].destruction_points, 1);
    }

    #[test]
    fn test_best_option_prefers_zone_then_low_hp() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::MediumTank, 0, (2, -2)),
            // outside the zone, 1 hp
            unit(1, UnitKind::LightTank, 1, (4, -2)),
            // inside the zone, 3 hp
            unit(2, UnitKind::HeavyTank, 2, (0, 0)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        let options = units[0].fire_options(&view);
        assert_eq!(options.len(), 2);
        let best = best_fire_option(&options, &view).unwrap();
        assert_eq!(best.hits, vec![UnitId(2)]);
    }

    #[test]
    fn test_best_option_prefers_lowest_hp_outside_zone() {
        let board = Board::default();
        let units = vec![
            unit(0, UnitKind::MediumTank, 0, (5, -5)),
            unit(1, UnitKind::HeavyTank, 1, (7, -5)),
            unit(2, UnitKind::LightTank, 2, (3, -5)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        let options = units[0].fire_options(&view);
        let best = best_fire_option(&options, &view).unwrap();
        assert_eq!(best.hits, vec![UnitId(2)]);
    }

    #[test]
    fn test_best_option_prefers_multi_hit() {
        let board = board_with(&[]);
        let units = vec![
            unit(0, UnitKind::TankDestroyer, 0, (0, 0)),
            unit(1, UnitKind::LightTank, 1, (1, 0)),
            unit(2, UnitKind::HeavyTank, 1, (0, -1)),
            unit(3, UnitKind::HeavyTank, 2, (0, -2)),
        ];
        let matrix = NeutralityMatrix::new(3);
        let view = BattleView {
            board: &board,
            units: &units,
            neutrality: &matrix,
        };
        let options = units[0].fire_options(&view);
        let best = best_fire_option(&options, &view).unwrap();
        assert_eq!(best.hits.len(), 2);
    }

    #[test]
    fn test_threat_footprint_by_pattern() {
        let board = board_with(&[]);
        let spg = unit(0, UnitKind::Spg, 0, (0, 0));
        // range 3 band covers distances 2 and 3
        assert_eq!(threat_footprint(&spg, &board).len(), 30);

        let destroyer = unit(1, UnitKind::TankDestroyer, 0, (0, 0));
        assert_eq!(threat_footprint(&destroyer, &board).len(), 18);
    }
}
