//! Standard unit placement along the map edges.
//!
//! Each player gets the middle stretch of one map edge, inset from both
//! corners so the three deployment zones never touch. Cells are visited in
//! a fixed q-major order and filled with the roster in [`UnitKind::ROSTER`]
//! order, so placement is fully deterministic.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::HexCoord;
use crate::map::Board;
use crate::unit::{PlayerId, UnitKind};

/// Smallest map radius whose edges hold a full roster.
pub const MIN_RADIUS: i32 = 4;

/// Number of edges the standard placement knows.
pub const EDGE_COUNT: usize = 3;

/// One unit to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deployment {
    /// Vehicle type.
    pub kind: UnitKind,
    /// Spawn and respawn cell.
    pub spawn: HexCoord,
}

impl Deployment {
    /// Create a deployment.
    #[must_use]
    pub const fn new(kind: UnitKind, spawn: HexCoord) -> Self {
        Self { kind, spawn }
    }
}

/// Distance kept from each corner of an edge.
#[must_use]
pub const fn edge_inset(radius: i32) -> i32 {
    (radius + 1 - UnitKind::ROSTER.len() as i32) / 2
}

/// Whether `cell` lies in the deployment stretch of `player`'s edge.
fn on_edge(player: PlayerId, cell: HexCoord, radius: i32) -> bool {
    let inset = edge_inset(radius);
    let within = |v: i32| inset <= v && v <= radius - inset;
    match player {
        0 => cell.q == radius && within(-cell.r),
        1 => cell.q + cell.r == -radius && within(-cell.q) && within(-cell.r),
        2 => cell.r == radius && within(-cell.q),
        _ => false,
    }
}

/// Spawn cells of each player's edge, in visit order.
///
/// Obstacle cells are skipped.
///
/// # Errors
/// Returns [`GameError::UnsupportedPlayerCount`] for more players than
/// edges.
pub fn edge_cells(board: &Board, players: usize) -> Result<Vec<Vec<HexCoord>>> {
    if players > EDGE_COUNT {
        return Err(GameError::UnsupportedPlayerCount {
            requested: players,
            min: 1,
            max: EDGE_COUNT,
        });
    }
    let radius = board.radius();
    let mut edges = vec![Vec::new(); players];
    for cell in board.cells() {
        if board.is_obstacle(cell) {
            continue;
        }
        if let Some(player) = (0..players).find(|&p| on_edge(p, cell, radius)) {
            edges[player].push(cell);
        }
    }
    Ok(edges)
}

/// The standard roster for every player: one of each kind, placed along
/// the player's edge.
///
/// # Errors
/// Returns [`GameError::UnsupportedPlayerCount`] for unsupported player
/// counts and [`GameError::InvalidConfig`] when an edge has too few open
/// cells.
pub fn standard_deployments(board: &Board, players: usize) -> Result<Vec<Vec<Deployment>>> {
    if !(2..=EDGE_COUNT).contains(&players) {
        return Err(GameError::UnsupportedPlayerCount {
            requested: players,
            min: 2,
            max: EDGE_COUNT,
        });
    }

    edge_cells(board, players)?
        .into_iter()
        .enumerate()
        .map(|(player, cells)| {
            if cells.len() < UnitKind::ROSTER.len() {
                return Err(GameError::InvalidConfig(format!(
                    "edge of player {player} has {} open cells, roster needs {}",
                    cells.len(),
                    UnitKind::ROSTER.len()
                )));
            }
            Ok(UnitKind::ROSTER
                .iter()
                .zip(cells)
                .map(|(&kind, spawn)| Deployment::new(kind, spawn))
                .collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapLayout;

    #[test]
    fn test_inset_for_default_radius() {
        assert_eq!(edge_inset(10), 3);
        assert_eq!(edge_inset(MIN_RADIUS), 0);
    }

    #[test]
    fn test_standard_layout_three_players() {
        let board = Board::default();
        let deployments = standard_deployments(&board, 3).unwrap();
        assert_eq!(deployments.len(), 3);

        let spawns: Vec<Vec<HexCoord>> = deployments
            .iter()
            .map(|d| d.iter().map(|u| u.spawn).collect())
            .collect();
        let expect = |raw: &[(i32, i32)]| -> Vec<HexCoord> {
            raw.iter().copied().map(HexCoord::from).collect()
        };

        assert_eq!(
            spawns[0],
            expect(&[(10, -7), (10, -6), (10, -5), (10, -4), (10, -3)])
        );
        assert_eq!(
            spawns[1],
            expect(&[(-7, -3), (-6, -4), (-5, -5), (-4, -6), (-3, -7)])
        );
        assert_eq!(
            spawns[2],
            expect(&[(-7, 10), (-6, 10), (-5, 10), (-4, 10), (-3, 10)])
        );

        for roster in &deployments {
            let kinds: Vec<_> = roster.iter().map(|d| d.kind).collect();
            assert_eq!(kinds, UnitKind::ROSTER.to_vec());
        }
    }

    #[test]
    fn test_two_players_use_first_edges() {
        let board = Board::default();
        let deployments = standard_deployments(&board, 2).unwrap();
        assert_eq!(deployments.len(), 2);
        assert_eq!(deployments[0][0].spawn, HexCoord::new(10, -7));
        assert_eq!(deployments[1][0].spawn, HexCoord::new(-7, -3));
    }

    #[test]
    fn test_unsupported_counts() {
        let board = Board::default();
        assert!(matches!(
            standard_deployments(&board, 1),
            Err(GameError::UnsupportedPlayerCount { requested: 1, .. })
        ));
        assert!(matches!(
            standard_deployments(&board, 4),
            Err(GameError::UnsupportedPlayerCount { requested: 4, .. })
        ));
    }

    #[test]
    fn test_spawns_are_disjoint_and_in_bounds() {
        for radius in MIN_RADIUS..=12 {
            let board = Board::new(MapLayout {
                radius,
                ..MapLayout::default()
            });
            let edges = edge_cells(&board, 3).unwrap();
            let mut all: Vec<_> = edges.iter().flatten().copied().collect();
            assert!(all.iter().all(|&c| board.in_bounds(c)));
            let before = all.len();
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), before, "radius {radius}");
        }
    }

    #[test]
    fn test_blocked_edge_is_reported() {
        let board = Board::new(MapLayout {
            obstacles: crate::map::ObstacleLayout::Custom(vec![
                HexCoord::new(10, -7),
                HexCoord::new(10, -6),
            ]),
            ..MapLayout::default()
        });
        assert!(matches!(
            standard_deployments(&board, 3),
            Err(GameError::InvalidConfig(_))
        ));
    }
}
