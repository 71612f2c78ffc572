//! Speed-bounded reachability and move-level path search on the hex grid.
//!
//! A unit's action moves it to any cell within `speed` edges. The searches
//! here treat one such action as a single edge of cost 1: a path is the
//! sequence of cells the unit stands on after each action, starting with its
//! current cell, so `path[1]` is the destination of the next move.
//!
//! Obstacles and out-of-bounds cells are impassable. Cells holding other
//! units may be crossed but never ended on. Every search caps its expansions
//! and reports "no path" when the cap is hit, so degenerate maps always
//! terminate.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::hex::HexCoord;
use crate::map::Board;

/// Iteration caps for the three searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum cells dequeued by [`reachable_set`].
    pub reachability: usize,
    /// Maximum nodes expanded by [`shortest_path_single_goal`].
    pub single_goal: usize,
    /// Maximum nodes expanded by [`shortest_path_multi_goal`].
    pub multi_goal: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            reachability: 1000,
            single_goal: 100,
            multi_goal: 500,
        }
    }
}

/// The moving unit as seen by the searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mover {
    /// Cell the unit currently stands on.
    pub position: HexCoord,
    /// Edges the unit may traverse per action.
    pub speed: i32,
}

/// A node in the open-set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct SearchNode {
    cell: HexCoord,
    /// g for Dijkstra, g + h for A*.
    priority: i32,
    /// Insertion counter; equal priorities pop in insertion order.
    sequence: u64,
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, reverse for min-heap behavior.
        match other.priority.cmp(&self.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cells a unit can end its next action on.
///
/// Breadth-first expansion from `mover.position` up to `mover.speed` edges,
/// through any open cell. A cell is returned when it is not in `occupied`;
/// the mover's own cell never counts as occupied, so standing still is
/// always an option. Results are in discovery order.
#[must_use]
pub fn reachable_set(
    mover: Mover,
    board: &Board,
    occupied: &HashSet<HexCoord>,
    max_iterations: usize,
) -> Vec<HexCoord> {
    let mut result = Vec::new();
    bounded_expand(mover.position, mover.speed, board, max_iterations, |cell| {
        if cell == mover.position || !occupied.contains(&cell) {
            result.push(cell);
        }
    });
    result
}

/// Shortest move sequence from the mover to `goal`, by A*.
///
/// Each edge is one action (a jump to any cell of the reachable set) with
/// cost 1; the heuristic is the number of actions the hex distance to `goal`
/// needs at full speed, which never overestimates. Cells in `avoid` are
/// never used as intermediate or final destinations.
///
/// Returns `None` when already at the goal, when the goal is unreachable or
/// when `max_iterations` expansions pass without reaching it.
#[must_use]
pub fn shortest_path_single_goal(
    mover: Mover,
    goal: HexCoord,
    board: &Board,
    occupied: &HashSet<HexCoord>,
    avoid: &HashSet<HexCoord>,
    max_iterations: usize,
) -> Option<Vec<HexCoord>> {
    if mover.position == goal {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut g_score: HashMap<HexCoord, i32> = HashMap::new();
    let mut closed: HashSet<HexCoord> = HashSet::new();
    let mut sequence = 0u64;

    g_score.insert(mover.position, 0);
    open_set.push(SearchNode {
        cell: mover.position,
        priority: actions_needed(mover.position, goal, mover.speed),
        sequence,
    });

    let mut iterations = 0;
    while let Some(current) = open_set.pop() {
        if iterations >= max_iterations {
            return None;
        }
        iterations += 1;

        if current.cell == goal {
            return Some(reconstruct_path(&came_from, goal));
        }
        if !closed.insert(current.cell) {
            continue;
        }

        let current_g = g_score.get(&current.cell).copied().unwrap_or(i32::MAX);
        let step = Mover {
            position: current.cell,
            speed: mover.speed,
        };
        for next in action_targets(step, mover.position, board, occupied, max_iterations) {
            if avoid.contains(&next) || closed.contains(&next) {
                continue;
            }
            let tentative_g = current_g + 1;
            if tentative_g < g_score.get(&next).copied().unwrap_or(i32::MAX) {
                came_from.insert(next, current.cell);
                g_score.insert(next, tentative_g);
                sequence += 1;
                open_set.push(SearchNode {
                    cell: next,
                    priority: tentative_g + actions_needed(next, goal, mover.speed),
                    sequence,
                });
            }
        }
    }

    None
}

/// Shortest move sequence from the mover to any cell of `goals`.
///
/// Uniform-cost search over the same action edges as
/// [`shortest_path_single_goal`], except that an occupied goal cell is an
/// acceptable destination as long as it is not already within `speed` of
/// the mover's starting cell (goals that close are left to direct movement).
/// Cells in `avoid` are never entered. Returns the first shortest path found
/// to any goal, or `None`.
#[must_use]
pub fn shortest_path_multi_goal(
    mover: Mover,
    goals: &HashSet<HexCoord>,
    board: &Board,
    occupied: &HashSet<HexCoord>,
    avoid: &HashSet<HexCoord>,
    max_iterations: usize,
) -> Option<Vec<HexCoord>> {
    if goals.contains(&mover.position) {
        return None;
    }

    let immediate: HashSet<HexCoord> = mover.position.spiral(mover.speed).into_iter().collect();

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<HexCoord, HexCoord> = HashMap::new();
    let mut visited: HashSet<HexCoord> = avoid.clone();
    visited.insert(mover.position);
    let mut sequence = 0u64;

    open_set.push(SearchNode {
        cell: mover.position,
        priority: 0,
        sequence,
    });

    let mut iterations = 0;
    while let Some(current) = open_set.pop() {
        if iterations >= max_iterations {
            return None;
        }
        iterations += 1;

        if goals.contains(&current.cell) {
            return Some(reconstruct_path(&came_from, current.cell));
        }

        let mut neighbors = Vec::new();
        bounded_expand(current.cell, mover.speed, board, max_iterations, |cell| {
            let free = cell == mover.position || !occupied.contains(&cell);
            let distant_goal = goals.contains(&cell) && !immediate.contains(&cell);
            if free || distant_goal {
                neighbors.push(cell);
            }
        });

        for next in neighbors {
            if visited.insert(next) {
                came_from.insert(next, current.cell);
                sequence += 1;
                open_set.push(SearchNode {
                    cell: next,
                    priority: current.priority + 1,
                    sequence,
                });
            }
        }
    }

    None
}

/// Lower bound on the actions from `from` to `goal` covering at most `speed`
/// edges each.
fn actions_needed(from: HexCoord, goal: HexCoord, speed: i32) -> i32 {
    let distance = from.distance(goal);
    let speed = speed.max(1);
    (distance + speed - 1) / speed
}

/// Free destinations of one action from `step.position`.
///
/// `origin` is the cell the searching unit really stands on; it is vacated
/// by the move and therefore free.
fn action_targets(
    step: Mover,
    origin: HexCoord,
    board: &Board,
    occupied: &HashSet<HexCoord>,
    max_iterations: usize,
) -> Vec<HexCoord> {
    let mut targets = Vec::new();
    bounded_expand(step.position, step.speed, board, max_iterations, |cell| {
        if cell == origin || !occupied.contains(&cell) {
            targets.push(cell);
        }
    });
    targets
}

/// Breadth-first walk over open cells up to `depth` edges from `start`,
/// calling `visit` on every cell reached (including `start`).
fn bounded_expand(
    start: HexCoord,
    depth: i32,
    board: &Board,
    max_iterations: usize,
    mut visit: impl FnMut(HexCoord),
) {
    let mut queue = VecDeque::from([(start, 0)]);
    let mut seen = HashSet::from([start]);
    let mut iterations = 0;

    while let Some((cell, dist)) = queue.pop_front() {
        if iterations >= max_iterations {
            break;
        }
        iterations += 1;
        visit(cell);

        if dist >= depth {
            continue;
        }
        for next in cell.neighbors() {
            if board.is_open(next) && seen.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }
}

/// Walk `came_from` back from `goal` to the start.
fn reconstruct_path(came_from: &HashMap<HexCoord, HexCoord>, goal: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
