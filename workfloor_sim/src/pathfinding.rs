// A* pathfinding over the 8-connected placement grid.
//
// Implements standard A* using a `BinaryHeap` open list (min-heap via
// reversed ordering). Search nodes live in an arena `Vec` and refer to
// their parents by arena index, never by reference, so parent links stay
// valid when the arena grows.
//
// Straight moves cost 10 and diagonal moves cost 14 (integer approximation
// of 1:√2). The heuristic is octile distance scaled by the same constants,
// which is admissible and consistent for this move set.
//
// The search terminates successfully as soon as an expanded node generates
// the target as a neighbor; exhausting the open list without reaching the
// target returns `None` — the explicit no-path signal. Callers must ensure
// the target cell is not occupied before searching (placement requests on
// occupied cells are rejected upstream, see `sim.rs`).
//
// See also: `grid.rs` for the occupancy index being searched, `sim.rs` for
// route caching and invalidation, `task.rs` for the `Route` that stores the
// returned waypoints.
//
// **Critical constraint: determinism.** A* is a pure function of grid state
// and start/target. Equal-cost open entries are ordered by a monotonic
// sequence counter (most recent first), so expansion order is fully
// deterministic.

use crate::grid::GridIndex;
use crate::types::GridCell;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Ordered waypoint sequence: the cell after `start` through `target`,
/// inclusive of `target`, exclusive of `start`.
pub type Waypoints = SmallVec<[GridCell; 16]>;

/// The 8 king-move neighbor offsets with their step costs, in row-major
/// order. Straight = 10, diagonal = 14.
const NEIGHBOR_OFFSETS: [(i32, i32, u32); 8] = [
    (-1, -1, 14),
    (0, -1, 10),
    (1, -1, 14),
    (-1, 0, 10),
    (1, 0, 10),
    (-1, 1, 14),
    (0, 1, 10),
    (1, 1, 14),
];

/// A search node in the arena. `parent` is an arena index; index-based
/// links survive arena reallocation, raw pointers would not.
struct PathNode {
    cell: GridCell,
    parent: Option<usize>,
    g: u32,
    closed: bool,
}

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    f: u32,
    /// Monotonic push counter. Among equal `f`, the most recently pushed
    /// entry pops first — a depth-first preference along the current best
    /// path, and a total order that keeps expansion deterministic.
    seq: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on f for a min-heap; ties prefer the larger sequence.
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Octile distance scaled to the 10/14 step costs — the admissible
/// heuristic for 8-connected movement.
fn octile_distance(a: GridCell, b: GridCell) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    14 * dx.min(dy) + 10 * dx.abs_diff(dy)
}

/// Find a waypoint sequence from `start` to `target` over the grid.
///
/// Returns `Some` with the waypoints (exclusive of `start`, inclusive of
/// `target`; empty when `start == target`), or `None` when the open list
/// exhausts without reaching the target.
pub fn find_path(start: GridCell, target: GridCell, grid: &GridIndex) -> Option<Waypoints> {
    if start == target {
        return Some(Waypoints::new());
    }

    let width = (grid.max().x - grid.min().x).max(0) as usize;
    let height = (grid.max().y - grid.min().y).max(0) as usize;
    let mut arena: Vec<PathNode> = Vec::with_capacity(width.saturating_mul(height).min(1 << 14));
    let mut index_of: FxHashMap<GridCell, usize> = FxHashMap::default();
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut next_seq: u64 = 0;

    arena.push(PathNode {
        cell: start,
        parent: None,
        g: 0,
        closed: false,
    });
    index_of.insert(start, 0);
    open.push(OpenEntry {
        f: octile_distance(start, target),
        seq: next_seq,
        node: 0,
    });
    next_seq += 1;

    while let Some(entry) = open.pop() {
        let current = entry.node;
        if arena[current].closed {
            continue; // Stale entry superseded by a cheaper re-push.
        }
        arena[current].closed = true;

        let current_cell = arena[current].cell;
        let current_g = arena[current].g;

        for &(dx, dy, step) in &NEIGHBOR_OFFSETS {
            let neighbor = GridCell::new(current_cell.x + dx, current_cell.y + dy);

            // The target is generated, not expanded: reaching it from any
            // direction completes the search immediately.
            if neighbor == target {
                return Some(reconstruct(&arena, current, target));
            }

            if !grid.in_bounds(neighbor) || grid.occupied(neighbor) {
                continue;
            }

            let tentative_g = current_g + step;

            match index_of.get(&neighbor) {
                Some(&ni) => {
                    if arena[ni].closed || tentative_g >= arena[ni].g {
                        continue;
                    }
                    // Cheaper path to an open cell: re-home its parent and
                    // re-push with the improved score.
                    arena[ni].g = tentative_g;
                    arena[ni].parent = Some(current);
                    open.push(OpenEntry {
                        f: tentative_g + octile_distance(neighbor, target),
                        seq: next_seq,
                        node: ni,
                    });
                    next_seq += 1;
                }
                None => {
                    let ni = arena.len();
                    arena.push(PathNode {
                        cell: neighbor,
                        parent: Some(current),
                        g: tentative_g,
                        closed: false,
                    });
                    index_of.insert(neighbor, ni);
                    open.push(OpenEntry {
                        f: tentative_g + octile_distance(neighbor, target),
                        seq: next_seq,
                        node: ni,
                    });
                    next_seq += 1;
                }
            }
        }
    }

    None // Open list exhausted: no path.
}

/// Walk parent links from the node that generated the target back to
/// `start`, then reverse so the sequence runs start→target.
fn reconstruct(arena: &[PathNode], final_node: usize, target: GridCell) -> Waypoints {
    let mut path = Waypoints::new();
    path.push(target);
    let mut current = final_node;
    while let Some(parent) = arena[current].parent {
        path.push(arena[current].cell);
        current = parent;
    }
    path.reverse();
    path
}
