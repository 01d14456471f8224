// Chores and pending tasks — the per-worker work state machine's data.
//
// Every worker carries exactly one `Chore` at all times. There is no "no
// task" state: when nothing is queued, the scheduler synthesizes a short
// randomized wander so workers mill about visibly instead of freezing.
//
// `Chore` is a tagged enum with per-variant payloads, so an idle worker
// cannot carry build progress and a building worker cannot carry a wander
// timer — invalid field combinations are unrepresentable.
//
// A `PendingTask` is a queued placement waiting for a free worker. The
// queue is FIFO (`VecDeque` on `SimState`); a task's `required_time` is
// normalized at creation so a non-positive build duration means "complete
// immediately on arrival" and never reaches a division.
//
// See also: `sim.rs` for the scheduler that drives these transitions,
// `pathfinding.rs` for the `Waypoints` a `Route` caches, `grid.rs` for the
// revision counter used in route invalidation.
//
// **Critical constraint: determinism.** Wander targets and durations come
// from the sim PRNG; the pending queue preserves insertion order.

use crate::pathfinding::Waypoints;
use crate::types::{FixtureId, GridCell, Vec2};
use serde::{Deserialize, Serialize};

/// A cached A* route being followed waypoint by waypoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    /// Waypoints from the cell after the start through the target cell.
    pub waypoints: Waypoints,
    /// Index of the first unvisited waypoint.
    pub next: usize,
    /// `GridIndex` revision this route was computed against. When the grid
    /// has moved past it, the remaining waypoints are re-checked against
    /// occupancy before the route is trusted again.
    pub grid_revision: u64,
}

impl Route {
    pub fn new(waypoints: Waypoints, grid_revision: u64) -> Self {
        Self {
            waypoints,
            next: 0,
            grid_revision,
        }
    }

    /// The waypoint currently being steered at, if any remain.
    pub fn current(&self) -> Option<GridCell> {
        self.waypoints.get(self.next).copied()
    }

    /// Waypoints not yet visited (including the current one).
    pub fn remaining(&self) -> &[GridCell] {
        &self.waypoints[self.next.min(self.waypoints.len())..]
    }

    /// Mark the current waypoint visited.
    pub fn advance(&mut self) {
        if self.next < self.waypoints.len() {
            self.next += 1;
        }
    }
}

/// What a worker is currently doing. Exactly one per worker, always.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Chore {
    /// No queued work: drift toward a nearby random point for a short
    /// random duration, then pick a new one.
    Idle {
        wander_target: Vec2,
        duration: f32,
        elapsed: f32,
    },
    /// Walk to `target_cell` and build the fixture there.
    Build {
        fixture: FixtureId,
        target_cell: GridCell,
        required_time: f32,
        time_worked: f32,
        route: Option<Route>,
    },
}

/// A queued placement waiting for an idle worker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingTask {
    /// The provisional plan fixture created at placement time.
    pub fixture: FixtureId,
    /// The cell the fixture will occupy once built.
    pub cell: GridCell,
    /// Build duration in seconds. Normalized non-negative at creation.
    pub required_time: f32,
}
