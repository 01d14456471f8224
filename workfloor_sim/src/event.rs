// Narrative simulation events — the sim's observability output.
//
// Each call to `SimState::tick()` returns the `SimEvent`s that occurred
// during that tick. The event-log collaborator renders them; the sim
// itself never prints or logs. Silently recoverable conditions (a rejected
// placement, a temporarily unreachable target) emit nothing; worker
// numeric faults do emit, because an isolated-but-skipped agent is
// something an observer needs to see.
//
// See also: `sim.rs` for the tick loop that emits these, `command.rs` for
// the actions that trigger most of them.

use crate::types::{FixtureId, GridCell, WorkerId};
use serde::{Deserialize, Serialize};

/// A narrative event emitted by the simulation for the UI / event log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Types of narrative events visible to the observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A new worker has been spawned.
    WorkerSpawned { worker: WorkerId },
    /// A placement was accepted and queued as a translucent plan.
    FixturePlanned { fixture: FixtureId, cell: GridCell },
    /// A build completed; the cell is now occupied.
    FixtureBuilt { fixture: FixtureId, cell: GridCell },
    /// A worker's steering produced a non-finite state; its movement was
    /// skipped this tick and the rest of the sim proceeded.
    WorkerFaulted { worker: WorkerId },
    /// The world was discarded and rebuilt from its seed.
    WorldReset,
}
