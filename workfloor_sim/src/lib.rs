// workfloor_sim — pure Rust simulation library.
//
// This crate contains all simulation logic for Workfloor: autonomous
// worker agents on a 2D grid who claim queued placement tasks, path-find
// around occupied cells, steer smoothly along the computed route, and
// build fixtures on site. It has zero windowing or rendering dependencies
// and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `sim.rs`:         Top-level SimState, fixed-phase tick loop, the task scheduler.
// - `grid.rs`:        Cell occupancy index + world↔cell quantization.
// - `pathfinding.rs`: A* over the 8-connected cell grid.
// - `steering.rs`:    Seek/arrival steering step + facing selection.
// - `task.rs`:        Chore state machine data (idle wander vs. build) + pending queue entries.
// - `command.rs`:     Action / InputFrame — all external sim input.
// - `event.rs`:       SimEvent — narrative/observability output per tick.
// - `config.rs`:      SimConfig — all tunable parameters, JSON-loadable.
// - `render.rs`:      Renderable + Camera — read-only state for the drawing collaborator.
// - `prng.rs`:        Xoshiro256++ PRNG with SplitMix64 seeding.
// - `types.rs`:       Vec2, GridCell, entity IDs, Facing.
//
// A front-end crate wraps this library for an actual window: it decodes
// device events into `InputFrame`s and draws from the `Renderable`
// snapshots. That boundary is enforced at the compiler level — this crate
// cannot depend on frame timing, textures, or an OS event loop.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, input frame) -> (new state, events)`. All randomness comes from
// a seeded xoshiro256++ PRNG. No `HashMap` iteration affects behavior, no
// system time, no OS entropy. Entity maps are `BTreeMap`.

pub mod command;
pub mod config;
pub mod event;
pub mod grid;
pub mod pathfinding;
pub mod prng;
pub mod render;
pub mod sim;
pub mod steering;
pub mod task;
pub mod types;
