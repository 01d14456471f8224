// Core simulation state and tick loop.
//
// `SimState` is the single source of truth for the world. It owns the
// occupancy grid, every worker and fixture, the pending-task queue, the
// camera, the PRNG, and the config. All mutation happens through
// `tick(input, dt)`, which runs two fixed phases:
//
//   1. Apply the frame's deduplicated action set (camera, spawn, placement,
//      brush, reset). `Reset` short-circuits: the whole state is rebuilt
//      from its seed and config, atomically, before anything else runs.
//   2. Advance every worker's chore state machine exactly once, in
//      ascending worker-id order.
//
// ## Scheduler
//
// Each worker always has exactly one `Chore`:
//
//   Idle:
//     - If the pending queue is non-empty, dequeue the front task, switch
//       to `Build`, and start routing the same tick.
//     - Otherwise drift toward the wander target; when the leg expires or
//       the target is reached, synthesize a fresh randomized wander.
//   Build:
//     - Within the arrival radius of the target cell: hold still and
//       accumulate `time_worked`; the plan's alpha ramps toward opaque.
//       Once `time_worked >= required_time`, the fixture becomes a real
//       occupying entity, its cell is marked in the grid, and the worker
//       returns to idle.
//     - Otherwise: follow the cached A* route waypoint by waypoint,
//       steering at the next unvisited waypoint and advancing on arrival-
//       radius contact. The route is recomputed when missing or when the
//       grid revision moved and a remaining waypoint is now occupied. If
//       no path exists the worker holds position this tick and retries on
//       later ticks — occupancy may change.
//
// ## Placement
//
// A placement request quantizes the pointer to a cell and is silently
// rejected when the cell is out of bounds, occupied, or already claimed by
// another fixture. Accepted placements create a translucent plan fixture
// (non-occupying) and enqueue a pending task with the configured build
// duration, normalized at creation so non-positive durations complete
// immediately on arrival.
//
// ## Fault isolation
//
// A steering step that produces a non-finite position or velocity is
// discarded: the worker keeps its previous state, a `WorkerFaulted` event
// is emitted, and every other worker's update proceeds normally.
//
// See also: `grid.rs`, `pathfinding.rs`, `steering.rs`, `task.rs`,
// `command.rs`, `event.rs`, `render.rs`, `config.rs`.
//
// **Critical constraint: determinism.** Workers and fixtures live in
// `BTreeMap`s and are advanced in key order; the action set is a
// `BTreeSet`; all randomness comes from the seeded `SimRng`. Two sims with
// equal seeds, configs, and input frames stay byte-for-byte identical.

use crate::command::{Action, InputFrame};
use crate::config::SimConfig;
use crate::event::{SimEvent, SimEventKind};
use crate::grid::GridIndex;
use crate::pathfinding;
use crate::prng::SimRng;
use crate::render::{Camera, Renderable};
use crate::steering;
use crate::task::{Chore, PendingTask, Route};
use crate::types::{FixtureId, GridCell, Vec2, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// A worker agent — an autonomous builder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub chore: Chore,
    pub renderable: Renderable,
}

/// A fixture — a placement that is either a translucent plan or a built,
/// cell-occupying entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub cell: GridCell,
    pub position: Vec2,
    pub built: bool,
    pub renderable: Renderable,
}

/// Top-level simulation state. This is the entire world.
#[derive(Clone, Debug)]
pub struct SimState {
    /// Number of ticks processed so far.
    pub tick: u64,
    /// The seed the world was built from; `Reset` rebuilds from it.
    seed: u64,
    /// The simulation's deterministic PRNG.
    pub rng: SimRng,
    /// Immutable-after-startup configuration.
    pub config: SimConfig,
    /// Cell occupancy — the blocking truth for placement and search.
    pub grid: GridIndex,
    /// The camera the pan/zoom actions drive.
    pub camera: Camera,
    /// Whether the build brush is active (UI mode flag, tracked for the
    /// front-end; the core accepts placements regardless).
    pub brush_enabled: bool,
    next_worker_id: u32,
    next_fixture_id: u32,
    /// All workers, keyed by id. BTreeMap for deterministic iteration.
    pub workers: BTreeMap<WorkerId, Worker>,
    /// All fixtures (plans and built), keyed by id.
    pub fixtures: BTreeMap<FixtureId, Fixture>,
    /// Queued placements waiting for an idle worker, FIFO.
    pub pending: VecDeque<PendingTask>,
}

impl SimState {
    /// Create a new world with the default config and the given seed.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, SimConfig::default())
    }

    /// Create a new world with the given seed and config.
    pub fn with_config(seed: u64, config: SimConfig) -> Self {
        let grid = GridIndex::new(&config.grid);
        Self {
            tick: 0,
            seed,
            rng: SimRng::new(seed),
            config,
            grid,
            camera: Camera::default(),
            brush_enabled: false,
            next_worker_id: 1,
            next_fixture_id: 1,
            workers: BTreeMap::new(),
            fixtures: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Advance the world one tick of `dt` seconds, applying one frame of
    /// external input first. Returns the narrative events of this tick.
    pub fn tick(&mut self, input: &InputFrame, dt: f32) -> Vec<SimEvent> {
        let mut events = Vec::new();

        // Reset is a hard cancellation: rebuild the whole world value from
        // its seed before anything else can observe partial state.
        if input.actions.contains(&Action::Reset) {
            *self = Self::with_config(self.seed, self.config.clone());
            events.push(SimEvent {
                tick: self.tick,
                kind: SimEventKind::WorldReset,
            });
            return events;
        }

        self.tick += 1;

        for action in &input.actions {
            match *action {
                Action::Pan(dir) => {
                    self.camera.pan(dir, self.config.view.pan_speed * dt);
                }
                Action::Zoom(dir) => {
                    self.camera.apply_zoom(dir, &self.config.view);
                }
                Action::SpawnWorker => self.spawn_worker(&mut events),
                Action::PlaceFixture => self.place_fixture(input.pointer, &mut events),
                Action::ToggleBrush => self.brush_enabled = !self.brush_enabled,
                Action::Reset => {} // Handled above.
            }
        }

        let ids: Vec<WorkerId> = self.workers.keys().copied().collect();
        for id in ids {
            self.advance_worker(id, dt, &mut events);
        }

        events
    }

    /// Delete a fixture. A built fixture vacates its cell; a plan simply
    /// disappears (any worker en route abandons the task on its next tick).
    /// Returns whether a fixture was removed.
    pub fn remove_fixture(&mut self, id: FixtureId) -> bool {
        match self.fixtures.remove(&id) {
            Some(fixture) => {
                if fixture.built {
                    self.grid.remove(fixture.cell);
                }
                true
            }
            None => false,
        }
    }

    /// World-space extents of the grid, `(min, max)` half-open.
    fn world_extents(&self) -> (Vec2, Vec2) {
        let cs = self.grid.cell_size();
        (
            Vec2::new(self.grid.min().x as f32 * cs, self.grid.min().y as f32 * cs),
            Vec2::new(self.grid.max().x as f32 * cs, self.grid.max().y as f32 * cs),
        )
    }

    /// Spawn a worker at a random in-bounds position, already wandering.
    fn spawn_worker(&mut self, events: &mut Vec<SimEvent>) {
        let (min_w, max_w) = self.world_extents();
        let position = Vec2::new(
            self.rng.range_f32(min_w.x, max_w.x),
            self.rng.range_f32(min_w.y, max_w.y),
        );
        let id = WorkerId(self.next_worker_id);
        self.next_worker_id += 1;

        let chore = self.wander_chore(position);
        self.workers.insert(
            id,
            Worker {
                id,
                position,
                velocity: Vec2::ZERO,
                chore,
                renderable: Renderable::worker(),
            },
        );
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::WorkerSpawned { worker: id },
        });
    }

    /// Handle a placement request at a world position. Silently declined
    /// when the cell is out of bounds, occupied, or already claimed.
    fn place_fixture(&mut self, at: Vec2, events: &mut Vec<SimEvent>) {
        let cell = self.grid.cell_of(at);
        if !self.grid.in_bounds(cell) || self.grid.occupied(cell) {
            return;
        }
        // One fixture per cell, plans included — a second plan on the same
        // cell would race the first to a target that will be blocked.
        if self.fixtures.values().any(|f| f.cell == cell) {
            return;
        }

        let id = FixtureId(self.next_fixture_id);
        self.next_fixture_id += 1;
        self.fixtures.insert(
            id,
            Fixture {
                id,
                cell,
                position: self.grid.cell_center(cell),
                built: false,
                renderable: Renderable::fixture(self.config.view.plan_alpha),
            },
        );
        // Normalize at creation: a non-positive build duration completes
        // immediately on arrival instead of dividing by zero later.
        let required_time = self.config.work.build_time.max(0.0);
        self.pending.push_back(PendingTask {
            fixture: id,
            cell,
            required_time,
        });
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::FixturePlanned { fixture: id, cell },
        });
    }

    /// Synthesize a fresh idle-wander chore around the given position.
    fn wander_chore(&mut self, from: Vec2) -> Chore {
        let r = self.config.work.wander_radius;
        let (min_w, max_w) = self.world_extents();
        let wander_target = if r > 0.0 {
            Vec2::new(
                self.rng.range_f32(from.x - r, from.x + r).clamp(min_w.x, max_w.x),
                self.rng.range_f32(from.y - r, from.y + r).clamp(min_w.y, max_w.y),
            )
        } else {
            from
        };
        let lo = self.config.work.idle_min_time;
        let hi = self.config.work.idle_max_time;
        let duration = if lo < hi { self.rng.range_f32(lo, hi) } else { lo };
        Chore::Idle {
            wander_target,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance one worker's chore state machine by one tick.
    fn advance_worker(&mut self, id: WorkerId, dt: f32, events: &mut Vec<SimEvent>) {
        let Some(mut worker) = self.workers.remove(&id) else {
            return;
        };
        match worker.chore {
            Chore::Idle { .. } => {
                if let Some(task) = self.pending.pop_front() {
                    worker.chore = Chore::Build {
                        fixture: task.fixture,
                        target_cell: task.cell,
                        required_time: task.required_time,
                        time_worked: 0.0,
                        route: None,
                    };
                    // Begin routing on the same tick the task is claimed.
                    self.advance_build(&mut worker, dt, events);
                } else {
                    self.advance_idle(&mut worker, dt, events);
                }
            }
            Chore::Build { .. } => self.advance_build(&mut worker, dt, events),
        }
        self.workers.insert(id, worker);
    }

    /// Idle: drift toward the wander target; re-roll when the leg expires
    /// or the target is reached.
    fn advance_idle(&mut self, worker: &mut Worker, dt: f32, events: &mut Vec<SimEvent>) {
        let (target, expired) = match &mut worker.chore {
            Chore::Idle {
                wander_target,
                duration,
                elapsed,
            } => {
                *elapsed += dt;
                (*wander_target, *elapsed >= *duration)
            }
            Chore::Build { .. } => return,
        };

        let arrived = worker.position.distance(target) < self.config.steering.arrival_radius;
        if expired || arrived {
            worker.chore = self.wander_chore(worker.position);
        } else {
            self.steer_worker(worker, target, dt, events);
        }
    }

    /// Build: work on site when within the arrival radius of the target,
    /// otherwise follow the route toward it.
    fn advance_build(&mut self, worker: &mut Worker, dt: f32, events: &mut Vec<SimEvent>) {
        let (fixture_id, target_cell, required_time) = match &worker.chore {
            Chore::Build {
                fixture,
                target_cell,
                required_time,
                ..
            } => (*fixture, *target_cell, *required_time),
            Chore::Idle { .. } => return,
        };

        // The plan can be deleted out from under the task; abandon it.
        if !self.fixtures.contains_key(&fixture_id) {
            worker.chore = self.wander_chore(worker.position);
            return;
        }

        let target_pos = self.grid.cell_center(target_cell);
        if worker.position.distance(target_pos) < self.config.steering.arrival_radius {
            // On site: hold still and accumulate work.
            worker.velocity = Vec2::ZERO;
            worker.renderable.stand();
            let time_worked = match &mut worker.chore {
                Chore::Build { time_worked, .. } => {
                    *time_worked += dt;
                    *time_worked
                }
                Chore::Idle { .. } => return,
            };
            if time_worked >= required_time {
                self.finish_build(worker, fixture_id, target_cell, events);
            } else {
                let progress = if required_time > 0.0 {
                    (time_worked / required_time).min(1.0)
                } else {
                    1.0
                };
                if let Some(fixture) = self.fixtures.get_mut(&fixture_id) {
                    fixture.renderable.alpha = ramp_alpha(self.config.view.plan_alpha, progress);
                }
            }
        } else {
            match self.steering_cell(worker, target_cell) {
                Some(cell) => {
                    let aim = self.grid.cell_center(cell);
                    self.steer_worker(worker, aim, dt, events);
                }
                // No path this tick: hold position, keep the task, retry
                // on a later tick when occupancy may have changed.
                None => worker.velocity = Vec2::ZERO,
            }
        }
    }

    /// Materialize a completed placement and return the worker to idle.
    fn finish_build(
        &mut self,
        worker: &mut Worker,
        fixture_id: FixtureId,
        cell: GridCell,
        events: &mut Vec<SimEvent>,
    ) {
        if let Some(fixture) = self.fixtures.get_mut(&fixture_id) {
            fixture.built = true;
            fixture.renderable.alpha = 255;
        }
        self.grid.add(cell);
        events.push(SimEvent {
            tick: self.tick,
            kind: SimEventKind::FixtureBuilt {
                fixture: fixture_id,
                cell,
            },
        });
        worker.chore = self.wander_chore(worker.position);
    }

    /// Ensure the worker has a valid route to `target_cell` and return the
    /// cell to steer at (the next unvisited waypoint), or `None` when the
    /// target is currently unreachable.
    fn steering_cell(&mut self, worker: &mut Worker, target_cell: GridCell) -> Option<GridCell> {
        let start_cell = self.grid.cell_of(worker.position);

        // A cached route stays valid until the grid revision moves AND a
        // remaining waypoint is actually blocked now.
        let route_ok = match &mut worker.chore {
            Chore::Build {
                route: Some(route), ..
            } => {
                if route.grid_revision == self.grid.revision() {
                    true
                } else if route.remaining().iter().any(|&c| self.grid.occupied(c)) {
                    false
                } else {
                    route.grid_revision = self.grid.revision();
                    true
                }
            }
            _ => false,
        };

        if !route_ok {
            let waypoints = pathfinding::find_path(start_cell, target_cell, &self.grid);
            match &mut worker.chore {
                Chore::Build { route, .. } => {
                    *route = waypoints.map(|w| Route::new(w, self.grid.revision()));
                    if route.is_none() {
                        return None;
                    }
                }
                Chore::Idle { .. } => return None,
            }
        }

        // Advance past any waypoint already reached, then aim at the next.
        let arrival = self.config.steering.arrival_radius;
        let position = worker.position;
        match &mut worker.chore {
            Chore::Build {
                route: Some(route), ..
            } => {
                while let Some(wp) = route.current() {
                    if position.distance(self.grid.cell_center(wp)) < arrival {
                        route.advance();
                    } else {
                        break;
                    }
                }
                Some(route.current().unwrap_or(target_cell))
            }
            _ => None,
        }
    }

    /// Apply one steering step to a worker, updating its render state. A
    /// non-finite result is discarded and surfaced as a `WorkerFaulted`
    /// event; the worker keeps its previous position and velocity.
    fn steer_worker(
        &mut self,
        worker: &mut Worker,
        target: Vec2,
        dt: f32,
        events: &mut Vec<SimEvent>,
    ) {
        match steering::steer(
            worker.position,
            worker.velocity,
            target,
            dt,
            &self.config.steering,
        ) {
            Some(stepped) => {
                worker.position = stepped.position;
                worker.velocity = stepped.velocity;
                if let Some(facing) = steering::facing_of(worker.velocity) {
                    worker.renderable.facing = facing;
                    worker.renderable.advance_frames(
                        worker.velocity.length() * dt,
                        self.config.view.distance_per_frame,
                    );
                }
            }
            None => {
                events.push(SimEvent {
                    tick: self.tick,
                    kind: SimEventKind::WorkerFaulted { worker: worker.id },
                });
            }
        }
    }
}

/// Interpolate a plan's alpha from its translucent base toward opaque.
fn ramp_alpha(base: u8, progress: f32) -> u8 {
    let p = progress.clamp(0.0, 1.0);
    (base as f32 + (255.0 - base as f32) * p) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{PanDir, ZoomDir};

    const DT: f32 = 1.0 / 60.0;

    fn frame(actions: &[Action]) -> InputFrame {
        InputFrame::with_actions(actions.iter().copied())
    }

    /// Insert a stationary idle worker at an exact position, bypassing the
    /// random spawn placement.
    fn insert_worker_at(sim: &mut SimState, position: Vec2) -> WorkerId {
        let id = WorkerId(sim.next_worker_id);
        sim.next_worker_id += 1;
        let chore = Chore::Idle {
            wander_target: position,
            duration: f32::INFINITY,
            elapsed: 0.0,
        };
        sim.workers.insert(
            id,
            Worker {
                id,
                position,
                velocity: Vec2::ZERO,
                chore,
                renderable: Renderable::worker(),
            },
        );
        id
    }

    #[test]
    fn new_sim_is_empty_and_deterministic() {
        let mut a = SimState::new(42);
        let mut b = SimState::new(42);
        assert!(a.workers.is_empty());
        assert!(a.fixtures.is_empty());
        assert!(a.pending.is_empty());
        assert_eq!(a.tick, 0);
        assert_eq!(a.rng.next_u64(), b.rng.next_u64());
    }

    #[test]
    fn spawn_action_creates_a_worker_in_bounds() {
        let mut sim = SimState::new(42);
        let events = sim.tick(&frame(&[Action::SpawnWorker]), DT);

        assert_eq!(sim.workers.len(), 1);
        let worker = sim.workers.values().next().unwrap();
        let cell = sim.grid.cell_of(worker.position);
        assert!(sim.grid.in_bounds(cell));
        assert!(matches!(worker.chore, Chore::Idle { .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::WorkerSpawned { .. })));
    }

    #[test]
    fn spawn_action_is_idempotent_within_a_tick() {
        // The action set deduplicates: one frame can only spawn once.
        let mut sim = SimState::new(42);
        let mut input = frame(&[Action::SpawnWorker]);
        input.actions.insert(Action::SpawnWorker);
        sim.tick(&input, DT);
        assert_eq!(sim.workers.len(), 1);
    }

    #[test]
    fn placement_creates_a_translucent_plan_and_queues_a_task() {
        let mut sim = SimState::new(42);
        let at = Vec2::new(100.0, 100.0);
        let events = sim.tick(&InputFrame::place_at(at), DT);

        assert_eq!(sim.fixtures.len(), 1);
        assert_eq!(sim.pending.len(), 1);
        let fixture = sim.fixtures.values().next().unwrap();
        assert!(!fixture.built);
        assert_eq!(fixture.renderable.alpha, sim.config.view.plan_alpha);
        assert_eq!(fixture.cell, sim.grid.cell_of(at));
        // Plans do not occupy their cell.
        assert!(!sim.grid.occupied(fixture.cell));
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::FixturePlanned { .. })));
    }

    #[test]
    fn placement_on_an_occupied_cell_is_silently_rejected() {
        let mut sim = SimState::new(42);
        let at = Vec2::new(100.0, 100.0);
        let cell = sim.grid.cell_of(at);
        sim.grid.add(cell);

        let events = sim.tick(&InputFrame::place_at(at), DT);
        assert!(sim.fixtures.is_empty());
        assert!(sim.pending.is_empty());
        assert!(!events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::FixturePlanned { .. })));
    }

    #[test]
    fn placement_out_of_bounds_is_silently_rejected() {
        let mut sim = SimState::new(42);
        sim.tick(&InputFrame::place_at(Vec2::new(-100.0, -100.0)), DT);
        assert!(sim.fixtures.is_empty());
        assert!(sim.pending.is_empty());
    }

    #[test]
    fn second_plan_on_the_same_cell_is_rejected() {
        let mut sim = SimState::new(42);
        let at = Vec2::new(100.0, 100.0);
        sim.tick(&InputFrame::place_at(at), DT);
        sim.tick(&InputFrame::place_at(at + Vec2::new(1.0, 1.0)), DT);
        assert_eq!(sim.fixtures.len(), 1);
        assert_eq!(sim.pending.len(), 1);
    }

    #[test]
    fn idle_worker_claims_the_queued_task() {
        let mut sim = SimState::new(42);
        insert_worker_at(&mut sim, Vec2::new(16.0, 16.0));
        sim.tick(&InputFrame::place_at(Vec2::new(300.0, 300.0)), DT);

        assert!(sim.pending.is_empty());
        let worker = sim.workers.values().next().unwrap();
        assert!(matches!(worker.chore, Chore::Build { .. }));
    }

    #[test]
    fn build_completes_after_required_time_on_site() {
        // requiredTime = 4.0 ticked at dt = 1.0 four times while on site:
        // the fourth tick completes the task, occupies the cell, and the
        // worker returns to idle.
        let mut sim = SimState::new(42);
        let target_cell = GridCell::new(5, 5);
        let on_site = sim.grid.cell_center(target_cell);
        insert_worker_at(&mut sim, on_site);
        sim.tick(&InputFrame::place_at(on_site), 1.0);

        for _ in 0..2 {
            let events = sim.tick(&InputFrame::default(), 1.0);
            assert!(events.is_empty());
            assert!(!sim.grid.occupied(target_cell));
        }

        let events = sim.tick(&InputFrame::default(), 1.0);
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::FixtureBuilt { cell, .. } if cell == target_cell)));
        assert!(sim.grid.occupied(target_cell));
        let worker = sim.workers.values().next().unwrap();
        assert!(matches!(worker.chore, Chore::Idle { .. }));
        let fixture = sim.fixtures.values().next().unwrap();
        assert!(fixture.built);
        assert_eq!(fixture.renderable.alpha, 255);
    }

    #[test]
    fn plan_alpha_ramps_with_build_progress() {
        let mut sim = SimState::new(42);
        let target_cell = GridCell::new(5, 5);
        let on_site = sim.grid.cell_center(target_cell);
        insert_worker_at(&mut sim, on_site);
        sim.tick(&InputFrame::place_at(on_site), 1.0);
        sim.tick(&InputFrame::default(), 1.0);

        // Two of four seconds worked: alpha sits between base and opaque.
        let fixture = sim.fixtures.values().next().unwrap();
        assert!(fixture.renderable.alpha > sim.config.view.plan_alpha);
        assert!(fixture.renderable.alpha < 255);
    }

    #[test]
    fn time_worked_does_not_accumulate_away_from_the_site() {
        let mut sim = SimState::new(42);
        insert_worker_at(&mut sim, Vec2::new(16.0, 16.0));
        sim.tick(&InputFrame::place_at(Vec2::new(700.0, 500.0)), 1.0);

        for _ in 0..3 {
            sim.tick(&InputFrame::default(), DT);
        }
        let worker = sim.workers.values().next().unwrap();
        match &worker.chore {
            Chore::Build { time_worked, .. } => assert_eq!(*time_worked, 0.0),
            Chore::Idle { .. } => panic!("worker should still be building"),
        }
    }

    #[test]
    fn zero_build_time_completes_on_arrival() {
        let mut config = SimConfig::default();
        config.work.build_time = 0.0;
        let mut sim = SimState::with_config(42, config);
        let target_cell = GridCell::new(3, 3);
        let on_site = sim.grid.cell_center(target_cell);
        insert_worker_at(&mut sim, on_site);

        let events = sim.tick(&InputFrame::place_at(on_site), DT);
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::FixtureBuilt { .. })));
        assert!(sim.grid.occupied(target_cell));
    }

    #[test]
    fn worker_routes_around_an_occupied_cell() {
        // The diagonal-detour scenario, driven end to end through the
        // scheduler: blocked (1,0), start cell (0,0), target (2,0).
        let mut sim = SimState::new(42);
        sim.grid.add(GridCell::new(1, 0));
        let start = sim.grid.cell_center(GridCell::new(0, 0));
        let target = sim.grid.cell_center(GridCell::new(2, 0));
        insert_worker_at(&mut sim, start);
        sim.tick(&InputFrame::place_at(target), DT);

        let worker = sim.workers.values().next().unwrap();
        let route = match &worker.chore {
            Chore::Build { route: Some(route), .. } => route,
            _ => panic!("worker should be building with a route"),
        };
        assert_eq!(
            route.waypoints.as_slice(),
            &[GridCell::new(1, 1), GridCell::new(2, 0)]
        );
        // First step aims at the detour waypoint: down-right of the start.
        assert!(worker.velocity.x > 0.0);
        assert!(worker.velocity.y > 0.0);
    }

    #[test]
    fn worker_follows_waypoints_to_a_detoured_target() {
        let mut sim = SimState::new(42);
        sim.grid.add(GridCell::new(1, 0));
        let start = sim.grid.cell_center(GridCell::new(0, 0));
        insert_worker_at(&mut sim, start);
        let target_cell = GridCell::new(2, 0);
        let target = sim.grid.cell_center(target_cell);
        sim.tick(&InputFrame::place_at(target), DT);

        let mut built = false;
        for _ in 0..3_000 {
            let events = sim.tick(&InputFrame::default(), DT);
            if events
                .iter()
                .any(|e| matches!(e.kind, SimEventKind::FixtureBuilt { .. }))
            {
                built = true;
                break;
            }
        }
        assert!(built, "worker never completed the detoured build");
        assert!(sim.grid.occupied(target_cell));
    }

    #[test]
    fn unreachable_target_holds_the_worker_in_place() {
        let mut sim = SimState::new(42);
        let target_cell = GridCell::new(10, 10);
        // Wall the target off completely.
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) {
                    sim.grid.add(GridCell::new(target_cell.x + dx, target_cell.y + dy));
                }
            }
        }
        let start = sim.grid.cell_center(GridCell::new(0, 0));
        insert_worker_at(&mut sim, start);
        let target = sim.grid.cell_center(target_cell);
        sim.tick(&InputFrame::place_at(target), DT);

        for _ in 0..10 {
            sim.tick(&InputFrame::default(), DT);
        }
        let worker = sim.workers.values().next().unwrap();
        // Task retained, no motion.
        assert!(matches!(worker.chore, Chore::Build { .. }));
        assert_eq!(worker.position, start);
        assert_eq!(worker.velocity, Vec2::ZERO);
    }

    #[test]
    fn unreachable_target_is_retried_once_unblocked() {
        let mut sim = SimState::new(42);
        let target_cell = GridCell::new(10, 10);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) {
                    sim.grid.add(GridCell::new(target_cell.x + dx, target_cell.y + dy));
                }
            }
        }
        let start = sim.grid.cell_center(GridCell::new(0, 0));
        insert_worker_at(&mut sim, start);
        let target = sim.grid.cell_center(target_cell);
        sim.tick(&InputFrame::place_at(target), DT);
        sim.tick(&InputFrame::default(), DT);

        // Open a gap in the wall; the scheduler recomputes and moves.
        sim.grid.remove(GridCell::new(9, 10));
        sim.tick(&InputFrame::default(), DT);
        let worker = sim.workers.values().next().unwrap();
        assert!(worker.velocity.length() > 0.0);
    }

    #[test]
    fn route_is_invalidated_when_a_waypoint_becomes_occupied() {
        let mut sim = SimState::new(42);
        let start = sim.grid.cell_center(GridCell::new(0, 0));
        insert_worker_at(&mut sim, start);
        let target_cell = GridCell::new(4, 0);
        let target = sim.grid.cell_center(target_cell);
        sim.tick(&InputFrame::place_at(target), DT);

        // The straight route runs through (2,0); block it mid-walk.
        let blocked = GridCell::new(2, 0);
        {
            let worker = sim.workers.values().next().unwrap();
            let route = match &worker.chore {
                Chore::Build { route: Some(route), .. } => route,
                _ => panic!("expected an active route"),
            };
            assert!(route.waypoints.contains(&blocked));
        }
        sim.grid.add(blocked);
        sim.tick(&InputFrame::default(), DT);

        let worker = sim.workers.values().next().unwrap();
        let route = match &worker.chore {
            Chore::Build { route: Some(route), .. } => route,
            _ => panic!("expected a recomputed route"),
        };
        assert!(
            !route.remaining().contains(&blocked),
            "recomputed route still crosses the newly occupied cell"
        );
    }

    #[test]
    fn reset_discards_the_world_atomically() {
        let mut sim = SimState::new(42);
        sim.tick(&frame(&[Action::SpawnWorker]), DT);
        sim.tick(&InputFrame::place_at(Vec2::new(100.0, 100.0)), DT);
        sim.tick(&frame(&[Action::Pan(PanDir::Right)]), DT);
        assert!(!sim.workers.is_empty());

        let events = sim.tick(&frame(&[Action::Reset, Action::SpawnWorker]), DT);
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::WorldReset)));
        // Reset wins over everything else in the same frame.
        assert!(sim.workers.is_empty());
        assert!(sim.fixtures.is_empty());
        assert!(sim.pending.is_empty());
        assert!(sim.grid.is_empty());
        assert_eq!(sim.tick, 0);
        assert_eq!(sim.camera.offset, Vec2::ZERO);

        // Reset is a pure reconstruction from the seed.
        let fresh = SimState::new(42);
        assert_eq!(sim.rng.clone().next_u64(), fresh.rng.clone().next_u64());
    }

    #[test]
    fn camera_and_brush_actions_apply_world_effects() {
        let mut sim = SimState::new(42);
        sim.tick(
            &frame(&[Action::Pan(PanDir::Right), Action::Zoom(ZoomDir::In), Action::ToggleBrush]),
            DT,
        );
        assert!(sim.camera.offset.x > 0.0);
        assert!(sim.camera.zoom > 1.0);
        assert!(sim.brush_enabled);
        sim.tick(&frame(&[Action::ToggleBrush]), DT);
        assert!(!sim.brush_enabled);
    }

    #[test]
    fn remove_fixture_vacates_its_cell() {
        let mut sim = SimState::new(42);
        let target_cell = GridCell::new(3, 3);
        let on_site = sim.grid.cell_center(target_cell);
        insert_worker_at(&mut sim, on_site);
        // One long tick: the on-site worker claims and finishes the build.
        sim.tick(&InputFrame::place_at(on_site), 10.0);
        assert!(sim.grid.occupied(target_cell));

        let id = *sim.fixtures.keys().next().unwrap();
        assert!(sim.remove_fixture(id));
        assert!(!sim.grid.occupied(target_cell));
        assert!(!sim.remove_fixture(id));
    }

    #[test]
    fn removing_a_plan_makes_its_builder_go_idle() {
        let mut sim = SimState::new(42);
        insert_worker_at(&mut sim, Vec2::new(16.0, 16.0));
        sim.tick(&InputFrame::place_at(Vec2::new(300.0, 300.0)), DT);
        let id = *sim.fixtures.keys().next().unwrap();
        sim.remove_fixture(id);
        sim.tick(&InputFrame::default(), DT);

        let worker = sim.workers.values().next().unwrap();
        assert!(matches!(worker.chore, Chore::Idle { .. }));
        assert!(!sim.grid.occupied(GridCell::new(9, 9)));
    }

    #[test]
    fn degenerate_mass_faults_the_worker_without_stopping_the_sim() {
        let mut config = SimConfig::default();
        config.steering.mass = 0.0;
        let mut sim = SimState::with_config(42, config);
        let stuck = insert_worker_at(&mut sim, Vec2::new(16.0, 16.0));
        let before = sim.workers[&stuck].position;
        sim.tick(&InputFrame::place_at(Vec2::new(700.0, 500.0)), DT);

        let events = sim.tick(&InputFrame::default(), DT);
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, SimEventKind::WorkerFaulted { worker } if worker == stuck)));
        // The fault is isolated: position untouched, never NaN.
        let worker = &sim.workers[&stuck];
        assert_eq!(worker.position, before);
        assert!(worker.position.is_finite());
    }

    #[test]
    fn same_seed_and_inputs_stay_identical() {
        let mut a = SimState::new(7);
        let mut b = SimState::new(7);
        let script = [
            frame(&[Action::SpawnWorker]),
            frame(&[Action::SpawnWorker]),
            InputFrame::place_at(Vec2::new(400.0, 300.0)),
            InputFrame::default(),
            InputFrame::place_at(Vec2::new(96.0, 96.0)),
        ];
        for input in &script {
            a.tick(input, DT);
            b.tick(input, DT);
        }
        for _ in 0..600 {
            a.tick(&InputFrame::default(), DT);
            b.tick(&InputFrame::default(), DT);
        }

        assert_eq!(a.workers.len(), b.workers.len());
        for (id, worker_a) in &a.workers {
            let worker_b = &b.workers[id];
            assert_eq!(worker_a.position, worker_b.position);
            assert_eq!(worker_a.velocity, worker_b.velocity);
        }
        assert_eq!(a.rng.next_u64(), b.rng.next_u64());
    }

    #[test]
    fn velocity_stays_bounded_through_a_full_run() {
        let mut sim = SimState::new(11);
        sim.tick(&frame(&[Action::SpawnWorker]), DT);
        sim.tick(&InputFrame::place_at(Vec2::new(600.0, 400.0)), DT);
        let max_speed = sim.config.steering.max_speed;
        for _ in 0..2_000 {
            sim.tick(&InputFrame::default(), DT);
            for worker in sim.workers.values() {
                assert!(worker.velocity.length() <= max_speed + 1e-3);
                assert!(worker.position.is_finite());
            }
        }
    }

    #[test]
    fn ramp_alpha_spans_base_to_opaque() {
        assert_eq!(ramp_alpha(25, 0.0), 25);
        assert_eq!(ramp_alpha(25, 1.0), 255);
        assert_eq!(ramp_alpha(25, 2.0), 255);
        let mid = ramp_alpha(25, 0.5);
        assert!(mid > 25 && mid < 255);
    }
}
