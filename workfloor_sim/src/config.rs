// Data-driven simulation configuration.
//
// All tunable parameters live in `SimConfig`, loadable from JSON at
// startup and never mutated at runtime by the core. Parameters are grouped
// into nested structs by concern: `GridParams` (cell lattice and bounds),
// `SteeringParams` (locomotion), `WorkParams` (build durations and idle
// wandering), and `ViewParams` (camera and render-facing constants).
//
// The defaults carry the reference constants the simulation was tuned
// with: 32-unit cells over a 25×19 grid (an 800×600 world), 200 u/s top
// speed, 4-second builds.
//
// See also: `sim.rs` which owns the `SimConfig` as part of `SimState`,
// `grid.rs` which is constructed from `GridParams`, `steering.rs` which
// reads `SteeringParams` every step.
//
// **Critical constraint: determinism.** Config values feed directly into
// simulation logic; two sims with the same seed and config stay identical.

use crate::types::GridCell;
use serde::{Deserialize, Serialize};

/// Cell lattice geometry and world bounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridParams {
    /// Side length of one grid cell in world units.
    pub cell_size: f32,
    /// Minimum corner of the grid, inclusive.
    pub min: GridCell,
    /// Maximum corner of the grid, exclusive.
    pub max: GridCell,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            min: GridCell::new(0, 0),
            max: GridCell::new(25, 19),
        }
    }
}

/// Seek/arrival locomotion parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SteeringParams {
    /// Top speed in world units per second.
    pub max_speed: f32,
    /// Agent mass; steering force is divided by this.
    pub mass: f32,
    /// Cap on the corrective steering force per step.
    pub max_force: f32,
    /// Distance inside which desired speed ramps linearly toward zero.
    pub slowing_radius: f32,
    /// Distance inside which an agent counts as arrived and hard-stops.
    pub arrival_radius: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            max_speed: 200.0,
            mass: 5.0,
            max_force: 20.0,
            slowing_radius: 100.0,
            arrival_radius: 15.0,
        }
    }
}

/// Build durations and idle-wander behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkParams {
    /// Seconds of on-site work a placement requires. Non-positive values
    /// mean "complete immediately on arrival".
    pub build_time: f32,
    /// Minimum duration of one idle wander leg, seconds.
    pub idle_min_time: f32,
    /// Maximum duration of one idle wander leg, seconds.
    pub idle_max_time: f32,
    /// Half-extent of the box around the worker that wander targets are
    /// drawn from. Must comfortably exceed the arrival radius or idle
    /// workers will stand still.
    pub wander_radius: f32,
}

impl Default for WorkParams {
    fn default() -> Self {
        Self {
            build_time: 4.0,
            idle_min_time: 0.0,
            idle_max_time: 1.0,
            wander_radius: 64.0,
        }
    }
}

/// Camera and render-facing constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewParams {
    /// Camera pan speed in world units per second per held direction.
    pub pan_speed: f32,
    /// Multiplicative zoom step per zoom action.
    pub zoom_step: f32,
    /// Lower zoom clamp.
    pub zoom_min: f32,
    /// Upper zoom clamp.
    pub zoom_max: f32,
    /// World units a worker travels per walk-cycle frame advance.
    pub distance_per_frame: f32,
    /// Alpha of a planned (not yet built) fixture, 0–255.
    pub plan_alpha: u8,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            pan_speed: 300.0,
            zoom_step: 1.25,
            zoom_min: 0.25,
            zoom_max: 4.0,
            distance_per_frame: 20.0,
            plan_alpha: 25,
        }
    }
}

/// Top-level simulation configuration. Loaded once, read everywhere.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid: GridParams,
    pub steering: SteeringParams,
    pub work: WorkParams,
    pub view: ViewParams,
}

impl SimConfig {
    /// Parse a config from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON (for writing a default config file).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
