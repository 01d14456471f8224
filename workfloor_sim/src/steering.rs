// Seek/arrival steering — turns a single waypoint into smooth motion.
//
// One call to `steer()` advances a worker's position and velocity by one
// time step toward one steering target (a waypoint, never the final goal
// directly — the scheduler in `sim.rs` feeds waypoints in sequence). The
// model is classic seek with arrival shaping: desired velocity points at
// the target at `max_speed`, ramping down linearly inside `slowing_radius`;
// the difference to the current velocity is truncated to `max_force` and
// applied through the agent's mass.
//
// Inside `arrival_radius` the agent hard-stops (velocity forced to exactly
// zero) instead of decelerating asymptotically, which is what lets the
// scheduler treat "within arrival radius" as a crisp waypoint-reached test.
//
// `facing_of()` derives the sprite facing the rendering collaborator
// consumes: the cardinal whose unit vector best aligns with the velocity.
//
// See also: `sim.rs` for waypoint advancement and fault isolation,
// `config.rs` for `SteeringParams`, `types.rs` for `Vec2`/`Facing`.
//
// **Critical constraint: determinism.** Pure functions of their arguments;
// no randomness, no global state.

use crate::config::SteeringParams;
use crate::types::{Facing, Vec2};

/// The result of one steering step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steered {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Advance `position`/`velocity` one step of `dt` seconds toward `target`.
///
/// Returns `None` when the computed state is non-finite — the numeric
/// invariant has been violated (e.g. a degenerate config) and the caller
/// must not write the result back into the agent.
pub fn steer(
    position: Vec2,
    velocity: Vec2,
    target: Vec2,
    dt: f32,
    params: &SteeringParams,
) -> Option<Steered> {
    let offset = target - position;
    let dist = offset.length();

    if !dist.is_finite() {
        return None;
    }

    // Hard stop inside the arrival radius.
    if dist < params.arrival_radius {
        return Some(Steered {
            position,
            velocity: Vec2::ZERO,
        });
    }

    // Arrival shaping: ramp desired speed down linearly inside the slowing
    // radius, full speed outside it.
    let desired_speed = if dist < params.slowing_radius {
        params.max_speed * (dist / params.slowing_radius)
    } else {
        params.max_speed
    };
    let desired_velocity = offset.normalized_or_zero() * desired_speed;

    let steering_force = (desired_velocity - velocity).truncated(params.max_force);
    let new_velocity = (velocity + steering_force * (1.0 / params.mass)).truncated(params.max_speed);
    let new_position = position + new_velocity * dt;

    if !new_position.is_finite() || !new_velocity.is_finite() {
        return None;
    }

    Some(Steered {
        position: new_position,
        velocity: new_velocity,
    })
}

/// The cardinal facing whose unit vector has the largest dot product with
/// `velocity`, or `None` for a zero velocity (a stopped worker keeps its
/// previous facing). Ties resolve to the first facing in down/right/up/left
/// order.
pub fn facing_of(velocity: Vec2) -> Option<Facing> {
    if velocity == Vec2::ZERO {
        return None;
    }
    let mut best = Facing::Down;
    let mut best_dot = velocity.dot(best.unit());
    for facing in [Facing::Right, Facing::Up, Facing::Left] {
        let d = velocity.dot(facing.unit());
        if d > best_dot {
            best = facing;
            best_dot = d;
        }
    }
    Some(best)
}
