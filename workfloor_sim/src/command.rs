// External actions — the only way outside code mutates the simulation.
//
// The input collaborator (window/event layer) decodes raw device events
// into a deduplicated set of `Action`s per tick and hands them to
// `SimState::tick()` inside an `InputFrame`. The set semantics make every
// action idempotent within a tick: inserting the same action twice has no
// additional effect.
//
// `Action` is deliberately payload-light so the set can be a `BTreeSet`
// (deterministic iteration order). The one piece of continuous input — the
// pointer position a placement refers to — travels alongside the set in
// the frame, the same way the reference front-end tracks the mouse
// position next to its action set.
//
// See also: `sim.rs` for `SimState::tick()` which applies a frame,
// `render.rs` for the camera the pan/zoom actions drive.
//
// **Critical constraint: determinism.** Actions are applied in `BTreeSet`
// order; `Reset` is checked first and short-circuits the tick.

use crate::types::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Direction for a camera pan action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PanDir {
    Left,
    Right,
    Up,
    Down,
}

/// Direction for a camera zoom action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoomDir {
    In,
    Out,
}

/// A discrete action kind produced by the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Pan the camera one step in the given direction.
    Pan(PanDir),
    /// Zoom the camera one step in or out.
    Zoom(ZoomDir),
    /// Spawn a worker at a random position in the world.
    SpawnWorker,
    /// Request a fixture placement at the frame's pointer position.
    PlaceFixture,
    /// Toggle the build brush on or off.
    ToggleBrush,
    /// Discard the entire world and rebuild it from the seed.
    Reset,
}

/// One tick's worth of external input: the deduplicated action set plus
/// the pointer position placements refer to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub actions: BTreeSet<Action>,
    pub pointer: Vec2,
}

impl InputFrame {
    /// A frame containing just the given actions, pointer at the origin.
    pub fn with_actions(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            pointer: Vec2::ZERO,
        }
    }

    /// A placement request at the given world position.
    pub fn place_at(pointer: Vec2) -> Self {
        Self {
            actions: BTreeSet::from([Action::PlaceFixture]),
            pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_set_deduplicates() {
        let frame = InputFrame::with_actions([
            Action::SpawnWorker,
            Action::SpawnWorker,
            Action::Pan(PanDir::Left),
        ]);
        assert_eq!(frame.actions.len(), 2);
    }

    #[test]
    fn input_frame_serialization_roundtrip() {
        let frame = InputFrame {
            actions: BTreeSet::from([Action::PlaceFixture, Action::Zoom(ZoomDir::In)]),
            pointer: Vec2::new(120.0, 88.0),
        };
        let json = serde_json::to_string(&frame).unwrap();
        let restored: InputFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.actions, frame.actions);
        assert_eq!(restored.pointer, frame.pointer);
    }
}
