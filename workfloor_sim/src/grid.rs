// Grid occupancy index — the spatial truth for placement blocking.
//
// `GridIndex` quantizes continuous world positions onto a fixed-size cell
// lattice and tracks which cells are blocked by completed fixtures. Only
// permanent placements occupy cells; workers share cells freely while
// moving. Membership tests are O(1) hash lookups (`FxHashSet` keyed by the
// integer cell coordinate), never a linear scan.
//
// Every successful mutation bumps a monotonic `revision` counter. Cached
// routes record the revision they were computed against, giving the
// scheduler a cheap way to detect that occupancy may have changed under a
// route without rescanning the set every tick (see `sim.rs`).
//
// See also: `pathfinding.rs` which queries `occupied()`/`in_bounds()` during
// search, `sim.rs` which owns the `GridIndex` as part of `SimState`,
// `config.rs` for `GridParams`.
//
// **Critical constraint: determinism.** The occupancy set is queried for
// membership only — its iteration order never influences simulation
// behavior, so a hash set is safe here.

use crate::config::GridParams;
use crate::types::{GridCell, Vec2};
use rustc_hash::FxHashSet;

/// Occupancy index over the placement grid. Bounds are half-open: a cell is
/// in bounds when `min <= cell < max` on both axes.
#[derive(Clone, Debug)]
pub struct GridIndex {
    cell_size: f32,
    min: GridCell,
    max: GridCell,
    occupied: FxHashSet<GridCell>,
    revision: u64,
}

impl GridIndex {
    pub fn new(params: &GridParams) -> Self {
        Self {
            cell_size: params.cell_size,
            min: params.min,
            max: params.max,
            occupied: FxHashSet::default(),
            revision: 0,
        }
    }

    /// Snap a world position to its containing cell: `position − (position
    /// mod cell_size)`, expressed as floor division so negative positions
    /// quantize correctly.
    pub fn cell_of(&self, pos: Vec2) -> GridCell {
        GridCell::new(
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// World position of a cell's center — the point steering aims at.
    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        Vec2::new(
            (cell.x as f32 + 0.5) * self.cell_size,
            (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Half-open bounds test: `min <= cell < max`.
    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.x >= self.min.x && cell.x < self.max.x && cell.y >= self.min.y && cell.y < self.max.y
    }

    /// O(1) membership test.
    pub fn occupied(&self, cell: GridCell) -> bool {
        self.occupied.contains(&cell)
    }

    /// Mark a cell blocked. Idempotent: adding an already-occupied cell is a
    /// no-op and does not bump the revision.
    pub fn add(&mut self, cell: GridCell) {
        if self.occupied.insert(cell) {
            self.revision += 1;
        }
    }

    /// Mark a cell free. Idempotent: removing an absent cell is a no-op and
    /// does not bump the revision.
    pub fn remove(&mut self, cell: GridCell) {
        if self.occupied.remove(&cell) {
            self.revision += 1;
        }
    }

    /// Monotonic counter incremented on every successful add/remove. Routes
    /// cache this to detect occupancy changes since they were computed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn min(&self) -> GridCell {
        self.min
    }

    pub fn max(&self) -> GridCell {
        self.max
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
}
