// Core types shared across the simulation.
//
// Defines the continuous 2D vector (`Vec2`) used for positions and
// velocities, the quantized grid coordinate (`GridCell`), strongly-typed
// entity identifiers, and the `Facing` enum exposed to the rendering
// collaborator. All types derive `Serialize`/`Deserialize` so commands,
// events, and config can cross the front-end boundary as JSON.
//
// The coordinate system uses screen conventions: X grows rightward, Y grows
// downward. `Facing::Down` therefore points toward +Y.
//
// **Critical constraint: determinism.** Entity IDs are sequential integers
// allocated by the sim state. Do not use UUID libraries or OS entropy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

// ---------------------------------------------------------------------------
// Continuous 2D vector
// ---------------------------------------------------------------------------

/// A 2D position or velocity in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or the zero vector if this vector
    /// has zero length. The zero case is the guard that keeps steering math
    /// free of NaN when an agent sits exactly on its target.
    pub fn normalized_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 { Self::new(self.x / len, self.y / len) } else { Self::ZERO }
    }

    /// This vector with its magnitude clamped to `max_len`.
    pub fn truncated(self, max_len: f32) -> Self {
        let len = self.length();
        if len > max_len && len > 0.0 {
            self * (max_len / len)
        } else {
            self
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Quantized grid coordinate
// ---------------------------------------------------------------------------

/// A cell in the placement grid, obtained by snapping a world position to
/// the cell lattice (see `GridIndex::cell_of`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Strongly-typed entity ID wrappers
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

entity_id!(/// Unique identifier for a worker agent.
WorkerId);
entity_id!(/// Unique identifier for a fixture (planned or built placement).
FixtureId);

// ---------------------------------------------------------------------------
// Facing — exposed to the rendering collaborator
// ---------------------------------------------------------------------------

/// The cardinal direction a worker's sprite faces. The discriminant order
/// (down, right, up, left) matches the sprite sheet row layout the renderer
/// expects, so `index()` can be used directly as a row selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Down,
    Right,
    Up,
    Left,
}

impl Facing {
    /// Unit vector for this facing, in screen coordinates (Y grows downward).
    pub fn unit(self) -> Vec2 {
        match self {
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Right => Vec2::new(1.0, 0.0),
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Sprite-sheet row index: down, right, up, left.
    pub fn index(self) -> usize {
        self as usize
    }

    /// All facings in index order.
    pub const ALL: [Facing; 4] = [Facing::Down, Facing::Right, Facing::Up, Facing::Left];
}
