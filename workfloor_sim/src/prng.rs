// Deterministic, portable pseudo-random number generator for the simulation.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled with zero external dependencies so the same seed produces the
// same spawn positions and wander targets on every platform.
//
// The sim state owns exactly one `SimRng`; spawn placement and idle-wander
// synthesis are the only consumers. See `sim.rs`.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state, regardless of platform or optimization
// level. No stdlib PRNG, no OS entropy, no system time.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG — the simulation's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimRng {
    s: [u64; 4],
}

impl SimRng {
    /// Create a new PRNG seeded from a `u64`, expanded to the 256-bit
    /// internal state via SplitMix64.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform `f32` in [0, 1) from the upper 24 bits of a `u64`
    /// (24 bits fills the f32 mantissa).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Generate a uniform random value in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        assert!(low < high, "range_f32: low must be less than high");
        low + self.next_f32() * (high - low)
    }
}

/// SplitMix64 — the xoshiro authors' recommended way to expand a small seed
/// into the full 256-bit state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
