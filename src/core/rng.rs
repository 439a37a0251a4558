//! Random Number Generator

use hexf::*;
use rand_core::{impls, Error, RngCore, SeedableRng};

// pbrt
use crate::core::pbrt::Float;

// see rng.h

pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1");
pub const DOUBLE_ONE_MINUS_EPSILON: f64 = hexf64!("0x1.fffffffffffffp-1");
#[cfg(not(feature = "float-as-double"))]
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;
#[cfg(feature = "float-as-double")]
pub const ONE_MINUS_EPSILON: Float = DOUBLE_ONE_MINUS_EPSILON;
pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// Map 32 random bits to a float in [0, 1).
pub fn u32_to_unit_float(v: u32) -> f32 {
    (v as f32 * hexf32!("0x1.0p-32")).min(FLOAT_ONE_MINUS_EPSILON)
}

/// Map 64 random bits to a double in [0, 1).
pub fn u64_to_unit_double(v: u64) -> f64 {
    (v as f64 * hexf64!("0x1.0p-64")).min(DOUBLE_ONE_MINUS_EPSILON)
}

/// PCG32 random number generator. Serves as the raw 32-bit bitstream
/// behind [BitstreamRandom](crate::core::random::BitstreamRandom).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new()
    }
}

impl Rng {
    pub fn new() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0_u64;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        // C++: state = oldstate * PCG32_MULT + inc;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        // C++: uint32_t xorshifted = (uint32_t)(((oldstate >> 18u) ^ oldstate) >> 27u);
        let xorshifted: u32 = ((oldstate >> 18) ^ oldstate).wrapping_shr(27) as u32;
        // C++: uint32_t rot = (uint32_t)(oldstate >> 59u);
        let rot: u32 = (oldstate >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
    /// Uniform integer in [0, b). Returns 0 for an empty range.
    pub fn uniform_uint32_bounded(&mut self, b: u32) -> u32 {
        if b == 0 {
            return 0;
        }
        // C++: uint32_t threshold = (~b + 1u) % b;
        let threshold: u32 = b.wrapping_neg() % b;
        loop {
            let r = self.uniform_uint32();
            if r >= threshold {
                return r % b;
            }
        }
    }
    pub fn uniform_float(&mut self) -> f32 {
        u32_to_unit_float(self.uniform_uint32())
    }
}

impl RngCore for Rng {
    fn next_u32(&mut self) -> u32 {
        self.uniform_uint32()
    }
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Rng {
    type Seed = [u8; 8];
    fn from_seed(seed: Self::Seed) -> Self {
        let mut rng = Rng::new();
        rng.set_sequence(u64::from_le_bytes(seed));
        rng
    }
}
