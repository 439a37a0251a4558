//! Uniform randomness as seen by samplers and integrators.
//!
//! [UniformRandom] is the capability every source of randomness
//! offers: bounded indices, reals in [0, 1) at two precision tiers
//! (*geometric* follows [Float], *visual* is always `f32`), skipping
//! draws and replication for another worker thread.
//!
//! [BitstreamRandom] wraps any raw uniform bit generator implementing
//! `rand_core::RngCore`. Its draws are independent, so discarding is
//! a no-op.

// others
use rand_core::{RngCore, SeedableRng};
// pbrt
use crate::core::pbrt::Float;
use crate::core::rng::{u32_to_unit_float, Rng};

pub trait UniformRandom: Send {
    /// Uniform index in `[0, bound)`. A bound of zero or one yields 0.
    fn next_index(&mut self, bound: usize) -> usize;
    /// Uniform real in `[0, 1)` at the precision of [Float].
    fn next_geometric(&mut self) -> Float;
    /// Uniform real in `[0, 1)` at single precision.
    fn next_visual(&mut self) -> f32;
    fn discard_geometric(&mut self, n: usize);
    fn discard_visual(&mut self, n: usize);
    /// Independent generator, derived from (and advancing) this one.
    fn replicate(&mut self) -> Box<dyn UniformRandom>;
}

#[derive(Debug, Clone)]
pub struct BitstreamRandom<R = Rng> {
    bitstream: R,
}

impl<R> BitstreamRandom<R>
where
    R: RngCore + SeedableRng + Send + 'static,
{
    pub fn new(bitstream: R) -> Self {
        BitstreamRandom { bitstream }
    }
    /// Seed a new, independent bitstream from the next 64 bits of this one.
    pub fn split(&mut self) -> Self {
        BitstreamRandom {
            bitstream: R::seed_from_u64(self.bitstream.next_u64()),
        }
    }
}

impl Default for BitstreamRandom<Rng> {
    fn default() -> Self {
        BitstreamRandom::new(Rng::new())
    }
}

impl<R> UniformRandom for BitstreamRandom<R>
where
    R: RngCore + SeedableRng + Send + 'static,
{
    fn next_index(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        let b: u64 = bound as u64;
        if b <= u64::from(u32::MAX) {
            let b: u32 = b as u32;
            let threshold: u32 = b.wrapping_neg() % b;
            loop {
                let r: u32 = self.bitstream.next_u32();
                if r >= threshold {
                    return (r % b) as usize;
                }
            }
        }
        let threshold: u64 = b.wrapping_neg() % b;
        loop {
            let r: u64 = self.bitstream.next_u64();
            if r >= threshold {
                return (r % b) as usize;
            }
        }
    }
    #[cfg(not(feature = "float-as-double"))]
    fn next_geometric(&mut self) -> Float {
        u32_to_unit_float(self.bitstream.next_u32())
    }
    #[cfg(feature = "float-as-double")]
    fn next_geometric(&mut self) -> Float {
        crate::core::rng::u64_to_unit_double(self.bitstream.next_u64())
    }
    fn next_visual(&mut self) -> f32 {
        u32_to_unit_float(self.bitstream.next_u32())
    }
    fn discard_geometric(&mut self, _n: usize) {}
    fn discard_visual(&mut self, _n: usize) {}
    fn replicate(&mut self) -> Box<dyn UniformRandom> {
        Box::new(self.split())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_stay_below_bound() {
        let mut random = BitstreamRandom::default();
        for bound in [2_usize, 3, 10, 1 << 20].iter() {
            for _ in 0..200 {
                assert!(random.next_index(*bound) < *bound);
            }
        }
        assert_eq!(random.next_index(0), 0);
        assert_eq!(random.next_index(1), 0);
    }

    #[test]
    fn reals_stay_in_unit_interval() {
        let mut random = BitstreamRandom::default();
        for _ in 0..1000 {
            let g = random.next_geometric();
            let v = random.next_visual();
            assert!(g >= 0.0 && g < 1.0);
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn discard_does_not_advance() {
        let mut a = BitstreamRandom::default();
        let mut b = BitstreamRandom::default();
        a.discard_geometric(17);
        a.discard_visual(3);
        assert_eq!(a.next_visual(), b.next_visual());
    }

    #[test]
    fn replicas_are_independent() {
        let mut parent = BitstreamRandom::default();
        let mut first = parent.replicate();
        let mut second = parent.replicate();
        let a: Vec<usize> = (0..16).map(|_| first.next_index(1 << 30)).collect();
        let b: Vec<usize> = (0..16).map(|_| second.next_index(1 << 30)).collect();
        assert_ne!(a, b);
    }
}
