//! The Halton sequence with Faure permuted digits. The first two
//! dimensions are enumerated so that the samples of every pixel of
//! an image are consecutive, non-overlapping stretches of one global
//! sequence.

use log::debug;
// pbrt
use crate::core::lowdiscrepancy::{
    inverse_radical_inverse, multiplicative_inverse, scrambled_radical_inverse,
    scrambled_radical_inverse_f64, FAURE_PERMUTATIONS, PRIMES, PRIME_TABLE_SIZE,
};
use crate::core::pbrt::Float;
use crate::core::random::UniformRandom;
use crate::core::rng::ONE_MINUS_EPSILON;
use crate::core::sequence::SequenceState;

// see halton.h

/// Pixels are enumerated modulo this resolution; larger images repeat
/// the per-pixel point sets.
pub const K_MAX_RESOLUTION: u64 = 128_u64;
/// Largest supported image width or height, `3^10`.
pub const MAX_HALTON_RESOLUTION: usize = 59049_usize;
pub const HALTON_DIMENSIONS: usize = PRIME_TABLE_SIZE;

/// Maps `(sample_index, pixel)` to an index into the global Halton
/// sequence for one image resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct HaltonEnumerator {
    image_dimensions: (usize, usize),
    base_scales: [u64; 2],
    base_exponents: [u64; 2],
    sample_stride: u64,
    mult_inverse: [u64; 2],
}

impl HaltonEnumerator {
    pub fn new(image_dimensions: (usize, usize)) -> Option<Self> {
        let (width, height) = image_dimensions;
        if width == 0 || height == 0 || width > MAX_HALTON_RESOLUTION || height > MAX_HALTON_RESOLUTION
        {
            return None;
        }
        // find radical inverse base scales and exponents that cover sampling area
        let mut base_scales: [u64; 2] = [1_u64; 2];
        let mut base_exponents: [u64; 2] = [0_u64; 2];
        for (i, extent) in [width, height].iter().enumerate() {
            let base: u64 = if i == 0 { 2 } else { 3 };
            let scale: u64 = (*extent as u64).min(K_MAX_RESOLUTION);
            while base_scales[i] < scale {
                base_scales[i] *= base;
                base_exponents[i] += 1;
            }
        }
        // compute multiplicative inverses for _base_scales_
        let mult_inverse: [u64; 2] = [
            multiplicative_inverse(base_scales[1] as i64, base_scales[0] as i64),
            multiplicative_inverse(base_scales[0] as i64, base_scales[1] as i64),
        ];
        Some(HaltonEnumerator {
            image_dimensions,
            base_scales,
            base_exponents,
            sample_stride: base_scales[0] * base_scales[1],
            mult_inverse,
        })
    }
    pub fn image_dimensions(&self) -> (usize, usize) {
        self.image_dimensions
    }
    pub fn base_scales(&self) -> [u64; 2] {
        self.base_scales
    }
    pub fn base_exponents(&self) -> [u64; 2] {
        self.base_exponents
    }
    /// Global indices have to fit into 32 bits.
    pub fn max_samples_per_pixel(&self) -> u64 {
        u64::from(u32::MAX) / self.sample_stride
    }
    pub fn index_for_sample(&self, sample_index: u64, pixel: (usize, usize)) -> Option<u64> {
        if sample_index >= self.max_samples_per_pixel()
            || pixel.0 >= self.image_dimensions.0
            || pixel.1 >= self.image_dimensions.1
        {
            return None;
        }
        let mut offset: u64 = 0_u64;
        if self.sample_stride > 1_u64 {
            let pm: [u64; 2] = [
                pixel.0 as u64 % K_MAX_RESOLUTION,
                pixel.1 as u64 % K_MAX_RESOLUTION,
            ];
            for i in 0..2 {
                let base: u64 = if i == 0 { 2 } else { 3 };
                let dim_offset: u64 = inverse_radical_inverse(base, pm[i], self.base_exponents[i]);
                offset += dim_offset * (self.sample_stride / self.base_scales[i]) * self.mult_inverse[i];
            }
            offset %= self.sample_stride;
        }
        Some(offset + sample_index * self.sample_stride)
    }
}

#[derive(Debug, Default, Clone)]
pub struct HaltonSequence {
    state: SequenceState,
    enumerator: Option<HaltonEnumerator>,
    global_index: u64,
    valid: bool,
}

impl HaltonSequence {
    pub fn new() -> Self {
        HaltonSequence::default()
    }
    pub fn dimensions() -> usize {
        HALTON_DIMENSIONS
    }
    pub fn capacity(image_dimensions: (usize, usize)) -> u64 {
        HaltonEnumerator::new(image_dimensions).map_or(0_u64, |e| e.max_samples_per_pixel())
    }
    pub fn state(&self) -> &SequenceState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut SequenceState {
        &mut self.state
    }
    /// Halton needs no entropy.
    pub fn permute(&mut self, _entropy: &mut dyn UniformRandom) {}
    pub fn start(
        &mut self,
        image_dimensions: (usize, usize),
        pixel: (usize, usize),
        sample_index: u32,
    ) -> bool {
        self.state.reset(image_dimensions, pixel, sample_index);
        self.valid = false;
        let reuse: bool = self
            .enumerator
            .as_ref()
            .map_or(false, |e| e.image_dimensions == image_dimensions);
        if !reuse {
            debug!("Halton enumerator for {:?}", image_dimensions);
            self.enumerator = HaltonEnumerator::new(image_dimensions);
        }
        let index: Option<u64> = self
            .enumerator
            .as_ref()
            .and_then(|e| e.index_for_sample(u64::from(sample_index), pixel));
        match index {
            Some(index) => {
                self.global_index = index;
                self.valid = true;
                true
            }
            None => false,
        }
    }
    pub fn next(&mut self) -> Option<Float> {
        let dim: usize = self.state.dimension as usize;
        if !self.valid || dim >= HALTON_DIMENSIONS {
            return None;
        }
        let enumerator: &HaltonEnumerator = self.enumerator.as_ref()?;
        self.state.dimension += 1;
        let value: Float = match dim {
            0 => {
                let frac: f64 = scrambled_radical_inverse_f64(
                    2,
                    &FAURE_PERMUTATIONS[0],
                    self.global_index >> enumerator.base_exponents[0],
                );
                ((self.state.pixel.0 as f64 + frac) / self.state.image_dimensions.0 as f64) as Float
            }
            1 => {
                let frac: f64 = scrambled_radical_inverse_f64(
                    3,
                    &FAURE_PERMUTATIONS[1],
                    self.global_index / enumerator.base_scales[1],
                );
                ((self.state.pixel.1 as f64 + frac) / self.state.image_dimensions.1 as f64) as Float
            }
            _ => scrambled_radical_inverse(PRIMES[dim], &FAURE_PERMUTATIONS[dim], self.global_index),
        };
        Some(value.min(ONE_MINUS_EPSILON))
    }
    pub fn discard(&mut self, n: usize) {
        self.state.advance(n, HALTON_DIMENSIONS);
    }
    pub fn sample_weight(&self, desired_samples: u32) -> Float {
        let capacity: u64 = self
            .enumerator
            .as_ref()
            .map_or(u64::from(u32::MAX), |e| e.max_samples_per_pixel());
        1.0 as Float / u64::from(desired_samples).min(capacity).max(1) as Float
    }
}
