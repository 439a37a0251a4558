//! The Sobol' sequence, optionally randomized with a fast
//! approximation of Owen scrambling. The image is embedded into a
//! square power of two grid and the first two dimensions are
//! enumerated per pixel of that grid.

use hexf::hexf64;
use log::debug;
use strum_macros::{Display, EnumString};
// pbrt
use crate::core::lowdiscrepancy::sobol_interval_to_index;
use crate::core::pbrt::{mix_bits, round_up_pow2_64, Float};
use crate::core::random::UniformRandom;
use crate::core::rng::ONE_MINUS_EPSILON;
use crate::core::sequence::SequenceState;
use crate::core::sobolmatrices::{
    MAX_SOBOL_LOG_2_RESOLUTION, NUM_SOBOL_DIMENSIONS, SOBOL_MATRIX_SIZE,
};

// see sobol.h

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Scrambler {
    None,
    FastOwen,
}

impl Default for Scrambler {
    fn default() -> Self {
        Scrambler::FastOwen
    }
}

#[derive(Debug, Clone)]
pub struct SobolSequence {
    state: SequenceState,
    scrambler: Scrambler,
    seeds: [u32; 2],
    global_index: u64,
    rescale: [f64; 2],
    valid: bool,
}

impl SobolSequence {
    pub fn new(scrambler: Scrambler) -> Self {
        SobolSequence {
            state: SequenceState::default(),
            scrambler,
            seeds: [0_u32; 2],
            global_index: 0_u64,
            rescale: [1.0_f64; 2],
            valid: false,
        }
    }
    pub fn dimensions() -> usize {
        NUM_SOBOL_DIMENSIONS
    }
    /// Side length of the square power of two grid an image is
    /// embedded in, together with its `log2`.
    pub fn resolution(image_dimensions: (usize, usize)) -> (u64, u32) {
        let resolution: u64 =
            round_up_pow2_64(image_dimensions.0.max(image_dimensions.1) as u64);
        (resolution, resolution.trailing_zeros())
    }
    /// The samples per pixel left after the `2m` pixel bits are taken
    /// from a 52 bit index, limited to what a `u32` sample index reaches.
    pub fn capacity(image_dimensions: (usize, usize)) -> u64 {
        if image_dimensions.0 == 0 || image_dimensions.1 == 0 {
            return 0_u64;
        }
        let (_, log_2_resolution) = SobolSequence::resolution(image_dimensions);
        if log_2_resolution > MAX_SOBOL_LOG_2_RESOLUTION {
            return 0_u64;
        }
        let frame_bits: u32 = SOBOL_MATRIX_SIZE as u32 - 2 * log_2_resolution;
        1_u64 << frame_bits.min(32)
    }
    pub fn scrambler(&self) -> Scrambler {
        self.scrambler
    }
    pub fn seeds(&self) -> [u32; 2] {
        self.seeds
    }
    pub fn state(&self) -> &SequenceState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut SequenceState {
        &mut self.state
    }
    pub fn permute(&mut self, entropy: &mut dyn UniformRandom) {
        if self.scrambler == Scrambler::FastOwen {
            for seed in self.seeds.iter_mut() {
                let hi: u32 = entropy.next_index(1 << 16) as u32;
                let lo: u32 = entropy.next_index(1 << 16) as u32;
                *seed = (hi << 16) | lo;
            }
        }
    }
    pub fn start(
        &mut self,
        image_dimensions: (usize, usize),
        pixel: (usize, usize),
        sample_index: u32,
    ) -> bool {
        let resized: bool = self.state.image_dimensions != image_dimensions;
        self.state.reset(image_dimensions, pixel, sample_index);
        self.valid = false;
        let (width, height) = image_dimensions;
        if width == 0 || height == 0 || pixel.0 >= width || pixel.1 >= height {
            return false;
        }
        let (resolution, log_2_resolution) = SobolSequence::resolution(image_dimensions);
        if resized {
            debug!(
                "Sobol' resolution {} (2^{}) for {:?}",
                resolution, log_2_resolution, image_dimensions
            );
        }
        if log_2_resolution > MAX_SOBOL_LOG_2_RESOLUTION {
            return false;
        }
        let index: Option<u64> = sobol_interval_to_index(
            log_2_resolution,
            u64::from(sample_index),
            (pixel.0 as u64, pixel.1 as u64),
        );
        match index {
            Some(index) => {
                self.global_index = index;
                self.rescale = [
                    resolution as f64 / width as f64,
                    resolution as f64 / height as f64,
                ];
                self.valid = true;
                true
            }
            None => false,
        }
    }
    pub fn next(&mut self) -> Option<Float> {
        let dim: usize = self.state.dimension as usize;
        if !self.valid || dim >= NUM_SOBOL_DIMENSIONS {
            return None;
        }
        self.state.dimension += 1;
        let word: u64 = self.sample_word(dim)?;
        let value: Float = if dim < 2 {
            (word as f64 * hexf64!("0x1.0p-64") * self.rescale[dim]) as Float
        } else {
            unit_value(word)
        };
        Some(value.min(ONE_MINUS_EPSILON))
    }
    pub fn discard(&mut self, n: usize) {
        self.state.advance(n, NUM_SOBOL_DIMENSIONS);
    }
    pub fn sample_weight(&self, desired_samples: u32) -> Float {
        1.0 as Float / desired_samples.max(1) as Float
    }
    fn dimension_seed(&self, dim: usize) -> u64 {
        let seed: u64 = (u64::from(self.seeds[0]) << 32) | u64::from(self.seeds[1]);
        mix_bits(seed ^ dim as u64)
    }
    /// The (scrambled) sample bits of *dim*, left aligned in 64 bits.
    #[cfg(not(feature = "float-as-double"))]
    fn sample_word(&self, dim: usize) -> Option<u64> {
        use crate::core::lowdiscrepancy::{fast_owen_scramble, sobol_sample_u32};
        let mut v: u32 = sobol_sample_u32(self.global_index, dim)?;
        if dim >= 2 && self.scrambler == Scrambler::FastOwen {
            v = fast_owen_scramble(v, self.dimension_seed(dim) as u32);
        }
        Some(u64::from(v) << 32)
    }
    #[cfg(feature = "float-as-double")]
    fn sample_word(&self, dim: usize) -> Option<u64> {
        use crate::core::lowdiscrepancy::{fast_owen_scramble_u64, sobol_sample_u64};
        let mut v: u64 = sobol_sample_u64(self.global_index, dim)?;
        if dim >= 2 && self.scrambler == Scrambler::FastOwen {
            v = fast_owen_scramble_u64(v, self.dimension_seed(dim));
        }
        Some(v)
    }
}

#[cfg(not(feature = "float-as-double"))]
fn unit_value(word: u64) -> Float {
    crate::core::rng::u32_to_unit_float((word >> 32) as u32)
}

#[cfg(feature = "float-as-double")]
fn unit_value(word: u64) -> Float {
    crate::core::rng::u64_to_unit_double(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::BitstreamRandom;

    #[test]
    fn scrambler_names() {
        assert_eq!("none".parse::<Scrambler>().unwrap(), Scrambler::None);
        assert_eq!("fastowen".parse::<Scrambler>().unwrap(), Scrambler::FastOwen);
        assert_eq!(Scrambler::FastOwen.to_string(), "fastowen");
        assert!("owen".parse::<Scrambler>().is_err());
    }

    #[test]
    fn resolution_and_capacity() {
        assert_eq!(SobolSequence::resolution((255, 255)), (256, 8));
        assert_eq!(SobolSequence::resolution((1, 1)), (1, 0));
        assert_eq!(SobolSequence::capacity((255, 255)), 1 << 32);
        assert_eq!(SobolSequence::capacity((1 << 20, 3)), 1 << 12);
        assert_eq!(SobolSequence::capacity((1 << 26, 1)), 1);
        assert_eq!(SobolSequence::capacity(((1 << 26) + 1, 1)), 0);
        assert_eq!(SobolSequence::capacity((0, 1)), 0);
    }

    #[test]
    fn start_rejects_bad_input() {
        let mut sequence = SobolSequence::new(Scrambler::None);
        assert!(!sequence.start((0, 4), (0, 0), 0));
        assert!(!sequence.start((4, 4), (4, 0), 0));
        assert!(!sequence.start(((1 << 26) + 1, 1), (0, 0), 0));
        assert_eq!(sequence.next(), None);
        assert!(sequence.start((1 << 26, 1), (12345, 0), 0));
        assert!(!sequence.start((1 << 26, 1), (12345, 0), 1));
        assert!(sequence.start((1 << 20, 3), (7, 2), (1 << 12) - 1));
        assert!(!sequence.start((1 << 20, 3), (7, 2), 1 << 12));
    }

    #[test]
    fn first_dimensions_stay_in_pixel() {
        let mut sequence = SobolSequence::new(Scrambler::FastOwen);
        for (dims, pixel) in [((2, 2), (1, 1)), ((2, 2), (0, 0)), ((255, 131), (254, 130)), ((7, 1), (3, 0))]
            .iter()
        {
            for sample_index in 0..64 {
                assert!(sequence.start(*dims, *pixel, sample_index));
                let u = sequence.next().unwrap();
                let v = sequence.next().unwrap();
                let (x0, x1) = (pixel.0 as Float / dims.0 as Float, (pixel.0 + 1) as Float / dims.0 as Float);
                let (y0, y1) = (pixel.1 as Float / dims.1 as Float, (pixel.1 + 1) as Float / dims.1 as Float);
                assert!(u >= x0 && u <= x1 && u < 1.0, "{} not in [{}, {})", u, x0, x1);
                assert!(v >= y0 && v <= y1 && v < 1.0, "{} not in [{}, {})", v, y0, y1);
            }
        }
    }

    #[test]
    fn runs_out_of_dimensions() {
        let mut sequence = SobolSequence::new(Scrambler::FastOwen);
        assert!(sequence.start((255, 255), (4, 4), 0));
        for _ in 0..NUM_SOBOL_DIMENSIONS {
            let v = sequence.next().unwrap();
            assert!(v >= 0.0 && v < 1.0);
        }
        assert_eq!(sequence.next(), None);
    }

    #[test]
    fn discard_skips_dimensions() {
        let mut a = SobolSequence::new(Scrambler::FastOwen);
        let mut entropy = BitstreamRandom::default();
        a.permute(&mut entropy);
        let mut b = a.clone();
        assert!(a.start((64, 48), (10, 40), 9));
        assert!(b.start((64, 48), (10, 40), 9));
        a.discard(11);
        for _ in 0..11 {
            b.next();
        }
        assert_eq!(a.next(), b.next());
        a.discard(5000);
        assert_eq!(a.next(), None);
    }

    #[test]
    fn permute_draws_seeds_only_when_scrambling() {
        let mut entropy = BitstreamRandom::default();
        let mut plain = SobolSequence::new(Scrambler::None);
        plain.permute(&mut entropy);
        assert_eq!(plain.seeds(), [0, 0]);
        let mut first = SobolSequence::new(Scrambler::FastOwen);
        let mut second = SobolSequence::new(Scrambler::FastOwen);
        first.permute(&mut entropy);
        second.permute(&mut entropy);
        assert_ne!(first.seeds(), second.seeds());
    }

    #[test]
    fn weights_are_reciprocal() {
        let sequence = SobolSequence::new(Scrambler::None);
        assert_eq!(sequence.sample_weight(1), 1.0);
        assert_eq!(sequence.sample_weight(2), 0.5);
        assert_eq!(sequence.sample_weight(0), 1.0);
    }

    #[cfg(not(feature = "float-as-double"))]
    #[test]
    fn reference_values() {
        let mut plain = SobolSequence::new(Scrambler::None);
        let mut scrambled = SobolSequence::new(Scrambler::FastOwen);
        scrambled.seeds = [0x1234_5678, 0x9abc_def0];
        assert!(plain.start((64, 64), (5, 6), 3));
        assert!(scrambled.start((64, 64), (5, 6), 3));
        assert_eq!(plain.global_index, 13864);
        let expected_plain: [f32; 6] = [
            0.079_772_95,
            0.094_299_316,
            0.993_469_24,
            0.580_627_44,
            0.343_444_82,
            0.553_894_04,
        ];
        let expected_scrambled: [f32; 6] = [
            0.079_772_95,
            0.094_299_316,
            0.897_955_54,
            0.325_484_66,
            0.975_036_3,
            0.766_582,
        ];
        for (p, s) in expected_plain.iter().zip(expected_scrambled.iter()) {
            assert_eq!(plain.next(), Some(*p));
            assert_eq!(scrambled.next(), Some(*s));
        }
    }
}
