//! A **LowDiscrepancySequence** hands out the coordinates of one
//! point of a deterministic, pixel and sample indexed point set, one
//! dimension at a time. Because it also implements
//! [UniformRandom](crate::core::random::UniformRandom), an integrator
//! can draw further dimensions from it as if it were plain
//! randomness.

// pbrt
use crate::core::pbrt::{mix_bits, Float};
use crate::core::random::{BitstreamRandom, UniformRandom};
use crate::core::rng::{Rng, FLOAT_ONE_MINUS_EPSILON};
// others
use rand_core::{RngCore, SeedableRng};
use crate::samplers::halton::HaltonSequence;
use crate::samplers::sobol::SobolSequence;

/// Per `start` state every sequence carries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SequenceState {
    pub image_dimensions: (usize, usize),
    pub pixel: (usize, usize),
    pub sample_index: u32,
    pub dimension: u32,
    // draws past the last dimension come from here
    overflow: Rng,
}

impl SequenceState {
    pub fn reset(&mut self, image_dimensions: (usize, usize), pixel: (usize, usize), sample_index: u32) {
        self.image_dimensions = image_dimensions;
        self.pixel = pixel;
        self.sample_index = sample_index;
        self.dimension = 0_u32;
        let pixel_bits: u64 = ((pixel.0 as u64) << 32) ^ pixel.1 as u64;
        self.overflow
            .set_sequence(mix_bits(pixel_bits ^ mix_bits(u64::from(sample_index))));
    }
    /// Skip *n* dimensions without going past *max_dimensions*.
    pub fn advance(&mut self, n: usize, max_dimensions: usize) {
        let dimension: usize = (self.dimension as usize).saturating_add(n);
        self.dimension = dimension.min(max_dimensions) as u32;
    }
    /// Entropy for scrambling a replica, split off the overflow stream.
    pub fn split_entropy(&mut self) -> BitstreamRandom<Rng> {
        BitstreamRandom::new(Rng::seed_from_u64(self.overflow.next_u64()))
    }
    #[cfg(not(feature = "float-as-double"))]
    fn overflow_geometric(&mut self) -> Float {
        self.overflow.uniform_float()
    }
    #[cfg(feature = "float-as-double")]
    fn overflow_geometric(&mut self) -> Float {
        crate::core::rng::u64_to_unit_double(self.overflow.next_u64())
    }
}

#[derive(Debug, Clone)]
pub enum LowDiscrepancySequence {
    Halton(HaltonSequence),
    Sobol(SobolSequence),
}

impl LowDiscrepancySequence {
    /// Draw the scrambling parameters. Called once per instance.
    pub fn permute(&mut self, entropy: &mut dyn UniformRandom) {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.permute(entropy),
            LowDiscrepancySequence::Sobol(sequence) => sequence.permute(entropy),
        }
    }
    /// Position the sequence on sample *sample_index* of *pixel*.
    /// Returns `false` when the index is beyond capacity; the sequence
    /// then yields nothing until the next successful start.
    pub fn start(
        &mut self,
        image_dimensions: (usize, usize),
        pixel: (usize, usize),
        sample_index: u32,
    ) -> bool {
        match self {
            LowDiscrepancySequence::Halton(sequence) => {
                sequence.start(image_dimensions, pixel, sample_index)
            }
            LowDiscrepancySequence::Sobol(sequence) => {
                sequence.start(image_dimensions, pixel, sample_index)
            }
        }
    }
    pub fn next(&mut self) -> Option<Float> {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.next(),
            LowDiscrepancySequence::Sobol(sequence) => sequence.next(),
        }
    }
    pub fn discard(&mut self, n: usize) {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.discard(n),
            LowDiscrepancySequence::Sobol(sequence) => sequence.discard(n),
        }
    }
    pub fn sample_weight(&self, desired_samples: u32) -> Float {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.sample_weight(desired_samples),
            LowDiscrepancySequence::Sobol(sequence) => sequence.sample_weight(desired_samples),
        }
    }
    pub fn duplicate(&self) -> LowDiscrepancySequence {
        self.clone()
    }
    /// A copy with freshly drawn scrambling, seeded from (and
    /// advancing) this sequence's overflow stream.
    pub fn replicate_scrambled(&mut self) -> LowDiscrepancySequence {
        let mut entropy: BitstreamRandom<Rng> = self.state_mut().split_entropy();
        let mut replica: LowDiscrepancySequence = self.duplicate();
        replica.permute(&mut entropy);
        replica
    }
    /// Number of dimensions `next` can produce after a `start`.
    pub fn dimensions(&self) -> usize {
        match self {
            LowDiscrepancySequence::Halton(_) => HaltonSequence::dimensions(),
            LowDiscrepancySequence::Sobol(_) => SobolSequence::dimensions(),
        }
    }
    /// Samples per pixel the generator supports at *image_dimensions*,
    /// zero for unsupported resolutions.
    pub fn capacity(&self, image_dimensions: (usize, usize)) -> u64 {
        match self {
            LowDiscrepancySequence::Halton(_) => HaltonSequence::capacity(image_dimensions),
            LowDiscrepancySequence::Sobol(_) => SobolSequence::capacity(image_dimensions),
        }
    }
    pub fn state(&self) -> &SequenceState {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.state(),
            LowDiscrepancySequence::Sobol(sequence) => sequence.state(),
        }
    }
    fn state_mut(&mut self) -> &mut SequenceState {
        match self {
            LowDiscrepancySequence::Halton(sequence) => sequence.state_mut(),
            LowDiscrepancySequence::Sobol(sequence) => sequence.state_mut(),
        }
    }
}

impl UniformRandom for LowDiscrepancySequence {
    fn next_index(&mut self, bound: usize) -> usize {
        let u: Float = self.next_geometric();
        if bound <= 1 {
            return 0;
        }
        ((u * bound as Float) as usize).min(bound - 1)
    }
    fn next_geometric(&mut self) -> Float {
        match self.next() {
            Some(value) => value,
            None => self.state_mut().overflow_geometric(),
        }
    }
    fn next_visual(&mut self) -> f32 {
        (self.next_geometric() as f32).min(FLOAT_ONE_MINUS_EPSILON)
    }
    fn discard_geometric(&mut self, n: usize) {
        self.discard(n);
    }
    fn discard_visual(&mut self, n: usize) {
        self.discard(n);
    }
    fn replicate(&mut self) -> Box<dyn UniformRandom> {
        Box::new(self.replicate_scrambled())
    }
}
