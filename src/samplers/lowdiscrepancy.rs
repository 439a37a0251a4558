// pbrt
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::random::{BitstreamRandom, UniformRandom};
use crate::core::rng::Rng;
use crate::core::sampler::Sample;
use crate::core::sequence::LowDiscrepancySequence;

/// Drives a [LowDiscrepancySequence] through the samples of one pixel
/// at a time, stopping early when the sequence runs out of capacity.
pub struct LowDiscrepancyImageSampler {
    pub sequence: LowDiscrepancySequence,
    pub desired_samples_per_pixel: u32,
    entropy: BitstreamRandom<Rng>,
    image_dimensions: (usize, usize),
    pixel: (usize, usize),
    sample_counter: u32,
    exhausted: bool,
}

impl LowDiscrepancyImageSampler {
    pub fn new(sequence: LowDiscrepancySequence, desired_samples_per_pixel: u32) -> Self {
        LowDiscrepancyImageSampler::with_entropy(
            sequence,
            desired_samples_per_pixel,
            BitstreamRandom::default(),
        )
    }
    fn with_entropy(
        mut sequence: LowDiscrepancySequence,
        desired_samples_per_pixel: u32,
        mut entropy: BitstreamRandom<Rng>,
    ) -> Self {
        sequence.permute(&mut entropy);
        LowDiscrepancyImageSampler {
            sequence,
            desired_samples_per_pixel,
            entropy,
            image_dimensions: (0, 0),
            pixel: (0, 0),
            sample_counter: 0_u32,
            exhausted: true,
        }
    }
    /// A sampler for another worker: same sequence kind and sample
    /// count, freshly drawn scrambling.
    pub fn replicate(&mut self) -> LowDiscrepancyImageSampler {
        let entropy: BitstreamRandom<Rng> = self.entropy.split();
        LowDiscrepancyImageSampler::with_entropy(
            self.sequence.duplicate(),
            self.desired_samples_per_pixel,
            entropy,
        )
    }
    pub fn start_pixel(&mut self, image_dimensions: (usize, usize), pixel: (usize, usize)) {
        self.image_dimensions = image_dimensions;
        self.pixel = pixel;
        self.sample_counter = 0_u32;
        self.exhausted = false;
    }
    /// Samples produced for the current pixel so far.
    pub fn samples_taken(&self) -> u32 {
        self.sample_counter
    }
    pub fn next_sample<'a>(
        &'a mut self,
        sample_lens: bool,
        _rng: &'a mut dyn UniformRandom,
    ) -> Option<Sample<'a>> {
        if self.exhausted || self.sample_counter >= self.desired_samples_per_pixel {
            return None;
        }
        if !self
            .sequence
            .start(self.image_dimensions, self.pixel, self.sample_counter)
        {
            // fewer samples than requested for this pixel
            self.exhausted = true;
            return None;
        }
        let image_uv: Point2f = Point2f::new(self.sequence.next()?, self.sequence.next()?);
        let image_uv_footprint: Point2f = image_uv
            + Point2f::new(
                1.0 as Float / self.image_dimensions.0 as Float,
                1.0 as Float / self.image_dimensions.1 as Float,
            );
        let lens_uv: Option<Point2f> = if sample_lens {
            Some(Point2f::new(self.sequence.next()?, self.sequence.next()?))
        } else {
            None
        };
        let weight: Float = self.sequence.sample_weight(self.desired_samples_per_pixel);
        self.sample_counter += 1;
        Some(Sample {
            image_uv,
            image_uv_footprint,
            lens_uv,
            weight,
            rng: &mut self.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samplers::halton::HaltonSequence;
    use crate::samplers::sobol::{Scrambler, SobolSequence};

    fn count_samples(sampler: &mut LowDiscrepancyImageSampler, dims: (usize, usize), pixel: (usize, usize)) -> u32 {
        let mut rng = BitstreamRandom::default();
        sampler.start_pixel(dims, pixel);
        let mut n = 0;
        while let Some(sample) = sampler.next_sample(false, &mut rng) {
            assert!(sample.lens_uv.is_none());
            n += 1;
        }
        n
    }

    #[test]
    fn produces_exactly_the_desired_count() {
        let mut halton = LowDiscrepancyImageSampler::new(
            LowDiscrepancySequence::Halton(HaltonSequence::new()),
            7,
        );
        let mut sobol = LowDiscrepancyImageSampler::new(
            LowDiscrepancySequence::Sobol(SobolSequence::new(Scrambler::FastOwen)),
            7,
        );
        assert_eq!(count_samples(&mut halton, (10, 10), (3, 3)), 7);
        assert_eq!(count_samples(&mut sobol, (10, 10), (3, 3)), 7);
        // restarting a pixel starts over
        assert_eq!(count_samples(&mut sobol, (10, 10), (3, 3)), 7);
    }

    #[test]
    fn stops_early_beyond_capacity() {
        // a 2^26 wide image leaves a single Sobol' sample per pixel
        let mut sobol = LowDiscrepancyImageSampler::new(
            LowDiscrepancySequence::Sobol(SobolSequence::new(Scrambler::None)),
            4,
        );
        assert_eq!(count_samples(&mut sobol, (1 << 26, 1), (5, 0)), 1);
    }

    #[test]
    fn nothing_before_start_pixel() {
        let mut halton = LowDiscrepancyImageSampler::new(
            LowDiscrepancySequence::Halton(HaltonSequence::new()),
            4,
        );
        let mut rng = BitstreamRandom::default();
        assert!(halton.next_sample(true, &mut rng).is_none());
    }

    #[test]
    fn samples_carry_footprint_lens_and_weight() {
        let mut sobol = LowDiscrepancyImageSampler::new(
            LowDiscrepancySequence::Sobol(SobolSequence::new(Scrambler::FastOwen)),
            4,
        );
        let mut rng = BitstreamRandom::default();
        sobol.start_pixel((4, 8), (1, 6));
        let sample = sobol.next_sample(true, &mut rng).unwrap();
        assert!((sample.image_uv_footprint.x - sample.image_uv.x - 0.25).abs() < 1e-6);
        assert!((sample.image_uv_footprint.y - sample.image_uv.y - 0.125).abs() < 1e-6);
        let lens = sample.lens_uv.unwrap();
        assert!(lens.x >= 0.0 && lens.x < 1.0 && lens.y >= 0.0 && lens.y < 1.0);
        assert_eq!(sample.weight, 0.25);
        // further draws continue the sequence
        let extra = sample.rng.next_geometric();
        assert!(extra >= 0.0 && extra < 1.0);
    }
}
