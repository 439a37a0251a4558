//! The **ImageSampler** hands an integrator the image space (and
//! lens) positions of every sample of a pixel, together with the
//! weight that turns the average of the samples into an estimate of
//! the pixel integral.
//!
//! All samplers are created through one of the factories
//! [make_halton_image_sampler], [make_sobol_image_sampler],
//! [make_stratified_image_sampler] or [make_random_image_sampler],
//! replicated once per worker thread and then driven with
//! `start_pixel` and repeated `next_sample` calls until `None`.

use log::warn;
use strum_macros::{Display, EnumString};
// pbrt
use crate::core::geometry::Point2f;
use crate::core::pbrt::{clamp_t, Float};
use crate::core::random::UniformRandom;
use crate::core::rng::ONE_MINUS_EPSILON;
use crate::core::sequence::LowDiscrepancySequence;
use crate::samplers::halton::HaltonSequence;
use crate::samplers::lowdiscrepancy::LowDiscrepancyImageSampler;
use crate::samplers::random::RandomImageSampler;
use crate::samplers::sobol::{Scrambler, SobolSequence};
use crate::samplers::stratified::StratifiedImageSampler;

// see sampler.h

/// One sample of a pixel.
pub struct Sample<'a> {
    /// Position in the full image, `[0, 1)` on both axes.
    pub image_uv: Point2f,
    /// `image_uv` moved by one pixel on both axes.
    pub image_uv_footprint: Point2f,
    pub lens_uv: Option<Point2f>,
    pub weight: Float,
    /// Randomness for any further draws of the integrator.
    pub rng: &'a mut dyn UniformRandom,
}

/// Map an offset in `[0, 1)` inside *pixel* to the full image extent.
pub fn image_coordinate(pixel: usize, extent: usize, offset: Float) -> Float {
    let v: f64 = (pixel as f64 + offset as f64) / extent as f64;
    clamp_t(v as Float, 0.0 as Float, ONE_MINUS_EPSILON)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SamplerKind {
    Halton,
    Sobol,
    Stratified,
    Random,
}

pub enum ImageSampler {
    LowDiscrepancy(LowDiscrepancyImageSampler),
    Stratified(StratifiedImageSampler),
    Random(RandomImageSampler),
}

impl ImageSampler {
    pub fn start_pixel(&mut self, image_dimensions: (usize, usize), pixel: (usize, usize)) {
        match self {
            ImageSampler::LowDiscrepancy(sampler) => sampler.start_pixel(image_dimensions, pixel),
            ImageSampler::Stratified(sampler) => sampler.start_pixel(image_dimensions, pixel),
            ImageSampler::Random(sampler) => sampler.start_pixel(image_dimensions, pixel),
        }
    }
    /// The next sample of the current pixel, `None` once the pixel is
    /// done. Stratified and random samplers draw from *rng*,
    /// low-discrepancy samplers from their own sequence.
    pub fn next_sample<'a>(
        &'a mut self,
        sample_lens: bool,
        rng: &'a mut dyn UniformRandom,
    ) -> Option<Sample<'a>> {
        match self {
            ImageSampler::LowDiscrepancy(sampler) => sampler.next_sample(sample_lens, rng),
            ImageSampler::Stratified(sampler) => sampler.next_sample(sample_lens, rng),
            ImageSampler::Random(sampler) => sampler.next_sample(sample_lens, rng),
        }
    }
    /// An independent sampler for another worker thread.
    pub fn replicate(&mut self) -> Box<ImageSampler> {
        let sampler: ImageSampler = match self {
            ImageSampler::LowDiscrepancy(sampler) => {
                ImageSampler::LowDiscrepancy(sampler.replicate())
            }
            ImageSampler::Stratified(sampler) => ImageSampler::Stratified(sampler.clone()),
            ImageSampler::Random(sampler) => ImageSampler::Random(sampler.clone()),
        };
        Box::new(sampler)
    }
    /// The requested number of samples per pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        match self {
            ImageSampler::LowDiscrepancy(sampler) => sampler.desired_samples_per_pixel,
            ImageSampler::Stratified(sampler) => sampler.samples_per_pixel(),
            ImageSampler::Random(sampler) => sampler.samples_per_pixel,
        }
    }
    pub fn kind(&self) -> SamplerKind {
        match self {
            ImageSampler::LowDiscrepancy(sampler) => match sampler.sequence {
                LowDiscrepancySequence::Halton(_) => SamplerKind::Halton,
                LowDiscrepancySequence::Sobol(_) => SamplerKind::Sobol,
            },
            ImageSampler::Stratified(_) => SamplerKind::Stratified,
            ImageSampler::Random(_) => SamplerKind::Random,
        }
    }
}

pub fn make_halton_image_sampler(desired_samples_per_pixel: u32) -> ImageSampler {
    ImageSampler::LowDiscrepancy(LowDiscrepancyImageSampler::new(
        LowDiscrepancySequence::Halton(HaltonSequence::new()),
        desired_samples_per_pixel,
    ))
}

pub fn make_sobol_image_sampler(desired_samples_per_pixel: u32, scrambler: Scrambler) -> ImageSampler {
    ImageSampler::LowDiscrepancy(LowDiscrepancyImageSampler::new(
        LowDiscrepancySequence::Sobol(SobolSequence::new(scrambler)),
        desired_samples_per_pixel,
    ))
}

pub fn make_stratified_image_sampler(x_samples: u16, y_samples: u16, jittered: bool) -> ImageSampler {
    ImageSampler::Stratified(StratifiedImageSampler::new(x_samples, y_samples, jittered))
}

pub fn make_random_image_sampler(samples_per_pixel: u32) -> ImageSampler {
    ImageSampler::Random(RandomImageSampler::new(samples_per_pixel))
}

/// Sampler configuration as it comes from a scene description or the
/// command line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SamplerSettings {
    Halton {
        pixel_samples: u32,
    },
    Sobol {
        pixel_samples: u32,
        scrambler: Scrambler,
    },
    Stratified {
        x_samples: u16,
        y_samples: u16,
        jitter: bool,
    },
    Random {
        pixel_samples: u32,
    },
}

impl SamplerSettings {
    /// The classic defaults for each kind of sampler.
    pub fn default_for(kind: SamplerKind) -> Self {
        match kind {
            SamplerKind::Halton => SamplerSettings::Halton { pixel_samples: 16 },
            SamplerKind::Sobol => SamplerSettings::Sobol {
                pixel_samples: 16,
                scrambler: Scrambler::default(),
            },
            SamplerKind::Stratified => SamplerSettings::Stratified {
                x_samples: 4,
                y_samples: 4,
                jitter: true,
            },
            SamplerKind::Random => SamplerSettings::Random { pixel_samples: 4 },
        }
    }
    pub fn kind(&self) -> SamplerKind {
        match self {
            SamplerSettings::Halton { .. } => SamplerKind::Halton,
            SamplerSettings::Sobol { .. } => SamplerKind::Sobol,
            SamplerSettings::Stratified { .. } => SamplerKind::Stratified,
            SamplerSettings::Random { .. } => SamplerKind::Random,
        }
    }
    pub fn make_sampler(&self) -> ImageSampler {
        match *self {
            SamplerSettings::Halton { pixel_samples } => make_halton_image_sampler(pixel_samples),
            SamplerSettings::Sobol {
                pixel_samples,
                scrambler,
            } => make_sobol_image_sampler(pixel_samples, scrambler),
            SamplerSettings::Stratified {
                x_samples,
                y_samples,
                jitter,
            } => make_stratified_image_sampler(x_samples, y_samples, jitter),
            SamplerSettings::Random { pixel_samples } => make_random_image_sampler(pixel_samples),
        }
    }
    pub fn samples_per_pixel(&self) -> u64 {
        match *self {
            SamplerSettings::Halton { pixel_samples }
            | SamplerSettings::Sobol { pixel_samples, .. }
            | SamplerSettings::Random { pixel_samples } => u64::from(pixel_samples),
            SamplerSettings::Stratified {
                x_samples,
                y_samples,
                ..
            } => u64::from(x_samples) * u64::from(y_samples),
        }
    }
    /// Samples per pixel the configured generator can deliver at
    /// *image_dimensions*, `None` when it is not limited.
    pub fn capacity(&self, image_dimensions: (usize, usize)) -> Option<u64> {
        match self {
            SamplerSettings::Halton { .. } => Some(HaltonSequence::capacity(image_dimensions)),
            SamplerSettings::Sobol { .. } => Some(SobolSequence::capacity(image_dimensions)),
            _ => None,
        }
    }
    /// Warn (and return the message) when fewer samples than requested
    /// will be taken at *image_dimensions*.
    pub fn capacity_warning(&self, image_dimensions: (usize, usize)) -> Option<String> {
        let capacity: u64 = self.capacity(image_dimensions)?;
        let requested: u64 = self.samples_per_pixel();
        if requested <= capacity {
            return None;
        }
        let message: String = format!(
            "{} sampler delivers at most {} of the {} requested samples per pixel at {}x{}",
            self.kind(),
            capacity,
            requested,
            image_dimensions.0,
            image_dimensions.1
        );
        warn!("{}", message);
        Some(message)
    }
}
