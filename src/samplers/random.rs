// pbrt
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::random::UniformRandom;
use crate::core::sampler::{image_coordinate, Sample};

/// Independent uniform samples, drawn from the caller's randomness.
#[derive(Debug, Clone)]
pub struct RandomImageSampler {
    pub samples_per_pixel: u32,
    image_dimensions: (usize, usize),
    pixel: (usize, usize),
    sample_index: u32,
}

impl RandomImageSampler {
    pub fn new(samples_per_pixel: u32) -> Self {
        RandomImageSampler {
            samples_per_pixel,
            image_dimensions: (0, 0),
            pixel: (0, 0),
            sample_index: samples_per_pixel,
        }
    }
    pub fn start_pixel(&mut self, image_dimensions: (usize, usize), pixel: (usize, usize)) {
        self.image_dimensions = image_dimensions;
        self.pixel = pixel;
        self.sample_index = 0_u32;
    }
    pub fn next_sample<'a>(
        &mut self,
        sample_lens: bool,
        rng: &'a mut dyn UniformRandom,
    ) -> Option<Sample<'a>> {
        if self.sample_index >= self.samples_per_pixel {
            return None;
        }
        let u: Float = rng.next_geometric();
        let v: Float = rng.next_geometric();
        let image_uv: Point2f = Point2f::new(
            image_coordinate(self.pixel.0, self.image_dimensions.0, u),
            image_coordinate(self.pixel.1, self.image_dimensions.1, v),
        );
        let image_uv_footprint: Point2f = image_uv
            + Point2f::new(
                1.0 as Float / self.image_dimensions.0 as Float,
                1.0 as Float / self.image_dimensions.1 as Float,
            );
        let lens_uv: Option<Point2f> = if sample_lens {
            let u: Float = rng.next_geometric();
            Some(Point2f::new(u, rng.next_geometric()))
        } else {
            None
        };
        self.sample_index += 1;
        Some(Sample {
            image_uv,
            image_uv_footprint,
            lens_uv,
            weight: 1.0 as Float / self.samples_per_pixel as Float,
            rng,
        })
    }
}
