// pbrt
use crate::core::geometry::Point2f;
use crate::core::pbrt::Float;
use crate::core::random::UniformRandom;
use crate::core::sampler::{image_coordinate, Sample};

/// Splits every pixel into an `x_samples` by `y_samples` grid and
/// places one sample in each cell, at its center or jittered.
#[derive(Debug, Clone)]
pub struct StratifiedImageSampler {
    pub x_samples: u16,
    pub y_samples: u16,
    pub jittered: bool,
    image_dimensions: (usize, usize),
    pixel: (usize, usize),
    sample_index: u32,
}

impl StratifiedImageSampler {
    pub fn new(x_samples: u16, y_samples: u16, jittered: bool) -> Self {
        StratifiedImageSampler {
            x_samples,
            y_samples,
            jittered,
            image_dimensions: (0, 0),
            pixel: (0, 0),
            // nothing to hand out before start_pixel
            sample_index: u32::from(x_samples) * u32::from(y_samples),
        }
    }
    pub fn samples_per_pixel(&self) -> u32 {
        u32::from(self.x_samples) * u32::from(self.y_samples)
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
        let n: u32 = self.samples_per_pixel();
        if self.sample_index >= n {
            return None;
        }
        let x_samples: u32 = u32::from(self.x_samples);
        let k: u32 = self.sample_index;
        // cell in row-major order
        let (kx, ky) = (k % x_samples, k / x_samples);
        let (jx, jy) = if self.jittered {
            let jx: Float = rng.next_geometric();
            (jx, rng.next_geometric())
        } else {
            (0.5 as Float, 0.5 as Float)
        };
        let dx: Float = (kx as Float + jx) / x_samples as Float;
        let dy: Float = (ky as Float + jy) / self.y_samples as Float;
        let image_uv: Point2f = Point2f::new(
            image_coordinate(self.pixel.0, self.image_dimensions.0, dx),
            image_coordinate(self.pixel.1, self.image_dimensions.1, dy),
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
            weight: 1.0 as Float / n as Float,
            rng,
        })
    }
}
