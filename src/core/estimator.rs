//! Estimate the per-pixel integral of an image space function with
//! any [ImageSampler], spread over a pool of worker threads.
//!
//! The master sampler is replicated once per worker before the
//! workers start; every worker then pulls 16x16 tiles from a shared
//! [BlockQueue] and sends its finished tiles through a channel to a
//! collector.

use log::{info, warn};
// std
use std::error::Error;
use std::fmt;
// pbrt
use crate::blockqueue::{BlockQueue, Tile};
use crate::core::pbrt::Float;
use crate::core::random::BitstreamRandom;
use crate::core::rng::Rng;
use crate::core::sampler::{ImageSampler, Sample};

pub const TILE_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    EmptyImage((usize, usize)),
    WorkerPanicked,
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EstimatorError::EmptyImage(dims) => {
                write!(f, "cannot estimate an image of {}x{} pixels", dims.0, dims.1)
            }
            EstimatorError::WorkerPanicked => write!(f, "an estimator worker thread panicked"),
        }
    }
}

impl Error for EstimatorError {}

/// Per-pixel estimates in row-major order.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub image_dimensions: (usize, usize),
    pub values: Vec<Float>,
    pub samples_taken: u64,
}

impl Estimate {
    pub fn value(&self, pixel: (usize, usize)) -> Float {
        self.values[pixel.1 * self.image_dimensions.0 + pixel.0]
    }
    /// Average over all pixels, an estimate of the integral over the
    /// whole image.
    pub fn mean(&self) -> Float {
        if self.values.is_empty() {
            return 0.0 as Float;
        }
        let sum: f64 = self.values.iter().map(|v| f64::from(*v)).sum();
        (sum / self.values.len() as f64) as Float
    }
}

#[derive(Debug, Clone)]
pub struct EstimatorOptions {
    /// 0 uses all cores
    pub num_threads: u8,
    pub sample_lens: bool,
    pub show_progress: bool,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        EstimatorOptions {
            num_threads: 0_u8,
            sample_lens: false,
            show_progress: false,
        }
    }
}

struct EstimatedTile {
    tile: Tile,
    values: Vec<Float>,
    samples_taken: u64,
}

fn estimate_tile<F>(
    tile: Tile,
    image_dimensions: (usize, usize),
    sampler: &mut ImageSampler,
    rng: &mut BitstreamRandom<Rng>,
    sample_lens: bool,
    f: &F,
) -> EstimatedTile
where
    F: Fn(&mut Sample) -> Float,
{
    let mut values: Vec<Float> = Vec::with_capacity(tile.area());
    let mut samples_taken: u64 = 0;
    for pixel in tile.pixels() {
        sampler.start_pixel(image_dimensions, pixel);
        let mut sum: Float = 0.0 as Float;
        while let Some(mut sample) = sampler.next_sample(sample_lens, &mut *rng) {
            let value: Float = f(&mut sample);
            samples_taken += 1;
            if !value.is_finite() {
                warn!(
                    "Non-finite value {} returned for pixel ({}, {}). Setting to zero.",
                    value, pixel.0, pixel.1
                );
                continue;
            }
            sum += sample.weight * value;
        }
        values.push(sum);
    }
    EstimatedTile {
        tile,
        values,
        samples_taken,
    }
}

/// Integrate *f* over every pixel of an image of *image_dimensions*.
pub fn estimate<F>(
    sampler: &mut ImageSampler,
    image_dimensions: (usize, usize),
    options: &EstimatorOptions,
    f: F,
) -> Result<Estimate, EstimatorError>
where
    F: Fn(&mut Sample) -> Float + Sync,
{
    let (width, height) = image_dimensions;
    if width == 0 || height == 0 {
        return Err(EstimatorError::EmptyImage(image_dimensions));
    }
    if let ImageSampler::LowDiscrepancy(ld) = &*sampler {
        let capacity: u64 = ld.sequence.capacity(image_dimensions);
        if u64::from(ld.desired_samples_per_pixel) > capacity {
            warn!(
                "{} sampler is limited to {} samples per pixel at {}x{}",
                sampler.kind(),
                capacity,
                width,
                height
            );
        }
    }
    let num_cores: usize = if options.num_threads == 0_u8 {
        num_cpus::get()
    } else {
        options.num_threads as usize
    };
    let block_queue = BlockQueue::new(
        (width as u32, height as u32),
        (TILE_SIZE as u32, TILE_SIZE as u32),
    );
    info!(
        "Estimating {}x{} pixels ({} tiles) with {} thread(s) ...",
        width,
        height,
        block_queue.len(),
        num_cores
    );
    // replicas are created before any worker runs
    let mut entropy: BitstreamRandom<Rng> = BitstreamRandom::default();
    let workers: Vec<(Box<ImageSampler>, BitstreamRandom<Rng>)> = (0..num_cores)
        .map(|_| (sampler.replicate(), entropy.split()))
        .collect();
    let mut values: Vec<Float> = vec![0.0 as Float; width * height];
    let mut samples_taken: u64 = 0;
    {
        let bq = &block_queue;
        let f = &f;
        let values = &mut values;
        let samples_taken = &mut samples_taken;
        let sample_lens: bool = options.sample_lens;
        let show_progress: bool = options.show_progress;
        crossbeam::scope(|scope| {
            let (tile_tx, tile_rx) = crossbeam_channel::bounded(num_cores);
            // spawn worker threads
            for (mut tile_sampler, mut rng) in workers {
                let tile_tx = tile_tx.clone();
                scope.spawn(move |_| {
                    while let Some(tile) = bq.next() {
                        let estimated: EstimatedTile = estimate_tile(
                            tile,
                            image_dimensions,
                            &mut tile_sampler,
                            &mut rng,
                            sample_lens,
                            f,
                        );
                        // send the tile through the channel to the collector
                        if tile_tx.send(estimated).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tile_tx);
            // spawn thread to collect tiles
            scope.spawn(move |_| {
                let mut progress = if show_progress {
                    Some(pbr::ProgressBar::new(bq.len() as u64))
                } else {
                    None
                };
                for estimated in tile_rx.iter() {
                    let tile: Tile = estimated.tile;
                    for ((x, y), value) in tile.pixels().zip(estimated.values.into_iter()) {
                        values[y * width + x] = value;
                    }
                    *samples_taken += estimated.samples_taken;
                    if let Some(progress) = progress.as_mut() {
                        progress.inc();
                    }
                }
                if let Some(progress) = progress.as_mut() {
                    progress.finish();
                }
            });
        })
        .map_err(|_| EstimatorError::WorkerPanicked)?;
    }
    info!("{} samples taken", samples_taken);
    Ok(Estimate {
        image_dimensions,
        values,
        samples_taken,
    })
}
