//! Command line driver: print the samples of one pixel or estimate
//! the integral of a test function over a whole image.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::info;
// pbrt
use rs_sampling::core::estimator::{estimate, EstimatorOptions};
use rs_sampling::core::pbrt::Float;
use rs_sampling::core::random::BitstreamRandom;
use rs_sampling::core::sampler::{Sample, SamplerKind, SamplerSettings};
use rs_sampling::samplers::sobol::Scrambler;
// std
use std::f64::consts::PI;
use std::str::FromStr;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Image size in format `width`x`height`.
#[derive(Debug, Copy, Clone)]
struct Resolution(usize, usize);

impl FromStr for Resolution {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once('x')
            .with_context(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
        let w: usize = w.trim().parse().context("bad image width")?;
        let h: usize = h.trim().parse().context("bad image height")?;
        Ok(Resolution(w, h))
    }
}

/// Pixel coordinates in format `x`,`y`.
#[derive(Debug, Copy, Clone)]
struct Pixel(usize, usize);

impl FromStr for Pixel {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once(',')
            .with_context(|| format!("expected X,Y, got {:?}", s))?;
        let x: usize = x.trim().parse().context("bad pixel column")?;
        let y: usize = y.trim().parse().context("bad pixel row")?;
        Ok(Pixel(x, y))
    }
}

/// Test functions over the image with known integrals.
#[derive(Debug, Copy, Clone, ValueEnum)]
enum Integrand {
    /// sin(pi u) sin(pi v)
    Sine,
    /// 1 inside a disk of radius 0.4 around the image center
    Disk,
    /// u v w with w drawn from the sample's randomness
    Extra,
}

impl Integrand {
    fn evaluate(&self, sample: &mut Sample) -> Float {
        let (u, v) = (f64::from(sample.image_uv.x), f64::from(sample.image_uv.y));
        let value: f64 = match self {
            Integrand::Sine => (PI * u).sin() * (PI * v).sin(),
            Integrand::Disk => {
                if (u - 0.5) * (u - 0.5) + (v - 0.5) * (v - 0.5) < 0.16 {
                    1.0
                } else {
                    0.0
                }
            }
            Integrand::Extra => u * v * f64::from(sample.rng.next_geometric()),
        };
        value as Float
    }
    fn exact(&self) -> f64 {
        match self {
            Integrand::Sine => 4.0 / (PI * PI),
            Integrand::Disk => PI * 0.16,
            Integrand::Extra => 0.125,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Print every sample of one pixel
    Dump {
        #[arg(long, default_value = "0,0")]
        pixel: Pixel,
    },
    /// Estimate the integral of a test function over the image
    Estimate {
        #[arg(long, value_enum, default_value_t = Integrand::Sine)]
        integrand: Integrand,
    },
}

/// Generate and evaluate image samples.
#[derive(Parser, Debug)]
#[command(version = VERSION)]
struct Cli {
    /// halton, sobol, stratified or random
    #[arg(long, default_value = "halton")]
    sampler: SamplerKind,
    /// samples per pixel (halton, sobol, random)
    #[arg(long = "pixelsamples")]
    pixel_samples: Option<u32>,
    /// horizontal strata per pixel (stratified)
    #[arg(long = "xsamples")]
    x_samples: Option<u16>,
    /// vertical strata per pixel (stratified)
    #[arg(long = "ysamples")]
    y_samples: Option<u16>,
    /// jitter samples inside their strata (stratified)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    jitter: bool,
    /// none or fastowen (sobol)
    #[arg(long, default_value = "fastowen")]
    scrambler: Scrambler,
    #[arg(long, default_value = "256x256")]
    resolution: Resolution,
    /// use specified number of threads, 0 uses all cores
    #[arg(short = 't', long = "nthreads", default_value_t = 0)]
    nthreads: u8,
    /// also generate lens samples
    #[arg(long)]
    lens: bool,
    /// show a progress bar while estimating
    #[arg(long)]
    progress: bool,
    #[command(subcommand)]
    mode: Mode,
}

impl Cli {
    fn settings(&self) -> SamplerSettings {
        match SamplerSettings::default_for(self.sampler) {
            SamplerSettings::Halton { pixel_samples } => SamplerSettings::Halton {
                pixel_samples: self.pixel_samples.unwrap_or(pixel_samples),
            },
            SamplerSettings::Sobol { pixel_samples, .. } => SamplerSettings::Sobol {
                pixel_samples: self.pixel_samples.unwrap_or(pixel_samples),
                scrambler: self.scrambler,
            },
            SamplerSettings::Stratified {
                x_samples,
                y_samples,
                ..
            } => SamplerSettings::Stratified {
                x_samples: self.x_samples.unwrap_or(x_samples),
                y_samples: self.y_samples.unwrap_or(y_samples),
                jitter: self.jitter,
            },
            SamplerSettings::Random { pixel_samples } => SamplerSettings::Random {
                pixel_samples: self.pixel_samples.unwrap_or(pixel_samples),
            },
        }
    }
}

fn dump(settings: &SamplerSettings, image_dimensions: (usize, usize), pixel: Pixel, lens: bool) -> Result<()> {
    if pixel.0 >= image_dimensions.0 || pixel.1 >= image_dimensions.1 {
        bail!(
            "pixel ({}, {}) is outside of the {}x{} image",
            pixel.0,
            pixel.1,
            image_dimensions.0,
            image_dimensions.1
        );
    }
    let mut sampler = settings.make_sampler();
    let mut rng = BitstreamRandom::default();
    sampler.start_pixel(image_dimensions, (pixel.0, pixel.1));
    let mut n: u64 = 0;
    while let Some(sample) = sampler.next_sample(lens, &mut rng) {
        match sample.lens_uv {
            Some(lens_uv) => println!(
                "{:6} uv = ({:.8}, {:.8}) footprint = ({:.8}, {:.8}) lens = ({:.8}, {:.8}) weight = {}",
                n,
                sample.image_uv.x,
                sample.image_uv.y,
                sample.image_uv_footprint.x,
                sample.image_uv_footprint.y,
                lens_uv.x,
                lens_uv.y,
                sample.weight
            ),
            None => println!(
                "{:6} uv = ({:.8}, {:.8}) footprint = ({:.8}, {:.8}) weight = {}",
                n,
                sample.image_uv.x,
                sample.image_uv.y,
                sample.image_uv_footprint.x,
                sample.image_uv_footprint.y,
                sample.weight
            ),
        }
        n += 1;
    }
    info!("{} of {} samples", n, settings.samples_per_pixel());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    let image_dimensions: (usize, usize) = (args.resolution.0, args.resolution.1);
    if image_dimensions.0 == 0 || image_dimensions.1 == 0 {
        bail!("image resolution must not be empty");
    }
    let settings: SamplerSettings = args.settings();
    info!("rs_sampling version {} with {:?}", VERSION, settings);
    settings.capacity_warning(image_dimensions);
    match args.mode {
        Mode::Dump { pixel } => dump(&settings, image_dimensions, pixel, args.lens)?,
        Mode::Estimate { integrand } => {
            let mut sampler = settings.make_sampler();
            let options = EstimatorOptions {
                num_threads: args.nthreads,
                sample_lens: args.lens,
                show_progress: args.progress,
            };
            let result = estimate(&mut sampler, image_dimensions, &options, |sample| {
                integrand.evaluate(sample)
            })
            .context("estimation failed")?;
            let mean: f64 = f64::from(result.mean());
            let exact: f64 = integrand.exact();
            println!(
                "{:?}: estimate = {:.8} exact = {:.8} error = {:.3e} ({} samples)",
                integrand,
                mean,
                exact,
                (mean - exact).abs(),
                result.samples_taken
            );
        }
    }
    Ok(())
}
