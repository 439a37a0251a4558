//! # rs_sampling
//!
//! The sample generation engine of a physically based renderer: for
//! every pixel it hands the integrator a sequence of points in the
//! unit square (plus optional lens coordinates) whose weighted
//! average estimates the pixel's integral.
//!
//! Samplers are created with one of the factories in
//! [core::sampler], replicated once per worker thread and then
//! driven pixel by pixel. The [estimator][core::estimator::estimate]
//! shows the whole control flow on an arbitrary image space function.
//!
//! ```
//! use rs_sampling::core::random::BitstreamRandom;
//! use rs_sampling::core::sampler::make_halton_image_sampler;
//!
//! let mut sampler = make_halton_image_sampler(4);
//! let mut rng = BitstreamRandom::default();
//! sampler.start_pixel((640, 480), (320, 240));
//! let mut n = 0;
//! while let Some(sample) = sampler.next_sample(false, &mut rng) {
//!     assert!(sample.image_uv.x >= 0.5 && sample.image_uv.x < 0.51);
//!     n += 1;
//! }
//! assert_eq!(n, 4);
//! ```

pub mod blockqueue;
pub mod core;
pub mod samplers;
