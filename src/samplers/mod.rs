//! The concrete image samplers and the low-discrepancy sequences
//! behind them.
//!
//! - HaltonSequence
//! - SobolSequence
//! - LowDiscrepancyImageSampler
//! - StratifiedImageSampler
//! - RandomImageSampler
//!
//! ## Halton Sequence
//!
//! The Halton sequence generates not only points that are guaranteed
//! to not clump too closely together, but also generates points that
//! are simultaneously well distributed over all the dimensions of the
//! sample vector. The digits of every base are permuted with Faure's
//! permutations to break up the correlation between higher
//! dimensions.
//!
//! ## Sobol Sequence
//!
//! The Sobol' sequence is very efficient to implement while also
//! being extremly well distributed over all dimensions of the sample
//! vector. The weakness of the Sobol' points is that they are prone
//! to structural grid artefacts before convergence, which the
//! optional fast Owen scrambling breaks up.
//!
//! ## Stratified and Random Samplers
//!
//! Jittered grid and plain uniform samples, mostly useful as a
//! baseline to compare the variance of the low-discrepancy samplers
//! against.

pub mod halton;
pub mod lowdiscrepancy;
pub mod random;
pub mod sobol;
pub mod stratified;
