//! Shared math, randomness and the sampler contracts.

pub mod estimator;
pub mod geometry;
pub mod lowdiscrepancy;
pub mod pbrt;
pub mod random;
pub mod rng;
pub mod sampler;
pub mod sequence;
pub mod sobolmatrices;
