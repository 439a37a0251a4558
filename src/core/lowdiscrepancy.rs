//! Low-discrepancy building blocks: radical inverses with digit
//! permutations for the Halton sequence, generator matrix products
//! for the Sobol' sequence, and the per-pixel index arithmetic both
//! need.

use hexf::hexf64;
use lazy_static::lazy_static;
use num::{Integer, PrimInt};
// pbrt
use crate::core::pbrt::{bit_width, mix_bits, Float};
use crate::core::rng::ONE_MINUS_EPSILON;
use crate::core::sobolmatrices::{
    SobolEnumeration, MAX_SOBOL_LOG_2_RESOLUTION, NUM_SOBOL_DIMENSIONS, SOBOL_ENUMERATIONS,
    SOBOL_MATRICES_32, SOBOL_MATRICES_64, SOBOL_MATRIX_SIZE,
};

// see lowdiscrepancy.h

pub const PRIME_TABLE_SIZE: usize = 256;

lazy_static! {
    /// The first [PRIME_TABLE_SIZE] primes, `2, 3, 5, ..., 1619`.
    pub static ref PRIMES: Vec<u64> = first_primes(PRIME_TABLE_SIZE);
    /// Faure permutation of the digits of each base in [PRIMES].
    pub static ref FAURE_PERMUTATIONS: Vec<Vec<u16>> = {
        let largest: usize = PRIMES.last().map_or(2, |p| *p as usize);
        let all: Vec<Vec<u16>> = faure_permutations_up_to(largest);
        PRIMES.iter().map(|p| all[*p as usize].clone()).collect()
    };
}

fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate: u64 = 2;
    while primes.len() < count {
        if primes
            .iter()
            .take_while(|p| *p * *p <= candidate)
            .all(|p| candidate % p != 0)
        {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

/// Faure permutations for every base up to and including
/// `max_base`, indexed by base. Entries 0 and 1 are placeholders.
fn faure_permutations_up_to(max_base: usize) -> Vec<Vec<u16>> {
    let mut perms: Vec<Vec<u16>> = vec![vec![0_u16], vec![0_u16], vec![0_u16, 1_u16]];
    for b in 3..=max_base {
        let perm: Vec<u16> = if b % 2 == 0 {
            let half: &Vec<u16> = &perms[b / 2];
            half.iter()
                .map(|v| 2 * v)
                .chain(half.iter().map(|v| 2 * v + 1))
                .collect()
        } else {
            let c: u16 = ((b - 1) / 2) as u16;
            let mut perm: Vec<u16> = perms[b - 1]
                .iter()
                .map(|v| if *v >= c { v + 1 } else { *v })
                .collect();
            perm.insert(c as usize, c);
            perm
        };
        perms.push(perm);
    }
    perms
}

/// Faure permutation of the digits `0..base`. Digit 0 always maps to
/// itself.
pub fn faure_permutation(base: usize) -> Vec<u16> {
    if base < 2 {
        return vec![0_u16];
    }
    faure_permutations_up_to(base).swap_remove(base)
}

/// Mirror the base-*base* digits of *a* around the radix point,
/// mapping every digit through *perm* when given. The trailing zero
/// digits contribute nothing, so *perm* must fix zero.
fn radical_inverse_f64(base: u64, perm: Option<&[u16]>, a: u64) -> f64 {
    let base: u128 = u128::from(base);
    let mut a: u128 = u128::from(a);
    let mut reversed_digits: u128 = 0;
    let mut base_n: u128 = 1;
    while a != 0 {
        let next: u128 = a / base;
        let digit: u128 = a - next * base;
        let digit: u128 = match perm {
            Some(perm) => u128::from(perm[digit as usize]),
            None => digit,
        };
        reversed_digits = reversed_digits * base + digit;
        base_n *= base;
        a = next;
    }
    reversed_digits as f64 / base_n as f64
}

/// Radical inverse of *a* in the prime base `PRIMES[base_index]`.
pub fn radical_inverse(base_index: usize, a: u64) -> Float {
    if base_index == 0 {
        return ((a.reverse_bits() as f64 * hexf64!("0x1.0p-64")) as Float).min(ONE_MINUS_EPSILON);
    }
    (radical_inverse_f64(PRIMES[base_index], None, a) as Float).min(ONE_MINUS_EPSILON)
}

/// Radical inverse with the digits permuted by *perm*, as `f64`, for
/// callers that keep computing in double precision.
pub fn scrambled_radical_inverse_f64(base: u64, perm: &[u16], a: u64) -> f64 {
    radical_inverse_f64(base, Some(perm), a)
}

/// Radical inverse with the digits permuted by *perm*, clamped below
/// one.
pub fn scrambled_radical_inverse(base: u64, perm: &[u16], a: u64) -> Float {
    (scrambled_radical_inverse_f64(base, perm, a) as Float).min(ONE_MINUS_EPSILON)
}

/// Compute the inverse of the radical inverse function.
pub fn inverse_radical_inverse(base: u64, inverse: u64, n_digits: u64) -> u64 {
    let mut inverse: u64 = inverse;
    let mut index: u64 = 0_u64;
    for _i in 0..n_digits {
        let digit: u64 = inverse % base;
        inverse /= base;
        index = index * base + digit;
    }
    index
}

/// The `x` with `a * x = 1 (mod n)`, for coprime *a* and *n*.
pub fn multiplicative_inverse(a: i64, n: i64) -> u64 {
    let gcd = a.extended_gcd(&n);
    gcd.x.mod_floor(&n) as u64
}

/// Product of a generator *matrix* (one entry per column) and the bit
/// vector *a* over GF(2). Fails when *a* has more bits than the
/// matrix has columns.
pub fn multiply_generator<T>(matrix: &[T], a: u64) -> Option<T>
where
    T: PrimInt,
{
    if bit_width(a) as usize > matrix.len() {
        return None;
    }
    let mut v: T = T::zero();
    let mut a: u64 = a;
    let mut i: usize = 0;
    while a != 0 {
        if a & 1 != 0 {
            v = v ^ matrix[i];
        }
        a >>= 1;
        i += 1;
    }
    Some(v)
}

fn sobol_columns<T>(matrices: &[T], dimension: usize) -> Option<&[T]> {
    if dimension >= NUM_SOBOL_DIMENSIONS {
        return None;
    }
    let start: usize = dimension * SOBOL_MATRIX_SIZE;
    Some(&matrices[start..start + SOBOL_MATRIX_SIZE])
}

/// Unscrambled 32-bit Sobol' sample *index* in *dimension*.
pub fn sobol_sample_u32(index: u64, dimension: usize) -> Option<u32> {
    multiply_generator(sobol_columns(&SOBOL_MATRICES_32, dimension)?, index)
}

/// Unscrambled 64-bit Sobol' sample *index* in *dimension*.
pub fn sobol_sample_u64(index: u64, dimension: usize) -> Option<u64> {
    multiply_generator(sobol_columns(&SOBOL_MATRICES_64, dimension)?, index)
}

/// Global Sobol' index of the *frame*-th sample whose first two
/// dimensions fall into *pixel* on a `2^m` by `2^m` grid.
pub fn sobol_interval_to_index(log_2_resolution: u32, frame: u64, pixel: (u64, u64)) -> Option<u64> {
    if log_2_resolution == 0 {
        return Some(frame);
    }
    if log_2_resolution > MAX_SOBOL_LOG_2_RESOLUTION {
        return None;
    }
    let m: u32 = log_2_resolution;
    let enumeration: &SobolEnumeration = SOBOL_ENUMERATIONS.get((m - 1) as usize)?.as_ref()?;
    let delta: u64 = multiply_generator(&enumeration.frame, frame)?;
    let b: u64 = ((pixel.0 << m) | pixel.1) ^ delta;
    let low: u64 = multiply_generator(&enumeration.inverse, b)?;
    Some((frame << (2 * m)) | low)
}

/// Hash based approximation of a random Owen scramble: flipping a bit
/// depends only on the more significant bits.
pub fn fast_owen_scramble(v: u32, seed: u32) -> u32 {
    let mut v: u32 = v.reverse_bits();
    v ^= v.wrapping_mul(0x3d20_adea);
    v = v.wrapping_add(seed);
    v = v.wrapping_mul((seed >> 16) | 1);
    v ^= v.wrapping_mul(0x0552_6c56);
    v ^= v.wrapping_mul(0x53a2_2864);
    v.reverse_bits()
}

/// 64-bit variant of [fast_owen_scramble]; the lower word is
/// scrambled with a seed that depends on the unscrambled upper word.
pub fn fast_owen_scramble_u64(v: u64, seed: u64) -> u64 {
    let hi: u32 = (v >> 32) as u32;
    let lo: u32 = v as u32;
    let scrambled_hi: u32 = fast_owen_scramble(hi, seed as u32);
    let scrambled_lo: u32 = fast_owen_scramble(lo, mix_bits(seed ^ u64::from(hi)) as u32);
    (u64::from(scrambled_hi) << 32) | u64::from(scrambled_lo)
}
