//! Generator matrices for the Sobol' sequence.
//!
//! Every dimension owns [SOBOL_MATRIX_SIZE] columns of 64 bits; column
//! `c` is the contribution of bit `c` of the sample index, with the
//! most significant bit of the column being the first binary digit of
//! the sample value. The 32-bit matrices are the upper halves of the
//! 64-bit ones.
//!
//! Dimension 0 is the van der Corput sequence. Dimension `k >= 1`
//! takes the primitive polynomial and initial direction numbers of
//! dimension `k + 1` of Joe and Kuo's `new-joe-kuo-6.21201` table, so
//! dimension 1 is the Pascal matrix.
//!
//! For each logical resolution `2^m` the *enumeration* matrices map
//! between the low `2m` index bits and the pixel the first two
//! dimensions land in, see
//! [sobol_interval_to_index](crate::core::lowdiscrepancy::sobol_interval_to_index).
//!
//! All tables are built on first use and never change afterwards.

use lazy_static::lazy_static;
use sobol::params::JoeKuoD6;

// see sobolmatrices.h

pub const NUM_SOBOL_DIMENSIONS: usize = 1024;
pub const SOBOL_MATRIX_SIZE: usize = 52;
/// Largest supported `log2` of the logical (square, power of two)
/// image resolution.
pub const MAX_SOBOL_LOG_2_RESOLUTION: u32 = 26;

/// Enumeration matrices for one logical resolution `2^m`.
#[derive(Debug, Clone, PartialEq)]
pub struct SobolEnumeration {
    /// Contribution of each frame bit (index bits `2m` and up) to the
    /// interleaved pixel code.
    pub frame: Vec<u64>,
    /// Maps an interleaved pixel code back to the low `2m` bits of the
    /// sample index.
    pub inverse: Vec<u64>,
}

lazy_static! {
    pub static ref SOBOL_MATRICES_64: Vec<u64> = build_sobol_matrices();
    pub static ref SOBOL_MATRICES_32: Vec<u32> =
        SOBOL_MATRICES_64.iter().map(|column| (column >> 32) as u32).collect();
    /// Indexed by `m - 1`.
    pub static ref SOBOL_ENUMERATIONS: Vec<Option<SobolEnumeration>> =
        (1..=MAX_SOBOL_LOG_2_RESOLUTION)
            .map(|m| build_enumeration(m as usize))
            .collect();
}

fn build_sobol_matrices() -> Vec<u64> {
    let mut matrices: Vec<u64> = Vec::with_capacity(NUM_SOBOL_DIMENSIONS * SOBOL_MATRIX_SIZE);
    // van der Corput
    for i in 0..SOBOL_MATRIX_SIZE {
        matrices.push(1_u64 << (63 - i));
    }
    let params: JoeKuoD6 = JoeKuoD6::extended();
    for dim in params.dim_params.iter().take(NUM_SOBOL_DIMENSIONS - 1) {
        matrices.extend_from_slice(&direction_numbers(dim.a, &dim.m));
    }
    matrices
}

/// Columns of one dimension from the coefficient word *a* of its
/// primitive polynomial (`a_1` most significant) and the initial
/// direction numbers *m*, whose count is the polynomial degree.
pub fn direction_numbers(a: u32, m: &[u32]) -> [u64; SOBOL_MATRIX_SIZE] {
    let s: usize = m.len().max(1).min(SOBOL_MATRIX_SIZE);
    let mut v: [u64; SOBOL_MATRIX_SIZE] = [0_u64; SOBOL_MATRIX_SIZE];
    for (i, column) in v.iter_mut().enumerate().take(s) {
        let mi: u64 = u64::from(m.get(i).copied().unwrap_or(1));
        *column = mi << (63 - i);
    }
    for i in s..SOBOL_MATRIX_SIZE {
        let j: usize = i - s;
        let mut column: u64 = v[j] ^ (v[j] >> s);
        for k in 0..(s - 1) {
            if (a >> k) & 1 != 0 {
                column ^= v[j + 1 + k];
            }
        }
        v[i] = column;
    }
    v
}

fn build_enumeration(m: usize) -> Option<SobolEnumeration> {
    let vdc: &[u64] = &SOBOL_MATRICES_64[0..SOBOL_MATRIX_SIZE];
    let sobol: &[u64] = &SOBOL_MATRICES_64[SOBOL_MATRIX_SIZE..2 * SOBOL_MATRIX_SIZE];
    let shift: usize = 64 - m;
    let pixel_code = |c: usize| -> u64 { ((vdc[c] >> shift) << m) | (sobol[c] >> shift) };
    let columns: Vec<u64> = (0..2 * m).map(pixel_code).collect();
    Some(SobolEnumeration {
        frame: (2 * m..SOBOL_MATRIX_SIZE).map(pixel_code).collect(),
        inverse: invert_gf2(&columns)?,
    })
}

/// Gauss-Jordan inversion of a square matrix over GF(2), given and
/// returned as columns. `None` for a singular matrix.
pub fn invert_gf2(columns: &[u64]) -> Option<Vec<u64>> {
    let n: usize = columns.len();
    // (image, preimage) pairs
    let mut rows: Vec<(u64, u64)> = columns
        .iter()
        .enumerate()
        .map(|(c, column)| (*column, 1_u64 << c))
        .collect();
    for bit in 0..n {
        let pivot: usize = (bit..n).find(|k| (rows[*k].0 >> bit) & 1 != 0)?;
        rows.swap(bit, pivot);
        let (image, preimage) = rows[bit];
        for (k, row) in rows.iter_mut().enumerate() {
            if k != bit && (row.0 >> bit) & 1 != 0 {
                row.0 ^= image;
                row.1 ^= preimage;
            }
        }
    }
    Some(rows.into_iter().map(|(_, preimage)| preimage).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // initial direction numbers m_i, recovered from the leading columns
    fn initial_numbers(dim: usize, degree: usize) -> Vec<u64> {
        (0..degree)
            .map(|i| SOBOL_MATRICES_64[dim * SOBOL_MATRIX_SIZE + i] >> (63 - i))
            .collect()
    }

    #[test]
    fn first_two_dimensions_are_reference_matrices() {
        let m = &SOBOL_MATRICES_32;
        assert_eq!(m.len(), NUM_SOBOL_DIMENSIONS * SOBOL_MATRIX_SIZE);
        assert_eq!(m[0], 0x8000_0000);
        assert_eq!(m[1], 0x4000_0000);
        assert_eq!(m[31], 0x1);
        assert_eq!(m[32], 0x0);
        let d1 = &m[SOBOL_MATRIX_SIZE..2 * SOBOL_MATRIX_SIZE];
        assert_eq!(
            &d1[..8],
            &[
                0x8000_0000,
                0xc000_0000,
                0xa000_0000,
                0xf000_0000,
                0x8800_0000,
                0xcc00_0000,
                0xaa00_0000,
                0xff00_0000
            ]
        );
        assert_eq!(d1[31], 0xffff_ffff);
    }

    #[test]
    fn joe_kuo_initial_direction_numbers() {
        assert_eq!(initial_numbers(2, 2), vec![1, 3]);
        assert_eq!(initial_numbers(3, 3), vec![1, 3, 1]);
        assert_eq!(initial_numbers(4, 3), vec![1, 1, 1]);
        assert_eq!(initial_numbers(5, 4), vec![1, 1, 3, 3]);
        assert_eq!(initial_numbers(6, 4), vec![1, 3, 5, 13]);
        assert_eq!(initial_numbers(7, 5), vec![1, 1, 5, 5, 17]);
        // d = 1024, s = 13, a = 3538
        assert_eq!(
            initial_numbers(NUM_SOBOL_DIMENSIONS - 1, 13),
            vec![1, 1, 5, 11, 11, 33, 37, 29, 263, 1019, 657, 1453, 7807]
        );
    }

    #[test]
    fn joe_kuo_leading_columns() {
        let m = &SOBOL_MATRICES_32;
        let d2 = &m[2 * SOBOL_MATRIX_SIZE..3 * SOBOL_MATRIX_SIZE];
        assert_eq!(&d2[..4], &[0x8000_0000, 0xc000_0000, 0x6000_0000, 0x9000_0000]);
        let d3 = &m[3 * SOBOL_MATRIX_SIZE..4 * SOBOL_MATRIX_SIZE];
        assert_eq!(&d3[..4], &[0x8000_0000, 0xc000_0000, 0x2000_0000, 0x5000_0000]);
    }

    #[test]
    fn recurrence_extends_initial_numbers() {
        // x^2 + x + 1 with m = (1, 3)
        let v = direction_numbers(1, &[1, 3]);
        assert_eq!(v[0] >> 32, 0x8000_0000);
        assert_eq!(v[1] >> 32, 0xc000_0000);
        assert_eq!(v[2] >> 32, 0x6000_0000);
        assert_eq!(v[3] >> 32, 0x9000_0000);
    }

    #[test]
    fn columns_end_on_diagonal() {
        // every column c is odd at bit 63 - c
        for dim in 0..NUM_SOBOL_DIMENSIONS {
            for c in 0..SOBOL_MATRIX_SIZE {
                let column = SOBOL_MATRICES_64[dim * SOBOL_MATRIX_SIZE + c];
                assert_eq!(column.trailing_zeros() as usize, 63 - c, "dim {} col {}", dim, c);
            }
        }
    }

    #[test]
    fn inverse_undoes_matrix() {
        let columns: Vec<u64> = vec![0b011, 0b110, 0b100];
        let inverse = invert_gf2(&columns).unwrap();
        for c in 0..3 {
            // multiply columns by inverse column c
            let mut v = 0_u64;
            for bit in 0..3 {
                if (inverse[c] >> bit) & 1 != 0 {
                    v ^= columns[bit];
                }
            }
            assert_eq!(v, 1 << c);
        }
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert_eq!(invert_gf2(&[0b01, 0b01]), None);
        assert_eq!(invert_gf2(&[0b10, 0b00]), None);
    }

    #[test]
    fn enumeration_tables_cover_all_resolutions() {
        assert_eq!(SOBOL_ENUMERATIONS.len(), MAX_SOBOL_LOG_2_RESOLUTION as usize);
        for m in 1..=MAX_SOBOL_LOG_2_RESOLUTION as usize {
            let enumeration = SOBOL_ENUMERATIONS[m - 1].as_ref().unwrap();
            assert_eq!(enumeration.inverse.len(), 2 * m);
            assert_eq!(enumeration.frame.len(), SOBOL_MATRIX_SIZE - 2 * m);
        }
    }
}
