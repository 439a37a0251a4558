//! Type definition of Float, otherwise constants and small bit
//! manipulation helpers which can be used almost everywhere else in
//! the code.

// see pbrt.h

#[cfg(not(feature = "float-as-double"))]
pub type Float = f32;

#[cfg(feature = "float-as-double")]
pub type Float = f64;

/// Clamp the given value *val* to lie between the values *low* and *high*.
pub fn clamp_t<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Number of bits needed to represent *v*, zero for zero.
pub fn bit_width(v: u64) -> u32 {
    // C++20: return std::bit_width(v);
    64_u32 - v.leading_zeros()
}

/// Round an integer up to the next higher (or equal) power of 2.
pub fn round_up_pow2_64(v: u64) -> u64 {
    if v <= 1 {
        return 1;
    }
    let mut ret: u64 = v - 1;
    ret |= ret >> 1;
    ret |= ret >> 2;
    ret |= ret >> 4;
    ret |= ret >> 8;
    ret |= ret >> 16;
    ret |= ret >> 32;
    ret.wrapping_add(1)
}

/// Bit mixing finalizer, used to derive well distributed seeds from
/// structured input like pixel coordinates or dimension indices.
pub fn mix_bits(v: u64) -> u64 {
    let mut v: u64 = v;
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5_d329_728e_a185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81da_def4_bc2d_d44d);
    v ^= v >> 33;
    v
}
