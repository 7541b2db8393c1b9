//! Q8 fixed-point helpers
//!
//! Coefficients are pre-scaled by 256; descaling is `>> 8`.
//! Intermediate values are `i32` so every result can be saturated
//! into `0..=255` instead of wrapping.

/// Q8 luma weights (sum to 256)
pub const LUMA_R: u32 = 77;
pub const LUMA_G: u32 = 150;
pub const LUMA_B: u32 = 29;

/// Q8 unity
pub const Q8_ONE: i32 = 256;

/// Saturate an intermediate channel value into `0..=255`
#[inline(always)]
pub const fn clamp8(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        value as u8
    }
}

/// Q8 luma: `(77R + 150G + 29B) >> 8`
#[inline(always)]
pub const fn luma8(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B) >> 8) as u8
}

/// Scale an 8-bit value by a Q8 factor (256 = 1.0)
#[inline(always)]
pub const fn scale8(value: u8, factor_q8: u32) -> u8 {
    let scaled = (value as u32 * factor_q8) >> 8;
    if scaled > 255 { 255 } else { scaled as u8 }
}

/// Blend two 8-bit values
///
/// # Arguments
/// * `a` - First value
/// * `b` - Second value
/// * `amount_of_b` - Q8 blend factor (0 = all a, 256 = all b)
#[inline(always)]
pub const fn blend8(a: u8, b: u8, amount_of_b: u32) -> u8 {
    let keep = 256 - amount_of_b;
    ((a as u32 * keep + b as u32 * amount_of_b) >> 8) as u8
}

/// Contrast around mid-grey: `((value - 128) * contrast_q8 >> 8) + 128`
///
/// Returns the unsaturated value so callers can add offsets before clamping.
#[inline(always)]
pub const fn contrast_q8(value: u8, contrast_q8: i32) -> i32 {
    (((value as i32 - 128) * contrast_q8) >> 8) + 128
}
