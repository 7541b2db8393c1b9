//! Nearest-neighbour resampling
//!
//! Horizontal and full-frame scaling use 16.16 fixed point:
//! `scale = (src << 16) / dst`, `index = (i * scale) >> 16`.
//! Row selection in the scanline loop uses 8.8 fixed point.
//! Samples are picked, never averaged.

use crate::error::FrameError;
use crate::frame::FrameRow;
use crate::pixel::Pixel;

/// 16.16 step between destination samples
///
/// Saturates at `u32::MAX` when `src / dst` does not fit the 16-bit
/// integer part, so such a step never wraps to a smaller one.
#[inline(always)]
pub const fn scale_16_16(src: usize, dst: usize) -> u32 {
    if dst == 0 {
        return 0;
    }
    let scale = ((src as u64) << 16) / dst as u64;
    if scale > u32::MAX as u64 {
        u32::MAX
    } else {
        scale as u32
    }
}

/// Source sample for destination index `i`
#[inline(always)]
pub const fn source_index(i: usize, scale: u32) -> usize {
    ((i as u64 * scale as u64) >> 16) as usize
}

/// 8.8 vertical step: `(src_height << 8) / dst_height`
pub const fn vertical_scale(src_height: usize, dst_height: usize) -> u32 {
    if dst_height == 0 {
        return 0;
    }
    ((src_height as u32) << 8) / dst_height as u32
}

/// Source row for output row `y`, clamped to the last source row
pub const fn source_row(y: usize, scale: u32, src_height: usize) -> usize {
    let row = ((y as u32 * scale) >> 8) as usize;
    if row >= src_height {
        src_height.saturating_sub(1)
    } else {
        row
    }
}

/// Resample one frame row into `dst`, filling all of it
pub fn downscale_row(row: &FrameRow<'_>, dst: &mut [Pixel]) {
    let scale = scale_16_16(row.width(), dst.len());
    for (i, out) in dst.iter_mut().enumerate() {
        *out = row.pixel(source_index(i, scale));
    }
}

/// Resample a row of packed pixels into `dst`
pub fn downscale_pixels(src: &[Pixel], dst: &mut [Pixel]) {
    if src.is_empty() {
        return;
    }
    let scale = scale_16_16(src.len(), dst.len());
    for (i, out) in dst.iter_mut().enumerate() {
        *out = src[source_index(i, scale)];
    }
}

/// Resample a whole `src_width x src_height` image into `dst`
pub fn downscale_frame(
    src: &[Pixel],
    src_width: usize,
    src_height: usize,
    dst: &mut [Pixel],
    dst_width: usize,
    dst_height: usize,
) -> Result<(), FrameError> {
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Err(FrameError::Empty);
    }
    let src_len = src_width * src_height;
    if src.len() < src_len {
        return Err(FrameError::TooShort {
            needed: src_len * 2,
            len: src.len() * 2,
        });
    }
    let dst_len = dst_width * dst_height;
    if dst.len() < dst_len {
        return Err(FrameError::TooShort {
            needed: dst_len * 2,
            len: dst.len() * 2,
        });
    }

    let y_scale = scale_16_16(src_height, dst_height);
    for (y, out) in dst[..dst_len].chunks_exact_mut(dst_width).enumerate() {
        let sy = source_index(y, y_scale);
        downscale_pixels(&src[sy * src_width..(sy + 1) * src_width], out);
    }
    Ok(())
}
