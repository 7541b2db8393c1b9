//! Neighbourhood filters
//!
//! These read a 3x3 window and therefore need at least three rows. On a
//! single scanline band they leave the pixels untouched. Working rows live in
//! the caller's [`FilterScratch`](super::FilterScratch), never on the heap.

use super::Surface;
use crate::math8::clamp8;
use crate::pixel::Pixel;

#[inline(always)]
fn fits<const W: usize>(surface: &Surface<'_>) -> bool {
    surface.width() >= 3 && surface.height() >= 3 && surface.width() <= W
}

fn load_luma(dst: &mut [u8], src: &[Pixel]) {
    for (l, p) in dst.iter_mut().zip(src) {
        *l = p.luma();
    }
}

/// Binary Sobel edge map
///
/// Luma is kept for three rows only, in a circular buffer. Row `y + 2` is
/// loaded after row `y` is written, so every gradient is computed from the
/// source image. Border pixels keep their original colour.
pub fn edge_detect<const W: usize>(
    surface: &mut Surface<'_>,
    threshold: u8,
    lines: &mut [[u8; W]; 3],
) {
    if !fits::<W>(surface) {
        return;
    }
    let (width, height) = (surface.width(), surface.height());
    let threshold = i32::from(threshold);
    let data = surface.pixels_mut();

    for (row, line) in lines.iter_mut().enumerate() {
        load_luma(&mut line[..width], &data[row * width..(row + 1) * width]);
    }

    for y in 1..height - 1 {
        let above = &lines[(y - 1) % 3];
        let mid = &lines[y % 3];
        let below = &lines[(y + 1) % 3];
        let out = &mut data[y * width..(y + 1) * width];

        for x in 1..width - 1 {
            let l = |row: &[u8; W], dx: usize| i32::from(row[x + dx - 1]);
            let gx = -l(above, 0) + l(above, 2) - 2 * l(mid, 0) + 2 * l(mid, 2) - l(below, 0)
                + l(below, 2);
            let gy = -l(above, 0) - 2 * l(above, 1) - l(above, 2)
                + l(below, 0)
                + 2 * l(below, 1)
                + l(below, 2);
            let magnitude = (gx.abs() + gy.abs()) >> 1;
            out[x] = if magnitude > threshold {
                Pixel::WHITE
            } else {
                Pixel::BLACK
            };
        }

        let next = y + 2;
        if next < height {
            load_luma(
                &mut lines[next % 3][..width],
                &data[next * width..(next + 1) * width],
            );
        }
    }
}

/// 3x3 box average at every other pixel of every other row
///
/// The divide by nine is approximated as `sum * 7 >> 6`. Only odd rows and
/// columns are written, so each window reads unmodified neighbours.
pub fn blur(surface: &mut Surface<'_>) {
    if surface.width() < 3 || surface.height() < 3 {
        return;
    }
    let (width, height) = (surface.width(), surface.height());
    let data = surface.pixels_mut();

    for y in (1..height - 1).step_by(2) {
        for x in (1..width - 1).step_by(2) {
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for row in y - 1..=y + 1 {
                for p in &data[row * width + x - 1..=row * width + x + 1] {
                    let c = p.unpack();
                    r += u32::from(c.r);
                    g += u32::from(c.g);
                    b += u32::from(c.b);
                }
            }
            data[y * width + x] = Pixel::pack(
                ((r * 7) >> 6) as u8,
                ((g * 7) >> 6) as u8,
                ((b * 7) >> 6) as u8,
            );
        }
    }
}

/// `out = c + (strength * (4c - up - down - left - right) >> 8)`, per channel
///
/// The row above and the current row are cached before they are overwritten,
/// so all taps read the source image.
pub fn sharpen<const W: usize>(
    surface: &mut Surface<'_>,
    strength: u8,
    rows: &mut [[Pixel; W]; 2],
) {
    if strength == 0 || !fits::<W>(surface) {
        return;
    }
    let (width, height) = (surface.width(), surface.height());
    let strength = i32::from(strength);
    let data = surface.pixels_mut();

    rows[0][..width].copy_from_slice(&data[..width]);
    rows[1][..width].copy_from_slice(&data[width..2 * width]);
    let mut prev = 0;

    for y in 1..height - 1 {
        let cur = prev ^ 1;
        let (up, center) = (&rows[prev], &rows[cur]);
        let (head, tail) = data.split_at_mut((y + 1) * width);
        let down = &tail[..width];
        let out = &mut head[y * width..];

        for x in 1..width - 1 {
            let c = center[x].unpack();
            let taps = [
                up[x].unpack(),
                down[x].unpack(),
                center[x - 1].unpack(),
                center[x + 1].unpack(),
            ];
            let sharp = |value: u8, sum: i32| {
                let value = i32::from(value);
                clamp8(value + ((strength * (value * 4 - sum)) >> 8))
            };
            out[x] = Pixel::pack(
                sharp(c.r, taps.iter().map(|t| i32::from(t.r)).sum()),
                sharp(c.g, taps.iter().map(|t| i32::from(t.g)).sum()),
                sharp(c.b, taps.iter().map(|t| i32::from(t.b)).sum()),
            );
        }

        // The row above is no longer needed; its slot takes the next row.
        rows[prev][..width].copy_from_slice(down);
        prev = cur;
    }
}
