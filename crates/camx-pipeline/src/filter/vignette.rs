//! Radial darkening without square roots
//!
//! The squared distance from the frame centre is compared against the squared
//! distance of the farthest corner:
//! `factor = 256 - dist_sq * strength / max_dist_sq`, never below `floor`.
//! The centre is taken from the band's frame geometry, so a scanline band
//! is darkened exactly like the same rows of the full frame.

use super::Surface;
use crate::math8::scale8;
use crate::pixel::Pixel;

pub fn vignette(surface: &mut Surface<'_>, strength: u8, floor: u16) {
    let band = surface.band();
    let cx = (surface.width() >> 1) as i32;
    let cy = (band.frame_height >> 1) as i32;
    let max_dist_sq = (cx * cx + cy * cy) as u32;
    if strength == 0 || max_dist_sq == 0 {
        return;
    }
    let strength = u32::from(strength);
    let floor = u32::from(floor.min(256));

    for (row_index, row) in surface.rows_mut().enumerate() {
        let dy = (band.y + row_index) as i32 - cy;
        let dy_sq = (dy * dy) as u32;
        for (x, pixel) in row.iter_mut().enumerate() {
            let dx = x as i32 - cx;
            let dist_sq = (dx * dx) as u32 + dy_sq;
            let dark = dist_sq * strength / max_dist_sq;
            let factor = 256u32.saturating_sub(dark).max(floor);
            if factor >= 256 {
                continue;
            }
            let c = pixel.unpack();
            *pixel = Pixel::pack(
                scale8(c.r, factor),
                scale8(c.g, factor),
                scale8(c.b, factor),
            );
        }
    }
}
