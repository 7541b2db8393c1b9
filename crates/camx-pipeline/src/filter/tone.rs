//! Pointwise colour transforms
//!
//! Each pixel is unpacked, transformed with Q8 integer math, saturated and
//! repacked. No pixel depends on its neighbours, so these run unchanged on a
//! single scanline or a whole frame.

use crate::math8::{blend8, clamp8, contrast_q8, luma8};
use crate::pixel::{Pixel, Rgb};

/// Sepia matrix rows (Q8)
const SEPIA_R: [u32; 3] = [101, 197, 48];
const SEPIA_G: [u32; 3] = [89, 176, 43];
const SEPIA_B: [u32; 3] = [70, 137, 34];

/// Vintage look
const VINTAGE_KEEP: u32 = 179; // ~0.7 of the original colour
const VINTAGE_WARMTH: i32 = 30;
const VINTAGE_FADE: i32 = 20;

/// Cool look
const COOL_CONTRAST_Q8: i32 = 276; // ~1.08
const COOL_SHIFT: i32 = 25;

/// Apply `f` to every pixel in the unpacked domain
#[inline(always)]
fn map_pixels(pixels: &mut [Pixel], mut f: impl FnMut(Rgb) -> Rgb) {
    for pixel in pixels.iter_mut() {
        *pixel = Pixel::from_rgb(f(pixel.unpack()));
    }
}

/// Replace each pixel with its Q8 luma
pub fn grayscale(pixels: &mut [Pixel]) {
    for pixel in pixels.iter_mut() {
        *pixel = Pixel::gray(pixel.luma());
    }
}

#[inline(always)]
const fn sepia_channel(row: [u32; 3], c: Rgb) -> u8 {
    let value = (c.r as u32 * row[0] + c.g as u32 * row[1] + c.b as u32 * row[2]) >> 8;
    if value > 255 { 255 } else { value as u8 }
}

/// Sepia transform of a single colour
pub const fn sepia_rgb(c: Rgb) -> Rgb {
    Rgb {
        r: sepia_channel(SEPIA_R, c),
        g: sepia_channel(SEPIA_G, c),
        b: sepia_channel(SEPIA_B, c),
    }
}

pub fn sepia(pixels: &mut [Pixel]) {
    map_pixels(pixels, sepia_rgb);
}

/// `out = ((in - 128) * contrast >> 8) + 128 + brightness`, saturated
pub fn brightness_contrast(pixels: &mut [Pixel], brightness: i8, contrast: u16) {
    if brightness == 0 && contrast == 256 {
        return;
    }
    let offset = i32::from(brightness);
    let gain = i32::from(contrast);
    map_pixels(pixels, |c| Rgb {
        r: clamp8(contrast_q8(c.r, gain) + offset),
        g: clamp8(contrast_q8(c.g, gain) + offset),
        b: clamp8(contrast_q8(c.b, gain) + offset),
    });
}

/// Warm, slightly desaturated colour with lifted shadows
pub const fn vintage_rgb(c: Rgb) -> Rgb {
    let lum = luma8(c.r, c.g, c.b);
    let amount_of_luma = 256 - VINTAGE_KEEP;
    let r = blend8(c.r, lum, amount_of_luma) as i32 + VINTAGE_WARMTH;
    let g = blend8(c.g, lum, amount_of_luma) as i32 + (VINTAGE_WARMTH >> 1);
    let b = blend8(c.b, lum, amount_of_luma) as i32;
    Rgb {
        r: clamp8(max(r, VINTAGE_FADE)),
        g: clamp8(max(g, VINTAGE_FADE)),
        b: clamp8(max(b, VINTAGE_FADE)),
    }
}

pub fn vintage(pixels: &mut [Pixel]) {
    map_pixels(pixels, vintage_rgb);
}

/// Contrast boost followed by a blue/cyan shift
pub const fn cool_rgb(c: Rgb) -> Rgb {
    Rgb {
        r: clamp8(contrast_q8(c.r, COOL_CONTRAST_Q8) - (COOL_SHIFT >> 1)),
        g: clamp8(contrast_q8(c.g, COOL_CONTRAST_Q8) + (COOL_SHIFT >> 2)),
        b: clamp8(contrast_q8(c.b, COOL_CONTRAST_Q8) + COOL_SHIFT),
    }
}

pub fn cool(pixels: &mut [Pixel]) {
    map_pixels(pixels, cool_rgb);
}

/// Push channels away from luma by `boost_q8`, then optionally add
/// `clarity` Q8 of extra contrast
pub fn vibrant(pixels: &mut [Pixel], boost_q8: u16, clarity: u8) {
    let boost = i32::from(boost_q8);
    let gain = 256 + i32::from(clarity);
    map_pixels(pixels, |c| {
        let lum = i32::from(luma8(c.r, c.g, c.b));
        let push = |v: u8| clamp8(lum + (((i32::from(v) - lum) * boost) >> 8));
        let (r, g, b) = (push(c.r), push(c.g), push(c.b));
        if clarity == 0 {
            Rgb { r, g, b }
        } else {
            Rgb {
                r: clamp8(contrast_q8(r, gain)),
                g: clamp8(contrast_q8(g, gain)),
                b: clamp8(contrast_q8(b, gain)),
            }
        }
    });
}

/// Negative image
pub fn invert(pixels: &mut [Pixel]) {
    map_pixels(pixels, |c| Rgb {
        r: 255 - c.r,
        g: 255 - c.g,
        b: 255 - c.b,
    });
}

#[inline(always)]
const fn max(a: i32, b: i32) -> i32 {
    if a > b { a } else { b }
}
