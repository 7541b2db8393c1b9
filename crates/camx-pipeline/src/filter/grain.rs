//! Film grain driven by a shift-register noise source

use crate::math8::clamp8;
use crate::pixel::{Pixel, Rgb};

/// Fibonacci LFSR with taps at bits 0, 1, 21 and 31
///
/// One step is a handful of shifts and XORs. The feedback includes bit 0,
/// so the register is invertible and a non-zero state never reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lfsr(u32);

impl Lfsr {
    pub const SEED: u32 = 0xDEAD_BEEF;

    /// Create a register; a zero seed is replaced by [`Lfsr::SEED`]
    pub const fn new(seed: u32) -> Self {
        Self(if seed == 0 { Self::SEED } else { seed })
    }

    /// Advance one step and return the new state
    #[inline(always)]
    pub fn step(&mut self) -> u32 {
        let s = self.0;
        let bit = (s ^ (s >> 1) ^ (s >> 21) ^ (s >> 31)) & 1;
        self.0 = (s >> 1) | (bit << 31);
        self.0
    }

    pub const fn state(&self) -> u32 {
        self.0
    }
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new(Self::SEED)
    }
}

/// Add the same signed noise sample to all channels of each pixel
///
/// Noise is `((lfsr & 0xFF) - 128) * intensity / 256`, so the amplitude never
/// exceeds ±128 even at full intensity.
pub fn grain(pixels: &mut [Pixel], intensity: u8, lfsr: &mut Lfsr) {
    if intensity == 0 {
        return;
    }
    let intensity = i32::from(intensity);
    for pixel in pixels.iter_mut() {
        let sample = (lfsr.step() & 0xFF) as i32 - 128;
        let noise = sample * intensity / 256;
        let c = pixel.unpack();
        *pixel = Pixel::from_rgb(Rgb {
            r: clamp8(i32::from(c.r) + noise),
            g: clamp8(i32::from(c.g) + noise),
            b: clamp8(i32::from(c.b) + noise),
        });
    }
}
