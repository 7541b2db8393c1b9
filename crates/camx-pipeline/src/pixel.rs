//! RGB565 pixel codec
//!
//! Every stage of the pipeline trades in [`Pixel`], a packed 16-bit colour
//! with 5 bits of red, 6 bits of green and 5 bits of blue.
//!
//! Expansion to 8 bits is a plain left shift: the low bits are zero-filled,
//! not replicated. `0xFFFF` therefore unpacks to `(248, 252, 248)`.

use bytemuck::{Pod, Zeroable};

use crate::math8::luma8;

/// 8-bit per channel colour, as produced by [`Pixel::unpack`]
pub type Rgb = rgb::RGB8;

/// Packed RGB565 pixel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Pixel(pub u16);

impl Pixel {
    pub const BLACK: Pixel = Pixel(0x0000);
    pub const WHITE: Pixel = Pixel(0xFFFF);

    /// Pack 8-bit channels, truncating each to its storage width
    #[inline(always)]
    pub const fn pack(r: u8, g: u8, b: u8) -> Self {
        Pixel((((r >> 3) as u16) << 11) | (((g >> 2) as u16) << 5) | ((b >> 3) as u16))
    }

    /// Pack a grey level into all three channels
    #[inline(always)]
    pub const fn gray(level: u8) -> Self {
        Self::pack(level, level, level)
    }

    #[inline(always)]
    pub const fn from_rgb(color: Rgb) -> Self {
        Self::pack(color.r, color.g, color.b)
    }

    /// Unpack into 8-bit channels (zero-filled low bits)
    #[inline(always)]
    pub const fn unpack(self) -> Rgb {
        Rgb {
            r: (((self.0 >> 11) & 0x1F) << 3) as u8,
            g: (((self.0 >> 5) & 0x3F) << 2) as u8,
            b: ((self.0 & 0x1F) << 3) as u8,
        }
    }

    /// Q8 luma of the unpacked channels
    #[inline(always)]
    pub const fn luma(self) -> u8 {
        let c = self.unpack();
        luma8(c.r, c.g, c.b)
    }

    /// Byte-swap into the order the display controller expects on the wire
    #[inline(always)]
    pub const fn to_wire(self) -> Self {
        Pixel(self.0.to_be())
    }
}

impl From<Rgb> for Pixel {
    fn from(color: Rgb) -> Self {
        Self::from_rgb(color)
    }
}

impl From<Pixel> for Rgb {
    fn from(pixel: Pixel) -> Self {
        pixel.unpack()
    }
}

/// Pack 8-bit channels into RGB565
#[inline(always)]
pub const fn pack(r: u8, g: u8, b: u8) -> Pixel {
    Pixel::pack(r, g, b)
}

/// Unpack RGB565 into 8-bit channels
#[inline(always)]
pub const fn unpack(pixel: Pixel) -> (u8, u8, u8) {
    let c = pixel.unpack();
    (c.r, c.g, c.b)
}

/// Convert a row to wire byte order in place
pub fn to_wire(row: &mut [Pixel]) {
    for pixel in row.iter_mut() {
        *pixel = pixel.to_wire();
    }
}
