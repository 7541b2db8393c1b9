//! Fixed-point filter library with compile-time known filter variants
//!
//! Filters mutate a [`Surface`] in place. They use integer math only and
//! never allocate: the few filters that need working state borrow it from a
//! [`FilterScratch`] owned by the caller.
//!
//! Dispatch is a `match` on [`Filter`] once per buffer, never per pixel.

mod grain;
mod params;
mod spatial;
mod tone;
mod vignette;

pub use grain::{Lfsr, grain};
pub use params::{
    BrightnessContrastParams, DEFAULT_EDGE_THRESHOLD, DEFAULT_GRAIN_INTENSITY, DEFAULT_PARAMS,
    DEFAULT_SHARPEN_STRENGTH, DEFAULT_VIBRANT_BOOST, DEFAULT_VIGNETTE_FLOOR,
    DEFAULT_VIGNETTE_STRENGTH, EdgeParams, FilterParams, GrainParams, SharpenParams,
    VibrantParams, VignetteParams,
};
pub use spatial::{blur, edge_detect, sharpen};
pub use tone::{
    brightness_contrast, cool, cool_rgb, grayscale, invert, sepia, sepia_rgb, vibrant, vintage,
    vintage_rgb,
};
pub use vignette::vignette;

use crate::pixel::Pixel;

/// Vertical placement of a surface inside the frame it belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    /// First frame row covered by the surface
    pub y: usize,
    /// Height of the whole frame
    pub frame_height: usize,
}

impl Band {
    /// A band covering a whole frame of `height` rows
    pub const fn full(height: usize) -> Self {
        Self {
            y: 0,
            frame_height: height,
        }
    }

    /// The single output row `y` of a frame
    pub const fn row(y: usize, frame_height: usize) -> Self {
        Self { y, frame_height }
    }
}

/// A rectangular, row-major view over packed pixels
pub struct Surface<'p> {
    pixels: &'p mut [Pixel],
    width: usize,
    height: usize,
    band: Band,
}

impl<'p> Surface<'p> {
    /// View the first `width * height` pixels of `pixels` as a whole frame
    ///
    /// Returns `None` for an empty geometry or a buffer that is too short.
    pub fn new(pixels: &'p mut [Pixel], width: usize, height: usize) -> Option<Self> {
        Self::with_band(pixels, width, height, Band::full(height))
    }

    /// View `pixels` as `height` rows starting at `band.y` of a taller frame
    pub fn with_band(
        pixels: &'p mut [Pixel],
        width: usize,
        height: usize,
        band: Band,
    ) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let len = width.checked_mul(height)?;
        let pixels = pixels.get_mut(..len)?;
        let band = Band {
            y: band.y,
            frame_height: band.frame_height.max(band.y + height),
        };
        Some(Self {
            pixels,
            width,
            height,
            band,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn pixels(&self) -> &[Pixel] {
        &*self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        self.pixels
    }

    pub fn rows_mut(&mut self) -> core::slice::ChunksExactMut<'_, Pixel> {
        self.pixels.chunks_exact_mut(self.width)
    }
}

/// Working state for filters that cannot run from the pixels alone
///
/// `W` is the widest row the spatial filters accept; wider surfaces pass
/// through them unchanged.
pub struct FilterScratch<const W: usize> {
    lfsr: Lfsr,
    lines: [[u8; W]; 3],
    rows: [[Pixel; W]; 2],
}

impl<const W: usize> FilterScratch<W> {
    pub const fn new() -> Self {
        Self {
            lfsr: Lfsr::new(Lfsr::SEED),
            lines: [[0; W]; 3],
            rows: [[Pixel::BLACK; W]; 2],
        }
    }

    /// Restart the grain sequence from `seed`
    pub fn reseed(&mut self, seed: u32) {
        self.lfsr = Lfsr::new(seed);
    }
}

impl<const W: usize> Default for FilterScratch<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// User-supplied filter, called with the surface to mutate
pub type FilterFn = fn(&mut Surface<'_>);

/// Filter slot - enum containing every available transform
///
/// Parameterised variants borrow their parameter block, so the same
/// `static` can be shared between a chain and the code that tunes it.
#[derive(Clone, Copy)]
pub enum Filter<'a> {
    Grayscale,
    Sepia,
    Vignette(&'a VignetteParams),
    BrightnessContrast(&'a BrightnessContrastParams),
    Vintage,
    Cool,
    Vibrant(&'a VibrantParams),
    Grain(&'a GrainParams),
    EdgeDetect(&'a EdgeParams),
    Blur,
    Sharpen(&'a SharpenParams),
    Invert,
    /// Caller-defined transform
    Custom(FilterFn),
}

impl Filter<'_> {
    /// Apply the filter to `surface`
    pub fn apply<const W: usize>(
        &self,
        surface: &mut Surface<'_>,
        scratch: &mut FilterScratch<W>,
    ) {
        match *self {
            Self::Grayscale => grayscale(surface.pixels_mut()),
            Self::Sepia => sepia(surface.pixels_mut()),
            Self::Vignette(p) => vignette(surface, p.strength(), p.floor()),
            Self::BrightnessContrast(p) => {
                brightness_contrast(surface.pixels_mut(), p.brightness(), p.contrast_q8());
            }
            Self::Vintage => vintage(surface.pixels_mut()),
            Self::Cool => cool(surface.pixels_mut()),
            Self::Vibrant(p) => vibrant(surface.pixels_mut(), p.boost_q8(), p.clarity()),
            Self::Grain(p) => grain(surface.pixels_mut(), p.intensity(), &mut scratch.lfsr),
            Self::EdgeDetect(p) => edge_detect(surface, p.threshold(), &mut scratch.lines),
            Self::Blur => blur(surface),
            Self::Sharpen(p) => sharpen(surface, p.strength(), &mut scratch.rows),
            Self::Invert => invert(surface.pixels_mut()),
            Self::Custom(f) => f(surface),
        }
    }

    /// Built-in identifier, `None` for custom filters
    pub const fn id(&self) -> Option<FilterId> {
        Some(match self {
            Self::Grayscale => FilterId::Grayscale,
            Self::Sepia => FilterId::Sepia,
            Self::Vignette(_) => FilterId::Vignette,
            Self::BrightnessContrast(_) => FilterId::BrightnessContrast,
            Self::Vintage => FilterId::Vintage,
            Self::Cool => FilterId::Cool,
            Self::Vibrant(_) => FilterId::Vibrant,
            Self::Grain(_) => FilterId::Grain,
            Self::EdgeDetect(_) => FilterId::EdgeDetect,
            Self::Blur => FilterId::Blur,
            Self::Sharpen(_) => FilterId::Sharpen,
            Self::Invert => FilterId::Invert,
            Self::Custom(_) => return None,
        })
    }

    /// Check if the filter needs a 3x3 neighbourhood
    pub const fn is_spatial(&self) -> bool {
        matches!(self, Self::EdgeDetect(_) | Self::Blur | Self::Sharpen(_))
    }
}

impl core::fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.id() {
            Some(id) => f.write_str(id.as_str()),
            None => f.write_str("Custom"),
        }
    }
}

/// Known filter names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterId {
    Grayscale,
    Sepia,
    Vignette,
    BrightnessContrast,
    Vintage,
    Cool,
    Vibrant,
    Grain,
    EdgeDetect,
    Blur,
    Sharpen,
    Invert,
}

pub const FILTER_NAME_GRAYSCALE: &str = "Grayscale";
pub const FILTER_NAME_SEPIA: &str = "Sepia";
pub const FILTER_NAME_VIGNETTE: &str = "Vignette";
pub const FILTER_NAME_BRIGHTNESS_CONTRAST: &str = "BrightnessContrast";
pub const FILTER_NAME_VINTAGE: &str = "Vintage";
pub const FILTER_NAME_COOL: &str = "Cool";
pub const FILTER_NAME_VIBRANT: &str = "Vibrant";
pub const FILTER_NAME_GRAIN: &str = "Grain";
pub const FILTER_NAME_EDGE_DETECT: &str = "EdgeDetect";
pub const FILTER_NAME_BLUR: &str = "Blur";
pub const FILTER_NAME_SHARPEN: &str = "Sharpen";
pub const FILTER_NAME_INVERT: &str = "Invert";

impl FilterId {
    pub const ALL: [FilterId; 12] = [
        Self::Grayscale,
        Self::Sepia,
        Self::Vignette,
        Self::BrightnessContrast,
        Self::Vintage,
        Self::Cool,
        Self::Vibrant,
        Self::Grain,
        Self::EdgeDetect,
        Self::Blur,
        Self::Sharpen,
        Self::Invert,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grayscale => FILTER_NAME_GRAYSCALE,
            Self::Sepia => FILTER_NAME_SEPIA,
            Self::Vignette => FILTER_NAME_VIGNETTE,
            Self::BrightnessContrast => FILTER_NAME_BRIGHTNESS_CONTRAST,
            Self::Vintage => FILTER_NAME_VINTAGE,
            Self::Cool => FILTER_NAME_COOL,
            Self::Vibrant => FILTER_NAME_VIBRANT,
            Self::Grain => FILTER_NAME_GRAIN,
            Self::EdgeDetect => FILTER_NAME_EDGE_DETECT,
            Self::Blur => FILTER_NAME_BLUR,
            Self::Sharpen => FILTER_NAME_SHARPEN,
            Self::Invert => FILTER_NAME_INVERT,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Build the filter, borrowing its parameters from `params`
    pub const fn filter(self, params: &FilterParams) -> Filter<'_> {
        match self {
            Self::Grayscale => Filter::Grayscale,
            Self::Sepia => Filter::Sepia,
            Self::Vignette => Filter::Vignette(&params.vignette),
            Self::BrightnessContrast => Filter::BrightnessContrast(&params.brightness_contrast),
            Self::Vintage => Filter::Vintage,
            Self::Cool => Filter::Cool,
            Self::Vibrant => Filter::Vibrant(&params.vibrant),
            Self::Grain => Filter::Grain(&params.grain),
            Self::EdgeDetect => Filter::EdgeDetect(&params.edge),
            Self::Blur => Filter::Blur,
            Self::Sharpen => Filter::Sharpen(&params.sharpen),
            Self::Invert => Filter::Invert,
        }
    }

    /// Build the filter with the process-wide [`DEFAULT_PARAMS`]
    pub fn filter_default(self) -> Filter<'static> {
        self.filter(&DEFAULT_PARAMS)
    }
}

impl core::fmt::Display for FilterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
