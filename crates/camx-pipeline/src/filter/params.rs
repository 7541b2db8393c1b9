//! Filter parameter blocks
//!
//! Parameters are written by mode/UI code and read by filters. Every field is
//! an atomic so a parameter block can sit in a `static` and be adjusted from
//! another task; a filter loads each value once per invocation, so a frame
//! never sees a half-updated setting.

use core::sync::atomic::{AtomicI8, AtomicU8, AtomicU16, Ordering};

/// Default vignette strength (Q8, 128 = 0.5)
pub const DEFAULT_VIGNETTE_STRENGTH: u8 = 128;
/// Lowest vignette factor (Q8), keeps corners from going fully black
pub const DEFAULT_VIGNETTE_FLOOR: u16 = 64;
/// Default film grain intensity
pub const DEFAULT_GRAIN_INTENSITY: u8 = 30;
/// Default Sobel threshold
pub const DEFAULT_EDGE_THRESHOLD: u8 = 50;
/// Default sharpen strength (Q8)
pub const DEFAULT_SHARPEN_STRENGTH: u8 = 30;
/// Default saturation boost (Q8, 333 ~ 1.3)
pub const DEFAULT_VIBRANT_BOOST: u16 = 333;

/// Vignette darkening
pub struct VignetteParams {
    /// Q8 strength (0 = none, 255 = full)
    strength: AtomicU8,
    /// Minimum Q8 factor applied to a channel
    floor: AtomicU16,
}

impl VignetteParams {
    pub const fn new(strength: u8) -> Self {
        Self {
            strength: AtomicU8::new(strength),
            floor: AtomicU16::new(DEFAULT_VIGNETTE_FLOOR),
        }
    }

    pub fn strength(&self) -> u8 {
        self.strength.load(Ordering::Relaxed)
    }

    pub fn set_strength(&self, strength: u8) {
        self.strength.store(strength, Ordering::Relaxed);
    }

    pub fn floor(&self) -> u16 {
        self.floor.load(Ordering::Relaxed)
    }

    /// Set the minimum factor, capped at 256 (no darkening at all)
    pub fn set_floor(&self, floor: u16) {
        self.floor.store(floor.min(256), Ordering::Relaxed);
    }
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self::new(DEFAULT_VIGNETTE_STRENGTH)
    }
}

/// Brightness offset and contrast gain
pub struct BrightnessContrastParams {
    /// Signed offset added after contrast
    brightness: AtomicI8,
    /// Q8 contrast gain (256 = neutral)
    contrast_q8: AtomicU16,
}

impl BrightnessContrastParams {
    pub const fn new(brightness: i8, contrast_q8: u16) -> Self {
        Self {
            brightness: AtomicI8::new(brightness),
            contrast_q8: AtomicU16::new(contrast_q8),
        }
    }

    pub fn brightness(&self) -> i8 {
        self.brightness.load(Ordering::Relaxed)
    }

    pub fn set_brightness(&self, brightness: i8) {
        self.brightness.store(brightness, Ordering::Relaxed);
    }

    pub fn contrast_q8(&self) -> u16 {
        self.contrast_q8.load(Ordering::Relaxed)
    }

    pub fn set_contrast_q8(&self, contrast_q8: u16) {
        self.contrast_q8.store(contrast_q8, Ordering::Relaxed);
    }

    /// Check if the settings leave pixels untouched
    pub fn is_neutral(&self) -> bool {
        self.brightness() == 0 && self.contrast_q8() == 256
    }
}

impl Default for BrightnessContrastParams {
    fn default() -> Self {
        Self::new(0, 256)
    }
}

/// Film grain
pub struct GrainParams {
    /// Noise amplitude (0-255)
    intensity: AtomicU8,
}

impl GrainParams {
    pub const fn new(intensity: u8) -> Self {
        Self {
            intensity: AtomicU8::new(intensity),
        }
    }

    pub fn intensity(&self) -> u8 {
        self.intensity.load(Ordering::Relaxed)
    }

    pub fn set_intensity(&self, intensity: u8) {
        self.intensity.store(intensity, Ordering::Relaxed);
    }
}

impl Default for GrainParams {
    fn default() -> Self {
        Self::new(DEFAULT_GRAIN_INTENSITY)
    }
}

/// Sobel edge detection
pub struct EdgeParams {
    /// Gradient magnitude above which a pixel is an edge
    threshold: AtomicU8,
}

impl EdgeParams {
    pub const fn new(threshold: u8) -> Self {
        Self {
            threshold: AtomicU8::new(threshold),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold.load(Ordering::Relaxed)
    }

    pub fn set_threshold(&self, threshold: u8) {
        self.threshold.store(threshold, Ordering::Relaxed);
    }
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

/// Unsharp-style sharpening
pub struct SharpenParams {
    /// Q8 strength (typically 0-100)
    strength: AtomicU8,
}

impl SharpenParams {
    pub const fn new(strength: u8) -> Self {
        Self {
            strength: AtomicU8::new(strength),
        }
    }

    pub fn strength(&self) -> u8 {
        self.strength.load(Ordering::Relaxed)
    }

    pub fn set_strength(&self, strength: u8) {
        self.strength.store(strength, Ordering::Relaxed);
    }
}

impl Default for SharpenParams {
    fn default() -> Self {
        Self::new(DEFAULT_SHARPEN_STRENGTH)
    }
}

/// Saturation boost with optional micro-contrast
pub struct VibrantParams {
    /// Q8 boost applied to the distance from luma (256 = unchanged)
    boost_q8: AtomicU16,
    /// Extra Q8 contrast added on top of unity; 0 skips the pass
    clarity: AtomicU8,
}

impl VibrantParams {
    pub const fn new(boost_q8: u16, clarity: u8) -> Self {
        Self {
            boost_q8: AtomicU16::new(boost_q8),
            clarity: AtomicU8::new(clarity),
        }
    }

    pub fn boost_q8(&self) -> u16 {
        self.boost_q8.load(Ordering::Relaxed)
    }

    pub fn set_boost_q8(&self, boost_q8: u16) {
        self.boost_q8.store(boost_q8, Ordering::Relaxed);
    }

    pub fn clarity(&self) -> u8 {
        self.clarity.load(Ordering::Relaxed)
    }

    pub fn set_clarity(&self, clarity: u8) {
        self.clarity.store(clarity, Ordering::Relaxed);
    }
}

impl Default for VibrantParams {
    fn default() -> Self {
        Self::new(DEFAULT_VIBRANT_BOOST, 0)
    }
}

/// All parameter blocks a preset may reference
pub struct FilterParams {
    pub vignette: VignetteParams,
    pub brightness_contrast: BrightnessContrastParams,
    pub grain: GrainParams,
    pub edge: EdgeParams,
    pub sharpen: SharpenParams,
    pub vibrant: VibrantParams,
}

impl FilterParams {
    pub const fn new() -> Self {
        Self {
            vignette: VignetteParams::new(DEFAULT_VIGNETTE_STRENGTH),
            brightness_contrast: BrightnessContrastParams::new(0, 256),
            grain: GrainParams::new(DEFAULT_GRAIN_INTENSITY),
            edge: EdgeParams::new(DEFAULT_EDGE_THRESHOLD),
            sharpen: SharpenParams::new(DEFAULT_SHARPEN_STRENGTH),
            vibrant: VibrantParams::new(DEFAULT_VIBRANT_BOOST, 0),
        }
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared parameter blocks behind [`FilterId::filter_default`]
///
/// [`FilterId::filter_default`]: super::FilterId::filter_default
pub static DEFAULT_PARAMS: FilterParams = FilterParams::new();
