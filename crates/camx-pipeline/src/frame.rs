//! Frame descriptors and the camera boundary
//!
//! A [`Frame`] is a borrowed view over a buffer owned by a [`FrameSource`].
//! It is validated once at construction; row and pixel access after that
//! cannot go out of bounds.

use crate::error::FrameError;
use crate::pixel::Pixel;

/// Layout of the bytes behind a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGB565, high byte first (what most sensors emit)
    Rgb565Be,
    /// RGB565, low byte first
    Rgb565Le,
    /// Encoded image, opaque to the pipeline
    Jpeg,
}

impl PixelFormat {
    /// RGB565 in the byte order of the running CPU
    pub const NATIVE: PixelFormat = if cfg!(target_endian = "little") {
        PixelFormat::Rgb565Le
    } else {
        PixelFormat::Rgb565Be
    };

    pub const fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::Jpeg)
    }

    /// Bytes per pixel, `None` for encoded formats
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgb565Be | PixelFormat::Rgb565Le => Some(2),
            PixelFormat::Jpeg => None,
        }
    }
}

/// Standard sensor resolutions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 160x120
    Qqvga,
    /// 320x240
    Qvga,
    /// 640x480
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    /// 1280x720
    Hd,
    /// 1280x1024
    Sxga,
    /// 1600x1200
    Uxga,
}

impl Resolution {
    pub const fn width(self) -> usize {
        self.size().0
    }

    pub const fn height(self) -> usize {
        self.size().1
    }

    pub const fn size(self) -> (usize, usize) {
        match self {
            Self::Qqvga => (160, 120),
            Self::Qvga => (320, 240),
            Self::Vga => (640, 480),
            Self::Svga => (800, 600),
            Self::Xga => (1024, 768),
            Self::Hd => (1280, 720),
            Self::Sxga => (1280, 1024),
            Self::Uxga => (1600, 1200),
        }
    }
}

/// Non-owning view over a captured frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> Frame<'a> {
    /// Wrap a frame buffer
    ///
    /// Uncompressed frames must hold at least `width * height * 2` bytes.
    /// Encoded frames are accepted as-is; their length is opaque.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        if let Some(bpp) = format.bytes_per_pixel() {
            let needed = width
                .checked_mul(height)
                .and_then(|n| n.checked_mul(bpp))
                .ok_or(FrameError::TooShort {
                    needed: usize::MAX,
                    len: data.len(),
                })?;
            if needed > data.len() {
                return Err(FrameError::TooShort {
                    needed,
                    len: data.len(),
                });
            }
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// View packed pixels as a frame in native byte order
    pub fn from_pixels(
        pixels: &'a [Pixel],
        width: usize,
        height: usize,
    ) -> Result<Self, FrameError> {
        Self::new(
            bytemuck::cast_slice(pixels),
            width,
            height,
            PixelFormat::NATIVE,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw bytes, including any trailing padding the source left behind
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `y`, `None` past the last row or for encoded frames
    pub fn row(&self, y: usize) -> Option<FrameRow<'a>> {
        let bpp = self.format.bytes_per_pixel()?;
        if y >= self.height {
            return None;
        }
        let stride = self.width * bpp;
        let start = y * stride;
        Some(FrameRow {
            bytes: self.data.get(start..start + stride)?,
            big_endian: matches!(self.format, PixelFormat::Rgb565Be),
        })
    }
}

/// One row of an uncompressed frame
#[derive(Debug, Clone, Copy)]
pub struct FrameRow<'a> {
    bytes: &'a [u8],
    big_endian: bool,
}

impl FrameRow<'_> {
    pub fn width(&self) -> usize {
        self.bytes.len() / 2
    }

    /// Pixel `x`, clamped to the last column
    #[inline(always)]
    pub fn pixel(&self, x: usize) -> Pixel {
        let x = x.min(self.width().saturating_sub(1));
        let pair = [self.bytes[2 * x], self.bytes[2 * x + 1]];
        Pixel(if self.big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        })
    }

    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        (0..self.width()).map(|x| self.pixel(x))
    }
}

/// Camera side of the pipeline
///
/// A source hands out at most one live frame per stream. The handle is not
/// `Clone`, so a frame is given back exactly once by moving its handle into
/// [`release`](FrameSource::release).
pub trait FrameSource {
    /// Token for an acquired frame buffer
    type Handle;

    /// Take the newest available frame, `None` if the driver is busy
    fn acquire(&mut self) -> Option<Self::Handle>;

    /// Describe the frame behind `handle`
    fn frame<'a>(&'a self, handle: &'a Self::Handle) -> Result<Frame<'a>, FrameError>;

    /// Hand the buffer back to the driver
    fn release(&mut self, handle: Self::Handle);
}
