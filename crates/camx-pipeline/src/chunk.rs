//! Double-buffered scanline staging area
//!
//! Two rows of `W` pixels, sized at compile time and placed wherever the
//! owner puts the buffer (a `static` in internal RAM on the device). Nothing
//! is allocated at runtime; `init` only checks the requested width against
//! the capacity and marks the buffer as reserved.
//!
//! # Concurrency precondition
//!
//! [`ChunkBuffer::process_buffer`] hands out the active slot and does not
//! know which slot a display transfer is still reading. A caller that queues
//! a slot for transfer must either await that transfer before asking for the
//! slot again, or use [`ChunkBuffer::split`], which returns both slots as
//! disjoint borrows so the in-flight one cannot be touched while the other
//! is filled.

use log::debug;

use crate::error::ChunkError;
use crate::pixel::Pixel;

pub struct ChunkBuffer<const W: usize> {
    slots: [[Pixel; W]; 2],
    width: usize,
    active: usize,
    reserved: bool,
}

impl<const W: usize> ChunkBuffer<W> {
    /// Maximum row width
    pub const CAPACITY: usize = W;

    pub const fn new() -> Self {
        Self {
            slots: [[Pixel::BLACK; W]; 2],
            width: 0,
            active: 0,
            reserved: false,
        }
    }

    /// Reserve both rows for `width` pixels each
    ///
    /// Calling `init` again re-reserves with the new width.
    pub fn init(&mut self, width: usize) -> Result<(), ChunkError> {
        if width == 0 {
            return Err(ChunkError::ZeroWidth);
        }
        if width > W {
            return Err(ChunkError::TooWide {
                requested: width,
                capacity: W,
            });
        }
        self.width = width;
        self.active = 0;
        self.reserved = true;
        debug!("chunk buffer reserved: 2 x {} px", width);
        Ok(())
    }

    /// Release the reservation; safe to call at any time
    pub fn deinit(&mut self) {
        if self.reserved {
            debug!("chunk buffer released");
        }
        self.reserved = false;
        self.width = 0;
        self.active = 0;
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// Reserved row width, 0 when not reserved
    pub fn width(&self) -> usize {
        self.width
    }

    /// Index of the slot `process_buffer` returns
    pub fn active(&self) -> usize {
        self.active
    }

    /// The active slot, trimmed to the reserved width
    pub fn process_buffer(&mut self) -> Result<&mut [Pixel], ChunkError> {
        if !self.reserved {
            return Err(ChunkError::NotReserved);
        }
        Ok(&mut self.slots[self.active][..self.width])
    }

    /// Make the other slot active
    pub fn swap(&mut self) {
        self.active ^= 1;
    }

    /// Both slots as `(active, other)`
    pub fn split(&mut self) -> Result<(&mut [Pixel], &mut [Pixel]), ChunkError> {
        if !self.reserved {
            return Err(ChunkError::NotReserved);
        }
        let width = self.width;
        let [first, second] = &mut self.slots;
        let (active, other) = if self.active == 0 {
            (first, second)
        } else {
            (second, first)
        };
        Ok((&mut active[..width], &mut other[..width]))
    }
}

impl<const W: usize> Default for ChunkBuffer<W> {
    fn default() -> Self {
        Self::new()
    }
}
