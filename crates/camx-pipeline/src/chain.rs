//! Ordered, bounded filter chain
//!
//! Filters run in insertion order. Capacity is fixed at compile time and
//! the chain never grows; names are looked up with a linear scan.

use heapless::Vec;
use log::{debug, info, warn};

use crate::error::ChainError;
use crate::filter::{Band, Filter, FilterScratch, Surface};
use crate::pixel::Pixel;

/// Default number of filter slots
pub const MAX_FILTERS: usize = 8;

/// Largest image filtered in viewfinder mode
pub const VIEWFINDER_WIDTH: usize = 320;
pub const VIEWFINDER_HEIGHT: usize = 240;

/// What the filtered image is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Live preview; oversized images pass through unfiltered
    Viewfinder,
    /// Still capture at full resolution
    Capture,
}

/// Registered filter with its name and enabled flag
#[derive(Debug, Clone, Copy)]
pub struct FilterSlot<'a> {
    pub name: &'a str,
    pub filter: Filter<'a>,
    pub enabled: bool,
}

/// Filter chain
///
/// `W` bounds the row width of the spatial filters' working rows and `N`
/// is the number of slots.
pub struct FilterChain<'a, const W: usize, const N: usize = MAX_FILTERS> {
    slots: Vec<FilterSlot<'a>, N>,
    scratch: FilterScratch<W>,
}

impl<'a, const W: usize, const N: usize> FilterChain<'a, W, N> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            scratch: FilterScratch::new(),
        }
    }

    /// Append an enabled filter
    pub fn add(&mut self, name: &'a str, filter: Filter<'a>) -> Result<(), ChainError> {
        self.add_with_state(name, filter, true)
    }

    /// Append a filter with an explicit initial state
    pub fn add_with_state(
        &mut self,
        name: &'a str,
        filter: Filter<'a>,
        enabled: bool,
    ) -> Result<(), ChainError> {
        if self.position(name).is_some() {
            warn!("filter {} already registered", name);
            return Err(ChainError::Duplicate);
        }
        self.slots
            .push(FilterSlot {
                name,
                filter,
                enabled,
            })
            .map_err(|_| {
                warn!("filter chain full, {} rejected", name);
                ChainError::Full
            })?;
        info!("filter added: {}", name);
        Ok(())
    }

    /// Run every enabled filter over a whole `width x height` image
    pub fn process(
        &mut self,
        pixels: &mut [Pixel],
        width: usize,
        height: usize,
    ) -> Result<(), ChainError> {
        self.process_band(pixels, width, height, Band::full(height))
    }

    /// Run every enabled filter over `height` rows that sit at `band` in a
    /// taller frame
    pub fn process_band(
        &mut self,
        pixels: &mut [Pixel],
        width: usize,
        height: usize,
        band: Band,
    ) -> Result<(), ChainError> {
        let mut surface =
            Surface::with_band(pixels, width, height, band).ok_or(ChainError::BufferTooSmall)?;
        for slot in self.slots.iter().filter(|slot| slot.enabled) {
            slot.filter.apply(&mut surface, &mut self.scratch);
        }
        Ok(())
    }

    /// Like [`process`](Self::process), but in viewfinder mode images larger
    /// than 320x240 are left untouched
    pub fn process_with_mode(
        &mut self,
        pixels: &mut [Pixel],
        width: usize,
        height: usize,
        mode: FilterMode,
    ) -> Result<(), ChainError> {
        if mode == FilterMode::Viewfinder
            && (width > VIEWFINDER_WIDTH || height > VIEWFINDER_HEIGHT)
        {
            debug!("viewfinder: skipping filters for {}x{}", width, height);
            return Ok(());
        }
        self.process(pixels, width, height)
    }

    /// Run one filter outside the chain, sharing the chain's working rows
    pub fn apply_single(
        &mut self,
        filter: &Filter<'_>,
        pixels: &mut [Pixel],
        width: usize,
        height: usize,
        band: Band,
    ) -> Result<(), ChainError> {
        let mut surface =
            Surface::with_band(pixels, width, height, band).ok_or(ChainError::BufferTooSmall)?;
        filter.apply(&mut surface, &mut self.scratch);
        Ok(())
    }

    /// Flip the first filter called `name`; `false` if there is none
    pub fn toggle(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        let slot = &mut self.slots[index];
        slot.enabled = !slot.enabled;
        info!("filter {}: {}", name, if slot.enabled { "ON" } else { "OFF" });
        true
    }

    /// Set the state of the filter at `index`; `false` if out of range
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Remove all filters, keeping the storage
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn count(&self) -> usize {
        self.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn name(&self, index: usize) -> Option<&'a str> {
        self.slots.get(index).map(|slot| slot.name)
    }

    /// `false` for disabled filters and out-of-range indices
    pub fn is_enabled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.enabled)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    pub fn slots(&self) -> &[FilterSlot<'a>] {
        &self.slots
    }

    /// Restart the grain noise sequence
    pub fn reseed(&mut self, seed: u32) {
        self.scratch.reseed(seed);
    }
}

impl<const W: usize, const N: usize> Default for FilterChain<'_, W, N> {
    fn default() -> Self {
        Self::new()
    }
}
