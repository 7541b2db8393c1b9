//! Filter line-ups for the camera modes
//!
//! Each function clears the chain and registers its filters in application
//! order. Parameter blocks come from the caller, usually a `static`
//! [`FilterParams`], so mode code can keep tuning them afterwards.

use crate::chain::FilterChain;
use crate::error::ChainError;
use crate::filter::{DEFAULT_GRAIN_INTENSITY, DEFAULT_VIGNETTE_STRENGTH, FilterId, FilterParams};

fn register<'a, const W: usize, const N: usize>(
    chain: &mut FilterChain<'a, W, N>,
    params: &'a FilterParams,
    ids: &[FilterId],
    enabled: bool,
) -> Result<(), ChainError> {
    chain.clear();
    for &id in ids {
        chain.add_with_state(id.as_str(), id.filter(params), enabled)?;
    }
    Ok(())
}

/// Every colour filter, all disabled, for toggling from a menu
pub fn register_catalog<'a, const W: usize, const N: usize>(
    chain: &mut FilterChain<'a, W, N>,
    params: &'a FilterParams,
) -> Result<(), ChainError> {
    register(
        chain,
        params,
        &[
            FilterId::Grayscale,
            FilterId::Sepia,
            FilterId::Vintage,
            FilterId::Cool,
            FilterId::Vibrant,
            FilterId::Vignette,
            FilterId::Grain,
        ],
        false,
    )
}

/// Sepia, grain and vignette, enabled at their default strengths
pub fn register_retro<'a, const W: usize, const N: usize>(
    chain: &mut FilterChain<'a, W, N>,
    params: &'a FilterParams,
) -> Result<(), ChainError> {
    params.grain.set_intensity(DEFAULT_GRAIN_INTENSITY);
    params.vignette.set_strength(DEFAULT_VIGNETTE_STRENGTH);
    register(
        chain,
        params,
        &[FilterId::Sepia, FilterId::Grain, FilterId::Vignette],
        true,
    )
}

/// Sobel edge map
pub fn register_edge<'a, const W: usize, const N: usize>(
    chain: &mut FilterChain<'a, W, N>,
    params: &'a FilterParams,
) -> Result<(), ChainError> {
    register(chain, params, &[FilterId::EdgeDetect], true)
}

/// Grayscale and sepia, disabled until toggled by name
pub fn register_webcam<'a, const W: usize, const N: usize>(
    chain: &mut FilterChain<'a, W, N>,
    params: &'a FilterParams,
) -> Result<(), ChainError> {
    register(
        chain,
        params,
        &[FilterId::Grayscale, FilterId::Sepia],
        false,
    )
}
