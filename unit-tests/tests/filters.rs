//! Fixed-point filter library

use camx_pipeline::filter::{
    self, Band, BrightnessContrastParams, EdgeParams, Filter, FilterId, FilterParams,
    FilterScratch, GrainParams, Lfsr, SharpenParams, Surface, VignetteParams,
};
use camx_pipeline::{FilterChain, Pixel, Rgb};
use harness::{checkerboard, gradient};

fn apply(filter: Filter<'_>, pixels: &mut [Pixel], width: usize, height: usize) {
    let mut scratch = FilterScratch::<64>::new();
    let mut surface = Surface::new(pixels, width, height).expect("valid surface");
    filter.apply(&mut surface, &mut scratch);
}

fn all_pixels() -> Vec<Pixel> {
    (0..=u16::MAX).map(Pixel).collect()
}

// -----------------------------------------------------------------------------
// Pointwise colour filters
// -----------------------------------------------------------------------------

#[test]
fn grayscale_gives_equal_channels_at_stored_precision() {
    let mut pixels = all_pixels();
    filter::grayscale(&mut pixels);
    for p in pixels {
        let c = p.unpack();
        assert_eq!(c.r, c.b, "{:?}", p);
        assert_eq!(c.r, c.g & 0xF8, "{:?}", p);
    }
}

#[test]
fn sepia_on_pure_white_clamps_red_and_green() {
    // (101+197+48) * 255 >> 8 = 344 and (89+176+43) * 255 >> 8 = 306 both
    // clamp; (70+137+34) * 255 >> 8 = 240 stays below the limit.
    assert_eq!(filter::sepia_rgb(Rgb::new(255, 255, 255)), Rgb::new(255, 255, 240));
}

#[test]
fn sepia_on_packed_white_uses_unpacked_channels() {
    let mut pixels = [Pixel::WHITE];
    filter::sepia(&mut pixels);
    // (248, 252, 248) -> (338, 301, 235) -> (255, 255, 235)
    assert_eq!(pixels[0], Pixel::pack(255, 255, 235));
    assert_eq!(pixels[0], Pixel(0xFFFD));
}

#[test]
fn vintage_lifts_shadows_and_warms() {
    assert_eq!(filter::vintage_rgb(Rgb::new(0, 0, 0)), Rgb::new(30, 20, 20));
    assert_eq!(filter::vintage_rgb(Rgb::new(100, 100, 100)), Rgb::new(130, 115, 100));
    assert_eq!(filter::vintage_rgb(Rgb::new(250, 250, 250)).r, 255);
}

#[test]
fn cool_shifts_towards_blue() {
    assert_eq!(filter::cool_rgb(Rgb::new(128, 128, 128)), Rgb::new(116, 134, 153));
    // 255 -> ((127 * 276) >> 8) + 128 = 264 before the tint
    assert_eq!(filter::cool_rgb(Rgb::new(255, 255, 255)), Rgb::new(252, 255, 255));
}

#[test]
fn vibrant_pushes_channels_away_from_luma() {
    let mut pixels = [Pixel::pack(200, 100, 100), Pixel::gray(128)];
    filter::vibrant(&mut pixels, 333, 0);
    let c = pixels[0].unpack();
    assert!(c.r > 200, "{:?}", c);
    assert!(c.g < 100, "{:?}", c);
    assert_eq!(pixels[1], Pixel::gray(128));
}

#[test]
fn invert_swaps_black_and_white() {
    let mut pixels = [Pixel::WHITE, Pixel::BLACK];
    filter::invert(&mut pixels);
    assert_eq!(pixels, [Pixel::BLACK, Pixel::WHITE]);
}

#[test]
fn neutral_brightness_contrast_is_a_no_op() {
    let original = all_pixels();
    let mut pixels = original.clone();
    filter::brightness_contrast(&mut pixels, 0, 256);
    assert_eq!(pixels, original);
}

// -----------------------------------------------------------------------------
// Saturation
// -----------------------------------------------------------------------------

#[test]
fn max_brightness_never_wraps() {
    let original = all_pixels();
    let mut pixels = original.clone();
    filter::brightness_contrast(&mut pixels, 127, 256);
    for (before, after) in original.iter().zip(&pixels) {
        let (b, a) = (before.unpack(), after.unpack());
        assert!(a.r >= b.r && a.g >= b.g && a.b >= b.b, "{:?} -> {:?}", b, a);
    }
}

#[test]
fn min_brightness_never_wraps() {
    let original = all_pixels();
    let mut pixels = original.clone();
    filter::brightness_contrast(&mut pixels, -128, 256);
    for (before, after) in original.iter().zip(&pixels) {
        let (b, a) = (before.unpack(), after.unpack());
        assert!(a.r <= b.r && a.g <= b.g && a.b <= b.b, "{:?} -> {:?}", b, a);
    }
    assert_eq!(pixels[0xFFFF], Pixel::pack(120, 124, 120));
}

#[test]
fn extreme_contrast_saturates() {
    let mut pixels = [Pixel::pack(200, 200, 200), Pixel::pack(40, 40, 40)];
    filter::brightness_contrast(&mut pixels, 0, 1024);
    assert_eq!(pixels, [Pixel::pack(255, 255, 255), Pixel::BLACK]);
}

#[test]
fn max_grain_never_wraps() {
    let mut lfsr = Lfsr::default();
    let mut white = vec![Pixel::WHITE; 4096];
    filter::grain(&mut white, 255, &mut lfsr);
    // Noise is at most +-128, so white can only drop to 248 - 128.
    assert!(white.iter().all(|p| p.unpack().r >= 120));
    assert!(white.iter().any(|p| *p != Pixel::WHITE));

    let mut black = vec![Pixel::BLACK; 4096];
    filter::grain(&mut black, 255, &mut lfsr);
    assert!(black.iter().all(|p| p.unpack().r <= 127));
    assert!(black.iter().any(|p| *p != Pixel::BLACK));
}

#[test]
fn grain_is_deterministic_per_seed_and_off_at_zero() {
    let mut a = gradient(16, 4);
    let mut b = a.clone();
    filter::grain(&mut a, 60, &mut Lfsr::new(42));
    filter::grain(&mut b, 60, &mut Lfsr::new(42));
    assert_eq!(a, b);

    let original = gradient(16, 4);
    let mut c = original.clone();
    filter::grain(&mut c, 0, &mut Lfsr::default());
    assert_eq!(c, original);
}

#[test]
fn lfsr_never_reaches_zero() {
    let mut lfsr = Lfsr::new(1);
    for _ in 0..100_000 {
        assert_ne!(lfsr.step(), 0);
    }
    assert_eq!(Lfsr::new(0), Lfsr::new(Lfsr::SEED));
}

// -----------------------------------------------------------------------------
// Vignette
// -----------------------------------------------------------------------------

#[test]
fn vignette_with_zero_strength_is_a_no_op() {
    let original = gradient(20, 16);
    let mut pixels = original.clone();
    let params = VignetteParams::new(0);
    apply(Filter::Vignette(&params), &mut pixels, 20, 16);
    assert_eq!(pixels, original);
}

#[test]
fn vignette_darkens_corners_down_to_the_floor() {
    let (w, h) = (16, 12);
    let mut pixels = vec![Pixel::WHITE; w * h];
    let params = VignetteParams::new(255);
    apply(Filter::Vignette(&params), &mut pixels, w, h);

    let center = pixels[(h / 2) * w + w / 2];
    let corner = pixels[0];
    assert_eq!(center, Pixel::WHITE);
    assert!(corner.unpack().r < center.unpack().r);
    // The corner hits the 64/256 floor: 248 * 64 >> 8 = 62, stored as 56.
    assert_eq!(corner.unpack().r, 56);
}

#[test]
fn vignette_per_row_matches_full_frame() {
    let (w, h) = (12, 9);
    let params = VignetteParams::new(200);
    let mut full = gradient(w, h);
    let mut rows = full.clone();
    apply(Filter::Vignette(&params), &mut full, w, h);

    let mut scratch = FilterScratch::<64>::new();
    for (y, row) in rows.chunks_exact_mut(w).enumerate() {
        let mut surface = Surface::with_band(row, w, 1, Band::row(y, h)).expect("row");
        Filter::Vignette(&params).apply(&mut surface, &mut scratch);
    }
    assert_eq!(rows, full);
}

// -----------------------------------------------------------------------------
// Spatial filters
// -----------------------------------------------------------------------------

#[test]
fn edge_detect_marks_a_vertical_step() {
    let (w, h) = (6, 5);
    let mut pixels: Vec<Pixel> = (0..w * h)
        .map(|i| if i % w < 3 { Pixel::BLACK } else { Pixel::WHITE })
        .collect();
    let original = pixels.clone();
    let params = EdgeParams::new(50);
    apply(Filter::EdgeDetect(&params), &mut pixels, w, h);

    for y in 1..h - 1 {
        let row = &pixels[y * w..(y + 1) * w];
        assert_eq!(
            &row[1..w - 1],
            &[Pixel::BLACK, Pixel::WHITE, Pixel::WHITE, Pixel::BLACK],
            "row {}",
            y
        );
    }
    // Borders keep their colour.
    assert_eq!(pixels[..w], original[..w]);
    assert_eq!(pixels[(h - 1) * w..], original[(h - 1) * w..]);
    for y in 0..h {
        assert_eq!(pixels[y * w], original[y * w]);
        assert_eq!(pixels[y * w + w - 1], original[y * w + w - 1]);
    }
}

#[test]
fn spatial_filters_skip_single_rows_and_wide_images() {
    let edge = EdgeParams::new(10);
    let sharpen = SharpenParams::new(100);
    for f in [Filter::EdgeDetect(&edge), Filter::Blur, Filter::Sharpen(&sharpen)] {
        let original = checkerboard(32, 1, 1);
        let mut row = original.clone();
        apply(f, &mut row, 32, 1);
        assert_eq!(row, original, "{:?}", f);

        // Wider than the 64-pixel scratch rows
        let original = checkerboard(80, 4, 1);
        let mut wide = original.clone();
        apply(f, &mut wide, 80, 4);
        if !matches!(f, Filter::Blur) {
            assert_eq!(wide, original, "{:?}", f);
        }
    }
}

#[test]
fn blur_averages_odd_pixels_only() {
    let (w, h) = (5, 5);
    let mut pixels = checkerboard(w, h, 1);
    let original = pixels.clone();
    apply(Filter::Blur, &mut pixels, w, h);

    // Five white cells around (1, 1): 5 * 248 * 7 >> 6 = 135, 5 * 252 * 7 >> 6 = 137
    assert_eq!(pixels[w + 1].unpack(), Rgb::new(128, 136, 128));
    assert_eq!(pixels[w + 2], original[w + 2]);
    assert_eq!(pixels[2 * w + 1], original[2 * w + 1]);
}

#[test]
fn sharpen_reads_unmodified_neighbours() {
    let (w, h) = (5, 5);
    let mut pixels = vec![Pixel::gray(128); w * h];
    pixels[2 * w + 2] = Pixel::gray(200);
    let params = SharpenParams::new(64);
    apply(Filter::Sharpen(&params), &mut pixels, w, h);

    assert_eq!(pixels[2 * w + 2], Pixel::gray(255));
    // 128 + (64 * (512 - 584) >> 8) = 110 on every side of the dot
    let side = Pixel::gray(110);
    assert_eq!(pixels[w + 2], side);
    assert_eq!(pixels[3 * w + 2], side);
    assert_eq!(pixels[2 * w + 1], side);
    assert_eq!(pixels[2 * w + 3], side);
    assert_eq!(pixels[w + 1], Pixel::gray(128));
}

#[test]
fn sharpen_leaves_flat_areas_alone() {
    let mut pixels = vec![Pixel::gray(90); 36];
    let params = SharpenParams::new(100);
    apply(Filter::Sharpen(&params), &mut pixels, 6, 6);
    assert!(pixels.iter().all(|p| *p == Pixel::gray(90)));
}

// -----------------------------------------------------------------------------
// Dispatch
// -----------------------------------------------------------------------------

#[test]
fn filter_names_round_trip() {
    for id in FilterId::ALL {
        assert_eq!(FilterId::parse_from_str(id.as_str()), Some(id));
        let params = FilterParams::new();
        assert_eq!(id.filter(&params).id(), Some(id));
    }
    assert_eq!(FilterId::parse_from_str("grayscale"), None);
    assert_eq!(FilterId::BrightnessContrast.as_str(), "BrightnessContrast");
}

#[test]
fn custom_filters_run_through_the_enum() {
    fn red(surface: &mut Surface<'_>) {
        surface.pixels_mut().fill(Pixel(0xF800));
    }
    let filter = Filter::Custom(red);
    assert_eq!(filter.id(), None);

    let mut pixels = vec![Pixel::BLACK; 6];
    apply(filter, &mut pixels, 3, 2);
    assert!(pixels.iter().all(|p| *p == Pixel(0xF800)));
}

#[test]
fn parameter_changes_apply_on_the_next_call() {
    static PARAMS: BrightnessContrastParams = BrightnessContrastParams::new(0, 256);
    let mut chain = FilterChain::<'static, 16>::new();
    chain
        .add("bc", Filter::BrightnessContrast(&PARAMS))
        .expect("added");

    let mut pixels = vec![Pixel::gray(100); 4];
    chain.process(&mut pixels, 4, 1).expect("processed");
    assert_eq!(pixels[0], Pixel::gray(100));

    PARAMS.set_brightness(40);
    chain.process(&mut pixels, 4, 1).expect("processed");
    assert_eq!(pixels[0], Pixel::gray(140));
}

#[test]
fn grain_params_default_to_thirty() {
    assert_eq!(GrainParams::default().intensity(), 30);
    assert_eq!(FilterParams::default().vignette.strength(), 128);
    assert_eq!(FilterParams::default().vignette.floor(), 64);
}

#[test]
fn default_filters_borrow_shared_params() {
    for id in FilterId::ALL {
        assert_eq!(id.filter_default().id(), Some(id));
    }

    let Filter::Vignette(params) = FilterId::Vignette.filter_default() else {
        panic!("vignette expected");
    };
    assert!(core::ptr::eq(params, &filter::DEFAULT_PARAMS.vignette));
    assert_eq!(params.strength(), filter::DEFAULT_VIGNETTE_STRENGTH);

    let mut chain = FilterChain::<'static, 16>::new();
    chain
        .add("Invert", FilterId::Invert.filter_default())
        .expect("added");
    let mut pixels = vec![Pixel::BLACK; 4];
    chain.process(&mut pixels, 4, 1).expect("processed");
    assert!(pixels.iter().all(|p| *p == Pixel::WHITE));
}
