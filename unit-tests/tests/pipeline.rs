//! Scanline renderer and camera pipeline

use camx_pipeline::downscale::downscale_frame;
use camx_pipeline::filter::Filter;
use camx_pipeline::{
    ChunkError, DisplayGeometry, FilterChain, FilterId, FilterParams, FilterSelect, Frame,
    FrameError,
    FrameOutcome, InitError, Pipeline, PipelineConfig, PipelineState, PipelineStats, Pixel,
    PixelFormat, RenderError, ScanlineRenderer, TransferPolicy,
};
use embassy_futures::block_on;
use harness::{MockBus, MockSource, NoDelay, gradient};

const W: usize = 16;

type Renderer<'a> = ScanlineRenderer<'a, MockBus, W>;

static PARAMS: FilterParams = FilterParams::new();

fn geometry(width: u16, height: u16) -> DisplayGeometry {
    DisplayGeometry {
        width,
        height,
        ..DisplayGeometry::ST7735_160X128
    }
}

fn config(width: u16, height: u16, policy: TransferPolicy) -> PipelineConfig {
    PipelineConfig::new(geometry(width, height)).with_policy(policy)
}

/// Initialized renderer with the bring-up traffic cleared
fn ready(stats: &PipelineStats, policy: TransferPolicy, width: u16, height: u16) -> Renderer<'_> {
    let mut renderer = Renderer::new(MockBus::with_latency(2), config(width, height, policy), stats);
    block_on(renderer.init(&mut NoDelay::default())).unwrap();
    renderer.display_mut().bus_mut().clear();
    renderer
}

fn expected_rows(src: &[Pixel], sw: usize, sh: usize, dw: usize, dh: usize) -> Vec<Vec<Pixel>> {
    let mut out = vec![Pixel::BLACK; dw * dh];
    downscale_frame(src, sw, sh, &mut out, dw, dh).unwrap();
    out.chunks(dw).map(<[Pixel]>::to_vec).collect()
}

fn sent_rows(renderer: &mut Renderer<'_>) -> Vec<Vec<Pixel>> {
    renderer.display_mut().bus().pixel_writes()
}

// -----------------------------------------------------------------------------
// Lifecycle
// -----------------------------------------------------------------------------

#[test]
fn init_rejects_panel_wider_than_chunk() {
    let stats = PipelineStats::new();
    let mut renderer = Renderer::new(
        MockBus::new(),
        config(32, 4, TransferPolicy::Overlapped),
        &stats,
    );
    let result = block_on(renderer.init(&mut NoDelay::default()));
    assert!(matches!(
        result,
        Err(InitError::Chunk(ChunkError::TooWide {
            requested: 32,
            capacity: W
        }))
    ));
    assert!(!renderer.is_initialized());
    assert!(renderer.display_mut().bus().events.is_empty());
}

#[test]
fn failed_panel_bring_up_releases_chunk() {
    let stats = PipelineStats::new();
    let mut bus = MockBus::new();
    bus.fail_commands = true;
    let mut renderer = Renderer::new(bus, config(8, 4, TransferPolicy::Overlapped), &stats);

    let result = block_on(renderer.init(&mut NoDelay::default()));
    assert!(matches!(result, Err(InitError::Display(_))));
    assert!(!renderer.is_initialized());
    assert_eq!(renderer.state(), PipelineState::Uninitialized);
}

#[test]
fn frames_are_refused_before_init_and_after_deinit() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let source = MockSource::from_pixels(&src, 8, 4);
    let renderer = Renderer::new(MockBus::new(), config(8, 4, TransferPolicy::Overlapped), &stats);
    let mut pipeline = Pipeline::new(source, renderer);

    let result = block_on(pipeline.process_camera_frame(FilterSelect::None));
    assert!(matches!(result, Err(RenderError::NotInitialized)));
    assert_eq!(pipeline.source().acquired, 0);

    block_on(pipeline.init(&mut NoDelay::default())).unwrap();
    assert_eq!(pipeline.renderer().state(), PipelineState::Idle);
    pipeline.deinit();
    assert_eq!(pipeline.renderer().state(), PipelineState::Uninitialized);
    let result = block_on(pipeline.process_camera_frame(FilterSelect::None));
    assert!(matches!(result, Err(RenderError::NotInitialized)));

    let (source, _) = pipeline.release();
    assert_eq!(source.released, 0);
}

#[test]
fn init_resets_counters() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut source = MockSource::from_pixels(&src, 8, 4);
    source.busy = 1;
    let mut pipeline = Pipeline::new(source, ready(&stats, TransferPolicy::Overlapped, 8, 4));
    block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
    assert_eq!(stats.dropped(), 1);

    let (_, mut renderer) = pipeline.release();
    block_on(renderer.init(&mut NoDelay::default())).unwrap();
    assert_eq!(renderer.stats(), Default::default());
}

// -----------------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------------

#[test]
fn rendered_rows_match_downscaled_frame() {
    for policy in [TransferPolicy::Overlapped, TransferPolicy::Synchronous] {
        let stats = PipelineStats::new();
        let src = gradient(16, 8);
        let mut pipeline = Pipeline::new(
            MockSource::from_pixels(&src, 16, 8),
            ready(&stats, policy, 8, 4),
        );

        let outcome = block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
        assert_eq!(outcome, FrameOutcome::Rendered);
        assert_eq!(
            sent_rows(pipeline.renderer_mut()),
            expected_rows(&src, 16, 8, 8, 4),
            "{policy:?}"
        );

        let snapshot = pipeline.stats();
        assert_eq!(snapshot.frames, 1);
        assert_eq!(snapshot.transfers, 4);
        assert_eq!(snapshot.aborted, 0);
        assert_eq!(pipeline.renderer().state(), PipelineState::Idle);
    }
}

#[test]
fn direct_render_returns_to_idle() {
    let stats = PipelineStats::new();
    let src = gradient(16, 8);
    let frame = Frame::from_pixels(&src, 16, 8).unwrap();
    let mut renderer = ready(&stats, TransferPolicy::Overlapped, 8, 4);

    block_on(renderer.process_frame(&frame, FilterSelect::None)).unwrap();
    assert_eq!(renderer.state(), PipelineState::Idle);
    assert_eq!(renderer.stats().frames, 1);
    assert_eq!(sent_rows(&mut renderer).len(), 4);

    renderer.deinit();
    let result = block_on(renderer.process_frame(&frame, FilterSelect::None));
    assert!(matches!(result, Err(RenderError::NotInitialized)));
    assert_eq!(renderer.state(), PipelineState::Uninitialized);
}

#[test]
fn short_frames_repeat_rows() {
    let stats = PipelineStats::new();
    let src = gradient(8, 2);
    let mut pipeline = Pipeline::new(
        MockSource::from_pixels(&src, 8, 2),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();

    let rows = sent_rows(pipeline.renderer_mut());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], rows[1]);
    assert_eq!(rows[2], rows[3]);
    assert_eq!(rows[2], &src[8..]);
}

#[test]
fn window_covers_output_area_once_per_frame() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut pipeline = Pipeline::new(
        MockSource::from_pixels(&src, 8, 4),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();

    let bus = pipeline.renderer_mut().display_mut().bus();
    assert_eq!(bus.commands(), [0x2A, 0x2B, 0x2C]);
    assert_eq!(bus.params_of(0x2A), Some(vec![0, 0, 0, 7]));
    assert_eq!(bus.params_of(0x2B), Some(vec![0, 0, 0, 3]));
}

#[test]
fn both_policies_filter_identically() {
    let run = |policy| {
        let stats = PipelineStats::new();
        let src = gradient(16, 16);
        let mut renderer = ready(&stats, policy, 16, 8);
        renderer
            .chain_mut()
            .add("Grayscale", FilterId::Grayscale.filter(&PARAMS))
            .unwrap();
        renderer
            .chain_mut()
            .add("Vignette", FilterId::Vignette.filter(&PARAMS))
            .unwrap();
        let mut pipeline = Pipeline::new(MockSource::from_pixels(&src, 16, 16), renderer);
        block_on(pipeline.process_camera_frame(FilterSelect::Chain)).unwrap();
        sent_rows(pipeline.renderer_mut())
    };

    let overlapped = run(TransferPolicy::Overlapped);
    assert_eq!(overlapped, run(TransferPolicy::Synchronous));

    // Banded vignette matches the whole-frame result
    let src = gradient(16, 16);
    let mut whole = vec![Pixel::BLACK; 16 * 8];
    downscale_frame(&src, 16, 16, &mut whole, 16, 8).unwrap();
    let mut chain: FilterChain<'_, W> = FilterChain::new();
    chain.add("Grayscale", FilterId::Grayscale.filter(&PARAMS)).unwrap();
    chain.add("Vignette", FilterId::Vignette.filter(&PARAMS)).unwrap();
    chain.process(&mut whole, 16, 8).unwrap();
    assert_eq!(overlapped.concat(), whole);
}

#[test]
fn single_filter_overrides_chain() {
    let stats = PipelineStats::new();
    let src = vec![Pixel::BLACK; 8 * 4];
    let mut renderer = ready(&stats, TransferPolicy::Overlapped, 8, 4);
    renderer.chain_mut().add("Grayscale", Filter::Grayscale).unwrap();
    let mut pipeline = Pipeline::new(MockSource::from_pixels(&src, 8, 4), renderer);

    block_on(pipeline.process_camera_frame(FilterSelect::Single(Filter::Invert))).unwrap();
    let rows = sent_rows(pipeline.renderer_mut());
    assert!(rows.concat().iter().all(|p| *p == Pixel::WHITE));
}

#[test]
fn disabled_chain_leaves_rows_untouched() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut renderer = ready(&stats, TransferPolicy::Synchronous, 8, 4);
    renderer
        .chain_mut()
        .add_with_state("Invert", Filter::Invert, false)
        .unwrap();
    let mut pipeline = Pipeline::new(MockSource::from_pixels(&src, 8, 4), renderer);

    block_on(pipeline.process_camera_frame(FilterSelect::Chain)).unwrap();
    assert_eq!(
        sent_rows(pipeline.renderer_mut()),
        expected_rows(&src, 8, 4, 8, 4)
    );
}

#[test]
fn little_endian_frames_decode() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let data = src.iter().flat_map(|p| p.0.to_le_bytes()).collect();
    let mut pipeline = Pipeline::new(
        MockSource::new(data, 8, 4, PixelFormat::Rgb565Le),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
    assert_eq!(sent_rows(pipeline.renderer_mut()), expected_rows(&src, 8, 4, 8, 4));
}

// -----------------------------------------------------------------------------
// Frame ownership
// -----------------------------------------------------------------------------

#[test]
fn busy_camera_is_not_an_error() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut source = MockSource::from_pixels(&src, 8, 4);
    source.busy = 2;
    let mut pipeline = Pipeline::new(source, ready(&stats, TransferPolicy::Overlapped, 8, 4));

    for _ in 0..2 {
        let outcome = block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
        assert_eq!(outcome, FrameOutcome::NoFrame);
    }
    let outcome = block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
    assert_eq!(outcome, FrameOutcome::Rendered);

    let snapshot = pipeline.stats();
    assert_eq!(snapshot.dropped, 2);
    assert_eq!(snapshot.frames, 1);
    assert_eq!(pipeline.source().acquired, 1);
}

#[test]
fn every_acquired_frame_is_released_once() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut pipeline = Pipeline::new(
        MockSource::from_pixels(&src, 8, 4),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    for _ in 0..5 {
        block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
    }
    let source = pipeline.source();
    assert_eq!(source.acquired, 5);
    assert_eq!(source.released, 5);
    assert!(!source.overlapped);
    assert!(!source.is_live());
}

#[test]
fn compressed_frame_is_released_and_counted() {
    let stats = PipelineStats::new();
    let mut pipeline = Pipeline::new(
        MockSource::new(vec![0xFF; 64], 8, 4, PixelFormat::Jpeg),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );

    let result = block_on(pipeline.process_camera_frame(FilterSelect::None));
    assert!(matches!(
        result,
        Err(RenderError::Frame(FrameError::Compressed))
    ));
    assert_eq!(pipeline.source().released, 1);
    assert_eq!(pipeline.stats().aborted, 1);
    assert_eq!(pipeline.stats().transfer_errors, 0);
    assert_eq!(pipeline.renderer().state(), PipelineState::Idle);
    assert!(pipeline.renderer_mut().display_mut().bus().events.is_empty());
}

#[test]
fn invalid_frame_is_released() {
    let stats = PipelineStats::new();
    let mut pipeline = Pipeline::new(
        MockSource::new(vec![0; 10], 8, 4, PixelFormat::Rgb565Be),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    let result = block_on(pipeline.process_camera_frame(FilterSelect::None));
    assert!(matches!(
        result,
        Err(RenderError::Frame(FrameError::TooShort { needed: 64, len: 10 }))
    ));
    assert_eq!(pipeline.source().released, 1);
    assert_eq!(pipeline.stats().aborted, 1);
}

// -----------------------------------------------------------------------------
// Transfer failures
// -----------------------------------------------------------------------------

#[test]
fn failed_row_aborts_frame_only() {
    for policy in [TransferPolicy::Overlapped, TransferPolicy::Synchronous] {
        let stats = PipelineStats::new();
        let src = gradient(8, 4);
        let mut pipeline = Pipeline::new(
            MockSource::from_pixels(&src, 8, 4),
            ready(&stats, policy, 8, 4),
        );
        // CASET and RASET parameters, rows 0 and 1, then row 2 fails
        pipeline
            .renderer_mut()
            .display_mut()
            .bus_mut()
            .fail_next_data_write(4);

        let result = block_on(pipeline.process_camera_frame(FilterSelect::None));
        assert!(matches!(result, Err(RenderError::Transfer(_))), "{policy:?}");
        let snapshot = pipeline.stats();
        assert_eq!(snapshot.transfers, 2, "{policy:?}");
        assert_eq!(snapshot.transfer_errors, 1);
        assert_eq!(snapshot.aborted, 1);
        assert_eq!(snapshot.frames, 0);
        assert_eq!(pipeline.source().released, 1);

        let outcome = block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
        assert_eq!(outcome, FrameOutcome::Rendered);
        assert_eq!(pipeline.renderer().consecutive_errors(), 0);
    }
}

#[test]
fn repeated_failures_mark_renderer_degraded() {
    let stats = PipelineStats::new();
    let src = gradient(8, 4);
    let mut pipeline = Pipeline::new(
        MockSource::from_pixels(&src, 8, 4),
        ready(&stats, TransferPolicy::Overlapped, 8, 4),
    );
    pipeline.renderer_mut().display_mut().bus_mut().fail_commands = true;

    for n in 1..=5 {
        assert!(!pipeline.renderer().is_degraded());
        assert!(block_on(pipeline.process_camera_frame(FilterSelect::None)).is_err());
        assert_eq!(pipeline.renderer().consecutive_errors(), n);
    }
    assert!(pipeline.renderer().is_degraded());
    assert_eq!(pipeline.stats().transfer_errors, 5);
    assert_eq!(pipeline.source().released, 5);

    pipeline.renderer_mut().display_mut().bus_mut().fail_commands = false;
    block_on(pipeline.process_camera_frame(FilterSelect::None)).unwrap();
    assert!(!pipeline.renderer().is_degraded());
    assert_eq!(pipeline.stats().frames, 1);
}
