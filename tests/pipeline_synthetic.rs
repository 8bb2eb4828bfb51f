//! End-to-end runs over the synthetic source and stub detector.

use std::sync::Arc;
use std::time::{Duration, Instant};

use overlay_pipeline::{
    spawn_pump, CadenceGate, ChannelContext, FrameOutcome, FrameSource, InlineContext, LabelFont,
    OverlayMapper, OverlayPipeline, OverlayStore, RawFrame, StubBackend, SyntheticSource,
    ViewBounds,
};

fn pipeline(
    store: Arc<OverlayStore>,
    ctx: impl overlay_pipeline::RenderContext + 'static,
    min_interval_ms: u64,
) -> OverlayPipeline {
    OverlayPipeline::new(
        CadenceGate::new(min_interval_ms),
        Box::new(StubBackend::new()),
        OverlayMapper::new(2.0, LabelFont::fixed(14.0)),
        ViewBounds::new(640.0, 480.0),
        store,
        ctx,
    )
}

#[test]
fn synthetic_frames_flow_end_to_end() {
    let mut source = SyntheticSource::new("stub://e2e".to_string(), 320, 240);
    source.connect().unwrap();

    let store = Arc::new(OverlayStore::new());
    let mut pipeline = pipeline(Arc::clone(&store), InlineContext, 200);

    // Frames 100ms apart: t=0, 200, 400 admitted, the rest dropped.
    let mut published = 0;
    let mut skipped = 0;
    for i in 0..6u64 {
        let frame = source.next_frame().unwrap();
        match pipeline.process_frame(&frame, i * 100) {
            FrameOutcome::Published(_) => published += 1,
            FrameOutcome::Skipped => skipped += 1,
            FrameOutcome::ContextClosed => panic!("context is inline"),
        }
    }

    assert_eq!(published, 3);
    assert_eq!(skipped, 3);

    let (generation, records) = store.snapshot();
    assert_eq!(generation, 3);
    assert_eq!(records.len(), 1);

    // Mapped into view space with a formatted label.
    let record = &records[0];
    assert!(record.label.contains('%'));
    assert!(record.label_size.width > 0.0);
    assert!(record.rect.max_x() <= 640.0);
}

#[test]
fn unchanged_scene_clears_stale_overlays() {
    let store = Arc::new(OverlayStore::new());
    let mut pipeline = pipeline(Arc::clone(&store), InlineContext, 200);

    let pixels = vec![7u8; 64 * 64 * 3];
    let first = RawFrame::new(pixels.clone(), 64, 64, 1);
    let second = RawFrame::new(pixels, 64, 64, 2);

    assert_eq!(
        pipeline.process_frame(&first, 0),
        FrameOutcome::Published(1)
    );
    assert_eq!(store.snapshot().1.len(), 1);

    // Identical pixels: the stub detector reports no result, and the pass
    // still publishes, clearing the previous overlay.
    assert_eq!(
        pipeline.process_frame(&second, 250),
        FrameOutcome::Published(0)
    );
    let (generation, records) = store.snapshot();
    assert_eq!(generation, 2);
    assert!(records.is_empty());
}

#[test]
fn daemon_wiring_publishes_across_threads() {
    let mut source = SyntheticSource::new("stub://e2e".to_string(), 64, 64);
    source.connect().unwrap();

    let (pump, frames) = spawn_pump(Box::new(source), 100);
    let store = Arc::new(OverlayStore::new());
    let (ctx, publish_rx) = ChannelContext::new();
    let worker = std::thread::spawn({
        let pipeline = pipeline(Arc::clone(&store), ctx, 10);
        move || pipeline.run(frames)
    });

    // Render side: run publish tasks until the first redraw lands.
    let deadline = Instant::now() + Duration::from_secs(10);
    while store.generation() == 0 && Instant::now() < deadline {
        if let Ok(task) = publish_rx.recv_timeout(Duration::from_millis(50)) {
            task();
        }
    }

    assert!(store.generation() >= 1, "render side saw a redraw");
    let (_, records) = store.snapshot();
    assert_eq!(records.len(), 1);

    pump.stop();
    worker.join().unwrap();
}
