//! overlayd - live detection overlay daemon
//!
//! This daemon:
//! 1. Captures frames from the configured source on a dedicated thread
//! 2. Throttles inference with the cadence gate (excess frames are dropped)
//! 3. Runs the detector backend on admitted frames
//! 4. Maps detections into view-space overlay records
//! 5. Publishes records to the overlay store on the render context
//! 6. Logs redraws and periodic pipeline health

use anyhow::{anyhow, Context, Result};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use overlay_pipeline::{
    build_backend, build_source, spawn_pump, CadenceGate, ChannelContext, LabelFont,
    OverlayMapper, OverlayPipeline, OverlayStore, PipelineConfig, ViewBounds,
};

fn main() -> Result<()> {
    // Initialize logging (simple stderr)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = PipelineConfig::load()?;
    log::info!(
        "source={} ({}x{} @ {}fps) view={}x{} cadence={}ms backend={}",
        cfg.source.url,
        cfg.source.width,
        cfg.source.height,
        cfg.source.target_fps,
        cfg.view.width,
        cfg.view.height,
        cfg.cadence.min_interval_ms,
        cfg.detector.backend
    );

    let mut source = build_source(&cfg.source)?;
    source.connect()?;

    // A detector that cannot initialize is fatal; the pipeline cannot run
    // without one.
    let mut backend = build_backend(&cfg.detector)?;
    backend.warm_up().context("detector failed to initialize")?;
    log::info!("detector backend '{}' ready", backend.name());

    let font = match &cfg.overlay.font_path {
        Some(path) => LabelFont::from_file(path, cfg.overlay.font_size)?,
        None => LabelFont::fixed(cfg.overlay.font_size),
    };

    let view = ViewBounds::new(cfg.view.width, cfg.view.height);
    let store = Arc::new(OverlayStore::new());
    let (ctx, publish_rx) = ChannelContext::new();
    let pipeline = OverlayPipeline::new(
        CadenceGate::new(cfg.cadence.min_interval_ms),
        backend,
        OverlayMapper::new(cfg.overlay.edge_offset, font),
        view,
        Arc::clone(&store),
        ctx,
    );
    let stats = pipeline.stats();

    let (pump, frames) = spawn_pump(source, cfg.source.target_fps);
    let pump_stats = pump.stats();

    let stop = pump.stop_flag();
    ctrlc::set_handler(move || {
        log::info!("shutdown requested");
        stop.store(true, Ordering::SeqCst);
    })
    .context("failed to install signal handler")?;

    let pipeline_thread = std::thread::spawn(move || pipeline.run(frames));

    log::info!("overlayd running");

    // Render loop on the main thread: run publish tasks as they arrive and
    // redraw whenever the store generation moves. Exits when the pipeline
    // drops its context.
    let mut seen_generation = 0u64;
    let mut last_health = Instant::now();
    loop {
        match publish_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(task) => task(),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(generation) = store.wait_for_redraw(seen_generation, Duration::ZERO) {
            seen_generation = generation;
            let (_, records) = store.snapshot();
            log::info!("redraw #{}: {} overlays", generation, records.len());
            for record in &records {
                log::debug!("  {} at {:?}", record.label, record.rect);
            }
        }

        if last_health.elapsed() >= Duration::from_secs(5) {
            log::info!(
                "health: captured={} dropped={} seen={} admitted={} published={} failures={}",
                pump_stats.produced(),
                pump_stats.dropped(),
                stats.frames_seen(),
                stats.frames_admitted(),
                stats.passes_published(),
                stats.detector_failures()
            );
            last_health = Instant::now();
        }
    }

    pipeline_thread
        .join()
        .map_err(|_| anyhow!("pipeline thread panicked"))?;
    pump.stop();

    log::info!(
        "overlayd stopped: {} frames captured, {} passes published",
        pump_stats.produced(),
        stats.passes_published()
    );
    Ok(())
}
