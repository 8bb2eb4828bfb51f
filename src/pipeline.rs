//! Per-frame orchestration: admit, detect, map, publish.
//!
//! Each arriving frame runs one pass: the cadence gate decides whether
//! inference is permitted now; an admitted frame goes through the detector,
//! the mapper, and a publish to the overlay store. A rejected frame is
//! dropped from detection entirely. Publishing is handed off to a
//! `RenderContext` so the store mutation and redraw land on the context that
//! owns the render surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use crate::cadence::CadenceGate;
use crate::detect::DetectorBackend;
use crate::frame::RawFrame;
use crate::geometry::ViewBounds;
use crate::overlay::{OverlayMapper, OverlayStore};

/// A publish handed off to the render context.
pub type PublishTask = Box<dyn FnOnce() + Send>;

/// Executes publish tasks on the context that owns the render surface.
///
/// The target context is an explicit parameter of publishing, not an ambient
/// assumption; tests and offline tools run tasks inline, the daemon posts
/// them to its render thread.
pub trait RenderContext: Send {
    /// Hand a task to the context. Returns false when the context is gone
    /// (teardown); the task is dropped and never runs.
    fn post(&self, task: PublishTask) -> bool;
}

/// Posts tasks to a channel drained by the render thread.
pub struct ChannelContext {
    tx: Sender<PublishTask>,
}

impl ChannelContext {
    pub fn new() -> (Self, Receiver<PublishTask>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }
}

impl RenderContext for ChannelContext {
    fn post(&self, task: PublishTask) -> bool {
        self.tx.send(task).is_ok()
    }
}

/// Runs tasks immediately on the calling thread.
pub struct InlineContext;

impl RenderContext for InlineContext {
    fn post(&self, task: PublishTask) -> bool {
        task();
        true
    }
}

/// Counters shared with the daemon's health log.
#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_seen: AtomicU64,
    frames_admitted: AtomicU64,
    passes_published: AtomicU64,
    detector_failures: AtomicU64,
}

impl PipelineStats {
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen.load(Ordering::Relaxed)
    }

    pub fn frames_admitted(&self) -> u64 {
        self.frames_admitted.load(Ordering::Relaxed)
    }

    pub fn passes_published(&self) -> u64 {
        self.passes_published.load(Ordering::Relaxed)
    }

    pub fn detector_failures(&self) -> u64 {
        self.detector_failures.load(Ordering::Relaxed)
    }
}

/// What one pass did with a frame.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The cadence gate rejected the frame; nothing ran, nothing published.
    Skipped,
    /// A pass completed and published this many records (0 = cleared).
    Published(usize),
    /// The render context is gone; the publish was discarded (teardown).
    ContextClosed,
}

pub struct OverlayPipeline {
    gate: CadenceGate,
    backend: Box<dyn DetectorBackend>,
    mapper: OverlayMapper,
    view: ViewBounds,
    store: Arc<OverlayStore>,
    ctx: Box<dyn RenderContext>,
    stats: Arc<PipelineStats>,
}

impl OverlayPipeline {
    pub fn new(
        gate: CadenceGate,
        backend: Box<dyn DetectorBackend>,
        mapper: OverlayMapper,
        view: ViewBounds,
        store: Arc<OverlayStore>,
        ctx: impl RenderContext + 'static,
    ) -> Self {
        Self {
            gate,
            backend,
            mapper,
            view,
            store,
            ctx: Box::new(ctx),
            stats: Arc::new(PipelineStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Run one pass over a frame at `now_ms`.
    ///
    /// Every admitted frame ends in exactly one publish: mapped records when
    /// the detector produced a result, an empty sequence otherwise, so stale
    /// overlays never outlive the pass that failed to refresh them.
    /// Per-frame detector errors are absorbed here and never retried; the
    /// next frame is a fresh attempt.
    pub fn process_frame(&mut self, frame: &RawFrame, now_ms: u64) -> FrameOutcome {
        self.stats.frames_seen.fetch_add(1, Ordering::Relaxed);

        if !self.gate.admit(now_ms) {
            return FrameOutcome::Skipped;
        }
        self.stats.frames_admitted.fetch_add(1, Ordering::Relaxed);

        let result = match self
            .backend
            .detect(frame.pixels(), frame.width, frame.height)
        {
            Ok(result) => result,
            Err(e) => {
                log::warn!("detector failed on frame {}: {:#}", frame.seq, e);
                self.stats.detector_failures.fetch_add(1, Ordering::Relaxed);
                None
            }
        };

        let records = match result {
            Some(result) => {
                log::debug!(
                    "frame {}: {} detections in {}ms",
                    frame.seq,
                    result.detections.len(),
                    result.inference_ms
                );
                self.mapper.map(&result.detections, frame.dims(), self.view)
            }
            None => Vec::new(),
        };

        self.publish(records)
    }

    fn publish(&mut self, records: Vec<crate::overlay::OverlayRecord>) -> FrameOutcome {
        let count = records.len();
        let store = Arc::clone(&self.store);
        if self.ctx.post(Box::new(move || store.replace(records))) {
            self.stats.passes_published.fetch_add(1, Ordering::Relaxed);
            FrameOutcome::Published(count)
        } else {
            log::debug!("render context closed; publish discarded");
            FrameOutcome::ContextClosed
        }
    }

    /// Consume the capture channel until it closes.
    ///
    /// This single thread is the only caller of the detector, so at most one
    /// inference is in flight even when capture outpaces detector latency.
    pub fn run(mut self, frames: Receiver<RawFrame>) {
        let epoch = Instant::now();
        for frame in frames {
            let now_ms = epoch.elapsed().as_millis() as u64;
            if self.process_frame(&frame, now_ms) == FrameOutcome::ContextClosed {
                break;
            }
        }
        log::info!(
            "pipeline stopped: {} frames seen, {} admitted, {} published",
            self.stats.frames_seen(),
            self.stats.frames_admitted(),
            self.stats.passes_published()
        );
    }
}
