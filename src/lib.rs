//! Real-time detection overlay pipeline.
//!
//! Consumes a serialized stream of camera frames, periodically runs an
//! object-detection model, and converts frame-space results into view-space
//! overlay records ready for rendering.
//!
//! # Architecture
//!
//! FrameSource → CadenceGate (admit/drop) → Detector → OverlayMapper →
//! OverlayStore → Renderer.
//!
//! - `capture`: frame sources and the capture pump (bounded channel,
//!   drop-based backpressure)
//! - `cadence`: inference throttling (at most one call per minimum interval)
//! - `detect`: detector backends (stub, optional tract ONNX)
//! - `overlay`: frame-space → view-space mapping, records, shared store
//! - `pipeline`: per-frame orchestration and the render-context handoff
//! - `render`: overlay rasterization for the binaries
//!
//! One pipeline serves one camera source and one detection stream. Passes
//! are stateless with respect to prior results except for cadence gating;
//! there is no cross-frame tracking.

pub mod cadence;
pub mod capture;
pub mod config;
pub mod detect;
pub mod frame;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod render;

pub use cadence::CadenceGate;
pub use capture::{build_source, spawn_pump, FrameSource, SyntheticSource};
pub use config::PipelineConfig;
pub use detect::{build_backend, Detection, DetectionResult, DetectorBackend, StubBackend};
pub use frame::RawFrame;
pub use geometry::{Color, PixelDims, Rect, ViewBounds};
pub use overlay::{LabelFont, LabelSize, OverlayMapper, OverlayRecord, OverlayStore};
pub use pipeline::{
    ChannelContext, FrameOutcome, InlineContext, OverlayPipeline, PipelineStats, RenderContext,
};
