//! Frame capture sources.
//!
//! This module provides sources for raw frames:
//! - Synthetic scene (`stub://` URLs, testing and demos)
//! - Local image sequences (directories of PNG/JPEG stills)
//!
//! All sources produce `RawFrame` instances. Delivery into the pipeline goes
//! through the capture pump (`spawn_pump`), which pushes frames into a
//! bounded channel; when the consumer is busy the frame is dropped rather
//! than queued. A real camera stack would slot in behind `FrameSource` the
//! same way.

mod image_dir;
pub mod pump;
mod synthetic;

use anyhow::{anyhow, Result};

pub use image_dir::ImageDirSource;
pub use pump::{spawn_pump, PumpHandle, PumpStats};
pub use synthetic::SyntheticSource;

use crate::config::SourceSettings;
use crate::frame::RawFrame;

/// A serialized source of raw frames. One instance feeds one pipeline.
pub trait FrameSource: Send {
    /// Open the source. Called once before the first `next_frame`.
    fn connect(&mut self) -> Result<()>;

    /// Capture the next frame.
    fn next_frame(&mut self) -> Result<RawFrame>;

    /// Check if the source is healthy.
    fn is_healthy(&self) -> bool {
        true
    }

    /// Get frame statistics.
    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_captured: u64,
    pub origin: String,
}

/// Build the configured frame source.
///
/// `stub://` URLs get the synthetic scene; anything else is treated as a
/// local directory of image stills. Remote URL schemes are rejected.
pub fn build_source(cfg: &SourceSettings) -> Result<Box<dyn FrameSource>> {
    if cfg.url.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(
            cfg.url.clone(),
            cfg.width,
            cfg.height,
        )));
    }
    if cfg.url.contains("://") {
        return Err(anyhow!(
            "capture only supports stub:// or local image directories (got '{}')",
            cfg.url
        ));
    }
    Ok(Box::new(ImageDirSource::new(cfg.url.clone())))
}
