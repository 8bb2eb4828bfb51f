use anyhow::Result;

use crate::detect::result::DetectionResult;

/// Detector backend trait.
///
/// A backend owns one loaded model and runs it on single frames. Calls are
/// serialized by the pipeline thread; implementations never see concurrent
/// `detect` invocations.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    ///
    /// `Ok(None)` is the valid "no usable result" outcome (the model ran but
    /// produced nothing this pass). `Err` is a per-frame failure; the caller
    /// absorbs it and clears stale overlays. Implementations must treat the
    /// pixel slice as read-only and ephemeral.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32)
        -> Result<Option<DetectionResult>>;

    /// Startup hook. An error here means the detector cannot run at all and
    /// is fatal to pipeline startup.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
