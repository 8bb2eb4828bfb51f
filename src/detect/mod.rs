//! Object detection backends.

pub mod backend;
pub mod backends;
pub mod result;

use anyhow::{anyhow, Result};

pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{class_color, Detection, DetectionResult};

use crate::config::DetectorSettings;

/// Build the configured detector backend.
pub fn build_backend(cfg: &DetectorSettings) -> Result<Box<dyn DetectorBackend>> {
    match cfg.backend.as_str() {
        "stub" => Ok(Box::new(StubBackend::new())),
        "tract" => {
            #[cfg(feature = "backend-tract")]
            {
                let model_path = cfg
                    .model_path
                    .as_ref()
                    .ok_or_else(|| anyhow!("tract backend requires detector.model_path"))?;
                let mut backend =
                    backends::TractBackend::new(model_path, cfg.input_width, cfg.input_height)?
                        .with_threshold(cfg.confidence_threshold);
                if let Some(labels) = &cfg.labels_path {
                    backend = backend.with_labels_file(labels)?;
                }
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "backend-tract"))]
            {
                Err(anyhow!(
                    "tract backend requires the backend-tract feature"
                ))
            }
        }
        other => Err(anyhow!("unknown detector backend '{}'", other)),
    }
}
