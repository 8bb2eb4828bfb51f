#![cfg(feature = "backend-tract")]

use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{class_color, Detection, DetectionResult};
use crate::geometry::Rect;

/// Tract-based backend for ONNX object detection.
///
/// Loads a local SSD-style model and runs it on RGB frames. Expected model
/// contract: input `[1, 3, H, W]` f32 scaled to [0, 1]; outputs are
/// `boxes [1, N, 4]` normalized `(ymin, xmin, ymax, xmax)`,
/// `classes [1, N]` and `scores [1, N]`. No network I/O; the model file is
/// the only disk access.
pub struct TractBackend {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    width: u32,
    height: u32,
    confidence_threshold: f32,
    labels: Vec<String>,
}

impl TractBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
            confidence_threshold: 0.5,
            labels: Vec::new(),
        })
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Load class labels from a file with one label per line, in class-index
    /// order.
    pub fn with_labels_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read labels file {}", path.display()))?;
        self.labels = raw.lines().map(|line| line.trim().to_string()).collect();
        Ok(self)
    }

    fn class_name(&self, class_index: usize) -> String {
        self.labels
            .get(class_index)
            .cloned()
            .unwrap_or_else(|| format!("class {}", class_index))
    }

    fn build_input(&self, pixels: &[u8], width: u32, height: u32) -> Result<Tensor> {
        if width != self.width || height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                width,
                height,
                self.width,
                self.height
            ));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;

        if pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                pixels.len()
            ));
        }

        let width = width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    fn decode_outputs(
        &self,
        outputs: TVec<TValue>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Vec<Detection>> {
        let boxes = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?
            .to_array_view::<f32>()
            .context("boxes tensor was not f32")?;
        let classes = outputs
            .get(1)
            .ok_or_else(|| anyhow!("model produced no classes output"))?
            .to_array_view::<f32>()
            .context("classes tensor was not f32")?;
        let scores = outputs
            .get(2)
            .ok_or_else(|| anyhow!("model produced no scores output"))?
            .to_array_view::<f32>()
            .context("scores tensor was not f32")?;

        if boxes.ndim() != 3 || classes.ndim() != 2 || scores.ndim() != 2 {
            return Err(anyhow!(
                "unexpected model output layout: boxes ndim {}, classes ndim {}, scores ndim {}",
                boxes.ndim(),
                classes.ndim(),
                scores.ndim()
            ));
        }

        let count = scores.len().min(classes.len()).min(boxes.len() / 4);
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        let mut detections = Vec::new();
        for i in 0..count {
            let score = scores[[0, i]];
            if score < self.confidence_threshold {
                continue;
            }

            let ymin = boxes[[0, i, 0]];
            let xmin = boxes[[0, i, 1]];
            let ymax = boxes[[0, i, 2]];
            let xmax = boxes[[0, i, 3]];
            let class_index = classes[[0, i]].max(0.0) as usize;

            detections.push(Detection {
                rect: Rect::new(
                    xmin * fw,
                    ymin * fh,
                    (xmax - xmin) * fw,
                    (ymax - ymin) * fh,
                ),
                class_name: self.class_name(class_index),
                confidence: score.clamp(0.0, 1.0),
                display_color: class_color(class_index),
            });
        }

        Ok(detections)
    }
}

impl DetectorBackend for TractBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<DetectionResult>> {
        let started = Instant::now();
        let input = self.build_input(pixels, width, height)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let detections = self.decode_outputs(outputs, width, height)?;

        Ok(Some(DetectionResult::with_timing(detections, started)))
    }

    fn warm_up(&mut self) -> Result<()> {
        // One pass over a blank frame primes internal buffers and surfaces
        // shape mismatches at startup instead of on the first live frame.
        let blank = vec![0u8; (self.width * self.height * 3) as usize];
        self.detect(&blank, self.width, self.height)
            .context("detector warm-up inference failed")?;
        Ok(())
    }
}
