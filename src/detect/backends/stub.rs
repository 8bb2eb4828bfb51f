use std::time::Instant;

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{class_color, Detection, DetectionResult};
use crate::geometry::Rect;

const STUB_CLASSES: [&str; 4] = ["person", "bottle", "cup", "chair"];

/// Number of calls for one full left-to-right sweep of the synthetic box.
const SWEEP_PERIOD: u64 = 48;

/// Stub backend for testing and demos. Emits one synthetic detection that
/// sweeps across the frame, deliberately overshooting both horizontal edges,
/// with a class label and confidence that change over time. A frame whose
/// pixels are identical to the previous call yields no result.
pub struct StubBackend {
    call_count: u64,
    last_hash: Option<[u8; 32]>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            call_count: 0,
            last_hash: None,
        }
    }

    fn synthetic_detection(&self, width: u32, height: u32) -> Detection {
        let w = width as f32;
        let h = height as f32;
        let box_w = w / 4.0;
        let box_h = h / 3.0;

        // Sweep from fully off the left edge to fully off the right edge.
        let sweep = (self.call_count % SWEEP_PERIOD) as f32 / SWEEP_PERIOD as f32;
        let x = sweep * (w + box_w) - box_w;
        let y = h * 0.2 + (h * 0.3) * ((self.call_count % 32) as f32 / 32.0);

        let class_index = ((self.call_count / SWEEP_PERIOD) % STUB_CLASSES.len() as u64) as usize;
        let confidence = 0.55 + 0.35 * ((self.call_count % 7) as f32 / 7.0);

        Detection {
            rect: Rect::new(x, y, box_w, box_h),
            class_name: STUB_CLASSES[class_index].to_string(),
            confidence,
            display_color: class_color(class_index),
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Option<DetectionResult>> {
        let started = Instant::now();
        let current_hash: [u8; 32] = Sha256::digest(pixels).into();

        let unchanged = self.last_hash.is_some_and(|prev| prev == current_hash);
        self.last_hash = Some(current_hash);

        if unchanged {
            return Ok(None);
        }

        let detection = self.synthetic_detection(width, height);
        self.call_count += 1;

        Ok(Some(DetectionResult::with_timing(
            vec![detection],
            started,
        )))
    }
}
