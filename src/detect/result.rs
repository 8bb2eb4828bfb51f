use std::time::Instant;

use crate::geometry::{Color, Rect};

/// Result of one detector invocation on a single frame.
#[derive(Clone, Debug, Default)]
pub struct DetectionResult {
    /// Detections in source-frame pixel coordinates, in model output order.
    pub detections: Vec<Detection>,
    /// Wall time spent inside the model, in milliseconds.
    pub inference_ms: u64,
}

impl DetectionResult {
    /// Build a result stamped with the elapsed time since `started`.
    pub fn with_timing(detections: Vec<Detection>, started: Instant) -> Self {
        Self {
            detections,
            inference_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// One detected object.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Bounding rectangle in source pixel units. Extents come straight from
    /// the model and are not guaranteed non-negative or in-bounds.
    pub rect: Rect,
    pub class_name: String,
    /// Confidence score in [0, 1].
    pub confidence: f32,
    pub display_color: Color,
}

const CLASS_PALETTE: [Color; 6] = [
    Color::rgb(255, 59, 48),
    Color::rgb(52, 199, 89),
    Color::rgb(0, 122, 255),
    Color::rgb(255, 149, 0),
    Color::rgb(175, 82, 222),
    Color::rgb(90, 200, 250),
];

/// Display color for a class index. The palette repeats past its length so
/// every class gets a stable color.
pub fn class_color(class_index: usize) -> Color {
    CLASS_PALETTE[class_index % CLASS_PALETTE.len()]
}
