//! Frame-space to view-space overlay mapping.
//!
//! Transforms detector output into renderable overlay records: scale from
//! source pixels into view units, clamp against the view edges, format and
//! measure the label. Output order always matches input order.

use crate::detect::Detection;
use crate::geometry::{PixelDims, Rect, ViewBounds};
use crate::overlay::record::{format_label, LabelFont, OverlayRecord};

pub struct OverlayMapper {
    edge_offset: f32,
    font: LabelFont,
}

impl OverlayMapper {
    /// `edge_offset` is the clamp margin in view units: out-of-bounds boxes
    /// are pulled this far inside the edge rather than flush against it.
    pub fn new(edge_offset: f32, font: LabelFont) -> Self {
        Self { edge_offset, font }
    }

    /// Map detections onto a target view.
    ///
    /// An empty input maps to an empty output; the caller still publishes it
    /// so stale overlays clear. Rects that collapse during clamping are
    /// emitted anyway and skipped at draw time.
    pub fn map(
        &self,
        detections: &[Detection],
        source: PixelDims,
        view: ViewBounds,
    ) -> Vec<OverlayRecord> {
        let (sx, sy) = scale_factors(source, view);

        detections
            .iter()
            .map(|detection| {
                let rect = self.clamp_to_view(
                    Rect::new(
                        detection.rect.x * sx,
                        detection.rect.y * sy,
                        detection.rect.width * sx,
                        detection.rect.height * sy,
                    ),
                    view,
                );

                let label = format_label(&detection.class_name, detection.confidence);
                let label_size = self.font.measure(&label);

                OverlayRecord {
                    rect,
                    label,
                    label_size,
                    color: detection.display_color,
                    font: self.font.clone(),
                }
            })
            .collect()
    }

    /// Clamp a scaled rect against the view bounds.
    ///
    /// A negative origin moves to `edge_offset`, not zero: the replacement
    /// coordinate is a small visible margin. An overflowing far edge trims
    /// the extent to end `edge_offset` inside the bound.
    fn clamp_to_view(&self, mut rect: Rect, view: ViewBounds) -> Rect {
        if rect.x < 0.0 {
            rect.x = self.edge_offset;
        }
        if rect.y < 0.0 {
            rect.y = self.edge_offset;
        }
        if rect.max_y() > view.height {
            rect.height = view.height - rect.y - self.edge_offset;
        }
        if rect.max_x() > view.width {
            rect.width = view.width - rect.x - self.edge_offset;
        }
        rect
    }
}

/// Scale factors from source pixels to view units. A zero source dimension
/// skips scaling on that axis; positive source dims are the caller's
/// contract and this guard only prevents division by zero.
fn scale_factors(source: PixelDims, view: ViewBounds) -> (f32, f32) {
    let sx = if source.width == 0 {
        1.0
    } else {
        view.width / source.width as f32
    };
    let sy = if source.height == 0 {
        1.0
    } else {
        view.height / source.height as f32
    };
    (sx, sy)
}
