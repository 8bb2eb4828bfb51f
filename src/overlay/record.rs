//! Renderable overlay records and label text measurement.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};

use crate::geometry::{Color, Rect};

/// Measured extent of a rendered label, in view units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelSize {
    pub width: f32,
    pub height: f32,
}

/// Text measurement capability. The renderer owns real font metrics; the
/// pipeline only needs extents for layout, so the capability is a trait.
pub trait TextMeasure: Send + Sync {
    fn measure(&self, text: &str, size_px: f32) -> LabelSize;
}

/// Glyph-accurate measurement backed by a loaded font face.
pub struct GlyphMeasure {
    font: FontArc,
}

impl GlyphMeasure {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Load a TTF/OTF face from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|_| anyhow!("invalid font file {}", path.display()))?;
        Ok(Self { font })
    }

    /// The underlying face, for renderers that rasterize glyphs.
    pub fn font(&self) -> &FontArc {
        &self.font
    }
}

impl TextMeasure for GlyphMeasure {
    fn measure(&self, text: &str, size_px: f32) -> LabelSize {
        let scaled = self.font.as_scaled(PxScale::from(size_px));
        let width: f32 = text
            .chars()
            .map(|c| scaled.h_advance(self.font.glyph_id(c)))
            .sum();
        LabelSize {
            width,
            height: scaled.height(),
        }
    }
}

/// Fixed-advance metrics for tests and headless runs.
pub struct FixedMeasure;

/// Advance per character as a fraction of the font size.
const FIXED_ADVANCE: f32 = 0.6;
/// Line height as a fraction of the font size.
const FIXED_LINE_HEIGHT: f32 = 1.2;

impl TextMeasure for FixedMeasure {
    fn measure(&self, text: &str, size_px: f32) -> LabelSize {
        LabelSize {
            width: text.chars().count() as f32 * size_px * FIXED_ADVANCE,
            height: size_px * FIXED_LINE_HEIGHT,
        }
    }
}

/// Cheaply clonable font handle carried by every overlay record.
#[derive(Clone)]
pub struct LabelFont {
    measure: Arc<dyn TextMeasure>,
    size_px: f32,
}

impl LabelFont {
    pub fn new(measure: Arc<dyn TextMeasure>, size_px: f32) -> Self {
        Self { measure, size_px }
    }

    /// Handle with fixed metrics, no font file required.
    pub fn fixed(size_px: f32) -> Self {
        Self::new(Arc::new(FixedMeasure), size_px)
    }

    /// Handle backed by a TTF/OTF face on disk.
    pub fn from_file<P: AsRef<Path>>(path: P, size_px: f32) -> Result<Self> {
        Ok(Self::new(Arc::new(GlyphMeasure::from_file(path)?), size_px))
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn measure(&self, text: &str) -> LabelSize {
        self.measure.measure(text, self.size_px)
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("size_px", &self.size_px)
            .finish()
    }
}

/// One renderable annotation: a view-space box with its label.
#[derive(Clone, Debug)]
pub struct OverlayRecord {
    /// View-space rectangle, clamped against the view bounds.
    pub rect: Rect,
    /// Class name plus integer confidence percentage.
    pub label: String,
    /// Precomputed label text extent, for layout.
    pub label_size: LabelSize,
    pub color: Color,
    pub font: LabelFont,
}

/// Label text: class name, two spaces, truncated integer percentage.
pub(crate) fn format_label(class_name: &str, confidence: f32) -> String {
    format!("{}  ({}%)", class_name, (confidence * 100.0) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_percentage_truncates() {
        assert_eq!(format_label("person", 0.729), "person  (72%)");
        assert_eq!(format_label("cup", 0.5), "cup  (50%)");
        assert_eq!(format_label("chair", 1.0), "chair  (100%)");
        assert_eq!(format_label("bottle", 0.0), "bottle  (0%)");
    }

    #[test]
    fn fixed_measure_is_deterministic() {
        let font = LabelFont::fixed(14.0);
        let a = font.measure("person  (72%)");
        let b = font.measure("person  (72%)");
        assert_eq!(a, b);
        assert_eq!(a.width, 13.0 * 14.0 * FIXED_ADVANCE);
        assert_eq!(a.height, 14.0 * FIXED_LINE_HEIGHT);
    }

    #[test]
    fn longer_labels_measure_wider() {
        let font = LabelFont::fixed(14.0);
        let short = font.measure("cup  (9%)");
        let long = font.measure("person  (100%)");
        assert!(long.width > short.width);
    }
}
