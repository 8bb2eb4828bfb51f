//! Overlay rasterization onto an RGB canvas.
//!
//! Stand-in for a real display surface: the binaries use this to draw the
//! current overlay sequence into an image, either for logging artifacts or
//! for offline annotation. A windowed renderer would read the same
//! `OverlayStore` snapshots and draw with its own toolkit.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect as PixelRect;

use crate::geometry::ViewBounds;
use crate::overlay::OverlayRecord;

/// Box border thickness in pixels.
const BORDER_THICKNESS: u32 = 3;
/// Vertical label inset from the top border, in pixels.
const LABEL_OFFSET: f32 = 10.0;

/// Blank canvas matching the view bounds.
pub fn blank_canvas(view: ViewBounds) -> RgbImage {
    RgbImage::new(view.width.max(1.0) as u32, view.height.max(1.0) as u32)
}

/// Draw overlay records onto `canvas`.
///
/// Zero-area boxes are skipped (clamping can collapse a rect; the record is
/// published anyway and filtered here). Labels are drawn only when a real
/// font face is available.
pub fn draw_records(canvas: &mut RgbImage, records: &[OverlayRecord], font: Option<&FontArc>) {
    for record in records {
        if record.rect.is_degenerate() {
            continue;
        }

        draw_border(canvas, record);

        if let Some(font) = font {
            let x = record.rect.x as i32;
            let y = (record.rect.y + LABEL_OFFSET - record.label_size.height).max(0.0) as i32;
            draw_text_mut(
                canvas,
                color_to_rgb(record.color),
                x,
                y,
                PxScale::from(record.font.size_px()),
                font,
                &record.label,
            );
        }
    }
}

fn draw_border(canvas: &mut RgbImage, record: &OverlayRecord) {
    let color = color_to_rgb(record.color);
    let (width, height) = (record.rect.width as u32, record.rect.height as u32);

    // Concentric 1px rects, shrinking inward.
    for t in 0..BORDER_THICKNESS {
        if width <= 2 * t || height <= 2 * t {
            break;
        }
        let rect = PixelRect::at(record.rect.x as i32 + t as i32, record.rect.y as i32 + t as i32)
            .of_size(width - 2 * t, height - 2 * t);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn color_to_rgb(color: crate::geometry::Color) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Rect};
    use crate::overlay::LabelFont;

    fn record(rect: Rect) -> OverlayRecord {
        let font = LabelFont::fixed(14.0);
        OverlayRecord {
            rect,
            label: "person  (90%)".to_string(),
            label_size: font.measure("person  (90%)"),
            color: Color::rgb(255, 0, 0),
            font,
        }
    }

    #[test]
    fn draws_border_pixels() {
        let mut canvas = blank_canvas(ViewBounds::new(64.0, 64.0));
        draw_records(&mut canvas, &[record(Rect::new(8.0, 8.0, 20.0, 20.0))], None);

        assert_eq!(canvas.get_pixel(8, 8), &Rgb([255, 0, 0]));
        // Interior stays untouched.
        assert_eq!(canvas.get_pixel(18, 18), &Rgb([0, 0, 0]));
    }

    #[test]
    fn degenerate_record_is_skipped() {
        let mut canvas = blank_canvas(ViewBounds::new(32.0, 32.0));
        let before = canvas.clone();
        draw_records(
            &mut canvas,
            &[record(Rect::new(5.0, 5.0, -3.0, 10.0))],
            None,
        );
        assert_eq!(canvas, before);
    }
}
