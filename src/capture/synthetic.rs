//! Synthetic frame source.
//!
//! Generates a deterministic scene with a bright square that wanders over a
//! shaded background, plus per-frame sensor noise. Every frame differs from
//! the previous one, so motion-sensitive consumers always see change.

use anyhow::Result;
use rand::Rng;

use super::{FrameSource, SourceStats};
use crate::frame::RawFrame;

pub struct SyntheticSource {
    origin: String,
    width: u32,
    height: u32,
    frame_count: u64,
}

impl SyntheticSource {
    pub fn new(origin: String, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
            frame_count: 0,
        }
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let width = self.width as usize;
        let height = self.height as usize;
        let mut pixels = vec![0u8; width * height * 3];

        // Shaded background.
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i / 3) % 64) as u8 + 32;
        }

        // Bright square, one step right per frame, wrapping with a row drop.
        let square = (width / 8).max(1);
        let steps_per_row = (width / square).max(1) as u64;
        let col = (self.frame_count % steps_per_row) as usize * square;
        let row =
            ((self.frame_count / steps_per_row) as usize * square) % height.saturating_sub(square).max(1);

        for y in row..(row + square).min(height) {
            for x in col..(col + square).min(width) {
                let base = (y * width + x) * 3;
                pixels[base] = 230;
                pixels[base + 1] = 230;
                pixels[base + 2] = 60;
            }
        }

        // Sensor noise so no two frames hash equal.
        let mut rng = rand::thread_rng();
        for _ in 0..16 {
            let idx = rng.gen_range(0..pixels.len());
            pixels[idx] = rng.gen();
        }

        pixels
    }
}

impl FrameSource for SyntheticSource {
    fn connect(&mut self) -> Result<()> {
        log::info!("SyntheticSource: connected to {}", self.origin);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RawFrame> {
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Ok(RawFrame::new(
            pixels,
            self.width,
            self.height,
            self.frame_count,
        ))
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            origin: self.origin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_frames_with_configured_dims() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 320, 240);
        source.connect()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width, 320);
        assert_eq!(frame.height, 240);
        assert_eq!(frame.byte_len(), 320 * 240 * 3);
        assert_eq!(frame.seq, 1);

        Ok(())
    }

    #[test]
    fn consecutive_frames_differ() -> Result<()> {
        let mut source = SyntheticSource::new("stub://test".to_string(), 64, 64);
        source.connect()?;

        let first = source.next_frame()?;
        let second = source.next_frame()?;
        assert_ne!(first.pixels(), second.pixels());

        Ok(())
    }
}
