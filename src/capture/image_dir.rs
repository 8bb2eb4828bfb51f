//! Image-sequence frame source.
//!
//! Reads a directory of PNG/JPEG stills in filename order and loops over
//! them forever, decoding each to packed RGB8. Useful for replaying captured
//! footage through the pipeline without camera hardware.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use super::{FrameSource, SourceStats};
use crate::frame::RawFrame;

pub struct ImageDirSource {
    dir: String,
    paths: Vec<PathBuf>,
    next_index: usize,
    frame_count: u64,
    last_ok: bool,
}

impl ImageDirSource {
    pub fn new(dir: String) -> Self {
        Self {
            dir,
            paths: Vec::new(),
            next_index: 0,
            frame_count: 0,
            last_ok: true,
        }
    }
}

fn is_still_image(path: &PathBuf) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("png") | Some("jpg") | Some("jpeg")
    )
}

impl FrameSource for ImageDirSource {
    fn connect(&mut self) -> Result<()> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read image directory {}", self.dir))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(is_still_image)
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(anyhow!("no PNG/JPEG images found in {}", self.dir));
        }

        log::info!(
            "ImageDirSource: connected to {} ({} stills)",
            self.dir,
            paths.len()
        );
        self.paths = paths;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<RawFrame> {
        let path = self
            .paths
            .get(self.next_index)
            .cloned()
            .ok_or_else(|| anyhow!("image source not connected"))?;
        self.next_index = (self.next_index + 1) % self.paths.len();

        let opened = image::open(&path);
        if opened.is_err() {
            self.last_ok = false;
        }
        let decoded = opened
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_rgb8();
        self.last_ok = true;
        self.frame_count += 1;

        let (width, height) = decoded.dimensions();
        Ok(RawFrame::new(
            decoded.into_raw(),
            width,
            height,
            self.frame_count,
        ))
    }

    fn is_healthy(&self) -> bool {
        self.last_ok
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_captured: self.frame_count,
            origin: self.dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_fails_on_missing_dir() {
        let mut source = ImageDirSource::new("/nonexistent/frames".to_string());
        assert!(source.connect().is_err());
    }

    #[test]
    fn loops_over_stills_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["b.png", "a.png"] {
            let img = image::RgbImage::from_pixel(4, 2, image::Rgb([name.as_bytes()[0], 0, 0]));
            img.save(dir.path().join(name))?;
        }

        let mut source = ImageDirSource::new(dir.path().display().to_string());
        source.connect()?;

        // Filename order: a.png first, then b.png, then wrap back to a.png.
        let first = source.next_frame()?;
        assert_eq!(first.pixels()[0], b'a');
        assert_eq!(first.dims().width, 4);

        let second = source.next_frame()?;
        assert_eq!(second.pixels()[0], b'b');

        let third = source.next_frame()?;
        assert_eq!(third.pixels()[0], b'a');
        assert_eq!(third.seq, 3);

        Ok(())
    }
}
