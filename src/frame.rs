//! Raw frame container.
//!
//! `RawFrame` carries one captured frame from a source to the pipeline:
//! packed RGB8 pixels plus dimensions and a per-source sequence number.
//! Frames are owned by the pass that processes them and are never retained
//! past the mapping step.

use crate::geometry::PixelDims;

/// One captured frame: packed RGB8 pixels with dimensions.
pub struct RawFrame {
    data: Vec<u8>,

    pub width: u32,
    pub height: u32,

    /// Monotonic per-source sequence number, assigned at capture time.
    pub seq: u64,
}

impl RawFrame {
    /// Create a new raw frame. Called by capture sources.
    pub fn new(data: Vec<u8>, width: u32, height: u32, seq: u64) -> Self {
        Self {
            data,
            width,
            height,
            seq,
        }
    }

    /// Packed RGB8 pixel data, row-major, no padding.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Raw byte length.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Source dimensions as a `PixelDims`.
    pub fn dims(&self) -> PixelDims {
        PixelDims::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_exposes_dims_and_pixels() {
        let frame = RawFrame::new(vec![0u8; 12], 2, 2, 7);
        assert_eq!(frame.dims(), PixelDims::new(2, 2));
        assert_eq!(frame.byte_len(), 12);
        assert_eq!(frame.seq, 7);
        assert_eq!(frame.pixels().len(), 12);
    }
}
