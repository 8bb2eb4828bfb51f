//! Overlay composition: mapping, records, and the shared store.

mod mapper;
pub mod record;
mod store;

pub use mapper::OverlayMapper;
pub use record::{
    FixedMeasure, GlyphMeasure, LabelFont, LabelSize, OverlayRecord, TextMeasure,
};
pub use store::OverlayStore;
