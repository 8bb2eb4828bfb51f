//! annotate - offline end-to-end run: frames through the full pipeline,
//! rasterized to annotated PNGs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use overlay_pipeline::config::SourceSettings;
use overlay_pipeline::overlay::GlyphMeasure;
use overlay_pipeline::render;
use overlay_pipeline::{
    build_source, CadenceGate, FrameOutcome, InlineContext, LabelFont, OverlayMapper,
    OverlayPipeline, OverlayStore, StubBackend, ViewBounds,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frame source: a stub:// scene or a local image directory.
    #[arg(long, default_value = "stub://annotate")]
    source: String,
    /// Number of frames to process.
    #[arg(long, default_value_t = 8)]
    frames: u64,
    /// Source frame width (stub scenes; stills carry their own dimensions).
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// Source frame height.
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Target view width.
    #[arg(long, default_value_t = 960.0)]
    view_width: f32,
    /// Target view height.
    #[arg(long, default_value_t = 720.0)]
    view_height: f32,
    /// Output directory for annotated PNGs.
    #[arg(long, default_value = "annotate_out")]
    out: String,
    /// Optional TTF/OTF face for label drawing; boxes only when unset.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Label font size in pixels.
    #[arg(long, default_value_t = 14.0)]
    font_size: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out)?;

    stage("connect source");
    let mut source = build_source(&SourceSettings {
        url: args.source.clone(),
        target_fps: 30,
        width: args.width,
        height: args.height,
    })?;
    source.connect()?;

    stage("prepare pipeline");
    let (label_font, face) = match &args.font {
        Some(path) => {
            let glyph = GlyphMeasure::from_file(path)?;
            let face = glyph.font().clone();
            (
                LabelFont::new(Arc::new(glyph), args.font_size),
                Some(face),
            )
        }
        None => (LabelFont::fixed(args.font_size), None),
    };

    let view = ViewBounds::new(args.view_width, args.view_height);
    let store = Arc::new(OverlayStore::new());
    let mut pipeline = OverlayPipeline::new(
        CadenceGate::new(200),
        Box::new(StubBackend::new()),
        OverlayMapper::new(2.0, label_font),
        view,
        Arc::clone(&store),
        InlineContext,
    );

    stage("process frames");
    let mut total_overlays = 0usize;
    for i in 0..args.frames {
        let frame = source.next_frame()?;

        // Paced one interval apart so every frame is admitted.
        let now_ms = i * 250;
        if let FrameOutcome::Published(count) = pipeline.process_frame(&frame, now_ms) {
            total_overlays += count;
        }

        let (_, records) = store.snapshot();
        let mut canvas = render::blank_canvas(view);
        render::draw_records(&mut canvas, &records, face.as_ref());

        let path = Path::new(&args.out).join(format!("frame_{:04}.png", i));
        canvas
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let stats = pipeline.stats();
    println!("annotate summary:");
    println!("  frames processed: {}", stats.frames_seen());
    println!("  frames admitted: {}", stats.frames_admitted());
    println!("  overlays drawn: {}", total_overlays);
    println!("  output: {}", args.out);

    Ok(())
}

fn stage(msg: &str) {
    eprintln!("annotate: {}", msg);
}
