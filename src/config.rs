use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_SOURCE_URL: &str = "stub://camera";
const DEFAULT_SOURCE_FPS: u32 = 30;
const DEFAULT_SOURCE_WIDTH: u32 = 640;
const DEFAULT_SOURCE_HEIGHT: u32 = 480;
const DEFAULT_VIEW_WIDTH: f32 = 960.0;
const DEFAULT_VIEW_HEIGHT: f32 = 720.0;
const DEFAULT_MIN_INTERVAL_MS: u64 = 200;
const DEFAULT_EDGE_OFFSET: f32 = 2.0;
const DEFAULT_FONT_SIZE: f32 = 14.0;
const DEFAULT_BACKEND: &str = "stub";
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Deserialize, Default)]
struct PipelineConfigFile {
    source: Option<SourceConfigFile>,
    view: Option<ViewConfigFile>,
    cadence: Option<CadenceConfigFile>,
    overlay: Option<OverlayConfigFile>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ViewConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct CadenceConfigFile {
    min_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    edge_offset: Option<f32>,
    font_path: Option<PathBuf>,
    font_size: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<PathBuf>,
    labels_path: Option<PathBuf>,
    confidence_threshold: Option<f32>,
    input_width: Option<u32>,
    input_height: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source: SourceSettings,
    pub view: ViewSettings,
    pub cadence: CadenceSettings,
    pub overlay: OverlaySettings,
    pub detector: DetectorSettings,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// `stub://` for the synthetic scene, or a local image directory.
    pub url: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct CadenceSettings {
    /// Minimum interval between inference calls, in milliseconds.
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct OverlaySettings {
    /// Clamp margin in view units for out-of-bounds boxes.
    pub edge_offset: f32,
    /// Optional TTF/OTF face for label measurement; fixed metrics when unset.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    pub backend: String,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
    pub confidence_threshold: f32,
    /// Model input dimensions. Must match the source frame dimensions; the
    /// pipeline feeds frames to the model unresized.
    pub input_width: u32,
    pub input_height: u32,
}

impl PipelineConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("OVERLAY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: PipelineConfigFile) -> Self {
        let source = SourceSettings {
            url: file
                .source
                .as_ref()
                .and_then(|source| source.url.clone())
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            target_fps: file
                .source
                .as_ref()
                .and_then(|source| source.target_fps)
                .unwrap_or(DEFAULT_SOURCE_FPS),
            width: file
                .source
                .as_ref()
                .and_then(|source| source.width)
                .unwrap_or(DEFAULT_SOURCE_WIDTH),
            height: file
                .source
                .as_ref()
                .and_then(|source| source.height)
                .unwrap_or(DEFAULT_SOURCE_HEIGHT),
        };
        let view = ViewSettings {
            width: file
                .view
                .as_ref()
                .and_then(|view| view.width)
                .unwrap_or(DEFAULT_VIEW_WIDTH),
            height: file
                .view
                .as_ref()
                .and_then(|view| view.height)
                .unwrap_or(DEFAULT_VIEW_HEIGHT),
        };
        let cadence = CadenceSettings {
            min_interval_ms: file
                .cadence
                .as_ref()
                .and_then(|cadence| cadence.min_interval_ms)
                .unwrap_or(DEFAULT_MIN_INTERVAL_MS),
        };
        let overlay = OverlaySettings {
            edge_offset: file
                .overlay
                .as_ref()
                .and_then(|overlay| overlay.edge_offset)
                .unwrap_or(DEFAULT_EDGE_OFFSET),
            font_path: file.overlay.as_ref().and_then(|overlay| overlay.font_path.clone()),
            font_size: file
                .overlay
                .as_ref()
                .and_then(|overlay| overlay.font_size)
                .unwrap_or(DEFAULT_FONT_SIZE),
        };
        let detector = DetectorSettings {
            backend: file
                .detector
                .as_ref()
                .and_then(|detector| detector.backend.clone())
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            model_path: file
                .detector
                .as_ref()
                .and_then(|detector| detector.model_path.clone()),
            labels_path: file
                .detector
                .as_ref()
                .and_then(|detector| detector.labels_path.clone()),
            confidence_threshold: file
                .detector
                .as_ref()
                .and_then(|detector| detector.confidence_threshold)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            input_width: file
                .detector
                .as_ref()
                .and_then(|detector| detector.input_width)
                .unwrap_or(source.width),
            input_height: file
                .detector
                .and_then(|detector| detector.input_height)
                .unwrap_or(source.height),
        };
        Self {
            source,
            view,
            cadence,
            overlay,
            detector,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("OVERLAY_SOURCE_URL") {
            if !url.trim().is_empty() {
                self.source.url = url;
            }
        }
        if let Ok(backend) = std::env::var("OVERLAY_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(path) = std::env::var("OVERLAY_MODEL_PATH") {
            if !path.trim().is_empty() {
                self.detector.model_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(interval) = std::env::var("OVERLAY_MIN_INTERVAL_MS") {
            self.cadence.min_interval_ms = interval.parse().map_err(|_| {
                anyhow!("OVERLAY_MIN_INTERVAL_MS must be an integer number of milliseconds")
            })?;
        }
        if let Ok(width) = std::env::var("OVERLAY_VIEW_WIDTH") {
            self.view.width = width
                .parse()
                .map_err(|_| anyhow!("OVERLAY_VIEW_WIDTH must be a number"))?;
        }
        if let Ok(height) = std::env::var("OVERLAY_VIEW_HEIGHT") {
            self.view.height = height
                .parse()
                .map_err(|_| anyhow!("OVERLAY_VIEW_HEIGHT must be a number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!(
                "source dimensions must be positive (mapping requires them)"
            ));
        }
        if self.source.target_fps == 0 {
            return Err(anyhow!("source target_fps must be >= 1"));
        }
        if self.view.width <= 0.0 || self.view.height <= 0.0 {
            return Err(anyhow!("view dimensions must be positive"));
        }
        if !(0.0..=1.0).contains(&self.detector.confidence_threshold) {
            return Err(anyhow!("confidence_threshold must be in [0, 1]"));
        }
        if self.detector.backend == "tract"
            && (self.detector.input_width != self.source.width
                || self.detector.input_height != self.source.height)
        {
            return Err(anyhow!(
                "detector input {}x{} does not match source {}x{}",
                self.detector.input_width,
                self.detector.input_height,
                self.source.width,
                self.source.height
            ));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<PipelineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
