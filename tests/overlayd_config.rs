use std::sync::Mutex;

use tempfile::NamedTempFile;

use overlay_pipeline::config::PipelineConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "OVERLAY_CONFIG",
        "OVERLAY_SOURCE_URL",
        "OVERLAY_BACKEND",
        "OVERLAY_MODEL_PATH",
        "OVERLAY_MIN_INTERVAL_MS",
        "OVERLAY_VIEW_WIDTH",
        "OVERLAY_VIEW_HEIGHT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_defaults_without_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.source.url, "stub://camera");
    assert_eq!(cfg.source.target_fps, 30);
    assert_eq!(cfg.source.width, 640);
    assert_eq!(cfg.source.height, 480);
    assert_eq!(cfg.view.width, 960.0);
    assert_eq!(cfg.view.height, 720.0);
    assert_eq!(cfg.cadence.min_interval_ms, 200);
    assert_eq!(cfg.overlay.edge_offset, 2.0);
    assert_eq!(cfg.overlay.font_size, 14.0);
    assert_eq!(cfg.detector.backend, "stub");
    assert_eq!(cfg.detector.confidence_threshold, 0.5);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "source": {
            "url": "stub://bench",
            "target_fps": 15,
            "width": 320,
            "height": 240
        },
        "view": {
            "width": 1280.0,
            "height": 960.0
        },
        "cadence": {
            "min_interval_ms": 500
        },
        "overlay": {
            "edge_offset": 4.0,
            "font_size": 18.0
        },
        "detector": {
            "backend": "stub",
            "confidence_threshold": 0.25
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("OVERLAY_CONFIG", file.path());
    std::env::set_var("OVERLAY_SOURCE_URL", "stub://front_door");
    std::env::set_var("OVERLAY_MIN_INTERVAL_MS", "250");

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.source.url, "stub://front_door");
    assert_eq!(cfg.source.target_fps, 15);
    assert_eq!(cfg.source.width, 320);
    assert_eq!(cfg.source.height, 240);
    assert_eq!(cfg.view.width, 1280.0);
    assert_eq!(cfg.view.height, 960.0);
    assert_eq!(cfg.cadence.min_interval_ms, 250);
    assert_eq!(cfg.overlay.edge_offset, 4.0);
    assert_eq!(cfg.overlay.font_size, 18.0);
    assert_eq!(cfg.detector.confidence_threshold, 0.25);

    clear_env();
}

#[test]
fn rejects_degenerate_source_dimensions() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "source": { "width": 0 } }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("OVERLAY_CONFIG", file.path());
    assert!(PipelineConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_out_of_range_confidence_threshold() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{ "detector": { "confidence_threshold": 1.5 } }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("OVERLAY_CONFIG", file.path());
    assert!(PipelineConfig::load().is_err());

    clear_env();
}
