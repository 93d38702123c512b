//! Configuration loading tests
//!
//! Run against a temporary directory so they never touch the user's real
//! ~/.lector.cfg.

use lector::segment::SegmentMode;
use lector::session::Config;

#[test]
fn test_config_created_with_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lector.cfg");

    let config = Config::load_from(path.clone()).expect("Failed to load config");

    // The file was written on first load
    assert!(path.exists());

    assert_eq!(config.rate(), 1.0);
    assert_eq!(config.pitch(), 1.0);
    assert_eq!(config.voice_id(), None);
    assert_eq!(config.mode(), SegmentMode::Sentence);
}

#[test]
fn test_config_changes_persist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("lector.cfg");

    let mut config = Config::load_from(path.clone()).expect("Failed to load config");
    config.set("speech", "rate", "2.5");
    config.set("reader", "mode", "page");
    config.save().expect("Failed to save config");

    let reloaded = Config::load_from(path).expect("Failed to reload config");
    assert_eq!(reloaded.rate(), 2.5);
    assert_eq!(reloaded.mode(), SegmentMode::Page);
}

#[test]
fn test_voice_params_assembled_from_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::load_from(dir.path().join("lector.cfg")).expect("load");

    config.set("speech", "voice", "en-us-2");
    config.set("speech", "rate", "1.25");

    let params = config.voice_params();
    assert_eq!(params.voice_id.as_deref(), Some("en-us-2"));
    assert_eq!(params.rate, 1.25);
    assert_eq!(params.pitch, 1.0);
    assert!(params.validate().is_ok());
}

#[test]
fn test_garbage_values_fall_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::load_from(dir.path().join("lector.cfg")).expect("load");

    config.set("speech", "rate", "fast");
    config.set("reader", "mode", "chapter");

    assert_eq!(config.rate(), 1.0);
    assert_eq!(config.mode(), SegmentMode::Sentence);
}
