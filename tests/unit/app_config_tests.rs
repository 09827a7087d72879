/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use log::LevelFilter;
use srtmerge::app_config::{Config, LogLevel};
use srtmerge::subtitle_processor::SubtitleColor;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.output_encoding, "utf-8");
    assert_eq!(config.highlight_color, SubtitleColor::Yellow);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withUnknownEncoding_shouldFail() {
    let mut config = Config::default();
    config.output_encoding = "utf-16".to_string();
    assert!(config.validate().is_ok());

    config.output_encoding = "no-such-encoding".to_string();
    assert!(config.validate().is_err());
}

/// Test that a missing config file falls back to defaults
#[test]
fn test_load_or_default_withMissingFile_shouldReturnDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config::load_or_default(temp_dir.path().join("missing.json"))?;

    assert_eq!(config, Config::default());
    Ok(())
}

/// Test loading a partial config file
#[test]
fn test_load_or_default_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "srtmerge.json",
        r##"{ "highlight_color": "#00ff00", "log_level": "debug" }"##,
    )?;

    let config = Config::load_or_default(&path)?;

    assert_eq!(config.output_encoding, "utf-8");
    assert_eq!(config.highlight_color, SubtitleColor::Hex("#00FF00".to_string()));
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that malformed colors are rejected while loading
#[test]
fn test_load_or_default_withInvalidColor_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "srtmerge.json", r#"{ "highlight_color": "mauve" }"#)?;

    assert!(Config::load_or_default(&path).is_err());
    Ok(())
}

/// Test serializing named colors by name
#[test]
fn test_config_serialization_withNamedColor_shouldWriteName() -> Result<()> {
    let json = serde_json::to_string(&Config::default())?;

    assert!(json.contains("\"highlight_color\":\"yellow\""));
    assert!(json.contains("\"log_level\":\"info\""));
    Ok(())
}

/// Test conversion of log levels
#[test]
fn test_log_level_into_level_filter_shouldMapEachLevel() {
    assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::Error);
    assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
}
