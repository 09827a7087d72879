use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::{LevelFilter, debug};
use serde::{Deserialize, Serialize};

use crate::encoding::TargetCharset;
use crate::errors::ConfigError;
use crate::subtitle_processor::SubtitleColor;

/// Application configuration module
/// This module handles loading and validating the settings shared by every
/// merge run. Command line flags override what is read here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Encoding label of the merged file
    #[serde(default = "default_output_encoding")]
    pub output_encoding: String,

    /// Tint used by the --upper-yellow / --lower-yellow flags
    #[serde(default = "default_highlight_color")]
    pub highlight_color: SubtitleColor,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_output_encoding() -> String {
    "utf-8".to_string()
}

fn default_highlight_color() -> SubtitleColor {
    SubtitleColor::Yellow
}

impl Config {
    /// Load the configuration file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check that the output encoding can actually be written
    pub fn validate(&self) -> Result<(), ConfigError> {
        TargetCharset::from_label(&self.output_encoding)
            .map_err(|_| ConfigError::OutputEncoding(self.output_encoding.clone()))?;
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_encoding: default_output_encoding(),
            highlight_color: default_highlight_color(),
            log_level: LogLevel::default(),
        }
    }
}
