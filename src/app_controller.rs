use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::merger::{Merger, MergerOptions, SourceOptions};
use crate::subtitle_processor::Decoration;

// @module: Application controller for two-file subtitle merging

/// One command line merge: an upper and a lower subtitle
#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    /// Subtitle added first; wins ties at equal timestamps
    pub upper_sub: PathBuf,
    /// Subtitle added second
    pub lower_sub: PathBuf,
    /// Tint the upper subtitle with the highlight color
    pub upper_yellow: bool,
    /// Tint the lower subtitle with the highlight color
    pub lower_yellow: bool,
    /// Place the upper subtitle at the top of the screen
    pub top: bool,
    /// Output file or directory
    pub output: Option<PathBuf>,
    /// Explicit codec of the upper subtitle
    pub upper_encoding: Option<String>,
    /// Explicit codec of the lower subtitle
    pub lower_encoding: Option<String>,
}

/// Main application controller for subtitle merging
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Merge the two subtitles of `request` and return the written path
    pub fn run(&self, request: &MergeRequest) -> Result<PathBuf> {
        FileManager::ensure_srt_file(&request.upper_sub)?;
        FileManager::ensure_srt_file(&request.lower_sub)?;

        let (output_path, output_name) = FileManager::resolve_output_location(
            &request.upper_sub,
            &request.lower_sub,
            request.output.as_deref(),
        );

        let mut merger = Merger::new(MergerOptions {
            output_path,
            output_name,
            output_encoding: self.config.output_encoding.clone(),
        })?;

        info!("Reading upper_sub");
        merger
            .add(&request.upper_sub, SourceOptions::new(
                request.upper_encoding.clone(),
                self.decoration(request.upper_yellow, request.top),
            ))
            .with_context(|| format!("Failed to add subtitle: {}", request.upper_sub.display()))?;

        info!("Reading lower_sub");
        merger
            .add(&request.lower_sub, SourceOptions::new(
                request.lower_encoding.clone(),
                self.decoration(request.lower_yellow, false),
            ))
            .with_context(|| format!("Failed to add subtitle: {}", request.lower_sub.display()))?;

        let written = merger.merge().context("Failed to merge subtitles")?;
        Ok(written)
    }

    fn decoration(&self, highlighted: bool, top: bool) -> Decoration {
        let color = highlighted.then(|| self.config.highlight_color.clone());
        Decoration::new(color, top)
    }
}
