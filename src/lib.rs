/*!
 * # srtmerge - SubRip subtitle merger
 *
 * A Rust library for merging two or more SubRip (`.srt`) subtitle files into
 * one file that shows every source's cues at their own times.
 *
 * ## Features
 *
 * - Automatic detection of each source's character encoding
 * - Sources in different encodings merged into one target encoding
 * - Byte-order mark written for Unicode output encodings
 * - Per-source color tint and top-of-screen placement
 * - Sequential renumbering of the merged cues
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `encoding`: Encoding detection, source decoding, target encoding and BOMs
 * - `subtitle_processor`: Dialog parsing and the per-source cue store
 * - `merger`: The merge engine
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations and output path resolution
 * - `app_controller`: Two-file merge driven by the command line
 * - `errors`: Custom error types for the application
 *
 * ## Example
 *
 * ```no_run
 * use srtmerge::{Decoration, Merger, MergerOptions, SourceOptions, SubtitleColor};
 *
 * # fn main() -> Result<(), srtmerge::MergeError> {
 * let mut merger = Merger::new(MergerOptions {
 *     output_name: "new.srt".to_string(),
 *     ..MergerOptions::default()
 * })?;
 * merger.add("en.srt", SourceOptions::default())?;
 * merger.add("fa.srt", SourceOptions::new(
 *     Some("cp1256".to_string()),
 *     Decoration::new(Some(SubtitleColor::Yellow), true),
 * ))?;
 * merger.merge()?;
 * # Ok(())
 * # }
 * ```
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod encoding;
pub mod errors;
pub mod file_utils;
pub mod merger;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, MergeRequest};
pub use encoding::{SourceEncoding, TargetCharset};
pub use errors::{AppError, ConfigError, MergeError};
pub use merger::{Merger, MergerOptions, SourceOptions};
pub use subtitle_processor::{Decoration, SubtitleColor, SubtitleSource};
