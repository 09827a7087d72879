/*!
 * Common test utilities for the srtmerge test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

/// Route library logs to the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// English sample with three cues
pub const ENGLISH_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Second language sample, CRLF line endings, one cue sharing a second with ENGLISH_SRT
pub const SECOND_SRT: &str = "1\r\n00:00:05,400 --> 00:00:08,000\r\nSegunda linea.\r\n\r\n2\r\n00:00:12,000 --> 00:00:13,000\r\nTercera linea.\r\n";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, ENGLISH_SRT)
}

/// Strip a UTF-8 BOM and split merged output into cue blocks
pub fn merged_blocks(output: &str) -> Vec<String> {
    output
        .trim_start_matches('\u{feff}')
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Index line of every merged block
pub fn merged_indices(output: &str) -> Vec<usize> {
    merged_blocks(output)
        .iter()
        .filter_map(|block| block.lines().next())
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}
