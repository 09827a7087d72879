use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::MergeError;

// @module: File and directory utilities

// @const: Extension of SubRip files
pub const SRT_EXTENSION: &str = "srt";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), MergeError> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(|source| MergeError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Read a whole file into memory
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, MergeError> {
        let path = path.as_ref();
        fs::read(path).map_err(|source| MergeError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write bytes to a file in one pass, creating the parent directory
    pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), MergeError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        let io_error = |source| MergeError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::create(path).map_err(io_error)?;
        file.write_all(bytes).map_err(io_error)?;
        file.flush().map_err(io_error)
    }

    // @checks: SubRip extension, case-insensitive
    pub fn is_srt_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SRT_EXTENSION))
    }

    /// Reject any input that is not a `.srt` file
    pub fn ensure_srt_file<P: AsRef<Path>>(path: P) -> Result<(), MergeError> {
        let path = path.as_ref();
        if Self::is_srt_file(path) {
            Ok(())
        } else {
            Err(MergeError::UnsupportedExtension(path.to_path_buf()))
        }
    }

    // @generates: Name of the merged subtitle, `{upper}_{lower}_merged.srt`
    pub fn merged_file_name<P1: AsRef<Path>, P2: AsRef<Path>>(upper_sub: P1, lower_sub: P2) -> String {
        let upper_stem = upper_sub.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        let lower_stem = lower_sub.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        format!("{}_{}_merged.{}", upper_stem, lower_stem, SRT_EXTENSION)
    }

    /// Split the requested output into directory and file name.
    ///
    /// An existing directory receives the merged file name, any other path is
    /// used as the output file itself. Without an output the merged file goes
    /// next to the upper subtitle.
    pub fn resolve_output_location<P1: AsRef<Path>, P2: AsRef<Path>>(
        upper_sub: P1,
        lower_sub: P2,
        output: Option<&Path>,
    ) -> (PathBuf, String) {
        let merged_name = Self::merged_file_name(&upper_sub, &lower_sub);
        let parent_of = |path: &Path| -> PathBuf {
            match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            }
        };

        match output {
            Some(output) if Self::dir_exists(output) => (output.to_path_buf(), merged_name),
            Some(output) => match output.file_name() {
                Some(name) => (parent_of(output), name.to_string_lossy().to_string()),
                None => (output.to_path_buf(), merged_name),
            },
            None => (parent_of(upper_sub.as_ref()), merged_name),
        }
    }
}
