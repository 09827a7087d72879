/*!
 * Merge engine.
 *
 * A [`Merger`] collects subtitle sources through [`Merger::add`] and writes
 * them as one SubRip file with [`Merger::merge`]. Each merge run builds a
 * fresh [`MergeSession`] that orders every truncated-second key once, walks
 * the sources in add order at each key and emits one self-contained byte
 * fragment per cue. Fragments are encoded one at a time, so sources decoded
 * from different encodings end up in the same target charset.
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::encoding::{self, SourceEncoding, TargetCharset};
use crate::errors::MergeError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{Decoration, SubtitleSource, TimeKey};

// @const: Runs of blank lines inside a stored cue
static BLANK_LINES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

// @const: Tail left by a trailing newline in UTF-16LE output
const UTF16LE_NEWLINE_TAIL: &[u8] = b"\x00\n\x00";

/// Where and how the merged file is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergerOptions {
    /// Output directory
    pub output_path: PathBuf,
    /// Output file name
    pub output_name: String,
    /// Target encoding label
    pub output_encoding: String,
}

impl Default for MergerOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("."),
            output_name: "subtitle_name.srt".to_string(),
            output_encoding: "utf-8".to_string(),
        }
    }
}

/// Per-source settings for [`Merger::add`]
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Explicit codec label, detected from the bytes when `None`
    pub encoding: Option<String>,
    /// Styling applied to every cue of the source
    pub decoration: Decoration,
}

impl SourceOptions {
    pub fn new(encoding: Option<String>, decoration: Decoration) -> Self {
        Self { encoding, decoration }
    }
}

/// Merges subtitle sources into one SubRip file
#[derive(Debug)]
pub struct Merger {
    options: MergerOptions,
    charset: TargetCharset,
    sources: Vec<SubtitleSource>,
    // every key ever added, across all sources
    timestamps: Vec<TimeKey>,
}

impl Merger {
    /// Create a merger; fails when the output encoding label is unknown
    pub fn new(options: MergerOptions) -> Result<Self, MergeError> {
        let charset = TargetCharset::from_label(&options.output_encoding)?;
        Ok(Self {
            options,
            charset,
            sources: Vec::new(),
            timestamps: Vec::new(),
        })
    }

    pub fn options(&self) -> &MergerOptions {
        &self.options
    }

    pub fn charset(&self) -> TargetCharset {
        self.charset
    }

    /// Sources in add order
    pub fn sources(&self) -> &[SubtitleSource] {
        &self.sources
    }

    /// Full path of the merged file
    pub fn output_path(&self) -> PathBuf {
        self.options.output_path.join(&self.options.output_name)
    }

    /// Read, decode and parse one subtitle file
    pub fn add<P: AsRef<Path>>(&mut self, path: P, options: SourceOptions) -> Result<&SubtitleSource, MergeError> {
        let path = path.as_ref();
        let bytes = FileManager::read_bytes(path)?;
        self.add_bytes(path, &bytes, options)
    }

    /// Add a source whose bytes are already in memory. `path` only names it.
    pub fn add_bytes<P: AsRef<Path>>(
        &mut self,
        path: P,
        bytes: &[u8],
        options: SourceOptions,
    ) -> Result<&SubtitleSource, MergeError> {
        let path = path.as_ref();
        let encoding = match options.encoding.as_deref() {
            Some(label) => SourceEncoding::from_label(label)?,
            None => {
                let detected = encoding::detect(bytes);
                debug!("Detected codec = {}", detected);
                detected
            }
        };

        let text = encoding::decode_source(bytes, encoding, path)?;
        debug!("Some decoded data = {:?}", text.chars().take(50).collect::<String>());

        let source = SubtitleSource::from_text(path, encoding, options.decoration, &text);
        self.timestamps.extend(source.keys());

        let index = self.sources.len();
        self.sources.push(source);
        Ok(&self.sources[index])
    }

    /// Assemble the merged file without writing it
    pub fn merge_to_bytes(&self) -> Result<Vec<u8>, MergeError> {
        let session = MergeSession::new(&self.timestamps, &self.sources, self.charset, &self.options.output_encoding);
        let mut fragments = session.emit();
        finalize(&mut fragments)?;
        debug!(
            "Merged {} cue(s) from {} source(s) over {} timestamp(s)",
            fragments.len(),
            self.sources.len(),
            session.timestamps().len()
        );
        Ok(fragments.concat())
    }

    /// Merge every added source and write the result to [`Merger::output_path`]
    pub fn merge(&self) -> Result<PathBuf, MergeError> {
        let bytes = self.merge_to_bytes()?;
        let output_path = self.output_path();
        FileManager::write_bytes(&output_path, &bytes)?;
        info!("\"{}\" created successfully.", output_path.display());
        Ok(output_path)
    }
}

/// State of a single merge run
#[derive(Debug)]
pub struct MergeSession<'a> {
    timestamps: Vec<TimeKey>,
    sources: &'a [SubtitleSource],
    charset: TargetCharset,
    bom: &'static [u8],
}

impl<'a> MergeSession<'a> {
    /// Union of the accumulated keys and every source's keys, ascending
    pub fn new(
        accumulated: &[TimeKey],
        sources: &'a [SubtitleSource],
        charset: TargetCharset,
        output_encoding: &str,
    ) -> Self {
        let keys: BTreeSet<TimeKey> = accumulated
            .iter()
            .copied()
            .chain(sources.iter().flat_map(|source| source.keys()))
            .collect();

        Self {
            timestamps: keys.into_iter().collect(),
            sources,
            charset,
            bom: encoding::bom_for_label(output_encoding),
        }
    }

    pub fn timestamps(&self) -> &[TimeKey] {
        &self.timestamps
    }

    /// One fragment per (timestamp, source) pair holding a cue. The index is
    /// dense across sources and the very first fragment carries the BOM.
    pub fn emit(&self) -> Vec<Vec<u8>> {
        let mut fragments = Vec::new();
        let mut index: usize = 1;

        for &key in &self.timestamps {
            for source in self.sources {
                let Some(dialog) = source.dialog_at(key) else {
                    continue;
                };

                let mut fragment = if index == 1 {
                    self.bom.to_vec()
                } else {
                    encoding::encode("\n", self.charset)
                };
                fragment.extend(encoding::encode(&index.to_string(), self.charset));
                fragment.extend(encoding::encode("\n", self.charset));
                fragment.extend(encoding::encode(&collapse_blank_lines(dialog), self.charset));

                fragments.push(fragment);
                index += 1;
            }
        }

        fragments
    }
}

/// Collapse doubled newlines inside a stored cue into single ones
pub fn collapse_blank_lines(cue: &str) -> String {
    BLANK_LINES_REGEX.replace_all(cue, "\n").into_owned()
}

/// Trim the byte stream's tail.
///
/// A last fragment ending in `00 0A 00` (a UTF-16LE newline after a
/// character) loses the newline code unit; otherwise a trailing `0A` byte is
/// dropped. Other multi-byte encodings are left as they are, apart from
/// UTF-16BE whose newline `00 0A` is cut in half.
pub fn finalize(fragments: &mut [Vec<u8>]) -> Result<(), MergeError> {
    let last = fragments.last_mut().ok_or(MergeError::EmptyMerge)?;

    if last.ends_with(UTF16LE_NEWLINE_TAIL) {
        last.truncate(last.len() - UTF16LE_NEWLINE_TAIL.len());
        last.push(0x00);
    } else if last.ends_with(b"\n") {
        last.pop();
    }

    Ok(())
}
