use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::SourceEncoding;
use crate::errors::ConfigError;

// @module: SubRip dialog parsing and per-source cue storage

// @const: SRT time range line, start time captured as h/m/s
static TIME_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{1,2}):(\d{1,2}),\d{1,5}\s*-->\s*\d{1,2}:\d{1,2}:\d{1,2},\d{1,5}").unwrap()
});

// @const: Blank line between two cue blocks, CRLF or LF
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n\r?\n").unwrap());

// @const: Position override that moves a cue to the top of the screen
pub const TOP_POSITION_TAG: &str = "{\\an8}";

/// Cue map key: start time truncated to whole seconds
pub type TimeKey = u32;

/// Tint applied to every cue of a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubtitleColor {
    Red,
    Blue,
    Green,
    White,
    Yellow,
    /// Arbitrary `#RRGGBB` value, stored uppercase
    Hex(String),
}

impl SubtitleColor {
    /// Hex value written into the font tag
    pub fn hex(&self) -> &str {
        match self {
            Self::Red => "#FF003B",
            Self::Blue => "#00ADFF",
            Self::Green => "#B4FF00",
            Self::White => "#FFFFFF",
            Self::Yellow => "#FFEB00",
            Self::Hex(value) => value,
        }
    }
}

impl fmt::Display for SubtitleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl FromStr for SubtitleColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "green" => Ok(Self::Green),
            "white" => Ok(Self::White),
            "yellow" => Ok(Self::Yellow),
            _ => {
                let digits = trimmed.strip_prefix('#').unwrap_or_default();
                if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
                    Ok(Self::Hex(format!("#{}", digits.to_uppercase())))
                } else {
                    Err(ConfigError::InvalidColor(s.to_string()))
                }
            }
        }
    }
}

impl TryFrom<String> for SubtitleColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubtitleColor> for String {
    fn from(color: SubtitleColor) -> Self {
        match color {
            SubtitleColor::Red => "red".to_string(),
            SubtitleColor::Blue => "blue".to_string(),
            SubtitleColor::Green => "green".to_string(),
            SubtitleColor::White => "white".to_string(),
            SubtitleColor::Yellow => "yellow".to_string(),
            SubtitleColor::Hex(value) => value,
        }
    }
}

/// Per-source display styling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    /// Tint, `None` leaves the text untouched
    pub color: Option<SubtitleColor>,
    /// Show the cues at the top of the screen
    pub top: bool,
}

impl Decoration {
    pub fn new(color: Option<SubtitleColor>, top: bool) -> Self {
        Self { color, top }
    }

    /// Wrap cue text in the color tag, then prefix the position override
    pub fn apply(&self, text: &str) -> String {
        let mut decorated = match &self.color {
            Some(color) => format!("<font color=\"{}\">{}</font>", color.hex(), text),
            None => text.to_string(),
        };
        if self.top {
            decorated.insert_str(0, TOP_POSITION_TAG);
        }
        decorated
    }
}

/// Why a cue block was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("block is empty")]
    EmptyBlock,

    #[error("block has no time line")]
    MissingTimeLine,

    #[error("time line does not match hh:mm:ss,fff --> hh:mm:ss,fff: {0:?}")]
    InvalidTimeLine(String),

    #[error("block has no text")]
    EmptyText,
}

/// One cue block after parsing and decoration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDialog {
    /// Start time truncated to whole seconds
    pub key: TimeKey,
    /// Original time range line
    pub time_line: String,
    /// Decorated cue text, lines joined with `\n`
    pub text: String,
}

impl ParsedDialog {
    /// Time line and text as stored in the cue map
    pub fn cue_block(&self) -> String {
        format!("{}\n{}\n", self.time_line, self.text)
    }
}

/// Split decoded file content into raw cue blocks on blank lines
pub fn split_dialogs(raw_text: &str) -> Vec<&str> {
    BLOCK_SEPARATOR_REGEX.split(raw_text).collect()
}

/// Start time of a time range line truncated to seconds.
/// The sub-second field is ignored.
pub fn parse_time_key(time_line: &str) -> Result<TimeKey, SkipReason> {
    let invalid = || SkipReason::InvalidTimeLine(time_line.to_string());
    let caps = TIME_LINE_REGEX.captures(time_line).ok_or_else(invalid)?;

    let field = |idx: usize| -> Option<TimeKey> { caps.get(idx)?.as_str().parse().ok() };
    let (hours, minutes, seconds) = match (field(1), field(2), field(3)) {
        (Some(h), Some(m), Some(s)) => (h, m, s),
        _ => return Err(invalid()),
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Parse one raw cue block: index line, time line, text lines.
pub fn parse_dialog(block: &str, decoration: &Decoration) -> Result<ParsedDialog, SkipReason> {
    let block = block.trim_start_matches(['\r', '\n']);
    if block.trim().is_empty() {
        return Err(SkipReason::EmptyBlock);
    }

    let mut lines = block.lines();
    let _index = lines.next();
    let time_line = lines.next().ok_or(SkipReason::MissingTimeLine)?.trim();
    let key = parse_time_key(time_line)?;

    let mut text_lines: Vec<&str> = lines.collect();
    while text_lines.last().is_some_and(|line| line.trim().is_empty()) {
        text_lines.pop();
    }
    if text_lines.is_empty() {
        return Err(SkipReason::EmptyText);
    }

    Ok(ParsedDialog {
        key,
        time_line: time_line.to_string(),
        text: decoration.apply(&text_lines.join("\n")),
    })
}

/// Parse every block of a decoded subtitle file, keeping the per-block outcome
pub fn parse_dialogs(raw_text: &str, decoration: &Decoration) -> Vec<Result<ParsedDialog, SkipReason>> {
    let raw_text = raw_text.trim_start_matches('\u{feff}');
    split_dialogs(raw_text)
        .into_iter()
        .map(|block| parse_dialog(block, decoration))
        .collect()
}

/// Remove every time range line from a stored cue block
fn strip_time_lines(cue_block: &str) -> String {
    cue_block
        .lines()
        .filter(|line| !TIME_LINE_REGEX.is_match(line))
        .fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
}

/// One added subtitle file and its cues keyed by truncated second
#[derive(Debug, Clone)]
pub struct SubtitleSource {
    /// Source filename
    pub path: PathBuf,

    /// Encoding the file was decoded with
    pub encoding: SourceEncoding,

    /// Styling applied to every cue
    pub decoration: Decoration,

    dialogs: BTreeMap<TimeKey, String>,

    skipped: usize,
}

impl SubtitleSource {
    /// Create an empty source
    pub fn new(path: PathBuf, encoding: SourceEncoding, decoration: Decoration) -> Self {
        SubtitleSource {
            path,
            encoding,
            decoration,
            dialogs: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Build a source from decoded file content. Blocks that fail to parse are
    /// counted and dropped; the rest of the file is kept.
    pub fn from_text<P: AsRef<Path>>(path: P, encoding: SourceEncoding, decoration: Decoration, raw_text: &str) -> Self {
        let mut source = Self::new(path.as_ref().to_path_buf(), encoding, decoration);

        for outcome in parse_dialogs(raw_text, &source.decoration) {
            match outcome {
                Ok(dialog) => {
                    source.insert(dialog);
                }
                Err(SkipReason::EmptyBlock) => {}
                Err(reason) => {
                    debug!("Skipping cue block in {:?}: {}", source.path, reason);
                    source.skipped += 1;
                }
            }
        }

        if source.skipped > 0 {
            warn!("Skipped {} unparsable cue block(s) in {:?}", source.skipped, source.path);
        }
        debug!("Parsed {} cue(s) from {:?}", source.dialogs.len(), source.path);

        source
    }

    /// Store a cue under its key. When the key is already taken, the new time
    /// line and text come first, followed by the older text with its time
    /// line removed.
    pub fn insert(&mut self, dialog: ParsedDialog) -> TimeKey {
        let mut merged = dialog.cue_block();
        if let Some(previous) = self.dialogs.remove(&dialog.key) {
            merged.push_str(&strip_time_lines(&previous));
        }
        self.dialogs.insert(dialog.key, merged);
        dialog.key
    }

    /// Stored cue block at a key
    pub fn dialog_at(&self, key: TimeKey) -> Option<&str> {
        self.dialogs.get(&key).map(String::as_str)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = TimeKey> + '_ {
        self.dialogs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Number of blocks dropped while parsing
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}

impl fmt::Display for SubtitleSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Source")?;
        writeln!(f, "Source: {:?}", self.path)?;
        writeln!(f, "Encoding: {}", self.encoding)?;
        writeln!(f, "Cues: {}", self.dialogs.len())?;
        Ok(())
    }
}
