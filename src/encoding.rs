use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::{debug, error, warn};
use thiserror::Error;

use crate::errors::MergeError;

// @module: Character encoding detection, decoding and target encoding

// @const: Bytes inspected when guessing a source encoding
pub const DETECTION_PREFIX_LEN: usize = 10_000;

// @const: Substituted for a fragment that cannot be encoded
pub const ENCODE_ERROR_PLACEHOLDER: &str =
    "An error has occurred while encoding with the specified output_encoding";

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];
const BOM_UTF32_LE: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const BOM_UTF32_BE: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Normalize an encoding label for table lookups: hyphens, underscores and
/// spaces removed, uppercased. `"utf-16_le"` becomes `"UTF16LE"`.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_uppercase()
}

fn is_ascii_label(label: &str) -> bool {
    matches!(normalize_label(label).as_str(), "ASCII" | "USASCII")
}

/// Byte-order mark for an output encoding label. Unrecognized labels get none.
pub fn bom_for_label(label: &str) -> &'static [u8] {
    match normalize_label(label).as_str() {
        "UTF8" => BOM_UTF8,
        "UTF16" | "UTF16LE" => BOM_UTF16_LE,
        "UTF16BE" => BOM_UTF16_BE,
        "UTF32" | "UTF32LE" => BOM_UTF32_LE,
        "UTF32BE" => BOM_UTF32_BE,
        _ => &[],
    }
}

/// Encoding a source subtitle file is read with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// Strict 7-bit ASCII, retried as UTF-8 when the guess was wrong
    Ascii,
    /// Any encoding from the WHATWG label table
    Labeled(&'static Encoding),
}

impl SourceEncoding {
    /// Resolve an explicit codec label such as `"cp1256"` or `"utf-8"`
    pub fn from_label(label: &str) -> Result<Self, MergeError> {
        let trimmed = label.trim();
        if is_ascii_label(trimmed) {
            return Ok(Self::Ascii);
        }
        Encoding::for_label(trimmed.as_bytes())
            .map(Self::Labeled)
            .ok_or_else(|| MergeError::UnknownEncoding(trimmed.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Labeled(encoding) => encoding.name(),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Guess the encoding of a subtitle file from the first
/// [`DETECTION_PREFIX_LEN`] bytes.
///
/// A byte-order mark wins outright. A prefix made only of ASCII bytes is
/// reported as [`SourceEncoding::Ascii`] even though later bytes may not be;
/// [`decode_source`] recovers from that case. Everything else is handed to
/// the statistical detector. The guess carries no guarantee of correctness.
pub fn detect(bytes: &[u8]) -> SourceEncoding {
    let prefix = &bytes[..bytes.len().min(DETECTION_PREFIX_LEN)];

    if let Some((encoding, _)) = Encoding::for_bom(prefix) {
        return SourceEncoding::Labeled(encoding);
    }

    if prefix.is_ascii() {
        return SourceEncoding::Ascii;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(prefix, prefix.len() == bytes.len());
    SourceEncoding::Labeled(detector.guess(None, true))
}

/// Decode a whole source file.
///
/// A leading byte-order mark overrides `encoding` and is stripped. ASCII
/// sources containing non-ASCII bytes are retried once as UTF-8 with a
/// warning. Any other decode failure is fatal.
pub fn decode_source(bytes: &[u8], encoding: SourceEncoding, path: &Path) -> Result<String, MergeError> {
    if let Some((bom_encoding, bom_len)) = Encoding::for_bom(bytes) {
        if encoding != SourceEncoding::Labeled(bom_encoding) {
            debug!(
                "Byte-order mark in {:?} overrides {} with {}",
                path,
                encoding,
                bom_encoding.name()
            );
        }
        return decode_strict(bom_encoding, &bytes[bom_len..], path);
    }

    match encoding {
        SourceEncoding::Ascii => match std::str::from_utf8(bytes) {
            Ok(text) if bytes.is_ascii() => Ok(text.to_string()),
            _ => {
                warn!(
                    "Encoding of {:?} was guessed as ascii but it contains non-ascii bytes, retrying as UTF-8",
                    path
                );
                decode_strict(UTF_8, bytes, path)
            }
        },
        SourceEncoding::Labeled(encoding) => decode_strict(encoding, bytes, path).inspect_err(|e| {
            error!("Error while decoding: {}", e);
        }),
    }
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8], path: &Path) -> Result<String, MergeError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| MergeError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        })
}

/// Text that could not be represented in the target charset
#[derive(Error, Debug)]
#[error("text contains characters that cannot be represented in {charset}")]
pub struct UnmappableText {
    /// Target charset name
    pub charset: &'static str,
}

/// Charset the merged output is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetCharset {
    /// Strict 7-bit ASCII
    Ascii,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// Any WHATWG encoding that has an encoder of its own
    Whatwg(&'static Encoding),
}

impl TargetCharset {
    /// Resolve an output encoding label. Plain `utf-16` and `utf-32` are
    /// little-endian.
    pub fn from_label(label: &str) -> Result<Self, MergeError> {
        let charset = match normalize_label(label).as_str() {
            "ASCII" | "USASCII" => Self::Ascii,
            "UTF16" | "UTF16LE" => Self::Utf16Le,
            "UTF16BE" => Self::Utf16Be,
            "UTF32" | "UTF32LE" => Self::Utf32Le,
            "UTF32BE" => Self::Utf32Be,
            _ => {
                let encoding = Encoding::for_label(label.trim().as_bytes())
                    .ok_or_else(|| MergeError::UnknownEncoding(label.to_string()))?;
                if encoding == UTF_16LE {
                    Self::Utf16Le
                } else if encoding == UTF_16BE {
                    Self::Utf16Be
                } else if encoding.output_encoding() != encoding {
                    // decode-only encodings such as "replacement"
                    return Err(MergeError::UnknownEncoding(label.to_string()));
                } else {
                    Self::Whatwg(encoding)
                }
            }
        };
        Ok(charset)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf32Le => "UTF-32LE",
            Self::Utf32Be => "UTF-32BE",
            Self::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Encode `text`, failing if any character is unmappable
    pub fn try_encode(&self, text: &str) -> Result<Vec<u8>, UnmappableText> {
        let bytes = match self {
            Self::Ascii => {
                if !text.is_ascii() {
                    return Err(UnmappableText { charset: self.name() });
                }
                text.as_bytes().to_vec()
            }
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf32Le => text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
            Self::Utf32Be => text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
            Self::Whatwg(encoding) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    return Err(UnmappableText { charset: self.name() });
                }
                bytes.into_owned()
            }
        };
        Ok(bytes)
    }
}

impl fmt::Display for TargetCharset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Encode one text fragment into the target charset.
///
/// Never fails: an unencodable fragment is logged and replaced by
/// [`ENCODE_ERROR_PLACEHOLDER`] so the rest of the output survives.
pub fn encode(text: &str, charset: TargetCharset) -> Vec<u8> {
    match charset.try_encode(text) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Problem encoding {:?} with {}: {}", text, charset, e);
            charset
                .try_encode(ENCODE_ERROR_PLACEHOLDER)
                .unwrap_or_else(|_| ENCODE_ERROR_PLACEHOLDER.as_bytes().to_vec())
        }
    }
}
