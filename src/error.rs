//! Structured error types for font parsing and subsetting.
//!
//! Every public operation returns [`FontError`]. Malformed input is reported
//! through [`FormatError`] so callers can match on the exact reason, while
//! embedding restrictions get their own variant because the fix is a
//! licensing question, not a broken file.

use crate::font::tables::Tag;
use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FontError {
    /// The font bytes are not a TrueType font we can read.
    #[error("malformed font: {0}")]
    Format(#[from] FormatError),

    /// The OS/2 `fsType` bits forbid embedding or subsetting this font.
    #[error("font embedding is restricted by its license (fsType {fs_type:#06x})")]
    Restricted { fs_type: u16 },

    /// The requested codepoints need more format 4 segments than fit in a
    /// single subtable.
    #[error("{segments} cmap segments do not fit in a format 4 subtable")]
    CmapOverflow { segments: usize },

    /// An internal invariant failed while generating a subset. The output
    /// would have been a malformed font, so nothing is returned.
    #[error("subset invariant violated: {0}")]
    Invariant(&'static str),
}

/// Reasons a font file is rejected as malformed or unsupported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected TrueType font, got type {0:#010x}")]
    NotTrueType(u32),

    #[error("missing required table '{0}'")]
    MissingTable(Tag),

    #[error("table '{tag}' at {offset:#x} with length {length} extends past end of file")]
    TableOutOfBounds { tag: Tag, offset: u32, length: u32 },

    #[error("read of {len} bytes at offset {offset:#x} is out of bounds")]
    Truncated { offset: usize, len: usize },

    #[error("table '{tag}' is {length} bytes, expected at least {expected}")]
    TableTooShort { tag: Tag, length: u32, expected: u32 },

    #[error("unitsPerEm in 'head' table is zero")]
    ZeroUnitsPerEm,

    #[error("invalid indexToLocFormat in 'head' table: {0}")]
    InvalidLocaFormat(i16),

    #[error("invalid glyphDataFormat in 'head' table: {0}")]
    GlyphDataFormat(i16),

    #[error("invalid metricDataFormat in 'hhea' table: {0}")]
    MetricDataFormat(i16),

    #[error("numberOfHMetrics is zero in 'hhea' table")]
    NoHorizontalMetrics,

    #[error("no supported unicode character map table found")]
    NoUnicodeCmap,

    #[error("expected cmap table format 4, found: {0}")]
    UnsupportedCmapFormat(u16),

    #[error("glyph {0} is outside the 'loca' table")]
    GlyphOutOfBounds(u16),

    #[error("composite glyph {glyph} references missing component {component}")]
    DanglingComponent { glyph: u16, component: u16 },
}

pub type Result<T, E = FontError> = std::result::Result<T, E>;
