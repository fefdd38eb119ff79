//! # Font Model
//!
//! Parsing TrueType fonts into a compact, read-only model and subsetting
//! them for PDF embedding.
//!
//! A [`Font`] is built once per family/style by [`parse`] and never changes
//! afterwards, so the same value can back any number of concurrent
//! [`subset_font`] calls. All metrics are normalized to a 1000 unit em, which
//! is what PDF font descriptors and width arrays expect.

pub mod cursor;
pub mod glyf;
pub mod parse;
pub mod registry;
pub mod subset;
pub mod tables;

pub use glyf::LocaFormat;
pub use parse::parse;
pub use registry::{FontId, FontInfo, FontKey, FontRegistry, Style};
pub use subset::{subset_font, subset_font_with, GlyphRemap, SubsetResult};

use serde::{Deserialize, Serialize};

/// Number of entries in the codepoint → glyph table (the whole BMP).
pub(crate) const CODEPOINT_COUNT: usize = 0x10000;

/// PDF font descriptor flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(pub u32);

impl Flags {
    /// All glyphs have the same width.
    pub const FIXED_PITCH: Flags = Flags(1 << 0);
    /// Glyphs have serifs.
    pub const SERIF: Flags = Flags(1 << 1);
    /// Contains glyphs outside the Adobe standard Latin set.
    pub const SYMBOLIC: Flags = Flags(1 << 2);
    /// Glyphs resemble cursive handwriting.
    pub const SCRIPT: Flags = Flags(1 << 3);
    /// Uses the Adobe standard Latin character set.
    pub const NONSYMBOLIC: Flags = Flags(1 << 5);
    pub const ITALIC: Flags = Flags(1 << 6);
    /// No lowercase letters.
    pub const ALL_CAP: Flags = Flags(1 << 16);
    /// Lowercase letters are small capitals.
    pub const SMALL_CAP: Flags = Flags(1 << 17);
    pub const FORCE_BOLD: Flags = Flags(1 << 18);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// Font bounding box in normalized units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// Scalar metrics of a font, normalized to a 1000 unit em.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// 1000 / unitsPerEm.
    pub scale: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    /// Degrees counter-clockwise from vertical.
    pub italic_angle: f32,
    pub underline_position: f32,
    pub underline_thickness: f32,
    pub strikeout_position: f32,
    pub strikeout_size: f32,
    pub bounds: Bounds,
    pub flags: Flags,
    pub weight_class: u16,
}

/// A parsed TrueType font.
///
/// Only what's needed to lay out text and subset the font is kept: the BMP
/// character map, advance widths, and a handful of scalar metrics. The raw
/// font bytes stay with the caller and are passed back in for subsetting.
#[derive(Clone, PartialEq)]
pub struct Font {
    /// Codepoint → glyph ID for the whole BMP. 0 means unmapped.
    pub(crate) gids: Box<[u16]>,
    /// Glyph ID → advance width, normalized.
    pub(crate) widths: Vec<f32>,
    pub(crate) metrics: Metrics,
    pub(crate) glyph_count: u16,
    /// numberOfHMetrics from hhea.
    pub(crate) metric_count: u16,
    pub(crate) loca_format: LocaFormat,
    pub(crate) postscript_name: Option<String>,
}

impl Font {
    pub(crate) fn empty() -> Self {
        Self {
            gids: vec![0u16; CODEPOINT_COUNT].into_boxed_slice(),
            widths: Vec::new(),
            metrics: Metrics::default(),
            glyph_count: 0,
            metric_count: 0,
            loca_format: LocaFormat::Short,
            postscript_name: None,
        }
    }

    /// Glyph ID for a character, or 0 (`.notdef`) if the font has none.
    /// Characters outside the BMP always map to 0.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.gids.get(ch as usize).copied().unwrap_or(0)
    }

    /// Glyph ID for a BMP codepoint.
    pub fn glyph_id_for_code(&self, code: u16) -> u16 {
        self.gids[code as usize]
    }

    /// Advance width of a glyph in 1000-unit em space, 0 for unknown glyphs.
    pub fn width(&self, gid: u16) -> f32 {
        self.widths.get(gid as usize).copied().unwrap_or(0.0)
    }

    /// Glyph ID and advance width for a character.
    pub fn glyph_width(&self, ch: char) -> (u16, f32) {
        let gid = self.glyph_id(ch);
        (gid, self.width(gid))
    }

    /// Scale a font design unit value into 1000-unit em space.
    pub fn scaled(&self, value: i16) -> f32 {
        self.metrics.scale * value as f32
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    /// Number of full horizontal metrics records in `hmtx`.
    pub fn metric_count(&self) -> u16 {
        self.metric_count
    }

    pub fn loca_format(&self) -> LocaFormat {
        self.loca_format
    }

    /// PostScript name from the `name` table, if it has one.
    pub fn postscript_name(&self) -> Option<&str> {
        self.postscript_name.as_deref()
    }

    /// Every mapped codepoint with its glyph ID, in codepoint order.
    pub fn mapped_codepoints(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.gids
            .iter()
            .enumerate()
            .filter(|&(_, &gid)| gid != 0)
            .map(|(code, &gid)| (code as u16, gid))
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("postscript_name", &self.postscript_name)
            .field("glyph_count", &self.glyph_count)
            .field("metric_count", &self.metric_count)
            .field("loca_format", &self.loca_format)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
