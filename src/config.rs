//! # Subset Options
//!
//! Knobs for the subset generator. Defaults produce the same output as
//! [`crate::font::subset_font`]; every field can be omitted from JSON input.

use serde::{Deserialize, Serialize};

/// Byte boundary each glyph record in the generated `glyf` table is padded to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GlyphAlignment {
    /// 2 bytes, the minimum a short `loca` can address.
    Word,
    /// 4 bytes.
    #[default]
    Long,
}

impl GlyphAlignment {
    pub fn bytes(self) -> usize {
        match self {
            GlyphAlignment::Word => 2,
            GlyphAlignment::Long => 4,
        }
    }
}

/// Which `loca` format the generator may choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocaPreference {
    /// Short offsets whenever the glyf table is small enough.
    #[default]
    Auto,
    /// Always write 32-bit offsets.
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubsetOptions {
    pub glyph_alignment: GlyphAlignment,
    pub loca_format: LocaPreference,
    /// Compute `head.checkSumAdjustment` for the finished file. When off the
    /// field is left at zero.
    pub checksum_adjustment: bool,
}

impl Default for SubsetOptions {
    fn default() -> Self {
        Self {
            glyph_alignment: GlyphAlignment::default(),
            loca_format: LocaPreference::default(),
            checksum_adjustment: true,
        }
    }
}

impl SubsetOptions {
    /// Parse options from JSON, e.g. `{"glyphAlignment": "word"}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
