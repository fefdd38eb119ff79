//! # Font Registry
//!
//! Parsed fonts keyed by family + style. Each font is parsed once on
//! registration; lookups hand out shared references that can be subset from
//! any number of threads at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::font::{parse, subset_font, Font, SubsetResult};

/// Text style bits. Only bold and italic select a different font file;
/// strike and underline are drawn, not looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(pub u8);

impl Style {
    pub const REGULAR: Style = Style(0);
    pub const BOLD: Style = Style(1 << 0);
    pub const ITALIC: Style = Style(1 << 1);
    pub const STRIKE: Style = Style(1 << 2);
    pub const UNDERLINE: Style = Style(1 << 3);

    const FONT_BITS: u8 = Self::BOLD.0 | Self::ITALIC.0;

    pub fn bold(self) -> bool {
        self.0 & Self::BOLD.0 != 0
    }

    pub fn italic(self) -> bool {
        self.0 & Self::ITALIC.0 != 0
    }

    pub fn strike(self) -> bool {
        self.0 & Self::STRIKE.0 != 0
    }

    pub fn underline(self) -> bool {
        self.0 & Self::UNDERLINE.0 != 0
    }

    /// The part of the style that picks a font file.
    pub fn font_style(self) -> Style {
        Style(self.0 & Self::FONT_BITS)
    }
}

impl std::ops::BitOr for Style {
    type Output = Style;

    fn bitor(self, rhs: Style) -> Style {
        Style(self.0 | rhs.0)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold() {
            f.write_str("b")?;
        }
        if self.italic() {
            f.write_str("i")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    /// Lowercased family name.
    pub family: String,
    pub style: Style,
}

impl FontKey {
    pub fn new(family: &str, style: Style) -> Self {
        Self {
            family: family.to_lowercase(),
            style: style.font_style(),
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family, self.style)
    }
}

/// Handle to a registered font, stable for the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub usize);

/// A registered font: the parsed model plus the bytes it came from.
#[derive(Debug, Clone)]
pub struct FontInfo {
    key: FontKey,
    font: Arc<Font>,
    data: Arc<[u8]>,
}

impl FontInfo {
    pub fn key(&self) -> &FontKey {
        &self.key
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Glyph ID and normalized advance width for a character.
    pub fn glyph_width(&self, ch: char) -> (u16, f32) {
        self.font.glyph_width(ch)
    }

    /// Subset this font to the glyphs needed for `chars`.
    pub fn subset<I>(&self, chars: I) -> Result<SubsetResult>
    where
        I: IntoIterator<Item = char>,
    {
        subset_font(&self.data, &self.font, chars)
    }
}

/// Maps family + style to parsed fonts.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Vec<FontInfo>,
    index: HashMap<FontKey, FontId>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a font. Registering the same family and style
    /// again points the key at the new font; earlier ids stay valid.
    pub fn register(&mut self, family: &str, style: Style, data: Vec<u8>) -> Result<FontId> {
        let key = FontKey::new(family, style);
        let font = parse(&data)?;

        let id = FontId(self.fonts.len());
        debug!(
            "registered font '{}' as {:?}: {} glyphs",
            key,
            id,
            font.glyph_count()
        );

        self.fonts.push(FontInfo {
            key: key.clone(),
            font: Arc::new(font),
            data: data.into(),
        });
        self.index.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, id: FontId) -> Option<&FontInfo> {
        self.fonts.get(id.0)
    }

    pub fn key(&self, id: FontId) -> Option<&FontKey> {
        self.get(id).map(FontInfo::key)
    }

    /// Look up a font by family (case-insensitive) and style. Strike and
    /// underline bits are ignored.
    pub fn resolve(&self, family: &str, style: Style) -> Option<&FontInfo> {
        let id = self.index.get(&FontKey::new(family, style))?;
        self.get(*id)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Every registered font in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FontId, &FontInfo)> {
        self.fonts.iter().enumerate().map(|(i, info)| (FontId(i), info))
    }
}
