//! # ttsubset
//!
//! TrueType font parsing and subsetting for PDF embedding.
//!
//! A document usually touches a few dozen characters of a font that ships
//! thousands of glyphs. Embedding the whole file bloats every PDF, so fonts
//! are parsed once into a compact model and then cut down, per document, to
//! exactly the glyphs the text needs. The subset is a standalone TrueType
//! file with glyph IDs renumbered from 0; the old → new mapping comes back
//! with it so width arrays and content streams can use the new IDs.
//!
//! ## Architecture
//!
//! ```text
//! TrueType bytes
//!       ↓
//!   [font::parse]       Directory, metrics, BMP cmap, advance widths
//!       ↓
//!   Font                Immutable, cached per family/style in FontRegistry
//!       ↓
//!   [font::subset]      Glyph closure, rebuilt glyf/loca/hmtx/cmap/post
//!       ↓
//! Subset bytes + GlyphRemap
//! ```
//!
//! ```no_run
//! let data = std::fs::read("DejaVuSans.ttf").unwrap();
//! let font = ttsubset::parse(&data).unwrap();
//! let subset = ttsubset::subset_font(&data, &font, "Hello".chars()).unwrap();
//! assert!(subset.ttf_data.len() < data.len());
//! ```

pub mod config;
pub mod error;
pub mod font;

pub use config::SubsetOptions;
pub use error::{FontError, FormatError};
pub use font::{
    parse, subset_font, subset_font_with, Flags, Font, FontId, FontRegistry, GlyphRemap, Metrics,
    Style, SubsetResult,
};
