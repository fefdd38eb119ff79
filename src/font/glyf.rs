//! # Glyph Records
//!
//! Locating glyphs through `loca` and walking composite glyph component
//! lists. The same walk drives both dependency collection and glyph ID
//! patching, so the two can never disagree about record layout.
//!
//! https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html

use crate::error::{FormatError, Result};
use crate::font::cursor::Reader;

/// Flags of a composite glyph component record.
pub mod component_flags {
    /// Arguments are words; otherwise bytes.
    pub const ARG_1_AND_2_ARE_WORDS: u16 = 1 << 0;
    pub const ARGS_ARE_XY_VALUES: u16 = 1 << 1;
    pub const ROUND_XY_TO_GRID: u16 = 1 << 2;
    /// One F2Dot14 scale follows the arguments.
    pub const WE_HAVE_A_SCALE: u16 = 1 << 3;
    /// Another component record follows this one.
    pub const MORE_COMPONENTS: u16 = 1 << 5;
    /// Separate x and y F2Dot14 scales follow the arguments.
    pub const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 1 << 6;
    /// A 2x2 F2Dot14 matrix follows the arguments.
    pub const WE_HAVE_A_TWO_BY_TWO: u16 = 1 << 7;
    pub const WE_HAVE_INSTRUCTIONS: u16 = 1 << 8;
    pub const USE_MY_METRICS: u16 = 1 << 9;
    pub const OVERLAP_COMPOUND: u16 = 1 << 10;
}

use component_flags::*;

/// Size of the glyph header: numberOfContours plus the bounding box.
const GLYPH_HEADER_LEN: usize = 10;

/// Format of the `loca` table, as stored in `head.indexToLocFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaFormat {
    /// u16 entries holding offset / 2.
    Short,
    /// u32 entries holding the byte offset.
    Long,
}

impl LocaFormat {
    /// Largest glyf length a short loca can address.
    pub const SHORT_MAX: usize = 0xFFFF * 2;

    pub fn from_head(value: i16) -> Result<Self> {
        match value {
            0 => Ok(LocaFormat::Short),
            1 => Ok(LocaFormat::Long),
            other => Err(FormatError::InvalidLocaFormat(other).into()),
        }
    }

    pub fn to_head(self) -> i16 {
        match self {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        }
    }

    /// The smallest format that can address a glyf table of `glyf_len` bytes.
    pub fn for_glyf_len(glyf_len: usize) -> Self {
        if glyf_len > Self::SHORT_MAX {
            LocaFormat::Long
        } else {
            LocaFormat::Short
        }
    }
}

/// Byte range of glyph `gid` inside the glyf table.
pub fn glyph_range(
    loca: &Reader<'_>,
    format: LocaFormat,
    gid: u16,
) -> Result<std::ops::Range<usize>> {
    let idx = gid as usize;
    let (start, end) = match format {
        LocaFormat::Short => (
            loca.u16_at(idx * 2)? as usize * 2,
            loca.u16_at(idx * 2 + 2)? as usize * 2,
        ),
        LocaFormat::Long => (
            loca.u32_at(idx * 4)? as usize,
            loca.u32_at(idx * 4 + 4)? as usize,
        ),
    };
    if end < start {
        return Err(FormatError::GlyphOutOfBounds(gid).into());
    }
    Ok(start..end)
}

/// True for a glyph record with a negative contour count.
pub fn is_composite(glyph: &[u8]) -> bool {
    glyph.len() >= 2 && i16::from_be_bytes([glyph[0], glyph[1]]) < 0
}

/// Visit every component of a composite glyph.
///
/// The callback receives the byte offset of the component's glyph index
/// (relative to the start of `glyph`) and the index itself. Simple and empty
/// glyphs have no components and the callback is never called.
pub fn walk_components<F>(glyph: &[u8], mut visit: F) -> Result<()>
where
    F: FnMut(usize, u16) -> Result<()>,
{
    if !is_composite(glyph) {
        return Ok(());
    }

    let mut reader = Reader::new(glyph);
    reader.seek(GLYPH_HEADER_LEN)?;

    loop {
        let flags = reader.u16()?;
        let gid_offset = reader.pos();
        let component = reader.u16()?;
        visit(gid_offset, component)?;

        if flags & MORE_COMPONENTS == 0 {
            return Ok(());
        }

        let args_len = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        let transform_len = if flags & WE_HAVE_A_SCALE != 0 {
            2
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            4
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            8
        } else {
            0
        };
        reader.skip(args_len + transform_len)?;
    }
}

/// Glyph indices referenced by a composite glyph, in record order.
pub fn components(glyph: &[u8]) -> Result<Vec<u16>> {
    let mut out = Vec::new();
    walk_components(glyph, |_, gid| {
        out.push(gid);
        Ok(())
    })?;
    Ok(out)
}
