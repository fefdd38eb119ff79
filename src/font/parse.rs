//! # TrueType Parser
//!
//! Decodes the handful of tables needed to measure text and subset a font:
//! `head`, `hhea`, `OS/2`, `post`, `maxp`, `cmap`, `hmtx`, and the PostScript
//! name from `name`. Every distance is scaled into a 1000 unit em as it is
//! read.
//!
//! Parsing either produces a complete [`Font`] or fails with the reason; a
//! half-populated model is never handed out.

use log::{debug, warn};

use crate::error::{FontError, FormatError, Result};
use crate::font::cursor::Reader;
use crate::font::glyf::LocaFormat;
use crate::font::tables::{TableDirectory, TableName, TableRecord};
use crate::font::{Bounds, Flags, Font};

/// Parse a TrueType font.
pub fn parse(data: &[u8]) -> Result<Font> {
    let tables = TableDirectory::parse(data)?;
    debug!("parsing TrueType font with {} known tables", tables.len());

    let mut parser = Parser {
        data,
        tables,
        font: Font::empty(),
    };
    parser.parse()?;

    let font = parser.font;
    debug!(
        "parsed font {:?}: {} glyphs, {} horizontal metrics",
        font.postscript_name, font.glyph_count, font.metric_count
    );
    Ok(font)
}

/// Encoding records we know how to read a format 4 subtable from. Any
/// Unicode platform encoding is accepted; the format check decides.
fn is_unicode_bmp(platform: u16, encoding: u16) -> bool {
    const PLATFORM_UNICODE: u16 = 0;
    const PLATFORM_MICROSOFT: u16 = 3;
    const ENCODING_MS_UNICODE_BMP: u16 = 1;

    platform == PLATFORM_UNICODE
        || (platform == PLATFORM_MICROSOFT && encoding == ENCODING_MS_UNICODE_BMP)
}

struct Parser<'a> {
    data: &'a [u8],
    tables: TableDirectory,
    font: Font,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Result<()> {
        self.parse_head()?;
        self.parse_hhea()?;
        self.parse_os2()?;
        self.parse_post()?;
        self.parse_maxp()?;
        self.parse_cmap()?;
        self.parse_hmtx()?;
        self.parse_name()?;
        Ok(())
    }

    /// A reader over a table, checking it is at least `min_len` bytes.
    fn table(&self, name: TableName, min_len: u32) -> Result<Reader<'a>> {
        let record = self.tables.require(name)?;
        self.table_record(name, record, min_len)
    }

    fn table_record(&self, name: TableName, record: TableRecord, min_len: u32) -> Result<Reader<'a>> {
        if record.length < min_len {
            return Err(FormatError::TableTooShort {
                tag: name.tag(),
                length: record.length,
                expected: min_len,
            }
            .into());
        }
        Reader::for_table(self.data, record)
    }

    fn fword_scaled(&self, reader: &mut Reader<'_>) -> Result<f32> {
        Ok(self.font.scaled(reader.fword()?))
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html
    fn parse_head(&mut self) -> Result<()> {
        let mut r = self.table(TableName::Head, 54)?;
        r.seek(18)?;

        let units_per_em = r.u16()?;
        if units_per_em == 0 {
            return Err(FormatError::ZeroUnitsPerEm.into());
        }
        self.font.metrics.scale = 1000.0 / units_per_em as f32;

        r.skip(16)?; // created + modified dates

        let min_x = self.fword_scaled(&mut r)?;
        let min_y = self.fword_scaled(&mut r)?;
        let max_x = self.fword_scaled(&mut r)?;
        let max_y = self.fword_scaled(&mut r)?;
        self.font.metrics.bounds = Bounds {
            min: [min_x, min_y],
            max: [max_x, max_y],
        };

        const MAC_STYLE_ITALIC: u16 = 1 << 1;
        if r.u16()? & MAC_STYLE_ITALIC != 0 {
            self.font.metrics.flags.insert(Flags::ITALIC);
        }

        r.skip(4)?; // lowestRecPPEM, fontDirectionHint

        self.font.loca_format = LocaFormat::from_head(r.i16()?)?;

        let glyph_data_format = r.i16()?;
        if glyph_data_format != 0 {
            return Err(FormatError::GlyphDataFormat(glyph_data_format).into());
        }

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html
    fn parse_hhea(&mut self) -> Result<()> {
        let mut r = self.table(TableName::Hhea, 36)?;
        r.seek(4)?;

        self.font.metrics.ascent = self.fword_scaled(&mut r)?;
        self.font.metrics.descent = self.fword_scaled(&mut r)?;

        r.seek(32)?;
        let metric_data_format = r.i16()?;
        if metric_data_format != 0 {
            return Err(FormatError::MetricDataFormat(metric_data_format).into());
        }

        self.font.metric_count = r.u16()?;
        if self.font.metric_count == 0 {
            return Err(FormatError::NoHorizontalMetrics.into());
        }

        Ok(())
    }

    // https://learn.microsoft.com/en-us/typography/opentype/spec/os2
    fn parse_os2(&mut self) -> Result<()> {
        let Some(record) = self.tables.get(TableName::Os2) else {
            self.font.metrics.cap_height = self.font.metrics.ascent;
            return Ok(());
        };
        let mut r = self.table_record(TableName::Os2, record, 68)?;

        let version = r.u16()?;
        r.skip(2)?; // xAvgCharWidth
        self.font.metrics.weight_class = r.u16()?;
        r.skip(2)?; // usWidthClass

        // Bit 1: restricted license, must not be embedded without permission.
        // Bit 8: no subsetting. Bit 9: bitmap embedding only.
        const FS_TYPE_RESTRICTED: u16 = 1 << 1;
        const FS_TYPE_NO_SUBSETTING: u16 = 1 << 8;
        const FS_TYPE_BITMAP_ONLY: u16 = 1 << 9;

        let fs_type = r.u16()?;
        if fs_type & (FS_TYPE_RESTRICTED | FS_TYPE_NO_SUBSETTING | FS_TYPE_BITMAP_ONLY) != 0 {
            return Err(FontError::Restricted { fs_type });
        }

        r.skip(16)?; // sub/superscript size and offsets

        self.font.metrics.strikeout_size = self.fword_scaled(&mut r)?;
        self.font.metrics.strikeout_position = self.fword_scaled(&mut r)?;

        r.skip(
            2 + // sFamilyClass
            10 + // panose
            16 + // ulUnicodeRange1-4
            4 + // achVendID
            2 + // fsSelection
            2 + // usFirstCharIndex
            2, // usLastCharIndex
        )?;

        // Apple's original 68 byte version 0 table stops here.
        if r.remaining() >= 4 {
            let typo_ascender = self.fword_scaled(&mut r)?;
            if self.font.metrics.ascent == 0.0 {
                self.font.metrics.ascent = typo_ascender;
            }
            let typo_descender = self.fword_scaled(&mut r)?;
            if self.font.metrics.descent == 0.0 {
                self.font.metrics.descent = typo_descender;
            }
        }
        self.font.metrics.cap_height = self.font.metrics.ascent;

        if version < 2 {
            return Ok(());
        }

        r.skip(
            2 + // sTypoLineGap
            2 + // usWinAscent
            2 + // usWinDescent
            8 + // ulCodePageRange1-2
            2, // sxHeight
        )?;
        self.font.metrics.cap_height = self.fword_scaled(&mut r)?;

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6post.html
    fn parse_post(&mut self) -> Result<()> {
        let mut r = self.table(TableName::Post, 16)?;
        r.skip(4)?; // format

        self.font.metrics.italic_angle = r.fixed()?;
        self.font.metrics.underline_position = self.fword_scaled(&mut r)?;
        self.font.metrics.underline_thickness = self.fword_scaled(&mut r)?;

        if r.u32()? != 0 {
            self.font.metrics.flags.insert(Flags::FIXED_PITCH);
        }
        if self.font.metrics.italic_angle != 0.0 {
            self.font.metrics.flags.insert(Flags::ITALIC);
        }

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html
    fn parse_maxp(&mut self) -> Result<()> {
        let mut r = self.table(TableName::Maxp, 6)?;
        r.skip(4)?; // version

        self.font.glyph_count = r.u16()?;
        self.font.widths = vec![0.0; self.font.glyph_count as usize];

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html
    fn parse_cmap(&mut self) -> Result<()> {
        const FORMAT_4: u16 = 4;
        const INVALID_RANGE_OFFSET: usize = 0xFFFF;

        let cmap = self.table(TableName::Cmap, 4)?;
        let mut r = cmap.clone();
        r.skip(2)?; // version
        let subtable_count = r.u16()?;

        // The first Unicode record whose subtable is format 4 wins. If only
        // other formats are on offer, report the first one we saw.
        let mut subtable = None;
        let mut other_format = None;
        for _ in 0..subtable_count {
            let platform = r.u16()?;
            let encoding = r.u16()?;
            let offset = r.u32()? as usize;
            if !is_unicode_bmp(platform, encoding) {
                continue;
            }
            let format = cmap.u16_at(offset)?;
            if format == FORMAT_4 {
                subtable = Some(offset);
                break;
            }
            other_format.get_or_insert(format);
        }

        let offset = match (subtable, other_format) {
            (Some(offset), _) => offset,
            (None, Some(format)) => return Err(FormatError::UnsupportedCmapFormat(format).into()),
            (None, None) => return Err(FormatError::NoUnicodeCmap.into()),
        };

        let mut r = cmap;
        r.seek(offset + 6)?; // format, length, language
        let seg_count = (r.u16()? >> 1) as usize;
        r.skip(6)?; // searchRange, entrySelector, rangeShift

        let end_codes = r.pos();
        let start_codes = end_codes + seg_count * 2 + 2; // + reservedPad
        let deltas = start_codes + seg_count * 2;
        let range_offsets = deltas + seg_count * 2;

        let mut out_of_range = 0usize;
        let mut past_table = 0usize;
        for seg in 0..seg_count {
            let end = r.u16_at(end_codes + seg * 2)?;
            let start = r.u16_at(start_codes + seg * 2)?;
            let delta = r.u16_at(deltas + seg * 2)?;
            let range_offset_pos = range_offsets + seg * 2;
            let range_offset = r.u16_at(range_offset_pos)? as usize;
            if range_offset == INVALID_RANGE_OFFSET {
                // Written on the sentinel by some broken generators
                continue;
            }

            for code in start..=end {
                let gid = if range_offset == 0 {
                    code.wrapping_add(delta)
                } else {
                    let pos = range_offset_pos + range_offset + 2 * (code - start) as usize;
                    match r.u16_at(pos) {
                        Ok(0) => 0,
                        Ok(gid) => gid.wrapping_add(delta),
                        Err(_) => {
                            past_table += 1;
                            0
                        }
                    }
                };

                self.font.gids[code as usize] = if gid < self.font.glyph_count {
                    gid
                } else {
                    out_of_range += 1;
                    0
                };
            }
        }

        if out_of_range > 0 {
            warn!("{} cmap entries point past the last glyph; treating as unmapped", out_of_range);
        }
        if past_table > 0 {
            warn!("{} cmap entries index past the glyph id array; treating as unmapped", past_table);
        }

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html
    fn parse_hmtx(&mut self) -> Result<()> {
        const STRIDE: usize = 4;

        let r = self.table(TableName::Hmtx, 0)?;
        let last_metric = self.font.metric_count.saturating_sub(1);

        for gid in 0..self.font.glyph_count {
            let idx = gid.min(last_metric) as usize;
            let advance = r.u16_at(idx * STRIDE)?;
            self.font.widths[gid as usize] = self.font.metrics.scale * advance as f32;
        }

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6name.html
    fn parse_name(&mut self) -> Result<()> {
        const NAME_ID_POSTSCRIPT: u16 = 6;
        const PLATFORM_MACINTOSH: u16 = 1;
        const PLATFORM_MICROSOFT: u16 = 3;

        let mut r = self.table(TableName::Name, 6)?;
        r.skip(2)?; // format
        let count = r.u16()?;
        let storage = r.u16()? as usize;

        let mut mac_name = None;
        for _ in 0..count {
            let platform = r.u16()?;
            let _encoding = r.u16()?;
            let _language = r.u16()?;
            let name_id = r.u16()?;
            let length = r.u16()? as usize;
            let offset = r.u16()? as usize;

            if name_id != NAME_ID_POSTSCRIPT {
                continue;
            }

            // Names with bad offsets are skipped rather than failing the font.
            let Ok(bytes) = r.read_at(storage + offset, length) else {
                continue;
            };

            match platform {
                PLATFORM_MICROSOFT => {
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|c| u16::from_be_bytes([c[0], c[1]]))
                        .collect();
                    self.font.postscript_name = Some(String::from_utf16_lossy(&units));
                    return Ok(());
                }
                PLATFORM_MACINTOSH if mac_name.is_none() => {
                    mac_name = Some(bytes.iter().map(|&b| b as char).collect::<String>());
                }
                _ => {}
            }
        }

        self.font.postscript_name = mac_name;
        Ok(())
    }
}
