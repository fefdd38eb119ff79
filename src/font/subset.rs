//! # TrueType Font Subsetter
//!
//! Strips a TrueType font to only the glyphs actually used in a document.
//! A typical font is 50-200KB; a subset with ~100 glyphs is usually 5-15KB.
//!
//! The subsetter rebuilds a valid TrueType file with remapped glyph IDs
//! (contiguous starting from 0). PDF CIDFont width arrays and content stream
//! glyph references must use the new IDs, so the old → new mapping is
//! returned alongside the font bytes.
//!
//! ## Approach
//!
//! 1. Collect all needed glyphs (glyph 0, used glyphs, composite dependencies)
//! 2. Remap old GIDs to new contiguous GIDs in ascending old-GID order
//! 3. Rebuild glyf, loca, hmtx, cmap and post; copy the rest
//! 4. Patch head/hhea/maxp, then write the directory with checksums
//!
//! Nothing is written until step 1 is complete, since table sizes depend on
//! the final glyph count.

use std::collections::{BTreeSet, VecDeque};
use std::ops::Range;

use log::{debug, trace};

use crate::config::{LocaPreference, SubsetOptions};
use crate::error::{FontError, FormatError, Result};
use crate::font::cursor::{Reader, Writer};
use crate::font::glyf::{self, LocaFormat};
use crate::font::tables::{self, TableDirectory, TableName, TableRecord};
use crate::font::Font;

/// Result of subsetting a font.
#[derive(Debug, Clone)]
pub struct SubsetResult {
    /// The subset TrueType file bytes.
    pub ttf_data: Vec<u8>,
    /// Maps original glyph IDs to new contiguous glyph IDs.
    pub gid_remap: GlyphRemap,
}

/// Old → new glyph ID mapping of a subset.
///
/// Backed by a dense array indexed by old glyph ID, sized to the largest old
/// ID kept plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRemap {
    table: Vec<u16>,
    /// Old glyph IDs in new-ID order.
    glyphs: Vec<u16>,
}

impl GlyphRemap {
    /// `glyphs` must be sorted ascending and start with glyph 0.
    fn new(glyphs: Vec<u16>) -> Result<Self> {
        if glyphs.first() != Some(&0) {
            return Err(FontError::Invariant("glyph 0 missing from subset"));
        }
        if glyphs.len() > u16::MAX as usize {
            return Err(FontError::Invariant("subset has more glyphs than a font can hold"));
        }

        let max = glyphs.last().copied().unwrap_or(0) as usize;
        let mut table = vec![0u16; max + 1];
        for (new_gid, &old_gid) in glyphs.iter().enumerate() {
            table[old_gid as usize] = new_gid as u16;
        }
        Ok(Self { table, glyphs })
    }

    /// New ID of an old glyph, or `None` if the glyph isn't in the subset.
    pub fn get(&self, old_gid: u16) -> Option<u16> {
        let new_gid = *self.table.get(old_gid as usize)?;
        (self.glyphs.get(new_gid as usize) == Some(&old_gid)).then_some(new_gid)
    }

    /// The raw remap array. Entries for glyphs not in the subset are 0.
    pub fn as_slice(&self) -> &[u16] {
        &self.table
    }

    /// Old glyph IDs in new-ID order: `old_glyph_ids()[new] == old`.
    pub fn old_glyph_ids(&self) -> &[u16] {
        &self.glyphs
    }

    /// Number of glyphs in the subset.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn require(&self, old_gid: u16) -> Result<u16> {
        self.get(old_gid)
            .ok_or(FontError::Invariant("glyph referenced outside the subset"))
    }
}

/// Subset a TrueType font to the glyphs needed for `chars`.
///
/// `data` must be the bytes `font` was parsed from. Characters outside the
/// BMP, and characters the font has no glyph for, are ignored.
pub fn subset_font<I>(data: &[u8], font: &Font, chars: I) -> Result<SubsetResult>
where
    I: IntoIterator<Item = char>,
{
    subset_font_with(data, font, chars, &SubsetOptions::default())
}

/// [`subset_font`] with explicit options.
pub fn subset_font_with<I>(
    data: &[u8],
    font: &Font,
    chars: I,
    options: &SubsetOptions,
) -> Result<SubsetResult>
where
    I: IntoIterator<Item = char>,
{
    let codes: BTreeSet<u16> = chars
        .into_iter()
        .filter_map(|ch| u16::try_from(ch as u32).ok())
        // 0xFFFF is the cmap sentinel and can never be reached in the subset
        .filter(|&code| code != 0xFFFF)
        .collect();

    let tables = TableDirectory::parse(data)?;
    let glyf = Reader::for_table(data, tables.require(TableName::Glyf)?)?;
    let loca = Reader::for_table(data, tables.require(TableName::Loca)?)?;

    let maxp = Reader::for_table(data, tables.require(TableName::Maxp)?)?;
    if maxp.u16_at(4)? != font.glyph_count {
        return Err(FontError::Invariant("font model was not parsed from these bytes"));
    }

    let generator = Generator {
        data,
        font,
        options,
        tables,
        glyf,
        loca,
    };
    generator.generate(&codes)
}

// ─── Generator ──────────────────────────────────────────────────

struct Generator<'a> {
    data: &'a [u8],
    font: &'a Font,
    options: &'a SubsetOptions,
    tables: TableDirectory,
    glyf: Reader<'a>,
    loca: Reader<'a>,
}

/// Where each kept glyph comes from and where it lands.
struct GlyfPlan {
    sources: Vec<Range<usize>>,
    /// glyphCount + 1 cumulative offsets into the new glyf table.
    offsets: Vec<u32>,
    format: LocaFormat,
}

/// Horizontal metrics of the subset in new-ID order.
struct HmtxPlan {
    metrics: Vec<(u16, i16)>,
    /// numberOfHMetrics for the new hhea.
    long_count: u16,
}

impl<'a> Generator<'a> {
    fn generate(&self, codes: &BTreeSet<u16>) -> Result<SubsetResult> {
        let gid_remap = GlyphRemap::new(self.collect_glyphs(codes)?)?;
        debug!(
            "subsetting {} codepoints to {} of {} glyphs",
            codes.len(),
            gid_remap.len(),
            self.font.glyph_count
        );

        let glyf_plan = self.plan_glyf(&gid_remap)?;
        let hmtx_plan = self.plan_hmtx(&gid_remap)?;

        let included: Vec<TableName> = TableName::ALL
            .into_iter()
            .filter(|name| name.is_required() || self.tables.contains(*name))
            .collect();
        let table_count = included.len() as u16;
        let dir_len = 12 + 16 * included.len();

        let copied_len: usize = included
            .iter()
            .filter_map(|&name| self.tables.get(name))
            .map(|record| record.padded_length() as usize)
            .sum();
        let mut writer = Writer::with_capacity(dir_len + copied_len);

        // Reserve the header and directory, written last.
        writer.skip(dir_len);

        let mut out = TableDirectory::default();
        for &name in &included {
            let offset = writer.pos();
            match name {
                TableName::Cmap => self.write_cmap(&mut writer, codes, &gid_remap)?,
                TableName::Glyf => self.write_glyf(&mut writer, &glyf_plan, &gid_remap)?,
                TableName::Loca => write_loca(&mut writer, &glyf_plan),
                TableName::Hmtx => write_hmtx(&mut writer, &hmtx_plan),
                TableName::Post => self.write_post(&mut writer)?,
                _ => self.copy_table(&mut writer, name)?,
            }
            let record = TableRecord {
                offset: offset as u32,
                length: (writer.pos() - offset) as u32,
            };
            trace!("wrote '{}': {} bytes at {:#x}", name.tag(), record.length, record.offset);
            out.set(name, record);
            writer.align(4);
        }

        let glyph_count = gid_remap.len() as u16;
        patch(&mut writer, &out, TableName::Head, 8, Patch::U32(0))?;
        patch(&mut writer, &out, TableName::Head, 50, Patch::U16(glyf_plan.format.to_head() as u16))?;
        patch(&mut writer, &out, TableName::Hhea, 34, Patch::U16(hmtx_plan.long_count))?;
        patch(&mut writer, &out, TableName::Maxp, 4, Patch::U16(glyph_count))?;

        write_directory(&mut writer, &out, table_count)?;

        if self.options.checksum_adjustment {
            let head = out.require(TableName::Head)?;
            let adjustment = 0xB1B0_AFBAu32.wrapping_sub(tables::checksum(writer.as_bytes()));
            writer.put_u32_at(head.offset as usize + 8, adjustment)?;
        }

        let ttf_data = writer.into_bytes();
        debug!("subset font is {} bytes ({} tables)", ttf_data.len(), table_count);

        Ok(SubsetResult { ttf_data, gid_remap })
    }

    // ─── Glyph Closure ──────────────────────────────────────────

    /// Raw bytes of one glyph record.
    fn glyph(&self, gid: u16) -> Result<&'a [u8]> {
        if gid >= self.font.glyph_count {
            return Err(FormatError::GlyphOutOfBounds(gid).into());
        }
        let range = glyf::glyph_range(&self.loca, self.font.loca_format, gid)?;
        self.glyf
            .read_at(range.start, range.len())
            .map_err(|_| FormatError::GlyphOutOfBounds(gid).into())
    }

    /// Glyph 0, the glyphs of every requested codepoint, and everything they
    /// reference as composite components, sorted ascending.
    fn collect_glyphs(&self, codes: &BTreeSet<u16>) -> Result<Vec<u16>> {
        // Glyph 0 is required:
        // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM07/appendixB.html
        let mut seen = BTreeSet::from([0u16]);
        seen.extend(codes.iter().map(|&code| self.font.glyph_id_for_code(code)));

        let mut queue: VecDeque<u16> = seen.iter().copied().collect();
        while let Some(gid) = queue.pop_front() {
            let glyph = self.glyph(gid)?;
            glyf::walk_components(glyph, |_, component| {
                if component >= self.font.glyph_count {
                    return Err(FormatError::DanglingComponent { glyph: gid, component }.into());
                }
                if seen.insert(component) {
                    queue.push_back(component);
                }
                Ok(())
            })?;
        }

        Ok(seen.into_iter().collect())
    }

    // ─── Table Planning ─────────────────────────────────────────

    fn plan_glyf(&self, remap: &GlyphRemap) -> Result<GlyfPlan> {
        let align = self.options.glyph_alignment.bytes();

        let mut sources = Vec::with_capacity(remap.len());
        let mut offsets = Vec::with_capacity(remap.len() + 1);
        let mut next = 0usize;
        for &old_gid in remap.old_glyph_ids() {
            let range = glyf::glyph_range(&self.loca, self.font.loca_format, old_gid)?;
            offsets.push(next as u32);
            next += range.len().next_multiple_of(align);
            sources.push(range);
        }
        offsets.push(next as u32);

        let format = match self.options.loca_format {
            LocaPreference::Auto => LocaFormat::for_glyf_len(next),
            LocaPreference::Long => LocaFormat::Long,
        };

        Ok(GlyfPlan { sources, offsets, format })
    }

    /// Advance and left side bearing for each new glyph. The emitted
    /// numberOfHMetrics is the shortest prefix after which every glyph shares
    /// the last long metric's advance.
    fn plan_hmtx(&self, remap: &GlyphRemap) -> Result<HmtxPlan> {
        const STRIDE: usize = 4;

        let hmtx = Reader::for_table(self.data, self.tables.require(TableName::Hmtx)?)?;
        let long_count = self.font.metric_count as usize;
        let bearings = long_count * STRIDE;

        let mut metrics = Vec::with_capacity(remap.len());
        for &old_gid in remap.old_glyph_ids() {
            let idx = old_gid as usize;
            let metric = if idx < long_count {
                (hmtx.u16_at(idx * STRIDE)?, hmtx.i16_at(idx * STRIDE + 2)?)
            } else {
                // Past the long metrics: shared final advance, own bearing.
                let advance = hmtx.u16_at((long_count - 1) * STRIDE)?;
                (advance, hmtx.i16_at(bearings + (idx - long_count) * 2)?)
            };
            metrics.push(metric);
        }

        let last_advance = metrics.last().map(|m| m.0).unwrap_or(0);
        let mut long_count = metrics.len();
        while long_count > 1 && metrics[long_count - 2].0 == last_advance {
            long_count -= 1;
        }

        Ok(HmtxPlan {
            metrics,
            long_count: long_count as u16,
        })
    }

    // ─── Table Writing ──────────────────────────────────────────

    fn copy_table(&self, writer: &mut Writer, name: TableName) -> Result<()> {
        let record = self.tables.require(name)?;
        writer.write(Reader::for_table(self.data, record)?.bytes());
        Ok(())
    }

    /// Glyph records in new-ID order, with composite component IDs remapped.
    fn write_glyf(&self, writer: &mut Writer, plan: &GlyfPlan, remap: &GlyphRemap) -> Result<()> {
        let align = self.options.glyph_alignment.bytes();
        let table_start = writer.pos();

        for (range, &offset) in plan.sources.iter().zip(&plan.offsets) {
            let glyph = self.glyf.read_at(range.start, range.len())?;
            let start = writer.pos();
            debug_assert_eq!(start - table_start, offset as usize);

            writer.write(glyph);
            glyf::walk_components(glyph, |gid_offset, old_gid| {
                writer.put_u16_at(start + gid_offset, remap.require(old_gid)?)
            })?;
            writer.align(align);
        }

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html
    fn write_cmap(&self, writer: &mut Writer, codes: &BTreeSet<u16>, remap: &GlyphRemap) -> Result<()> {
        let mut mapped = Vec::with_capacity(codes.len());
        for &code in codes {
            let old_gid = self.font.glyph_id_for_code(code);
            // Unmapped characters fall back to glyph 0 without a cmap entry
            if old_gid == 0 {
                continue;
            }
            mapped.push((code, remap.require(old_gid)?));
        }

        let segments = cmap_segments(&mapped);
        let seg_count = segments.len();
        if seg_count > MAX_CMAP_SEGMENTS {
            return Err(FontError::CmapOverflow { segments: seg_count });
        }

        const HEADER_LEN: u32 = 4; // version, numberSubtables
        const ENCODING_RECORD_LEN: u32 = 8; // platformID, encodingID, offset
        const PLATFORM_MICROSOFT: u16 = 3;
        const ENCODING_UNICODE_BMP: u16 = 1;

        let seg_count = seg_count as u16;
        let seg_count_x2 = seg_count * 2;
        let (search_range, entry_selector, range_shift) = tables::search_params(seg_count, 2);

        writer.u16(0); // version
        writer.u16(1); // numberSubtables
        writer.u16(PLATFORM_MICROSOFT);
        writer.u16(ENCODING_UNICODE_BMP);
        writer.u32(HEADER_LEN + ENCODING_RECORD_LEN);

        writer.u16(4); // format
        writer.u16(format4_len(seg_count as usize) as u16);
        writer.u16(0); // language
        writer.u16(seg_count_x2);
        writer.u16(search_range);
        writer.u16(entry_selector);
        writer.u16(range_shift);

        let ends: Vec<u16> = segments.iter().map(|s| s.end).collect();
        let starts: Vec<u16> = segments.iter().map(|s| s.start).collect();
        let deltas: Vec<u16> = segments.iter().map(|s| s.delta).collect();
        writer.u16_array(&ends);
        writer.u16(0); // reservedPad
        writer.u16_array(&starts);
        writer.u16_array(&deltas);
        writer.skip(seg_count_x2 as usize); // idRangeOffset, all 0

        Ok(())
    }

    // https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6post.html
    fn write_post(&self, writer: &mut Writer) -> Result<()> {
        let post = Reader::for_table(self.data, self.tables.require(TableName::Post)?)?;

        // italicAngle, underlinePosition, underlineThickness, isFixedPitch
        const KEPT_LEN: usize = 12;

        writer.u32(0x0003_0000); // format 3.0, no glyph names
        writer.write(post.read_at(4, KEPT_LEN)?);
        writer.skip(16); // [min,max]MemType42 + [min,max]MemType1, left as 0

        Ok(())
    }
}

fn write_loca(writer: &mut Writer, plan: &GlyfPlan) {
    for &offset in &plan.offsets {
        match plan.format {
            LocaFormat::Short => writer.u16((offset / 2) as u16),
            LocaFormat::Long => writer.u32(offset),
        }
    }
}

fn write_hmtx(writer: &mut Writer, plan: &HmtxPlan) {
    for (i, &(advance, lsb)) in plan.metrics.iter().enumerate() {
        if i < plan.long_count as usize {
            writer.u16(advance);
        }
        writer.i16(lsb);
    }
}

fn write_directory(writer: &mut Writer, out: &TableDirectory, table_count: u16) -> Result<()> {
    let entries: Vec<_> = out
        .iter()
        .map(|(name, record)| {
            let padded = record.offset as usize..(record.offset + record.padded_length()) as usize;
            let sum = tables::checksum(&writer.as_bytes()[padded]);
            (name.tag(), sum, record)
        })
        .collect();

    if entries.len() != table_count as usize {
        return Err(FontError::Invariant("directory does not match table count"));
    }

    let (search_range, entry_selector, range_shift) = tables::search_params(table_count, 16);

    writer.seek(0);
    writer.u32(0x0001_0000); // TrueType identifier
    writer.u16(table_count);
    writer.u16(search_range);
    writer.u16(entry_selector);
    writer.u16(range_shift);

    for (tag, sum, record) in entries {
        writer.tag(tag);
        writer.u32(sum);
        writer.u32(record.offset);
        writer.u32(record.length);
    }

    Ok(())
}

enum Patch {
    U16(u16),
    U32(u32),
}

/// Overwrite a field of an already-written table, checking it lies inside
/// that table.
fn patch(writer: &mut Writer, out: &TableDirectory, name: TableName, at: u32, value: Patch) -> Result<()> {
    let record = out.require(name)?;
    let size = match value {
        Patch::U16(_) => 2,
        Patch::U32(_) => 4,
    };
    if at + size > record.length {
        return Err(FormatError::TableTooShort {
            tag: name.tag(),
            length: record.length,
            expected: at + size,
        }
        .into());
    }

    let pos = (record.offset + at) as usize;
    match value {
        Patch::U16(v) => writer.put_u16_at(pos, v),
        Patch::U32(v) => writer.put_u32_at(pos, v),
    }
}

// ─── cmap Segments ──────────────────────────────────────────────

/// One format 4 segment mapping `start..=end` to `code + delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: u16,
    end: u16,
    delta: u16,
}

/// Byte length of a format 4 subtable with `seg_count` segments and no
/// glyphIdArray: 7 header fields, reservedPad, and four arrays.
fn format4_len(seg_count: usize) -> usize {
    16 + seg_count * 8
}

/// Most segments whose format 4 length still fits in a u16.
const MAX_CMAP_SEGMENTS: usize = (u16::MAX as usize - 16) / 8;

/// Merge `(code, new_gid)` pairs, sorted by code, into delta segments plus
/// the trailing 0xFFFF sentinel. A run continues only while both the code and
/// the glyph ID go up by one, so a single delta covers the whole segment.
fn cmap_segments(mapped: &[(u16, u16)]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut last_gid = 0u16;

    for &(code, gid) in mapped {
        if let Some(seg) = segments.last_mut() {
            if code == seg.end.wrapping_add(1) && gid == last_gid.wrapping_add(1) {
                seg.end = code;
                last_gid = gid;
                continue;
            }
        }
        // Delta arithmetic is modulo 0x10000
        segments.push(Segment {
            start: code,
            end: code,
            delta: gid.wrapping_sub(code),
        });
        last_gid = gid;
    }

    // Maps 0xFFFF to glyph 0
    segments.push(Segment {
        start: 0xFFFF,
        end: 0xFFFF,
        delta: 1,
    });
    segments
}
