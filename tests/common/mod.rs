//! Synthetic TrueType fonts for integration tests.
//!
//! Real fonts are large and licensed; these are tiny, fully known, and valid
//! enough for ttf-parser to read. The default fixture has simple glyphs,
//! nested composites with every argument/transform layout, an empty glyph,
//! trailing hmtx bearings, and a cmap using both delta and glyphIdArray
//! segments.

#![allow(dead_code)]

use ttsubset::font::glyf::component_flags::*;

// ─── Glyph Records ──────────────────────────────────────────────

/// One contour, three on-curve points: 29 bytes, deliberately odd.
pub fn simple_glyph(width: i16) -> Vec<u8> {
    let mut g = Vec::new();
    g.extend(1i16.to_be_bytes()); // numberOfContours
    g.extend(0i16.to_be_bytes()); // xMin
    g.extend(0i16.to_be_bytes()); // yMin
    g.extend(width.to_be_bytes()); // xMax
    g.extend(700i16.to_be_bytes()); // yMax
    g.extend(2u16.to_be_bytes()); // endPtsOfContours[0]
    g.extend(0u16.to_be_bytes()); // instructionLength
    g.extend([0x01, 0x01, 0x01]); // flags: on curve, long coordinates
    for x in [0i16, width / 2, width / 2] {
        g.extend(x.to_be_bytes());
    }
    for y in [0i16, 700, -700] {
        g.extend(y.to_be_bytes());
    }
    assert_eq!(g.len(), 29);
    g
}

/// A composite glyph from `(glyph id, extra flags)` parts. The extra flags
/// pick the argument width and transform layout of each record.
pub fn composite_glyph(parts: &[(u16, u16)]) -> Vec<u8> {
    let mut g = Vec::new();
    g.extend((-1i16).to_be_bytes());
    g.extend([0u8; 8]); // bbox

    for (i, &(gid, extra)) in parts.iter().enumerate() {
        let mut flags = extra | ARGS_ARE_XY_VALUES;
        if i + 1 < parts.len() {
            flags |= MORE_COMPONENTS;
        }
        g.extend(flags.to_be_bytes());
        g.extend(gid.to_be_bytes());

        if flags & ARG_1_AND_2_ARE_WORDS != 0 {
            g.extend(120i16.to_be_bytes());
            g.extend(40i16.to_be_bytes());
        } else {
            g.extend([12u8, 4]);
        }

        let one = 0x4000u16.to_be_bytes(); // 1.0 in F2Dot14
        if flags & WE_HAVE_A_SCALE != 0 {
            g.extend(one);
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            g.extend(one);
            g.extend(one);
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            g.extend(one);
            g.extend([0u8; 4]);
            g.extend(one);
        }
    }
    g
}

// ─── Font Builder ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TestFont {
    pub units_per_em: u16,
    pub glyphs: Vec<Vec<u8>>,
    /// One advance per long horizontal metric; its length is numberOfHMetrics.
    pub advances: Vec<u16>,
    /// Left side bearing per glyph.
    pub bearings: Vec<i16>,
    /// Codepoints mapped through a delta segment each.
    pub cmap: Vec<(u16, u16)>,
    /// Contiguous codepoints mapped through one glyphIdArray segment.
    pub indirect: Vec<(u16, u16)>,
    /// Put a platform 0 format 6 subtable ahead of the format 4 one.
    pub format6_first: bool,
    pub long_loca: bool,
    /// `(version, fsType)` of an OS/2 table, or no OS/2 table.
    pub os2: Option<(u16, u16)>,
    /// Include cvt, fpgm, prep and gasp.
    pub hinting: bool,
    pub postscript_name: Option<String>,
    pub mac_name: Option<String>,
    pub italic_angle: i32,
    pub fixed_pitch: bool,
    pub ascent: i16,
    pub descent: i16,
}

pub const NOTDEF: u16 = 0;
pub const GID_A: u16 = 1;
pub const GID_B: u16 = 2;
pub const GID_C: u16 = 3;
pub const GID_ACUTE: u16 = 4;
/// Á: composite of A and acute.
pub const GID_A_ACUTE: u16 = 5;
pub const GID_LOWER_A: u16 = 6;
pub const GID_LOWER_B: u16 = 7;
pub const GID_RING: u16 = 8;
/// Ǻ: composite of Á and ring, so it pulls in A and acute through Á.
pub const GID_A_RING_ACUTE: u16 = 9;
pub const GID_SPACE: u16 = 10;
pub const GLYPH_COUNT: u16 = 11;

impl Default for TestFont {
    fn default() -> Self {
        let glyphs = vec![
            simple_glyph(500), // .notdef
            simple_glyph(600), // A
            simple_glyph(610), // B
            simple_glyph(620), // C
            simple_glyph(300), // acute
            composite_glyph(&[(GID_A, ARG_1_AND_2_ARE_WORDS), (GID_ACUTE, WE_HAVE_A_SCALE)]),
            simple_glyph(520), // a
            simple_glyph(530), // b
            simple_glyph(300), // ring
            composite_glyph(&[
                (GID_A_ACUTE, ARG_1_AND_2_ARE_WORDS | WE_HAVE_A_TWO_BY_TWO),
                (GID_RING, WE_HAVE_AN_X_AND_Y_SCALE),
            ]),
            Vec::new(), // space
        ];

        Self {
            units_per_em: 2048,
            glyphs,
            advances: vec![500, 600, 610, 620, 300, 600, 520, 530],
            bearings: (0..GLYPH_COUNT as i16).map(|i| i * 3 - 5).collect(),
            cmap: vec![
                (0x20, GID_SPACE),
                (0x41, GID_A),
                (0x42, GID_B),
                (0x43, GID_C),
                (0x61, GID_LOWER_A),
                (0x62, GID_LOWER_B),
                (0xB4, GID_ACUTE),
                (0xC1, GID_A_ACUTE),
                (0x1FA, GID_A_RING_ACUTE),
            ],
            indirect: vec![(0x30, GID_C), (0x31, GID_B)],
            format6_first: false,
            long_loca: false,
            os2: Some((4, 0)),
            hinting: false,
            postscript_name: Some("TestSans-Regular".to_string()),
            mac_name: None,
            italic_angle: 0,
            fixed_pitch: false,
            ascent: 1900,
            descent: -500,
        }
    }
}

impl TestFont {
    /// Advance of a glyph in font units, repeating the last long metric.
    pub fn advance(&self, gid: u16) -> u16 {
        let idx = (gid as usize).min(self.advances.len() - 1);
        self.advances[idx]
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables: Vec<([u8; 4], Vec<u8>)> = Vec::new();

        let (glyf, loca) = self.glyf_loca();
        if let Some((version, fs_type)) = self.os2 {
            tables.push((*b"OS/2", self.os2_table(version, fs_type)));
        }
        tables.push((*b"cmap", self.cmap_table()));
        if self.hinting {
            tables.push((*b"cvt ", vec![0, 10, 0, 20]));
            tables.push((*b"fpgm", vec![0xB0, 0x01, 0x2C]));
            tables.push((*b"gasp", vec![0, 0, 0, 1, 0xFF, 0xFF, 0, 0x0F]));
        }
        tables.push((*b"glyf", glyf));
        tables.push((*b"head", self.head_table()));
        tables.push((*b"hhea", self.hhea_table()));
        tables.push((*b"hmtx", self.hmtx_table()));
        tables.push((*b"loca", loca));
        tables.push((*b"maxp", self.maxp_table()));
        tables.push((*b"name", self.name_table()));
        tables.push((*b"post", self.post_table()));
        if self.hinting {
            tables.push((*b"prep", vec![0xB1, 0x01, 0x02, 0x03, 0x04]));
        }
        tables.sort_by(|a, b| a.0.cmp(&b.0));

        assemble(&tables)
    }

    fn glyf_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0u32];
        for g in &self.glyphs {
            glyf.extend(g);
            // Short loca can only address even offsets
            if !self.long_loca && glyf.len() % 2 != 0 {
                glyf.push(0);
            }
            offsets.push(glyf.len() as u32);
        }

        let mut loca = Vec::new();
        for off in offsets {
            if self.long_loca {
                loca.extend(off.to_be_bytes());
            } else {
                loca.extend(((off / 2) as u16).to_be_bytes());
            }
        }
        (glyf, loca)
    }

    fn head_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes()); // version
        t.extend(0x0001_0000u32.to_be_bytes()); // fontRevision
        t.extend(0u32.to_be_bytes()); // checkSumAdjustment
        t.extend(0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
        t.extend(0x000Bu16.to_be_bytes()); // flags
        t.extend(self.units_per_em.to_be_bytes());
        t.extend([0u8; 16]); // created, modified
        t.extend((-100i16).to_be_bytes()); // xMin
        t.extend((-500i16).to_be_bytes()); // yMin
        t.extend(2000i16.to_be_bytes()); // xMax
        t.extend(1900i16.to_be_bytes()); // yMax
        t.extend(0u16.to_be_bytes()); // macStyle
        t.extend(8u16.to_be_bytes()); // lowestRecPPEM
        t.extend(2i16.to_be_bytes()); // fontDirectionHint
        t.extend((self.long_loca as i16).to_be_bytes());
        t.extend(0i16.to_be_bytes()); // glyphDataFormat
        assert_eq!(t.len(), 54);
        t
    }

    fn hhea_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes());
        t.extend(self.ascent.to_be_bytes());
        t.extend(self.descent.to_be_bytes());
        t.extend(0i16.to_be_bytes()); // lineGap
        t.extend(620u16.to_be_bytes()); // advanceWidthMax
        t.extend([0u8; 6]); // minLeftSideBearing, minRightSideBearing, xMaxExtent
        t.extend(1i16.to_be_bytes()); // caretSlopeRise
        t.extend(0i16.to_be_bytes()); // caretSlopeRun
        t.extend([0u8; 10]); // caretOffset, reserved
        t.extend(0i16.to_be_bytes()); // metricDataFormat
        t.extend((self.advances.len() as u16).to_be_bytes());
        assert_eq!(t.len(), 36);
        t
    }

    fn hmtx_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        for (gid, &lsb) in self.bearings.iter().enumerate() {
            if gid < self.advances.len() {
                t.extend(self.advances[gid].to_be_bytes());
            }
            t.extend(lsb.to_be_bytes());
        }
        t
    }

    fn maxp_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0001_0000u32.to_be_bytes());
        t.extend((self.glyphs.len() as u16).to_be_bytes());
        t.extend(3u16.to_be_bytes()); // maxPoints
        t.extend(1u16.to_be_bytes()); // maxContours
        t.extend(6u16.to_be_bytes()); // maxComponentPoints
        t.extend(2u16.to_be_bytes()); // maxComponentContours
        t.extend(2u16.to_be_bytes()); // maxZones
        t.extend([0u8; 12]);
        t.extend(2u16.to_be_bytes()); // maxComponentElements
        t.extend(2u16.to_be_bytes()); // maxComponentDepth
        assert_eq!(t.len(), 32);
        t
    }

    fn os2_table(&self, version: u16, fs_type: u16) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(version.to_be_bytes());
        t.extend(540i16.to_be_bytes()); // xAvgCharWidth
        t.extend(400u16.to_be_bytes()); // usWeightClass
        t.extend(5u16.to_be_bytes()); // usWidthClass
        t.extend(fs_type.to_be_bytes());
        t.extend([0u8; 16]); // sub/superscript
        t.extend(102i16.to_be_bytes()); // yStrikeoutSize
        t.extend(530i16.to_be_bytes()); // yStrikeoutPosition
        t.extend([0u8; 2 + 10 + 16]); // sFamilyClass, panose, ulUnicodeRange
        t.extend(*b"TEST"); // achVendID
        t.extend(0x0040u16.to_be_bytes()); // fsSelection
        t.extend(0x20u16.to_be_bytes()); // usFirstCharIndex
        t.extend(0x1FAu16.to_be_bytes()); // usLastCharIndex
        t.extend(1800i16.to_be_bytes()); // sTypoAscender
        t.extend((-450i16).to_be_bytes()); // sTypoDescender
        t.extend(0i16.to_be_bytes()); // sTypoLineGap
        t.extend(1900u16.to_be_bytes()); // usWinAscent
        t.extend(500u16.to_be_bytes()); // usWinDescent
        if version >= 1 {
            t.extend([0u8; 8]); // ulCodePageRange
        }
        if version >= 2 {
            t.extend(1000i16.to_be_bytes()); // sxHeight
            t.extend(1434i16.to_be_bytes()); // sCapHeight
            t.extend(0u16.to_be_bytes()); // usDefaultChar
            t.extend(0x20u16.to_be_bytes()); // usBreakChar
            t.extend(2u16.to_be_bytes()); // usMaxContext
        }
        t
    }

    fn post_table(&self) -> Vec<u8> {
        let mut t = Vec::new();
        t.extend(0x0003_0000u32.to_be_bytes());
        t.extend(self.italic_angle.to_be_bytes());
        t.extend((-150i16).to_be_bytes()); // underlinePosition
        t.extend(100i16.to_be_bytes()); // underlineThickness
        t.extend((self.fixed_pitch as u32).to_be_bytes());
        t.extend([0u8; 16]);
        t
    }

    fn name_table(&self) -> Vec<u8> {
        // (platform, encoding, language, bytes)
        let mut records: Vec<(u16, u16, u16, Vec<u8>)> = Vec::new();
        if let Some(name) = &self.mac_name {
            records.push((1, 0, 0, name.as_bytes().to_vec()));
        }
        if let Some(name) = &self.postscript_name {
            let utf16 = name.encode_utf16().flat_map(u16::to_be_bytes).collect();
            records.push((3, 1, 0x409, utf16));
        }

        let mut t = Vec::new();
        t.extend(0u16.to_be_bytes()); // format
        t.extend((records.len() as u16).to_be_bytes());
        t.extend((6 + 12 * records.len() as u16).to_be_bytes());

        let mut storage: Vec<u8> = Vec::new();
        for (platform, encoding, language, bytes) in &records {
            t.extend(platform.to_be_bytes());
            t.extend(encoding.to_be_bytes());
            t.extend(language.to_be_bytes());
            t.extend(6u16.to_be_bytes()); // nameID: PostScript name
            t.extend((bytes.len() as u16).to_be_bytes());
            t.extend((storage.len() as u16).to_be_bytes());
            storage.extend(bytes);
        }
        t.extend(storage);
        t
    }

    fn cmap_table(&self) -> Vec<u8> {
        let format4 = self.format4_subtable();

        let mut subtables: Vec<(u16, u16, Vec<u8>)> = Vec::new();
        if self.format6_first {
            let mut f6 = Vec::new();
            f6.extend(6u16.to_be_bytes());
            f6.extend(12u16.to_be_bytes()); // length
            f6.extend(0u16.to_be_bytes()); // language
            f6.extend(0x41u16.to_be_bytes()); // firstCode
            f6.extend(1u16.to_be_bytes()); // entryCount
            f6.extend(GID_A.to_be_bytes());
            subtables.push((0, 3, f6));
        }
        subtables.push((3, 1, format4));

        let mut t = Vec::new();
        t.extend(0u16.to_be_bytes());
        t.extend((subtables.len() as u16).to_be_bytes());
        let mut offset = 4 + 8 * subtables.len() as u32;
        for (platform, encoding, data) in &subtables {
            t.extend(platform.to_be_bytes());
            t.extend(encoding.to_be_bytes());
            t.extend(offset.to_be_bytes());
            offset += data.len() as u32;
        }
        for (_, _, data) in subtables {
            t.extend(data);
        }
        t
    }

    fn format4_subtable(&self) -> Vec<u8> {
        // (start, end, delta, indirect)
        let mut segments: Vec<(u16, u16, u16, bool)> = self
            .cmap
            .iter()
            .map(|&(code, gid)| (code, code, gid.wrapping_sub(code), false))
            .collect();
        if let (Some(first), Some(last)) = (self.indirect.first(), self.indirect.last()) {
            segments.push((first.0, last.0, 0, true));
        }
        segments.sort_by_key(|s| s.0);
        segments.push((0xFFFF, 0xFFFF, 1, false));

        let seg_count = segments.len() as u16;
        let glyph_ids: Vec<u16> = self.indirect.iter().map(|&(_, gid)| gid).collect();

        let mut t = Vec::new();
        t.extend(4u16.to_be_bytes());
        t.extend((16 + 8 * seg_count + 2 * glyph_ids.len() as u16).to_be_bytes());
        t.extend(0u16.to_be_bytes()); // language
        t.extend((seg_count * 2).to_be_bytes());
        let selector = 15 - seg_count.leading_zeros() as u16;
        t.extend((2u16 << selector).to_be_bytes());
        t.extend(selector.to_be_bytes());
        t.extend((seg_count * 2 - (2u16 << selector)).to_be_bytes());
        for s in &segments {
            t.extend(s.1.to_be_bytes());
        }
        t.extend(0u16.to_be_bytes()); // reservedPad
        for s in &segments {
            t.extend(s.0.to_be_bytes());
        }
        for s in &segments {
            t.extend(s.2.to_be_bytes());
        }
        for (i, s) in segments.iter().enumerate() {
            // Distance from this idRangeOffset entry to glyphIdArray[0]
            let range_offset = if s.3 { 2 * (seg_count - i as u16) } else { 0 };
            t.extend(range_offset.to_be_bytes());
        }
        for gid in glyph_ids {
            t.extend(gid.to_be_bytes());
        }
        t
    }
}

/// Lay out a table directory and tables with correct checksums.
fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let count = tables.len() as u16;
    let selector = 15 - count.leading_zeros() as u16;

    let mut out = Vec::new();
    out.extend(0x0001_0000u32.to_be_bytes());
    out.extend(count.to_be_bytes());
    out.extend((16u16 << selector).to_be_bytes());
    out.extend(selector.to_be_bytes());
    out.extend((count * 16 - (16u16 << selector)).to_be_bytes());

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in tables {
        out.extend(tag);
        out.extend(checksum(data).to_be_bytes());
        out.extend((offset as u32).to_be_bytes());
        out.extend((data.len() as u32).to_be_bytes());

        body.extend(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend(body);
    out
}

/// The default fixture font.
pub fn test_font() -> Vec<u8> {
    TestFont::default().build()
}

// ─── Inspection ─────────────────────────────────────────────────

pub fn u16_at(data: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([data[pos], data[pos + 1]])
}

pub fn u32_at(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// `(tag, checksum, offset, length)` for each directory entry, in file order.
pub fn directory(data: &[u8]) -> Vec<([u8; 4], u32, usize, usize)> {
    let count = u16_at(data, 4) as usize;
    (0..count)
        .map(|i| {
            let rec = 12 + 16 * i;
            let mut tag = [0u8; 4];
            tag.copy_from_slice(&data[rec..rec + 4]);
            (
                tag,
                u32_at(data, rec + 4),
                u32_at(data, rec + 8) as usize,
                u32_at(data, rec + 12) as usize,
            )
        })
        .collect()
}

/// Offset and length of a table, if present.
pub fn table_range(data: &[u8], tag: &[u8; 4]) -> Option<(usize, usize)> {
    directory(data)
        .into_iter()
        .find(|(t, ..)| t == tag)
        .map(|(_, _, offset, length)| (offset, length))
}

pub fn table<'a>(data: &'a [u8], tag: &[u8; 4]) -> Option<&'a [u8]> {
    table_range(data, tag).map(|(offset, length)| &data[offset..offset + length])
}

/// Overwrite bytes inside a table.
pub fn patch(data: &mut [u8], tag: &[u8; 4], at: usize, bytes: &[u8]) {
    let (offset, _) = table_range(data, tag).expect("table present");
    data[offset + at..offset + at + bytes.len()].copy_from_slice(bytes);
}

/// Offsets within `cmap` of a format 4 segment's idDelta and idRangeOffset,
/// for a font whose only cmap record is the format 4 subtable.
pub fn cmap_segment_fields(data: &[u8], seg: usize) -> (usize, usize) {
    const SUBTABLE: usize = 12;
    let cmap = table(data, b"cmap").expect("cmap");
    let seg_x2 = u16_at(cmap, SUBTABLE + 6) as usize;
    let deltas = SUBTABLE + 16 + 2 * seg_x2;
    (deltas + 2 * seg, deltas + seg_x2 + 2 * seg)
}

/// Number of segments in the single format 4 subtable.
pub fn cmap_segment_count(data: &[u8]) -> usize {
    u16_at(table(data, b"cmap").expect("cmap"), 12 + 6) as usize / 2
}

/// Remove a table from the directory (its bytes stay behind, unreferenced).
pub fn drop_table(data: &[u8], tag: &[u8; 4]) -> Vec<u8> {
    let entries: Vec<_> = directory(data).into_iter().filter(|(t, ..)| t != tag).collect();
    let mut out = data.to_vec();
    out[4..6].copy_from_slice(&(entries.len() as u16).to_be_bytes());
    for (i, (t, sum, offset, length)) in entries.iter().enumerate() {
        let rec = 12 + 16 * i;
        out[rec..rec + 4].copy_from_slice(t);
        out[rec + 4..rec + 8].copy_from_slice(&sum.to_be_bytes());
        out[rec + 8..rec + 12].copy_from_slice(&(*offset as u32).to_be_bytes());
        out[rec + 12..rec + 16].copy_from_slice(&(*length as u32).to_be_bytes());
    }
    out
}

/// Raw bytes of a glyph, read through head/loca/glyf.
pub fn glyph(data: &[u8], gid: u16) -> &[u8] {
    let long = u16_at(table(data, b"head").expect("head"), 50) == 1;
    let loca = table(data, b"loca").expect("loca");
    let glyf = table(data, b"glyf").expect("glyf");
    let i = gid as usize;
    let (start, end) = if long {
        (u32_at(loca, i * 4) as usize, u32_at(loca, i * 4 + 4) as usize)
    } else {
        (u16_at(loca, i * 2) as usize * 2, u16_at(loca, i * 2 + 2) as usize * 2)
    };
    &glyf[start..end]
}

/// Component glyph IDs of a composite glyph, read independently of the
/// crate's own walker.
pub fn components(glyph: &[u8]) -> Vec<u16> {
    if glyph.len() < 2 || (u16_at(glyph, 0) as i16) >= 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut pos = 10;
    loop {
        let flags = u16_at(glyph, pos);
        out.push(u16_at(glyph, pos + 2));
        pos += 4;
        pos += if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        pos += if flags & WE_HAVE_A_SCALE != 0 {
            2
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            4
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            8
        } else {
            0
        };
        if flags & MORE_COMPONENTS == 0 {
            return out;
        }
    }
}

/// Check every directory checksum and the whole-file checksum adjustment.
pub fn assert_checksums(data: &[u8]) {
    let (head_offset, _) = table_range(data, b"head").expect("head");
    let adjustment = u32_at(data, head_offset + 8);

    for (tag, sum, offset, length) in directory(data) {
        let padded = (length + 3) & !3;
        let mut bytes = data[offset..offset + padded].to_vec();
        if &tag == b"head" {
            bytes[8..12].fill(0);
        }
        assert_eq!(
            checksum(&bytes),
            sum,
            "checksum of '{}'",
            String::from_utf8_lossy(&tag)
        );
    }

    assert_eq!(data.len() % 4, 0, "file is padded to 4 bytes");
    assert_eq!(checksum(data), 0xB1B0_AFBA, "whole-file checksum");
    assert_ne!(adjustment, 0);
}
