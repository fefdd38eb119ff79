//! # sfnt Table Directory
//!
//! The offset table and table records at the start of every TrueType file.
//! Only the fourteen tables that matter for embedding are tracked; anything
//! else in the source directory is skipped.
//!
//! https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html

use std::fmt;

use crate::error::{FormatError, Result};
use crate::font::cursor::Reader;

/// A four-byte table tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const CVT: Tag = Tag(*b"cvt ");
    pub const FPGM: Tag = Tag(*b"fpgm");
    pub const GASP: Tag = Tag(*b"gasp");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const NAME: Tag = Tag(*b"name");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const POST: Tag = Tag(*b"post");
    pub const PREP: Tag = Tag(*b"prep");

    pub fn from_u32(value: u32) -> Self {
        Tag(value.to_be_bytes())
    }

    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// The closed set of tables this crate reads or writes.
///
/// Declaration order is tag order (uppercase sorts before lowercase), which is
/// the order the table directory must be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Os2,
    Cmap,
    Cvt,
    Fpgm,
    Gasp,
    Glyf,
    Head,
    Hhea,
    Hmtx,
    Loca,
    Maxp,
    Name,
    Post,
    Prep,
}

impl TableName {
    pub const COUNT: usize = 14;

    /// All tables in tag order.
    pub const ALL: [TableName; TableName::COUNT] = [
        TableName::Os2,
        TableName::Cmap,
        TableName::Cvt,
        TableName::Fpgm,
        TableName::Gasp,
        TableName::Glyf,
        TableName::Head,
        TableName::Hhea,
        TableName::Hmtx,
        TableName::Loca,
        TableName::Maxp,
        TableName::Name,
        TableName::Post,
        TableName::Prep,
    ];

    /// Tables every font must have, both on input and in a generated subset.
    pub const REQUIRED: [TableName; 9] = [
        TableName::Cmap,
        TableName::Glyf,
        TableName::Head,
        TableName::Hhea,
        TableName::Hmtx,
        TableName::Loca,
        TableName::Maxp,
        TableName::Name,
        TableName::Post,
    ];

    /// Tables copied verbatim into a subset when the source has them.
    pub const OPTIONAL: [TableName; 5] = [
        TableName::Cvt,
        TableName::Fpgm,
        TableName::Gasp,
        TableName::Os2,
        TableName::Prep,
    ];

    pub fn tag(self) -> Tag {
        match self {
            TableName::Os2 => Tag::OS2,
            TableName::Cmap => Tag::CMAP,
            TableName::Cvt => Tag::CVT,
            TableName::Fpgm => Tag::FPGM,
            TableName::Gasp => Tag::GASP,
            TableName::Glyf => Tag::GLYF,
            TableName::Head => Tag::HEAD,
            TableName::Hhea => Tag::HHEA,
            TableName::Hmtx => Tag::HMTX,
            TableName::Loca => Tag::LOCA,
            TableName::Maxp => Tag::MAXP,
            TableName::Name => Tag::NAME,
            TableName::Post => Tag::POST,
            TableName::Prep => Tag::PREP,
        }
    }

    pub fn from_tag(tag: Tag) -> Option<Self> {
        TableName::ALL.into_iter().find(|name| name.tag() == tag)
    }

    pub fn is_required(self) -> bool {
        TableName::REQUIRED.contains(&self)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Location of one table inside a font buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableRecord {
    pub offset: u32,
    /// Unpadded content length, as stored in the directory.
    pub length: u32,
}

impl TableRecord {
    /// Length rounded up to the next multiple of 4.
    pub fn padded_length(&self) -> u32 {
        padded_len(self.length)
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// Round a table length up to the 4-byte boundary every table starts on.
pub fn padded_len(length: u32) -> u32 {
    length.saturating_add(3) & !3
}

/// The table directory of a font: one optional record per known table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDirectory {
    records: [Option<TableRecord>; TableName::COUNT],
}

impl TableDirectory {
    pub fn get(&self, name: TableName) -> Option<TableRecord> {
        self.records[name.index()]
    }

    pub fn set(&mut self, name: TableName, record: TableRecord) {
        self.records[name.index()] = Some(record);
    }

    pub fn contains(&self, name: TableName) -> bool {
        self.get(name).is_some()
    }

    /// The record for a table the caller cannot do without.
    pub fn require(&self, name: TableName) -> Result<TableRecord> {
        self.get(name)
            .ok_or_else(|| FormatError::MissingTable(name.tag()).into())
    }

    /// Present tables in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (TableName, TableRecord)> + '_ {
        TableName::ALL
            .into_iter()
            .filter_map(move |name| self.get(name).map(|record| (name, record)))
    }

    pub fn len(&self) -> usize {
        self.records.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the offset table and table records of a TrueType font.
    ///
    /// Fails if the sfnt version is not TrueType, if any record points past
    /// the end of the buffer, or if a required table is missing.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        let version = reader.u32()?;
        match version {
            // Four-char code 'true' (Apple) or the 1.0 TrueType identifier
            0x7472_7565 | 0x0001_0000 => {}
            other => return Err(FormatError::NotTrueType(other).into()),
        }

        let table_count = reader.u16()?;
        reader.skip(6)?; // searchRange, entrySelector, rangeShift

        let mut directory = TableDirectory::default();
        for _ in 0..table_count {
            let tag = reader.tag()?;
            reader.skip(4)?; // checksum
            let offset = reader.u32()?;
            let length = reader.u32()?;

            let Some(name) = TableName::from_tag(tag) else {
                continue;
            };

            let end = offset as u64 + length as u64;
            if end > data.len() as u64 {
                return Err(FormatError::TableOutOfBounds { tag, offset, length }.into());
            }
            directory.set(name, TableRecord { offset, length });
        }

        for name in TableName::REQUIRED {
            directory.require(name)?;
        }

        Ok(directory)
    }
}

/// Big-endian u32 sum (mod 2^32) over `data`, zero-padded to a multiple of 4.
pub fn checksum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(4);
    let mut sum = chunks
        .by_ref()
        .fold(0u32, |sum, c| sum.wrapping_add(u32::from_be_bytes([c[0], c[1], c[2], c[3]])));

    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut last = [0u8; 4];
        last[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}

/// `(searchRange, entrySelector, rangeShift)` for a binary-searchable array
/// of `count` entries of `entry_size` bytes each.
pub fn search_params(count: u16, entry_size: u16) -> (u16, u16, u16) {
    if count == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector).wrapping_mul(entry_size);
    let range_shift = count.wrapping_mul(entry_size).wrapping_sub(search_range);
    (search_range, entry_selector, range_shift)
}
