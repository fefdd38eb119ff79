//! # Byte Cursors
//!
//! Positioned big-endian reading and writing. A [`Reader`] is usually built
//! over a single table, so any read past that table's declared length fails
//! with [`FormatError::Truncated`] instead of wandering into the next table.
//!
//! The [`Writer`] keeps a logical length (the high-water mark of bytes
//! actually written) separate from its zero-filled physical buffer, and only
//! the written part is ever handed out.

use crate::error::{FormatError, Result};
use crate::font::tables::{Tag, TableRecord};

// ─── Reader ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// A reader limited to one table's bytes. Positions are table-relative.
    pub fn for_table(data: &'a [u8], record: TableRecord) -> Result<Self> {
        let range = record.range();
        let buf = data.get(range.clone()).ok_or(FormatError::Truncated {
            offset: range.start,
            len: range.len(),
        })?;
        Ok(Self::new(buf))
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Everything the reader can see, regardless of the cursor.
    pub fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(FormatError::Truncated { offset: pos, len: 0 }.into());
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read(count).map(|_| ())
    }

    pub fn read(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.read_at(self.pos, count)?;
        self.pos += count;
        Ok(bytes)
    }

    /// Read without moving the cursor.
    pub fn read_at(&self, pos: usize, count: usize) -> Result<&'a [u8]> {
        pos.checked_add(count)
            .and_then(|end| self.buf.get(pos..end))
            .ok_or_else(|| FormatError::Truncated { offset: pos, len: count }.into())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_be_bytes)
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.array().map(i16::from_be_bytes)
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_be_bytes)
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.array().map(i32::from_be_bytes)
    }

    pub fn tag(&mut self) -> Result<Tag> {
        self.array().map(Tag)
    }

    /// A signed distance in font design units.
    pub fn fword(&mut self) -> Result<i16> {
        self.i16()
    }

    /// A 16.16 fixed-point number.
    pub fn fixed(&mut self) -> Result<f32> {
        self.i32().map(|v| (v as f64 / 65536.0) as f32)
    }

    pub fn u16_at(&self, pos: usize) -> Result<u16> {
        let b = self.read_at(pos, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn i16_at(&self, pos: usize) -> Result<i16> {
        self.u16_at(pos).map(|v| v as i16)
    }

    pub fn u32_at(&self, pos: usize) -> Result<u32> {
        let b = self.read_at(pos, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

// ─── Writer ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Writer {
    /// Zero-filled storage; its length is the physical capacity.
    buf: Vec<u8>,
    /// High-water mark of bytes written.
    len: usize,
    pos: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: vec![0; capacity], len: 0, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of bytes written so far (not the cursor position).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Make room for `count` more bytes past the cursor. Growth is geometric
    /// and new space is zero-filled.
    pub fn ensure_capacity(&mut self, count: usize) {
        let needed = self.pos + count;
        if needed > self.buf.len() {
            let grown = needed.max(self.buf.len() * 2);
            self.buf.resize(grown, 0);
        }
    }

    /// Move the cursor. Seeking alone does not count as writing.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance the cursor over `count` zero bytes.
    pub fn skip(&mut self, count: usize) {
        self.ensure_capacity(count);
        self.buf[self.pos..self.pos + count].fill(0);
        self.advance(count);
    }

    /// Zero-pad up to the next multiple of `align`.
    pub fn align(&mut self, align: usize) {
        let rem = self.pos % align;
        if rem != 0 {
            self.skip(align - rem);
        }
    }

    fn advance(&mut self, count: usize) {
        self.pos += count;
        self.len = self.len.max(self.pos);
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.advance(bytes.len());
    }

    pub fn u8(&mut self, val: u8) {
        self.write(&[val]);
    }

    pub fn u16(&mut self, val: u16) {
        self.write(&val.to_be_bytes());
    }

    pub fn i16(&mut self, val: i16) {
        self.write(&val.to_be_bytes());
    }

    pub fn u32(&mut self, val: u32) {
        self.write(&val.to_be_bytes());
    }

    pub fn i32(&mut self, val: i32) {
        self.write(&val.to_be_bytes());
    }

    pub fn tag(&mut self, tag: Tag) {
        self.write(&tag.0);
    }

    pub fn u16_array(&mut self, values: &[u16]) {
        self.ensure_capacity(values.len() * 2);
        for &v in values {
            self.u16(v);
        }
    }

    /// Overwrite two already-written bytes without moving the cursor.
    pub fn put_u16_at(&mut self, pos: usize, val: u16) -> Result<()> {
        self.written_mut(pos, 2)?.copy_from_slice(&val.to_be_bytes());
        Ok(())
    }

    /// Overwrite four already-written bytes without moving the cursor.
    pub fn put_u32_at(&mut self, pos: usize, val: u32) -> Result<()> {
        self.written_mut(pos, 4)?.copy_from_slice(&val.to_be_bytes());
        Ok(())
    }

    fn written_mut(&mut self, pos: usize, count: usize) -> Result<&mut [u8]> {
        let end = pos
            .checked_add(count)
            .filter(|&end| end <= self.len)
            .ok_or(FormatError::Truncated { offset: pos, len: count })?;
        Ok(&mut self.buf[pos..end])
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Take the written bytes, dropping any spare capacity.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}
