//! One physical line of a record (Teildatensatz).
//!
//! Every segment starts with the 4 digit record-type tag and ends with the
//! segment's sequence number:
//!
//! ```text
//! 0100....................................................1
//! ^^^^ record type                          sequence digit ^
//! ```

use crate::error::{Error, Result};

/// Width of the record-type tag at the start of each segment.
pub const TAG_LEN: usize = 4;
/// Header bytes reserved per segment: the tag plus the sequence digit.
pub const HEADER_LEN: usize = TAG_LEN + 1;

/// Encodes a record type as segment tag.
pub fn tag_for(record_type: u16) -> String {
    format!("{record_type:04}")
}

/// A fixed-size byte buffer owned by a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    index: usize,
    buf: Vec<u8>,
}

impl Segment {
    /// Creates a blank segment carrying the tag and sequence number.
    ///
    /// `width` must be larger than [`HEADER_LEN`]; this is checked by
    /// [`Config::validate`](crate::Config::validate). Record types above
    /// 9999 keep only their last four digits.
    pub fn new(width: usize, record_type: u16, index: usize) -> Self {
        let mut segment = Self {
            index,
            buf: vec![b' '; width],
        };
        let tag = tag_for(record_type);
        segment.buf[..TAG_LEN].copy_from_slice(&tag.as_bytes()[tag.len() - TAG_LEN..]);
        segment.renumber(index);
        segment
    }

    pub fn width(&self) -> usize {
        self.buf.len()
    }

    /// 1-based position within the owning record.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The record-type tag bytes.
    pub fn tag(&self) -> &[u8] {
        &self.buf[..TAG_LEN]
    }

    /// The sequence byte at the end of the segment.
    pub fn sequence(&self) -> u8 {
        self.buf[self.buf.len() - 1]
    }

    /// Sequence digit expected for `index`; only the last decimal digit is stored.
    pub fn sequence_digit(index: usize) -> u8 {
        b'0' + (index % 10) as u8
    }

    pub(crate) fn renumber(&mut self, index: usize) {
        self.index = index;
        let last = self.buf.len() - 1;
        self.buf[last] = Self::sequence_digit(index);
    }

    /// Copies `bytes` into the buffer at `offset` (0-based).
    pub fn write(&mut self, bytes: &[u8], offset: usize) -> Result<()> {
        let range = self.checked_range(offset, bytes.len())?;
        self.buf[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Returns `len` bytes starting at `offset` (0-based).
    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let range = self.checked_range(offset, len)?;
        Ok(&self.buf[range])
    }

    fn checked_range(&self, offset: usize, len: usize) -> Result<std::ops::Range<usize>> {
        let width = self.width();
        match offset.checked_add(len) {
            Some(end) if end <= width => Ok(offset..end),
            _ => Err(Error::OutOfBounds { offset, len, width }),
        }
    }

    /// Appends the buffer followed by `end_marker` to `out`.
    pub fn export_into(&self, out: &mut Vec<u8>, end_marker: &[u8]) {
        out.extend_from_slice(&self.buf);
        out.extend_from_slice(end_marker);
    }

    /// The buffer followed by `end_marker`.
    pub fn export(&self, end_marker: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width() + end_marker.len());
        self.export_into(&mut out, end_marker);
        out
    }
}
