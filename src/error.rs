//! Error types for field, segment, record and package operations.
//!
//! These are the structural failures: they abort the call that caused them.
//! Semantic problems with otherwise well-formed data are reported as
//! [`Violation`](crate::Violation)s instead.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Value does not fit into the field.
    #[error("Value for field '{field}' is {actual} bytes long, field holds {length}")]
    SizeMismatch {
        field: String,
        length: usize,
        actual: usize,
    },

    /// Number needs more digits than the field has.
    #[error("Number {value} does not fit into {length} digits of field '{field}'")]
    OutOfRange {
        field: String,
        value: i64,
        length: usize,
    },

    /// Segment access past the end of the buffer.
    #[error("Access at offset {offset} with length {len} exceeds segment width {width}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        width: usize,
    },

    /// Content cannot be decoded as the requested value.
    #[error("Field '{field}' holds '{content}' which is not a valid {expected}")]
    Format {
        field: String,
        content: String,
        expected: &'static str,
    },

    /// Date fields only come in a few widths.
    #[error("Date field '{field}' has length {length}, only 2, 4, 6 or 8 are allowed")]
    UnsupportedLength { field: String, length: usize },

    /// Typed accessor used on a field of another kind.
    #[error("Field '{field}' is not a {expected} field")]
    KindMismatch {
        field: String,
        expected: &'static str,
    },

    /// Character outside of ISO-8859-1.
    #[error("Character {ch:?} in value for field '{field}' cannot be encoded")]
    Unencodable { field: String, ch: char },

    /// Field with zero length or a zero start offset.
    #[error("Field '{field}' has invalid geometry (start={start}, length={length})")]
    InvalidGeometry {
        field: String,
        start: usize,
        length: usize,
    },

    /// A field with this name is already part of the record.
    #[error("Field '{0}' already exists in record")]
    DuplicateField(String),

    /// Byte ranges of two fields intersect.
    #[error("Field '{field}' overlaps with '{other}'")]
    Overlap { field: String, other: String },

    /// Field was never added to the record.
    #[error("Field '{0}' not found in record")]
    UnknownField(String),

    /// Segment index outside `[1, count]`.
    #[error("Segment index {index} out of range (record has {count} segments)")]
    IndexOutOfRange { index: usize, count: usize },

    /// A record would need more segments than allowed.
    #[error("Record {record_type:04} would need {count} segments, at most {max} are allowed")]
    TooManySegments {
        record_type: u16,
        count: usize,
        max: usize,
    },

    /// Removal would leave a record without segments.
    #[error("Cannot remove the last segment of record {record_type:04}")]
    LastSegment { record_type: u16 },

    /// Reading the import source failed.
    #[error("Import failed: {0}")]
    Import(#[source] io::Error),

    /// Writing the export target failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Layout definition text could not be parsed.
    #[error("Layout line {line}: {message}")]
    Layout { line: usize, message: String },

    /// Configuration values that cannot describe a segment.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
