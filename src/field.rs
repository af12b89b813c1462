//! Fixed-width, positioned value cells.
//!
//! A [`Field`] is a name, a 1-based start offset inside its record and a
//! content buffer of exactly `length` bytes. The flavor of a field
//! (alphanumeric, numeric or date) is a [`FieldKind`] tag that selects how
//! values are padded, decoded and validated.
//!
//! ```
//! use gdv_records::Field;
//!
//! let mut count = Field::numeric("Anzahl", 10, 4);
//! count.set_number(7).unwrap();
//! assert_eq!(count.content(), "0007");
//! assert_eq!(count.to_int().unwrap(), 7);
//! ```

use std::fmt;
use std::iter::repeat_n;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::text;
use crate::violation::{Subject, Violation};

/// Where a value sits inside its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    /// Value first, blanks after it.
    Left,
    /// Padding first, value flush with the end.
    Right,
}

/// Date layouts, selected by field length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePattern {
    /// `dd`
    Day,
    /// `MMyy`
    MonthYear,
    /// `MMyyyy`
    MonthLongYear,
    /// `ddMMyyyy`
    DayMonthYear,
}

impl DatePattern {
    /// Pattern for a date field of `length` bytes.
    pub fn from_length(length: usize) -> Option<Self> {
        match length {
            2 => Some(DatePattern::Day),
            4 => Some(DatePattern::MonthYear),
            6 => Some(DatePattern::MonthLongYear),
            8 => Some(DatePattern::DayMonthYear),
            _ => None,
        }
    }

    pub fn length(self) -> usize {
        match self {
            DatePattern::Day => 2,
            DatePattern::MonthYear => 4,
            DatePattern::MonthLongYear => 6,
            DatePattern::DayMonthYear => 8,
        }
    }

    fn format_str(self) -> &'static str {
        match self {
            DatePattern::Day => "%d",
            DatePattern::MonthYear => "%m%y",
            DatePattern::MonthLongYear => "%m%Y",
            DatePattern::DayMonthYear => "%d%m%Y",
        }
    }

    /// Formats `date` using this pattern.
    pub fn encode(self, date: NaiveDate) -> String {
        date.format(self.format_str()).to_string()
    }

    /// Parses `text`, filling the parts the pattern lacks with January 1970
    /// (day only) or the first of the month.
    pub fn parse(self, text: &str) -> Option<NaiveDate> {
        let (full, fmt) = match self {
            DatePattern::Day => (format!("{text}011970"), "%d%m%Y"),
            DatePattern::MonthYear => (format!("01{text}"), "%d%m%y"),
            DatePattern::MonthLongYear => (format!("01{text}"), "%d%m%Y"),
            DatePattern::DayMonthYear => (text.to_string(), "%d%m%Y"),
        };
        NaiveDate::parse_from_str(&full, fmt).ok()
    }

    /// Parses `text` and only accepts it if formatting the result gives
    /// `text` back, so rolled-over values like the 31st of April fail.
    pub fn parse_exact(self, text: &str) -> Option<NaiveDate> {
        self.parse(text).filter(|date| self.encode(*date) == text)
    }
}

/// The flavor of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    AlphaNumeric,
    Numeric,
    Date(DatePattern),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::AlphaNumeric => "alphanumeric",
            FieldKind::Numeric => "numeric",
            FieldKind::Date(_) => "date",
        }
    }
}

/// A named, positioned value cell of fixed width.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    start: usize,
    kind: FieldKind,
    align: Align,
    content: Vec<u8>,
}

impl Field {
    /// Left aligned text field, initially blank.
    pub fn alphanumeric(name: impl Into<String>, start: usize, length: usize) -> Self {
        Self::blank(name.into(), start, length, FieldKind::AlphaNumeric, Align::Left)
    }

    /// Right aligned, zero padded number field, initially all zeros.
    pub fn numeric(name: impl Into<String>, start: usize, length: usize) -> Self {
        let mut field = Self::blank(name.into(), start, length, FieldKind::Numeric, Align::Right);
        field.content.fill(b'0');
        field
    }

    /// Date field, initially blank. Fails for lengths other than 2, 4, 6 or 8.
    pub fn date(name: impl Into<String>, start: usize, length: usize) -> Result<Self> {
        let name = name.into();
        let pattern = DatePattern::from_length(length)
            .ok_or_else(|| Error::UnsupportedLength {
                field: name.clone(),
                length,
            })?;
        Ok(Self::blank(name, start, length, FieldKind::Date(pattern), Align::Right))
    }

    fn blank(name: String, start: usize, length: usize, kind: FieldKind, align: Align) -> Self {
        Self {
            name,
            start,
            kind,
            align,
            content: vec![b' '; length],
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_content(mut self, value: &str) -> Result<Self> {
        self.set_content(value)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based start offset inside the record.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Exclusive end offset (`start + len`), saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len())
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn align(&self) -> Align {
        self.align
    }

    /// True when the byte ranges of both fields intersect.
    pub fn overlaps(&self, other: &Field) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// The raw content, exactly `len()` characters.
    pub fn content(&self) -> String {
        text::decode(&self.content)
    }

    /// The content with padding blanks removed.
    pub fn value(&self) -> String {
        self.content().trim().to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn relocate(&mut self, start: usize) {
        self.start = start;
    }

    /// Replaces the raw content after an import.
    pub(crate) fn load(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.content.len());
        self.content.copy_from_slice(bytes);
    }

    fn pad_byte(&self) -> u8 {
        match (self.kind, self.align) {
            (FieldKind::Numeric, Align::Right) => b'0',
            _ => b' ',
        }
    }

    /// Stores `value`, padded to the field length according to the alignment.
    pub fn set_content(&mut self, value: &str) -> Result<()> {
        let bytes = text::encode(value).map_err(|ch| Error::Unencodable {
            field: self.name.clone(),
            ch,
        })?;
        let length = self.len();
        if bytes.len() > length {
            return Err(Error::SizeMismatch {
                field: self.name.clone(),
                length,
                actual: bytes.len(),
            });
        }
        let pad = length - bytes.len();
        self.content = match self.align {
            Align::Left => bytes.into_iter().chain(repeat_n(b' ', pad)).collect(),
            Align::Right => repeat_n(self.pad_byte(), pad).chain(bytes).collect(),
        };
        Ok(())
    }

    /// Stores `n` as a zero padded decimal filling the whole field.
    pub fn set_number(&mut self, n: i64) -> Result<()> {
        let length = self.len();
        let digits = n.unsigned_abs().to_string();
        let encoded = if n < 0 {
            format!("-{digits:0>width$}", width = length.saturating_sub(1))
        } else {
            format!("{digits:0>length$}")
        };
        if encoded.len() > length {
            return Err(Error::OutOfRange {
                field: self.name.clone(),
                value: n,
                length,
            });
        }
        self.content = encoded.into_bytes();
        Ok(())
    }

    /// Decodes the content as integer. Blank content decodes to 0.
    pub fn to_int(&self) -> Result<i64> {
        let value = self.value();
        if value.is_empty() {
            return Ok(0);
        }
        if !is_number(&value) {
            return Err(self.format_error("number"));
        }
        value.parse().map_err(|_| self.format_error("number"))
    }

    /// Stores `date` in the field's date pattern.
    pub fn set_date(&mut self, date: NaiveDate) -> Result<()> {
        let pattern = self.date_pattern()?;
        self.set_content(&pattern.encode(date))
    }

    /// Decodes the content as date. Day-only and month patterns fill the
    /// missing parts with January 1970 and the first of the month.
    pub fn to_date(&self) -> Result<NaiveDate> {
        let pattern = self.date_pattern()?;
        pattern
            .parse_exact(&self.content())
            .ok_or_else(|| self.format_error("date"))
    }

    fn date_pattern(&self) -> Result<DatePattern> {
        match self.kind {
            FieldKind::Date(pattern) => Ok(pattern),
            _ => Err(Error::KindMismatch {
                field: self.name.clone(),
                expected: "date",
            }),
        }
    }

    fn format_error(&self, expected: &'static str) -> Error {
        Error::Format {
            field: self.name.clone(),
            content: self.content(),
            expected,
        }
    }

    /// True when the field carries no value.
    ///
    /// Numeric and date fields also count as empty when they hold only
    /// zeros, since that is how an unset number or date is written.
    pub fn is_empty(&self) -> bool {
        let value = self.value();
        if value.is_empty() {
            return true;
        }
        match self.kind {
            FieldKind::AlphaNumeric => false,
            FieldKind::Numeric | FieldKind::Date(_) => value.bytes().all(|b| b == b'0'),
        }
    }

    fn has_valid_date(&self, pattern: DatePattern) -> bool {
        let content = self.content();
        // "00..." marks a date that is deliberately not set
        content.starts_with("00") || pattern.parse_exact(&content).is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Collects every rule this field breaks.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(pos) = self.content.iter().position(|&b| is_control(b)) {
            violations.push(self.violation(format!(
                "contains control character at position {}",
                pos + 1
            )));
        }

        if self.is_empty() {
            return violations;
        }

        match self.kind {
            FieldKind::AlphaNumeric => {}
            FieldKind::Numeric => {
                if !is_number(&self.value()) {
                    violations.push(self.violation("is not a number"));
                }
            }
            FieldKind::Date(pattern) => {
                if !self.has_valid_date(pattern) {
                    violations.push(self.violation("is not a valid date"));
                }
            }
        }

        violations
    }

    fn violation(&self, message: impl Into<String>) -> Violation {
        Violation::new(
            Subject::Field {
                name: self.name.clone(),
                start: self.start,
            },
            self.content(),
            message,
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @{}:{} \"{}\"",
            self.name,
            self.start,
            self.len(),
            self.content()
        )
    }
}

fn is_number(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// C0 and C1 control characters.
fn is_control(b: u8) -> bool {
    b < 0x20 || (0x7F..0xA0).contains(&b)
}
