//! Records (Satz): named fields laid out over one or more segments.
//!
//! A record owns its fields and segments. Field positions are 1-based
//! offsets into the concatenation of all segments, so the second segment of
//! a 256 byte layout starts at position 257. The first four bytes and the
//! last byte of every segment are the segment header and cannot be covered
//! by fields.
//!
//! ```
//! use gdv_records::{Config, Field, Record};
//!
//! let config = Config::default();
//! let mut record = Record::new(100, &config).unwrap();
//! record.add(Field::alphanumeric("Name1", 44, 30)).unwrap();
//! record.set("Name1", "Oli B.").unwrap();
//!
//! let exported = record.export();
//! assert_eq!(exported.len(), 256);
//! assert_eq!(&exported[..4], b"0100");
//! assert_eq!(record.get("Name1").unwrap().trim(), "Oli B.");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Write;

use chrono::NaiveDate;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::segment::{Segment, TAG_LEN, tag_for};
use crate::text;
use crate::violation::{Subject, Violation};

/// Pseudo field name for the record-type tag of each segment.
pub const RECORD_TYPE: &str = "Satzart";
/// Pseudo field name for the sequence digit of each segment.
pub const SEGMENT_NUMBER: &str = "Satznummer";
/// Largest record type that fits into the tag.
pub const MAX_RECORD_TYPE: u16 = 9999;
/// Upper bound for the segments of one record.
pub const MAX_SEGMENTS: usize = 99;

/// An ordered collection of fields mapped onto segments.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: u16,
    known: bool,
    width: usize,
    end_marker: Vec<u8>,
    /// Fields keyed by start position; ranges never overlap.
    fields: BTreeMap<usize, Field>,
    names: HashMap<String, usize>,
    required: BTreeSet<String>,
    segments: Vec<Segment>,
}

impl Record {
    /// Creates a record with a single blank segment.
    pub fn new(record_type: u16, config: &Config) -> Result<Self> {
        Self::with_segments(record_type, 1, config)
    }

    /// Creates a record with `count` blank segments (at least one).
    pub fn with_segments(record_type: u16, count: usize, config: &Config) -> Result<Self> {
        config.validate()?;
        if record_type > MAX_RECORD_TYPE {
            return Err(Error::OutOfRange {
                field: RECORD_TYPE.to_string(),
                value: i64::from(record_type),
                length: TAG_LEN,
            });
        }
        if count > MAX_SEGMENTS {
            return Err(Error::TooManySegments {
                record_type,
                count,
                max: MAX_SEGMENTS,
            });
        }
        let width = config.segment_width;
        Ok(Self {
            record_type,
            known: true,
            width,
            end_marker: config.end_marker_bytes(),
            fields: BTreeMap::new(),
            names: HashMap::new(),
            required: BTreeSet::new(),
            segments: (1..=count.max(1))
                .map(|index| Segment::new(width, record_type, index))
                .collect(),
        })
    }

    /// Creates a record for a type code nobody registered a layout for.
    /// Validating it always reports the unknown type.
    pub fn unknown(record_type: u16, config: &Config) -> Result<Self> {
        let mut record = Self::new(record_type, config)?;
        record.known = false;
        Ok(record)
    }

    pub fn record_type(&self) -> u16 {
        self.record_type
    }

    /// False for records built for an unregistered type code.
    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn segment_width(&self) -> usize {
        self.width
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Fields ordered by start position.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Names of the identifying fields that must be set.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Result<&Field> {
        self.names
            .get(name)
            .and_then(|start| self.fields.get(start))
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Raw content of the named field.
    pub fn get(&self, name: &str) -> Result<String> {
        self.field(name).map(Field::content)
    }

    /// Adds a field, growing the segment list until the field fits.
    ///
    /// Fails if the field's byte range intersects another field or a
    /// segment header. Nothing is changed on failure.
    pub fn add(&mut self, field: Field) -> Result<()> {
        if field.start() == 0 || field.len() == 0 || field.start().checked_add(field.len()).is_none()
        {
            return Err(Error::InvalidGeometry {
                field: field.name().to_string(),
                start: field.start(),
                length: field.len(),
            });
        }
        let needed = (field.end() - 2) / self.width + 1;
        if needed > MAX_SEGMENTS {
            return Err(Error::TooManySegments {
                record_type: self.record_type,
                count: needed,
                max: MAX_SEGMENTS,
            });
        }
        if self.names.contains_key(field.name()) {
            return Err(Error::DuplicateField(field.name().to_string()));
        }
        if let Some(other) = self.find_overlap(&field) {
            return Err(Error::Overlap {
                field: field.name().to_string(),
                other: other.name().to_string(),
            });
        }
        self.check_header(&field)?;

        while self.segments.len() < needed {
            self.push_segment();
        }

        write_span(&mut self.segments, self.width, field.start(), field.as_bytes())?;
        self.names.insert(field.name().to_string(), field.start());
        self.fields.insert(field.start(), field);
        Ok(())
    }

    /// Adds an identifying field that validation requires to be set.
    pub fn add_required(&mut self, field: Field) -> Result<()> {
        let name = field.name().to_string();
        self.add(field)?;
        self.required.insert(name);
        Ok(())
    }

    /// Field with the largest start before `field` ends. Since stored ranges
    /// are disjoint and sorted, it is the only candidate for an overlap.
    fn find_overlap(&self, field: &Field) -> Option<&Field> {
        self.fields
            .range(..field.end())
            .next_back()
            .map(|(_, existing)| existing)
            .filter(|existing| existing.overlaps(field))
    }

    fn check_header(&self, field: &Field) -> Result<()> {
        let w = self.width;
        let first = (field.start() - 1) / w;
        let last = (field.end() - 2) / w;
        for seg in first..=last {
            let base = seg * w;
            let tag = (base + 1)..(base + 1 + TAG_LEN);
            let seq = base + w;
            let hits_tag = field.start() < tag.end && tag.start < field.end();
            let hits_seq = field.start() <= seq && seq < field.end();
            if hits_tag || hits_seq {
                return Err(Error::Overlap {
                    field: field.name().to_string(),
                    other: if hits_tag { RECORD_TYPE } else { SEGMENT_NUMBER }.to_string(),
                });
            }
        }
        Ok(())
    }

    fn push_segment(&mut self) {
        let index = self.segments.len() + 1;
        tracing::debug!(record_type = self.record_type, index, "adding segment");
        self.segments
            .push(Segment::new(self.width, self.record_type, index));
    }

    fn update(&mut self, name: &str, op: impl FnOnce(&mut Field) -> Result<()>) -> Result<()> {
        let start = *self
            .names
            .get(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        let field = self
            .fields
            .get_mut(&start)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        op(field)?;
        let bytes = field.as_bytes().to_vec();
        write_span(&mut self.segments, self.width, start, &bytes)
    }

    /// Sets the content of a previously added field.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.update(name, |field| field.set_content(value))
    }

    pub fn set_number(&mut self, name: &str, n: i64) -> Result<()> {
        self.update(name, |field| field.set_number(n))
    }

    pub fn set_date(&mut self, name: &str, date: NaiveDate) -> Result<()> {
        self.update(name, |field| field.set_date(date))
    }

    /// Loads `data` into the segments, one segment width per segment, then
    /// refreshes every field from its byte range.
    ///
    /// Missing segments are appended; a short final chunk is blank padded.
    /// Segments beyond the data keep their content.
    pub fn import_from(&mut self, data: &[u8]) -> Result<()> {
        let count = data.len().div_ceil(self.width);
        if count > MAX_SEGMENTS {
            return Err(Error::TooManySegments {
                record_type: self.record_type,
                count,
                max: MAX_SEGMENTS,
            });
        }
        for (i, chunk) in data.chunks(self.width).enumerate() {
            if i >= self.segments.len() {
                self.push_segment();
            }
            let mut line = chunk.to_vec();
            line.resize(self.width, b' ');
            self.segments[i].write(&line, 0)?;
        }
        for field in self.fields.values_mut() {
            let bytes = read_span(&self.segments, self.width, field.start(), field.len())?;
            field.load(&bytes);
        }
        tracing::debug!(
            record_type = self.record_type,
            bytes = data.len(),
            segments = self.segments.len(),
            "imported record"
        );
        Ok(())
    }

    /// All segments, each followed by the end-of-record marker.
    pub fn export(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.segments.len() * (self.width + self.end_marker.len()));
        for segment in &self.segments {
            segment.export_into(&mut out, &self.end_marker);
        }
        out
    }

    pub fn export_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.export())?;
        Ok(())
    }

    /// The exported record as text.
    pub fn to_text(&self) -> String {
        text::decode(&self.export())
    }

    /// Collects field violations, segment header mismatches, an unknown
    /// record type and unset identifying fields, in that order.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self.fields.values().flat_map(Field::validate).collect();

        let tag = tag_for(self.record_type);
        for segment in &self.segments {
            let subject = || Subject::Segment {
                record_type: self.record_type,
                index: segment.index(),
            };
            if segment.tag() != tag.as_bytes() {
                violations.push(Violation::new(
                    subject(),
                    text::decode(segment.tag()),
                    format!("tag does not match record type {tag}"),
                ));
            }
            let expected = Segment::sequence_digit(segment.index());
            if segment.sequence() != expected {
                violations.push(Violation::new(
                    subject(),
                    text::decode(&[segment.sequence()]),
                    format!("sequence number should be {}", expected as char),
                ));
            }
        }

        let subject = Subject::Record {
            record_type: self.record_type,
        };
        if !self.known {
            violations.push(Violation::new(
                subject.clone(),
                tag.clone(),
                "unknown record type",
            ));
        }
        for name in &self.required {
            if let Ok(field) = self.field(name)
                && field.is_empty()
            {
                violations.push(Violation::new(
                    subject.clone(),
                    field.content(),
                    format!("required field '{name}' is not set"),
                ));
            }
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Removes segment `index` (1-based).
    ///
    /// Fields inside the removed segment are dropped, fields behind it move
    /// up by one segment width and later segments are renumbered.
    pub fn remove_segment(&mut self, index: usize) -> Result<()> {
        let count = self.segments.len();
        if index == 0 || index > count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        if count == 1 {
            return Err(Error::LastSegment {
                record_type: self.record_type,
            });
        }

        let w = self.width;
        let lo = (index - 1) * w + 1;
        let hi = index * w + 1;
        let mut kept = BTreeMap::new();
        for (start, mut field) in std::mem::take(&mut self.fields) {
            if field.end() <= lo {
                kept.insert(start, field);
            } else if start >= hi {
                field.relocate(start - w);
                kept.insert(start - w, field);
            } else {
                tracing::debug!(
                    record_type = self.record_type,
                    field = field.name(),
                    "dropping field of removed segment"
                );
                self.required.remove(field.name());
            }
        }
        self.names = kept
            .iter()
            .map(|(start, field)| (field.name().to_string(), *start))
            .collect();
        self.fields = kept;

        self.segments.remove(index - 1);
        for (i, segment) in self.segments.iter_mut().enumerate().skip(index - 1) {
            segment.renumber(i + 1);
        }
        Ok(())
    }

    /// Removes segment `index` and every segment after it. The first segment
    /// always stays, so at least one segment remains.
    pub fn remove_segments_from(&mut self, index: usize) -> Result<()> {
        let from = index.max(2);
        while self.segments.len() >= from {
            self.remove_segment(self.segments.len())?;
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type == other.record_type && self.fields == other.fields
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record_type.hash(state);
        self.fields.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Satzart {} ({} segments, {} fields)",
            tag_for(self.record_type),
            self.segments.len(),
            self.fields.len()
        )
    }
}

/// Writes `bytes` at 1-based position `start` of the concatenated segments.
fn write_span(segments: &mut [Segment], width: usize, start: usize, bytes: &[u8]) -> Result<()> {
    let count = segments.len();
    let mut pos = start - 1;
    let mut rest = bytes;
    while !rest.is_empty() {
        let (seg, offset) = (pos / width, pos % width);
        let n = (width - offset).min(rest.len());
        segments
            .get_mut(seg)
            .ok_or(Error::IndexOutOfRange {
                index: seg + 1,
                count,
            })?
            .write(&rest[..n], offset)?;
        rest = &rest[n..];
        pos += n;
    }
    Ok(())
}

/// Reads `len` bytes at 1-based position `start` of the concatenated segments.
fn read_span(segments: &[Segment], width: usize, start: usize, len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(len);
    let mut pos = start - 1;
    while out.len() < len {
        let (seg, offset) = (pos / width, pos % width);
        let n = (width - offset).min(len - out.len());
        let segment = segments.get(seg).ok_or(Error::IndexOutOfRange {
            index: seg + 1,
            count: segments.len(),
        })?;
        out.extend_from_slice(segment.read(offset, n)?);
        pos += n;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn config() -> Config {
        Config::default()
    }

    fn record(record_type: u16) -> Record {
        Record::new(record_type, &config()).unwrap()
    }

    fn hash_of(record: &Record) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_record_type() {
        let satz = Record::with_segments(100, 1, &config()).unwrap();
        assert_eq!(satz.record_type(), 100);
        assert_eq!(satz.segment_count(), 1);
        assert!(satz.is_known());
    }

    #[test]
    fn test_record_type_too_large() {
        assert!(matches!(
            Record::new(10000, &config()),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_add_overlap() {
        let mut satz = record(123);
        satz.add(Field::alphanumeric("Name1", 44, 30)).unwrap();
        let err = satz.add(Field::alphanumeric("Bumm", 50, 4)).unwrap_err();
        match err {
            Error::Overlap { field, other } => {
                assert_eq!(field, "Bumm");
                assert_eq!(other, "Name1");
            }
            other => panic!("Expected Overlap, got {other:?}"),
        }
        assert_eq!(satz.field_count(), 1);
    }

    #[test]
    fn test_add_overlap_any_order() {
        let a = || Field::alphanumeric("a", 44, 30);
        let b = || Field::alphanumeric("b", 30, 20);

        let mut first = record(123);
        first.add(a()).unwrap();
        assert!(matches!(first.add(b()), Err(Error::Overlap { .. })));

        let mut second = record(123);
        second.add(b()).unwrap();
        assert!(matches!(second.add(a()), Err(Error::Overlap { .. })));
    }

    #[test]
    fn test_adjacent_fields_do_not_overlap() {
        let mut satz = record(123);
        satz.add(Field::alphanumeric("a", 10, 5)).unwrap();
        satz.add(Field::alphanumeric("b", 15, 5)).unwrap();
        satz.add(Field::alphanumeric("c", 5, 5)).unwrap();
        let names: Vec<&str> = satz.fields().map(Field::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_add_over_segment_header() {
        let mut satz = record(123);
        let err = satz.add(Field::alphanumeric("x", 3, 4)).unwrap_err();
        assert!(matches!(err, Error::Overlap { other, .. } if other == RECORD_TYPE));

        let err = satz.add(Field::alphanumeric("y", 250, 7)).unwrap_err();
        assert!(matches!(err, Error::Overlap { other, .. } if other == SEGMENT_NUMBER));

        // tag of the second segment
        let err = satz.add(Field::alphanumeric("z", 258, 2)).unwrap_err();
        assert!(matches!(err, Error::Overlap { other, .. } if other == RECORD_TYPE));
        assert_eq!(satz.segment_count(), 1);
    }

    #[test]
    fn test_add_invalid_geometry() {
        let mut satz = record(123);
        assert!(matches!(
            satz.add(Field::alphanumeric("zero", 0, 5)),
            Err(Error::InvalidGeometry { .. })
        ));
        assert!(matches!(
            satz.add(Field::alphanumeric("empty", 10, 0)),
            Err(Error::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_add_overflowing_geometry() {
        let mut satz = record(123);
        assert!(matches!(
            satz.add(Field::alphanumeric("x", usize::MAX, 1)),
            Err(Error::InvalidGeometry { .. })
        ));
        assert_eq!(satz.field_count(), 0);
    }

    #[test]
    fn test_add_too_many_segments() {
        let mut satz = record(123);
        assert!(matches!(
            satz.add(Field::alphanumeric("weit", 1_000_000_000, 1)),
            Err(Error::TooManySegments { count, .. }) if count > MAX_SEGMENTS
        ));
        assert_eq!(satz.segment_count(), 1);

        // last usable byte of the last allowed segment
        satz.add(Field::alphanumeric("ende", MAX_SEGMENTS * 256 - 1, 1))
            .unwrap();
        assert_eq!(satz.segment_count(), MAX_SEGMENTS);

        assert!(matches!(
            Record::with_segments(123, MAX_SEGMENTS + 1, &config()),
            Err(Error::TooManySegments { .. })
        ));
        let data = vec![b' '; (MAX_SEGMENTS + 1) * 256];
        assert!(matches!(
            record(123).import_from(&data),
            Err(Error::TooManySegments { .. })
        ));
    }

    #[test]
    fn test_add_duplicate_name() {
        let mut satz = record(123);
        satz.add(Field::alphanumeric("Ort", 50, 30)).unwrap();
        assert!(matches!(
            satz.add(Field::alphanumeric("Ort", 100, 30)),
            Err(Error::DuplicateField(name)) if name == "Ort"
        ));
    }

    #[test]
    fn test_add_grows_segments() {
        let mut satz = record(220);
        satz.add(Field::alphanumeric("Zweiter", 300, 10)).unwrap();
        assert_eq!(satz.segment_count(), 2);
        satz.add(Field::numeric("Dritter", 3 * 256 - 10, 5)).unwrap();
        assert_eq!(satz.segment_count(), 3);
        let exported = satz.export();
        assert_eq!(exported.len(), 3 * 256);
        assert_eq!(&exported[256..260], b"0220");
        assert_eq!(exported[511], b'2');
        assert_eq!(exported[767], b'3');
    }

    #[test]
    fn test_set_unknown_field() {
        let mut satz = record(123);
        assert!(matches!(
            satz.set("gibtsnet", "plopp"),
            Err(Error::UnknownField(name)) if name == "gibtsnet"
        ));
    }

    #[test]
    fn test_get() {
        let mut satz = record(123);
        satz.add(Field::alphanumeric("Ort", 50, 30)).unwrap();
        satz.set("Ort", "Stuttgart").unwrap();
        assert_eq!(satz.get("Ort").unwrap().trim(), "Stuttgart");
        assert_eq!(&satz.export()[49..58], b"Stuttgart");
    }

    #[test]
    fn test_get_unknown_field() {
        let satz = record(123);
        assert!(matches!(
            satz.field("hemmernet"),
            Err(Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_set_number_and_date() {
        let mut satz = record(100);
        satz.add(Field::numeric("Anzahl", 10, 4)).unwrap();
        satz.add(Field::date("Beginn", 20, 8).unwrap()).unwrap();
        satz.set_number("Anzahl", 7).unwrap();
        satz.set_date("Beginn", NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
            .unwrap();
        let text = satz.to_text();
        assert_eq!(&text[9..13], "0007");
        assert_eq!(&text[19..27], "01012021");
        assert!(matches!(
            satz.set_number("Anzahl", 100000),
            Err(Error::OutOfRange { .. })
        ));
        assert_eq!(satz.get("Anzahl").unwrap(), "0007");
    }

    #[test]
    fn test_export() {
        let satz = record(123);
        let content = satz.export();
        assert_eq!(content.len(), 256);
        assert_eq!(&content[0..4], b"0123");
    }

    #[test]
    fn test_export_with_end_marker() {
        let config = Config::default().with_end_marker("\r\n");
        let satz = Record::with_segments(200, 2, &config).unwrap();
        let content = satz.export();
        assert_eq!(content.len(), 2 * 258);
        assert_eq!(&content[256..258], b"\r\n");
        assert_eq!(&content[258..262], b"0200");
    }

    #[test]
    fn test_import() {
        let mut x = record(123);
        x.add(Field::alphanumeric("F1", 5, 5)).unwrap();
        let mut line = String::from("0123Hello");
        line.push_str(&" ".repeat(246));
        line.push('1');
        assert_eq!(line.len(), 256);
        x.import_from(line.as_bytes()).unwrap();
        assert_eq!(x.record_type(), 123);
        assert_eq!(x.get("F1").unwrap(), "Hello");
        assert_eq!(x.to_text(), line);
        assert!(x.is_valid());
    }

    #[test]
    fn test_import_appends_segments() {
        let mut satz = record(123);
        let data = [Segment::new(256, 123, 1), Segment::new(256, 123, 2)]
            .iter()
            .flat_map(|s| s.export(b""))
            .collect::<Vec<u8>>();
        satz.import_from(&data).unwrap();
        assert_eq!(satz.segment_count(), 2);
        assert_eq!(satz.export(), data);
    }

    #[test]
    fn test_round_trip() {
        let mut original = Record::with_segments(210, 2, &config()).unwrap();
        original.add(Field::alphanumeric("Name", 44, 30)).unwrap();
        original.add(Field::numeric("Betrag", 300, 12)).unwrap();
        original.add(Field::date("Beginn", 400, 8).unwrap()).unwrap();
        original.set("Name", "Müller").unwrap();
        original.set_number("Betrag", 123456).unwrap();
        original.set("Beginn", "01012021").unwrap();

        let mut copy = Record::with_segments(210, 2, &config()).unwrap();
        copy.add(Field::alphanumeric("Name", 44, 30)).unwrap();
        copy.add(Field::numeric("Betrag", 300, 12)).unwrap();
        copy.add(Field::date("Beginn", 400, 8).unwrap()).unwrap();
        assert_ne!(copy, original);

        copy.import_from(&original.export()).unwrap();
        assert_eq!(copy, original);
        assert_eq!(copy.get("Name").unwrap().trim(), "Müller");
        assert_eq!(copy.field("Betrag").unwrap().to_int().unwrap(), 123456);
    }

    #[test]
    fn test_narrow_segments() {
        let config = Config::default().with_segment_width(10);
        let mut satz = Record::new(1, &config).unwrap();
        // bytes 5..9 of segment 1 are free, as are 15..19 of segment 2
        satz.add(Field::alphanumeric("a", 6, 4)).unwrap();
        satz.add(Field::alphanumeric("b", 15, 5)).unwrap();
        satz.set("a", "abcd").unwrap();
        satz.set("b", "efghi").unwrap();
        assert_eq!(satz.to_text(), "0001 abcd10001efghi2");
    }

    #[test]
    fn test_is_valid_with_invalid_field() {
        let mut satz = record(123);
        let schrott = Field::numeric("schrott", 10, 4).with_content("xxxx").unwrap();
        satz.add(schrott).unwrap();
        assert!(!satz.is_valid());
    }

    #[test]
    fn test_validate_unknown_type() {
        let mut a = Record::unknown(4711, &config()).unwrap();
        a.add_required(Field::alphanumeric("VU-Nummer", 5, 5)).unwrap();
        let violations = a.validate();
        assert_eq!(violations.len(), 2, "{violations:?}");
        assert!(violations.iter().any(|v| v.message == "unknown record type"));
        assert!(violations.iter().any(|v| v.message.contains("VU-Nummer")));

        a.set("VU-Nummer", "12345").unwrap();
        assert_eq!(a.validate().len(), 1);
    }

    #[test]
    fn test_validate_segment_header_mismatch() {
        let mut satz = record(123);
        let mut line = String::from("0124");
        line.push_str(&" ".repeat(251));
        line.push('7');
        satz.import_from(line.as_bytes()).unwrap();
        let violations = satz.validate();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].value, "0124");
        assert_eq!(violations[1].value, "7");
        assert!(matches!(
            violations[0].subject,
            Subject::Segment { index: 1, .. }
        ));
    }

    #[test]
    fn test_equals_and_hash() {
        let a = record(123);
        let mut b = record(123);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        b.add(Field::alphanumeric("c", 5, 5).with_content("ccccc").unwrap())
            .unwrap();
        assert_ne!(a, b);
        assert_ne!(record(123), record(124));
    }

    #[test]
    fn test_remove_segment() {
        let mut s = Record::with_segments(1, 3, &config()).unwrap();
        let n = s.segment_count();
        s.remove_segment(n).unwrap();
        assert_eq!(s.segment_count(), n - 1);
        s.remove_segment(1).unwrap();
        assert_eq!(s.segment_count(), n - 2);
        assert_eq!(s.segments()[0].sequence(), b'1');
    }

    #[test]
    fn test_remove_segment_out_of_range() {
        let mut s = Record::with_segments(1, 2, &config()).unwrap();
        assert!(matches!(
            s.remove_segment(0),
            Err(Error::IndexOutOfRange { index: 0, count: 2 })
        ));
        assert!(matches!(
            s.remove_segment(3),
            Err(Error::IndexOutOfRange { index: 3, count: 2 })
        ));
        s.remove_segment(2).unwrap();
        assert!(matches!(
            s.remove_segment(1),
            Err(Error::LastSegment { record_type: 1 })
        ));
    }

    #[test]
    fn test_remove_middle_segment_shifts_fields() {
        let mut s = Record::with_segments(220, 3, &config()).unwrap();
        s.add(Field::alphanumeric("eins", 10, 5)).unwrap();
        s.add_required(Field::alphanumeric("zwei", 256 + 10, 5)).unwrap();
        s.add(Field::alphanumeric("drei", 512 + 10, 5)).unwrap();
        s.set("drei", "three").unwrap();

        s.remove_segment(2).unwrap();
        assert_eq!(s.segment_count(), 2);
        assert!(!s.contains("zwei"));
        assert_eq!(s.required_fields().count(), 0);
        let drei = s.field("drei").unwrap();
        assert_eq!(drei.start(), 256 + 10);
        assert_eq!(drei.value(), "three");

        let text = s.to_text();
        assert_eq!(&text[256 + 9..256 + 14], "three");
        assert_eq!(text.as_bytes()[511], b'2');
        assert!(s.is_valid());
    }

    #[test]
    fn test_remove_all_segments() {
        let mut s = Record::with_segments(1, 3, &config()).unwrap();
        s.remove_segments_from(2).unwrap();
        assert_eq!(s.segment_count(), 1);

        let mut t = Record::with_segments(1, 4, &config()).unwrap();
        t.remove_segments_from(0).unwrap();
        assert_eq!(t.segment_count(), 1);

        let mut u = Record::with_segments(1, 4, &config()).unwrap();
        u.remove_segments_from(3).unwrap();
        assert_eq!(u.segment_count(), 2);
    }

    #[test]
    fn test_record_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Record>();
    }
}
