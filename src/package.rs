//! Packages (Datenpaket): the ordered records of one exchange file.
//!
//! Import reads physical lines, groups consecutive lines of one record type
//! whose sequence digits count up, and builds each group through the
//! [`Registry`]. Type codes nobody registered still import, as records that
//! report themselves unknown on validation.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::registry::Registry;
use crate::segment::{Segment, TAG_LEN};
use crate::standard;
use crate::text;
use crate::violation::Violation;

/// Ordered records sharing one configuration.
#[derive(Debug, Clone)]
pub struct Package {
    config: Config,
    registry: Arc<Registry>,
    records: Vec<Record>,
}

impl Package {
    /// An empty package that knows the envelope records.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, Registry::standard())
    }

    /// An empty package dispatching imports through `registry`.
    pub fn with_registry(config: Config, registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            config,
            registry: registry.into(),
            records: Vec::new(),
        }
    }

    /// A package holding only header and trailer, both carrying the
    /// configured default VU-Nummer.
    pub fn envelope(config: Config) -> Result<Self> {
        let mut package = Self::new(config);
        let org = package.config.default_identifying_value.clone();
        let mut header = standard::header(&package.config)?;
        header.set(standard::ORG_NUMBER, &org)?;
        let mut trailer = standard::trailer(&package.config)?;
        trailer.set(standard::ORG_NUMBER, &org)?;
        package.records = vec![header, trailer];
        package.refresh_count()?;
        Ok(package)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Appends `record`, in front of the trailer if there is one, and
    /// updates the trailer's record count.
    pub fn add(&mut self, record: Record) -> Result<()> {
        let at = match self.records.last() {
            Some(last) if last.record_type() == standard::TRAILER => self.records.len() - 1,
            _ => self.records.len(),
        };
        self.records.insert(at, record);
        self.refresh_count()
    }

    fn refresh_count(&mut self) -> Result<()> {
        let count = self.records.len() as i64;
        match self.records.last_mut() {
            Some(trailer)
                if trailer.record_type() == standard::TRAILER
                    && trailer.contains(standard::RECORD_COUNT) =>
            {
                trailer.set_number(standard::RECORD_COUNT, count)
            }
            _ => Ok(()),
        }
    }

    /// Reads all records from `reader` and appends them.
    ///
    /// Either every record of the input is appended or, on error, none.
    pub fn import_from<R: Read>(&mut self, mut reader: R) -> Result<()> {
        self.config.validate()?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(Error::Import)?;

        let width = self.config.segment_width;
        let lines = split_lines(&data, width, &self.config.end_marker_bytes());
        let groups = group_lines(&lines, width);
        if groups.is_empty() {
            return Err(Error::Import(io::Error::new(
                io::ErrorKind::InvalidData,
                "no records found",
            )));
        }

        let mut imported = Vec::with_capacity(groups.len());
        for group in groups {
            let code = record_code(group[0]);
            let mut record = match self.registry.build(code, &self.config) {
                Some(record) => record?,
                None => {
                    tracing::warn!(record_type = code, "no layout registered, importing as unknown");
                    standard::unknown(code, &self.config)?
                }
            };
            record.import_from(&group.concat())?;
            record.remove_segments_from(group.len() + 1)?;
            imported.push(record);
        }

        tracing::debug!(
            records = imported.len(),
            lines = lines.len(),
            "imported package"
        );
        self.records.extend(imported);
        Ok(())
    }

    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::open(path.as_ref()).map_err(Error::Import)?;
        self.import_from(BufReader::new(file))
    }

    /// All records exported back to back.
    pub fn export(&self) -> Vec<u8> {
        self.records.iter().flat_map(Record::export).collect()
    }

    pub fn export_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for record in &self.records {
            record.export_to(&mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn export_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.export_to(BufWriter::new(file))
    }

    /// Violations of all records, in record order.
    pub fn validate(&self) -> Vec<Violation> {
        self.records.iter().flat_map(Record::validate).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.records.iter().all(Record::is_valid)
    }
}

impl<'a> IntoIterator for &'a Package {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Splits raw input into physical lines of exactly `width` bytes.
///
/// A line ends after `width` bytes or at CR/LF. The end marker and any
/// line breaks following a line are skipped, blank lines are dropped and
/// short lines are padded with blanks.
fn split_lines(data: &[u8], width: usize, end_marker: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let rest = &data[pos..];
        let len = rest
            .iter()
            .take(width)
            .position(|b| matches!(b, b'\r' | b'\n'))
            .unwrap_or(rest.len().min(width));
        let mut line = rest[..len].to_vec();
        pos += len;

        if !end_marker.is_empty() && data[pos..].starts_with(end_marker) {
            pos += end_marker.len();
        }
        while pos < data.len() && matches!(data[pos], b'\r' | b'\n') {
            pos += 1;
        }

        if line.iter().all(|b| *b == b' ') {
            continue;
        }
        if line.len() < width {
            tracing::warn!(
                line = lines.len() + 1,
                length = line.len(),
                width,
                "short line padded with blanks"
            );
            line.resize(width, b' ');
        }
        lines.push(line);
    }
    lines
}

/// Groups lines into records: a line continues the current record when it
/// carries the same tag and the next sequence digit.
fn group_lines(lines: &[Vec<u8>], width: usize) -> Vec<Vec<&[u8]>> {
    let mut groups: Vec<Vec<&[u8]>> = Vec::new();
    for line in lines {
        let line = line.as_slice();
        if let Some(group) = groups.last_mut()
            && group[0][..TAG_LEN] == line[..TAG_LEN]
            && line[width - 1] == Segment::sequence_digit(group.len() + 1)
        {
            group.push(line);
            continue;
        }
        groups.push(vec![line]);
    }
    groups
}

/// Record type from the tag of `line`; unreadable tags map to 0.
fn record_code(line: &[u8]) -> u16 {
    let tag = text::decode(&line[..TAG_LEN]);
    tag.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(tag = %tag, "record type is not a number");
        0
    })
}
