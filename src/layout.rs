//! Parser for record layout definitions.
//!
//! Layout format:
//! ```text
//! # Adressteil
//! RECORD 0100
//! | ALPHA "VU-Nummer" 5,5 REQUIRED
//! | ALPHA "Name1" 44,30
//! | NUM "Postleitzahl" 164,6
//! | DATE "Geburtsdatum" 218,8
//! ?
//! ```
//!
//! - `RECORD <type> [SEGMENTS n]` starts a layout
//! - `| <field>` adds a field to the current layout
//! - `?` on its own line (or at the end of a field line) closes the layout;
//!   a following `RECORD` line closes it as well
//! - Lines starting with `#` are comments
//!
//! Field lines:
//! - `ALPHA`, `NUM` or `DATE` selects the field kind
//! - the name uses the first non-blank character as delimiter, so
//!   `"Name1"` and `/Name1/` are the same
//! - `start,length` is the 1-based position inside the record
//! - `LEFT` / `RIGHT` override the alignment, `REQUIRED` marks an
//!   identifying field that has to be set

use crate::config::Config;
use crate::error::{Error, Result};
use crate::field::{Align, Field};
use crate::record::{MAX_RECORD_TYPE, Record};

/// Field kinds a layout can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Alpha,
    Num,
    Date,
}

/// One field line of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub name: String,
    pub start: usize,
    pub length: usize,
    pub align: Option<Align>,
    pub required: bool,
}

impl FieldDef {
    /// Builds a blank field from this definition.
    pub fn build(&self) -> Result<Field> {
        let field = match self.field_type {
            FieldType::Alpha => Field::alphanumeric(self.name.as_str(), self.start, self.length),
            FieldType::Num => Field::numeric(self.name.as_str(), self.start, self.length),
            FieldType::Date => Field::date(self.name.as_str(), self.start, self.length)?,
        };
        Ok(match self.align {
            Some(align) => field.with_align(align),
            None => field,
        })
    }
}

/// The shape of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub record_type: u16,
    pub segments: usize,
    pub fields: Vec<FieldDef>,
}

impl RecordLayout {
    /// Builds a blank record with all fields of this layout.
    pub fn build(&self, config: &Config) -> Result<Record> {
        let mut record = Record::with_segments(self.record_type, self.segments, config)?;
        for def in &self.fields {
            let field = def.build()?;
            if def.required {
                record.add_required(field)?;
            } else {
                record.add(field)?;
            }
        }
        Ok(record)
    }
}

/// Parse layout definition text.
pub fn parse_layouts(text: &str) -> Result<Vec<RecordLayout>> {
    let mut layouts = Vec::new();
    let mut current: Option<RecordLayout> = None;

    for (line_num, line) in text.lines().enumerate() {
        let err = |message: String| Error::Layout {
            line: line_num + 1,
            message,
        };
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Trailing ? closes the current layout
        let closes = line.ends_with('?');
        let line = line.trim_end_matches('?').trim();

        if line.to_uppercase().starts_with("RECORD") {
            layouts.extend(current.take());
            let (record_type, segments) = parse_record_line(line).map_err(err)?;
            current = Some(RecordLayout {
                record_type,
                segments,
                fields: Vec::new(),
            });
        } else if let Some(stripped) = line.strip_prefix('|') {
            let layout = current
                .as_mut()
                .ok_or_else(|| err("Field definition outside of RECORD".to_string()))?;
            layout
                .fields
                .push(parse_field(stripped.trim()).map_err(err)?);
        } else if !line.is_empty() {
            return Err(err(format!(
                "Unexpected line: {}",
                line.split_whitespace().next().unwrap_or(line)
            )));
        }

        if closes {
            layouts.extend(current.take());
        }
    }

    layouts.extend(current);
    Ok(layouts)
}

/// Parse `RECORD <type> [SEGMENTS n]`.
fn parse_record_line(line: &str) -> std::result::Result<(u16, usize), String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let record_type: u16 = words
        .get(1)
        .ok_or("RECORD requires a record type")?
        .parse()
        .map_err(|_| format!("Invalid record type '{}'", words[1]))?;
    if record_type > MAX_RECORD_TYPE {
        return Err(format!("Record type {record_type} has more than 4 digits"));
    }

    let segments = match words.get(2..) {
        Some([]) | None => 1,
        Some([keyword, n]) if keyword.eq_ignore_ascii_case("SEGMENTS") => {
            let n: usize = n
                .parse()
                .map_err(|_| format!("Invalid segment count '{n}'"))?;
            if n == 0 {
                return Err("SEGMENTS must be at least 1".to_string());
            }
            n
        }
        Some(_) => return Err("RECORD accepts only SEGMENTS n after the type".to_string()),
    };

    Ok((record_type, segments))
}

/// Parse `KIND "name" start,length [options]`.
fn parse_field(line: &str) -> std::result::Result<FieldDef, String> {
    let mut parts = line.splitn(2, char::is_whitespace);
    let kind = parts.next().unwrap_or("");
    let field_type = match kind.to_uppercase().as_str() {
        "ALPHA" => FieldType::Alpha,
        "NUM" => FieldType::Num,
        "DATE" => FieldType::Date,
        "" => return Err("Field requires a type".to_string()),
        _ => return Err(format!("Unknown field type: {kind}")),
    };

    let (name, rest) = parse_delimited_string(parts.next().unwrap_or(""))?;
    if name.is_empty() {
        return Err("Field name must not be empty".to_string());
    }

    let mut words = rest.split_whitespace();
    let geometry = words
        .next()
        .ok_or_else(|| format!("Field '{name}' requires start,length"))?;
    let (start, length) = parse_geometry(geometry)?;

    let mut align = None;
    let mut required = false;
    for word in words {
        match word.to_uppercase().as_str() {
            "LEFT" => align = Some(Align::Left),
            "RIGHT" => align = Some(Align::Right),
            "REQUIRED" => required = true,
            _ => return Err(format!("Unknown option '{word}' for field '{name}'")),
        }
    }

    Ok(FieldDef {
        field_type,
        name,
        start,
        length,
        align,
        required,
    })
}

fn parse_geometry(text: &str) -> std::result::Result<(usize, usize), String> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("Expected start,length but got '{text}'"));
    }
    let start: usize = parts[0]
        .trim()
        .parse()
        .map_err(|_| "Invalid start position")?;
    let length: usize = parts[1].trim().parse().map_err(|_| "Invalid length")?;
    Ok((start, length))
}

/// Parse a delimited string: the first non-blank character is the
/// delimiter and the string runs until its next occurrence.
/// Returns (extracted_string, rest_of_input).
fn parse_delimited_string(s: &str) -> std::result::Result<(String, &str), String> {
    let s = s.trim_start();
    let Some(delim) = s.chars().next() else {
        return Err("Expected delimited field name".to_string());
    };
    let after_delim = &s[delim.len_utf8()..];

    if let Some(end) = after_delim.find(delim) {
        let extracted = after_delim[..end].to_string();
        let rest = &after_delim[end + delim.len_utf8()..];
        Ok((extracted, rest))
    } else {
        Err(format!("Unclosed delimiter '{delim}'"))
    }
}
