//! Envelope records every exchange file carries.
//!
//! The header (Vorsatz, 0001) opens a file and the trailer (Nachsatz, 9999)
//! closes it. Both identify the sending insurer by its VU-Nummer.

use crate::config::Config;
use crate::error::Result;
use crate::field::Field;
use crate::record::Record;

/// Record type of the header record.
pub const HEADER: u16 = 1;
/// Record type of the trailer record.
pub const TRAILER: u16 = 9999;

/// Identifying insurer number, present in nearly every record type.
pub const ORG_NUMBER: &str = "VU-Nummer";
pub const SENDER: &str = "Absender";
pub const RECIPIENT: &str = "Adressat";
pub const PERIOD_FROM: &str = "Erstellungs-Datum-Zeitraum vom";
pub const PERIOD_TO: &str = "Erstellungs-Datum-Zeitraum bis";
pub const BRANCH: &str = "Geschaeftsstelle/Vermittler";
/// Number of records in the file, envelope included.
pub const RECORD_COUNT: &str = "Anzahl der Saetze";

fn org_number() -> Field {
    Field::alphanumeric(ORG_NUMBER, 5, 5)
}

/// Blank header record.
pub fn header(config: &Config) -> Result<Record> {
    let mut record = Record::new(HEADER, config)?;
    record.add_required(org_number())?;
    record.add(Field::alphanumeric(SENDER, 10, 30))?;
    record.add(Field::alphanumeric(RECIPIENT, 40, 30))?;
    record.add(Field::date(PERIOD_FROM, 70, 8)?)?;
    record.add(Field::date(PERIOD_TO, 78, 8)?)?;
    record.add(Field::alphanumeric(BRANCH, 86, 10))?;
    Ok(record)
}

/// Blank trailer record.
pub fn trailer(config: &Config) -> Result<Record> {
    let mut record = Record::new(TRAILER, config)?;
    record.add_required(org_number())?;
    record.add(Field::numeric(RECORD_COUNT, 10, 10))?;
    record.add(Field::alphanumeric(BRANCH, 20, 10))?;
    Ok(record)
}

/// Fallback for type codes without a registered layout. Only the
/// VU-Nummer is known, at its usual position.
pub fn unknown(record_type: u16, config: &Config) -> Result<Record> {
    let mut record = Record::unknown(record_type, config)?;
    record.add_required(org_number())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = header(&Config::default()).unwrap();
        assert_eq!(header.field_count(), 6);
        assert_eq!(header.segment_count(), 1);
        // blank VU-Nummer is the only problem of a fresh header
        let violations = header.validate();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains(ORG_NUMBER));
    }

    #[test]
    fn test_trailer_layout() {
        let mut trailer = trailer(&Config::default()).unwrap();
        trailer.set(ORG_NUMBER, "12345").unwrap();
        trailer.set_number(RECORD_COUNT, 3).unwrap();
        assert!(trailer.is_valid());
        assert_eq!(&trailer.to_text()[..19], "9999123450000000003");
    }

    #[test]
    fn test_unknown_layout() {
        let record = unknown(4711, &Config::default()).unwrap();
        assert!(!record.is_known());
        assert_eq!(record.validate().len(), 2);
    }
}
