//! # gdv-records
//!
//! Fixed-width record packing for GDV exchange files.
//!
//! GDV files carry insurance data as fixed-width lines without any field
//! delimiters. The meaning of every byte comes from its position alone, so
//! a layout (which field lives at which offset) must be known to read or
//! write a file.
//!
//! ## Overview
//!
//! - **Field**: a named byte range; alphanumeric, numeric or date
//! - **Segment** (Teildatensatz): one physical line, 256 bytes by default,
//!   starting with the 4 digit record type and ending with a sequence digit
//! - **Record** (Satz): fields laid out over one or more segments
//! - **Package** (Datenpaket): the ordered records of a file
//!
//! Structural misuse (overlapping fields, oversized values) fails with an
//! [`Error`]. Content problems found in imported data are reported as
//! [`Violation`]s instead.
//!
//! ## Example
//!
//! ```
//! use gdv_records::{Config, Field, Package, Record};
//!
//! let config = Config::default();
//! let mut record = Record::new(100, &config).unwrap();
//! record.add(Field::alphanumeric("Name1", 44, 30)).unwrap();
//! record.set("Name1", "Oli B.").unwrap();
//!
//! let mut package = Package::envelope(config).unwrap();
//! package.add(record).unwrap();
//!
//! let exported = package.export();
//! assert_eq!(exported.len(), 3 * 256);
//! assert_eq!(&exported[256..260], b"0100");
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod layout;
pub mod package;
pub mod record;
pub mod registry;
pub mod segment;
pub mod standard;
pub mod text;
pub mod violation;

pub use config::{Config, SEGMENT_WIDTH};
pub use error::{Error, Result};
pub use field::{Align, DatePattern, Field, FieldKind};
pub use layout::{FieldDef, FieldType, RecordLayout, parse_layouts};
pub use package::Package;
pub use record::{MAX_RECORD_TYPE, MAX_SEGMENTS, RECORD_TYPE, Record, SEGMENT_NUMBER};
pub use registry::{Factory, Registry};
pub use segment::{HEADER_LEN, Segment, TAG_LEN};
pub use violation::{Subject, Violation};
