//! Validation results.

use std::fmt;

/// The entity a violation refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A field, identified by name and 1-based start position.
    Field { name: String, start: usize },
    /// A segment header of a record.
    Segment { record_type: u16, index: usize },
    /// A whole record.
    Record { record_type: u16 },
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Field { name, start } => write!(f, "field '{name}' @{start}"),
            Subject::Segment { record_type, index } => {
                write!(f, "record {record_type:04} segment {index}")
            }
            Subject::Record { record_type } => write!(f, "record {record_type:04}"),
        }
    }
}

/// A semantic rule failure found during validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Violation {
    /// What the violation is about
    pub subject: Subject,
    /// The offending raw value
    pub value: String,
    /// Human readable explanation
    pub message: String,
}

impl Violation {
    pub fn new(subject: Subject, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (\"{}\")", self.subject, self.message, self.value)
    }
}
