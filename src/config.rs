//! Record format configuration.

use crate::error::{Error, Result};
use crate::segment::HEADER_LEN;

/// Default width of a physical line.
pub const SEGMENT_WIDTH: usize = 256;

/// Configuration threaded into record and package construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bytes per physical line (segment)
    pub segment_width: usize,
    /// Bytes appended after each exported segment (e.g. "\n" or "\r\n")
    pub end_marker: String,
    /// VU-Nummer used when synthesizing envelope records
    pub default_identifying_value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_width: SEGMENT_WIDTH,
            end_marker: String::new(),
            default_identifying_value: "DUMMY".to_string(),
        }
    }
}

impl Config {
    /// Returns a copy using `marker` as end-of-record marker.
    pub fn with_end_marker(mut self, marker: &str) -> Self {
        self.end_marker = marker.to_string();
        self
    }

    /// Returns a copy using `width` bytes per segment.
    pub fn with_segment_width(mut self, width: usize) -> Self {
        self.segment_width = width;
        self
    }

    /// Checks that a segment can hold its header plus at least one data byte.
    pub fn validate(&self) -> Result<()> {
        if self.segment_width <= HEADER_LEN {
            return Err(Error::InvalidConfig(format!(
                "segment width {} must be larger than the {HEADER_LEN} header bytes",
                self.segment_width
            )));
        }
        if self.end_marker.chars().any(|c| c as u32 > 0xFF) {
            return Err(Error::InvalidConfig(
                "end marker must be ISO-8859-1 text".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn end_marker_bytes(&self) -> Vec<u8> {
        self.end_marker.chars().map(|c| c as u8).collect()
    }
}
