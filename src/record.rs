//! A raw miniSEED record together with its routing identity.
//!
//! [`Record`] carries the decoded identifying header fields and the
//! verbatim bytes of the record. The bytes are written out unchanged; the
//! header fields only decide where they go.

use std::fmt;

use crate::header::RecordHeader;
use crate::time::{NanoTime, TimeBucket};
use crate::types::FormatVersion;

/// One record read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub format_version: FormatVersion,
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: NanoTime,
    /// Header and data bytes exactly as read.
    pub raw: Vec<u8>,
}

impl Record {
    pub(crate) fn from_parts(header: RecordHeader, raw: Vec<u8>) -> Self {
        Self {
            format_version: header.format_version,
            network: header.network,
            station: header.station,
            location: header.location,
            channel: header.channel,
            start_time: header.start_time,
            raw,
        }
    }

    /// The stream this record belongs to.
    pub fn stream_id(&self) -> StreamId<'_> {
        StreamId {
            station: &self.station,
            network: &self.network,
            location: &self.location,
            channel: &self.channel,
        }
    }

    /// The minute bucket of the record's start time.
    pub fn time_bucket(&self) -> TimeBucket {
        self.start_time.bucket()
    }

    /// Output name: `STA.NET.LOC.CHA.D.YYYY.DDD.HHMM`.
    pub fn output_name(&self) -> String {
        format!("{}{}", self.stream_id(), self.time_bucket())
    }

    /// Length of the raw record in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} bytes [{}]",
            self.stream_id(),
            self.start_time,
            self.raw.len(),
            self.format_version,
        )
    }
}

/// Identity of a stream: station, network, location and channel codes.
///
/// Codes are compared and rendered verbatim, without case folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId<'a> {
    pub station: &'a str,
    pub network: &'a str,
    pub location: &'a str,
    pub channel: &'a str,
}

impl fmt::Display for StreamId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.station, self.network, self.location, self.channel
        )
    }
}
