//! Record start times and the minute buckets derived from them.
//!
//! [`NanoTime`] is the unified timestamp for v2 and v3 records. The v2
//! header stores a [`BTime`], which converts losslessly into a `NanoTime`.
//! [`TimeBucket`] truncates a start time to the minute for output naming.

use std::fmt;

/// Nanosecond-precision timestamp (year + day-of-year + time).
///
/// Fields are taken verbatim from the record header. No calendar
/// normalization or timezone conversion is ever applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NanoTime {
    pub year: u16,
    pub day: u16,        // 1-366
    pub hour: u8,        // 0-23
    pub minute: u8,      // 0-59
    pub second: u8,      // 0-60 (60 for leap second)
    pub nanosecond: u32, // 0-999_999_999
}

impl NanoTime {
    /// Create a NanoTime with default epoch (1970-001 00:00:00.000000000).
    pub fn epoch() -> Self {
        Self {
            year: 1970,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
        }
    }

    /// Create a NanoTime from a v2 [`BTime`] value.
    ///
    /// Converts the 0.0001-second fractional field to nanoseconds.
    pub fn from_btime(bt: &BTime) -> Self {
        Self {
            year: bt.year,
            day: bt.day,
            hour: bt.hour,
            minute: bt.minute,
            second: bt.second,
            nanosecond: bt.fract as u32 * 100_000,
        }
    }

    /// The minute bucket this time falls into.
    pub fn bucket(&self) -> TimeBucket {
        TimeBucket {
            year: self.year,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
        }
    }
}

impl Default for NanoTime {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for NanoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03} {:02}:{:02}:{:02}.{:09}",
            self.year, self.day, self.hour, self.minute, self.second, self.nanosecond
        )
    }
}

impl From<BTime> for NanoTime {
    fn from(bt: BTime) -> Self {
        Self::from_btime(&bt)
    }
}

/// BTIME timestamp (10 bytes in the miniSEED v2 fixed header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTime {
    pub year: u16,
    pub day: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub fract: u16, // 0.0001 second units
}

impl fmt::Display for BTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03} {:02}:{:02}:{:02}.{:04}",
            self.year, self.day, self.hour, self.minute, self.second, self.fract
        )
    }
}

/// Minute-resolution time bucket used in output names.
///
/// Displays as the file-name suffix `.D.YYYY.DDD.HHMM`, where `D` marks
/// data records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket {
    pub year: u16,
    pub day: u16,
    pub hour: u8,
    pub minute: u8,
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ".D.{:04}.{:03}.{:02}{:02}",
            self.year, self.day, self.hour, self.minute
        )
    }
}
