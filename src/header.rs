//! Decode the identifying header fields of miniSEED v2 and v3 records.
//!
//! Only the parts needed to route a record are decoded: the NSLC codes,
//! the start time and the total record length. Sample payloads are never
//! touched, so every data encoding passes through unchanged.
//!
//! Record length is discovered incrementally with [`probe_length`], which
//! lets a streaming reader fetch exactly as many bytes as the header needs
//! and never read past the end of a record.

use crate::error::HeaderError;
use crate::sid::SourceId;
use crate::time::{BTime, NanoTime};
use crate::types::{ByteOrder, FormatVersion};

/// Size of the v2 fixed header.
pub const V2_HEADER_SIZE: usize = 48;
/// Size of the v3 fixed header.
pub const V3_HEADER_SIZE: usize = 40;
/// Smallest v2 record length (2^7).
pub const MIN_V2_RECORD_LENGTH: usize = 1 << 7;
/// Largest record accepted in either version.
pub const MAX_RECORD_LENGTH: usize = 10 * 1024 * 1024;

const BLOCKETTE_1000: u16 = 1000;

type Result<T> = std::result::Result<T, HeaderError>;

/// Outcome of probing a partial record for its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The record is this many bytes long in total.
    Length(usize),
    /// At least this many leading bytes are needed before the length is known.
    NeedMore(usize),
}

/// Routing-relevant fields of a decoded record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub format_version: FormatVersion,
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: NanoTime,
    pub record_length: usize,
}

/// Determine the total length of the record starting at `data[0]`.
///
/// `data` may hold only the beginning of the record.
pub fn probe_length(data: &[u8]) -> Result<Probe> {
    if data.len() < 3 {
        return Ok(Probe::NeedMore(3));
    }
    match FormatVersion::detect(data) {
        FormatVersion::V3 => probe_v3_length(data),
        FormatVersion::V2 => probe_v2_length(data),
    }
}

/// Decode the header of one complete record.
pub fn decode_header(data: &[u8]) -> Result<RecordHeader> {
    match FormatVersion::detect(data) {
        FormatVersion::V3 => decode_v3_header(data),
        FormatVersion::V2 => decode_v2_header(data),
    }
}

fn probe_v3_length(data: &[u8]) -> Result<Probe> {
    if data.len() < V3_HEADER_SIZE {
        return Ok(Probe::NeedMore(V3_HEADER_SIZE));
    }
    let sid_length = data[33] as usize;
    let extra_length = u16::from_le_bytes([data[34], data[35]]) as usize;
    let data_length = u32::from_le_bytes([data[36], data[37], data[38], data[39]]) as usize;

    if sid_length == 0 {
        return Err(HeaderError::InvalidV3Header(
            "source identifier is empty".into(),
        ));
    }

    let total = V3_HEADER_SIZE + sid_length + extra_length + data_length;
    if total > MAX_RECORD_LENGTH {
        return Err(HeaderError::InvalidRecordLength(total));
    }
    Ok(Probe::Length(total))
}

fn probe_v2_length(data: &[u8]) -> Result<Probe> {
    if data.len() < V2_HEADER_SIZE {
        return Ok(Probe::NeedMore(V2_HEADER_SIZE));
    }
    let order = validate_v2_fixed_header(data)?;

    // Walk the blockette chain until blockette 1000 turns up
    let mut offset = order.u16([data[46], data[47]]) as usize;
    loop {
        if offset < V2_HEADER_SIZE {
            return Err(HeaderError::MissingBlockette1000);
        }
        if offset + 4 > MAX_RECORD_LENGTH {
            return Err(HeaderError::MissingBlockette1000);
        }
        if data.len() < offset + 4 {
            return Ok(Probe::NeedMore(offset + 4));
        }

        let blockette_type = order.u16([data[offset], data[offset + 1]]);
        let next_offset = order.u16([data[offset + 2], data[offset + 3]]) as usize;

        if blockette_type == BLOCKETTE_1000 {
            if data.len() < offset + 8 {
                return Ok(Probe::NeedMore(offset + 8));
            }
            let power = data[offset + 6];
            if !(7..=20).contains(&power) {
                return Err(HeaderError::InvalidRecordLength(
                    1usize.checked_shl(power as u32).unwrap_or(0),
                ));
            }
            let record_length = 1usize << power;
            if offset + 8 > record_length {
                return Err(HeaderError::InvalidV2Header(
                    "blockette 1000 lies outside the record".into(),
                ));
            }
            return Ok(Probe::Length(record_length));
        }

        // A chain that does not move forward would never terminate
        if next_offset == 0 || next_offset <= offset {
            return Err(HeaderError::MissingBlockette1000);
        }
        offset = next_offset;
    }
}

/// Check the v2 fixed header for plausibility and detect its byte order.
fn validate_v2_fixed_header(data: &[u8]) -> Result<ByteOrder> {
    let sequence_ok = data[0..6]
        .iter()
        .all(|&b| b.is_ascii_digit() || b == b' ' || b == 0);
    if !sequence_ok {
        return Err(HeaderError::InvalidV2Header(
            "sequence number is not numeric".into(),
        ));
    }

    let quality = data[6];
    if !matches!(quality, b'D' | b'R' | b'Q' | b'M') {
        return Err(HeaderError::InvalidV2Header(format!(
            "unexpected quality indicator {:?}",
            quality as char
        )));
    }

    let plausible = |order: ByteOrder| {
        let year = order.u16([data[20], data[21]]);
        let day = order.u16([data[22], data[23]]);
        (1900..=2100).contains(&year) && (1..=366).contains(&day)
    };
    let order = if plausible(ByteOrder::Big) {
        ByteOrder::Big
    } else if plausible(ByteOrder::Little) {
        ByteOrder::Little
    } else {
        return Err(HeaderError::InvalidV2Header(
            "start time year/day out of range".into(),
        ));
    };

    if data[24] > 23 || data[25] > 59 || data[26] > 60 {
        return Err(HeaderError::InvalidV2Header(
            "start time hour/minute/second out of range".into(),
        ));
    }
    Ok(order)
}

fn decode_v2_header(data: &[u8]) -> Result<RecordHeader> {
    let record_length = match probe_v2_length(data)? {
        Probe::Length(len) => len,
        Probe::NeedMore(expected) => {
            return Err(HeaderError::RecordTooShort {
                expected,
                actual: data.len(),
            });
        }
    };
    if data.len() < record_length {
        return Err(HeaderError::RecordTooShort {
            expected: record_length,
            actual: data.len(),
        });
    }

    let order = validate_v2_fixed_header(data)?;
    let start_time = BTime {
        year: order.u16([data[20], data[21]]),
        day: order.u16([data[22], data[23]]),
        hour: data[24],
        minute: data[25],
        second: data[26],
        // byte 27 is unused
        fract: order.u16([data[28], data[29]]),
    };

    Ok(RecordHeader {
        format_version: FormatVersion::V2,
        station: fixed_field(&data[8..13], "station")?,
        location: fixed_field(&data[13..15], "location")?,
        channel: fixed_field(&data[15..18], "channel")?,
        network: fixed_field(&data[18..20], "network")?,
        start_time: start_time.into(),
        record_length,
    })
}

/// Read a space-padded ASCII header field, dropping only the padding.
fn fixed_field(bytes: &[u8], name: &str) -> Result<String> {
    let text = std::str::from_utf8(bytes)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| HeaderError::InvalidV2Header(format!("{name} code is not ASCII")))?;
    let code = text.trim_end_matches([' ', '\0']);
    if !usable_in_file_name(code) {
        return Err(HeaderError::InvalidV2Header(format!(
            "{name} code {code:?} cannot be used in a file name"
        )));
    }
    Ok(code.to_string())
}

/// Codes end up in output file names; they must not leave the output
/// directory or cut the name short.
fn usable_in_file_name(code: &str) -> bool {
    !code.contains(['/', '\0'])
}

fn decode_v3_header(data: &[u8]) -> Result<RecordHeader> {
    let record_length = match probe_v3_length(data)? {
        Probe::Length(len) => len,
        Probe::NeedMore(expected) => {
            return Err(HeaderError::RecordTooShort {
                expected,
                actual: data.len(),
            });
        }
    };
    if data.len() < record_length {
        return Err(HeaderError::RecordTooShort {
            expected: record_length,
            actual: data.len(),
        });
    }

    let start_time = NanoTime {
        nanosecond: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        year: u16::from_le_bytes([data[8], data[9]]),
        day: u16::from_le_bytes([data[10], data[11]]),
        hour: data[12],
        minute: data[13],
        second: data[14],
    };

    let sid_length = data[33] as usize;
    let sid_bytes = &data[V3_HEADER_SIZE..V3_HEADER_SIZE + sid_length];
    let sid_str = std::str::from_utf8(sid_bytes)
        .map_err(|_| HeaderError::InvalidV3Header("invalid UTF-8 in SID".into()))?;
    let source_id = SourceId::parse(sid_str);
    let (network, station, location, channel) = source_id.to_nslc().ok_or_else(|| {
        HeaderError::InvalidV3Header(format!("cannot split {source_id} into NSLC codes"))
    })?;
    if let Some(code) = [&network, &station, &location, &channel]
        .into_iter()
        .find(|code| !usable_in_file_name(code))
    {
        return Err(HeaderError::InvalidV3Header(format!(
            "code {code:?} cannot be used in a file name"
        )));
    }

    Ok(RecordHeader {
        format_version: FormatVersion::V3,
        network,
        station,
        location,
        channel,
        start_time,
        record_length,
    })
}
