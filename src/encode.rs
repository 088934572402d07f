//! Build raw miniSEED v2/v3 records from a [`RecordTemplate`].
//!
//! The demultiplexer never re-encodes what it reads; this module exists to
//! synthesize well-formed input for tests and benchmarks, and is only
//! compiled with the `test-util` feature. Payload
//! bytes are copied into the data section as-is and declared as INT32
//! samples.

use crate::error::HeaderError;
use crate::header::{MAX_RECORD_LENGTH, MIN_V2_RECORD_LENGTH, V2_HEADER_SIZE, V3_HEADER_SIZE};
use crate::time::NanoTime;
use crate::types::{ByteOrder, FormatVersion};

/// Data encoding code for uncompressed 32-bit integers.
const ENCODING_INT32: u8 = 3;

/// v2 data section offset: fixed header + blockette 1000.
const V2_DATA_OFFSET: usize = V2_HEADER_SIZE + 8;

/// Description of a record to synthesize.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTemplate {
    pub format_version: FormatVersion,
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub start_time: NanoTime,
    pub sequence_number: u32,
    /// Header byte order (v2 only; v3 is always little-endian).
    pub byte_order: ByteOrder,
    /// Record length in bytes (v2 only, power of two).
    pub record_length: usize,
    pub payload: Vec<u8>,
}

impl RecordTemplate {
    /// A 512-byte big-endian v2 record with empty codes and no payload.
    pub fn new() -> Self {
        Self {
            format_version: FormatVersion::V2,
            network: String::new(),
            station: String::new(),
            location: String::new(),
            channel: String::new(),
            start_time: NanoTime::epoch(),
            sequence_number: 1,
            byte_order: ByteOrder::Big,
            record_length: 512,
            payload: Vec::new(),
        }
    }

    /// A v3 record with empty codes and no payload.
    pub fn new_v3() -> Self {
        Self {
            format_version: FormatVersion::V3,
            byte_order: ByteOrder::Little,
            ..Self::new()
        }
    }

    /// Set network, station, location, and channel codes.
    pub fn with_nslc(
        mut self,
        network: &str,
        station: &str,
        location: &str,
        channel: &str,
    ) -> Self {
        self.network = network.into();
        self.station = station.into();
        self.location = location.into();
        self.channel = channel.into();
        self
    }

    pub fn with_start_time(mut self, time: NanoTime) -> Self {
        self.start_time = time;
        self
    }

    pub fn with_sequence_number(mut self, seq: u32) -> Self {
        self.sequence_number = seq;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_record_length(mut self, len: usize) -> Self {
        self.record_length = len;
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }
}

impl Default for RecordTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a template into record bytes.
pub fn encode(template: &RecordTemplate) -> Result<Vec<u8>, HeaderError> {
    match template.format_version {
        FormatVersion::V2 => encode_v2(template),
        FormatVersion::V3 => encode_v3(template),
    }
}

fn encode_v2(t: &RecordTemplate) -> Result<Vec<u8>, HeaderError> {
    let rec_len = t.record_length;
    if !rec_len.is_power_of_two() || !(MIN_V2_RECORD_LENGTH..=1 << 20).contains(&rec_len) {
        return Err(HeaderError::InvalidRecordLength(rec_len));
    }
    if V2_DATA_OFFSET + t.payload.len() > rec_len {
        return Err(HeaderError::RecordTooShort {
            expected: V2_DATA_OFFSET + t.payload.len(),
            actual: rec_len,
        });
    }

    let u16_bytes = |v: u16| match t.byte_order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    };

    let mut buf = vec![0u8; rec_len];

    // Fixed header
    let seq = format!("{:06}", t.sequence_number % 1_000_000);
    buf[0..6].copy_from_slice(seq.as_bytes());
    buf[6] = b'D';
    buf[7] = b' ';
    write_padded(&mut buf[8..13], &t.station);
    write_padded(&mut buf[13..15], &t.location);
    write_padded(&mut buf[15..18], &t.channel);
    write_padded(&mut buf[18..20], &t.network);

    let st = &t.start_time;
    buf[20..22].copy_from_slice(&u16_bytes(st.year));
    buf[22..24].copy_from_slice(&u16_bytes(st.day));
    buf[24] = st.hour;
    buf[25] = st.minute;
    buf[26] = st.second;
    buf[28..30].copy_from_slice(&u16_bytes((st.nanosecond / 100_000) as u16));

    let num_samples = (t.payload.len() / 4) as u16;
    buf[30..32].copy_from_slice(&u16_bytes(num_samples));
    // Sample rate factor 1, multiplier 1
    buf[32..34].copy_from_slice(&u16_bytes(1));
    buf[34..36].copy_from_slice(&u16_bytes(1));
    buf[39] = 1; // number of blockettes
    buf[44..46].copy_from_slice(&u16_bytes(V2_DATA_OFFSET as u16));
    buf[46..48].copy_from_slice(&u16_bytes(V2_HEADER_SIZE as u16));

    // Blockette 1000
    buf[48..50].copy_from_slice(&u16_bytes(1000));
    buf[50..52].copy_from_slice(&u16_bytes(0));
    buf[52] = ENCODING_INT32;
    buf[53] = match t.byte_order {
        ByteOrder::Big => 1,
        ByteOrder::Little => 0,
    };
    buf[54] = rec_len.trailing_zeros() as u8;

    buf[V2_DATA_OFFSET..V2_DATA_OFFSET + t.payload.len()].copy_from_slice(&t.payload);
    Ok(buf)
}

fn encode_v3(t: &RecordTemplate) -> Result<Vec<u8>, HeaderError> {
    let sid = format!(
        "FDSN:{}_{}_{}_{}",
        t.network,
        t.station,
        t.location,
        split_channel(&t.channel)
    );
    if sid.len() > u8::MAX as usize {
        return Err(HeaderError::InvalidV3Header(format!(
            "SID too long: {} bytes",
            sid.len()
        )));
    }

    let total = V3_HEADER_SIZE + sid.len() + t.payload.len();
    if total > MAX_RECORD_LENGTH {
        return Err(HeaderError::InvalidRecordLength(total));
    }

    let mut buf = vec![0u8; total];
    buf[0] = b'M';
    buf[1] = b'S';
    buf[2] = 3;
    let st = &t.start_time;
    buf[4..8].copy_from_slice(&st.nanosecond.to_le_bytes());
    buf[8..10].copy_from_slice(&st.year.to_le_bytes());
    buf[10..12].copy_from_slice(&st.day.to_le_bytes());
    buf[12] = st.hour;
    buf[13] = st.minute;
    buf[14] = st.second;
    buf[15] = ENCODING_INT32;
    buf[16..24].copy_from_slice(&1.0f64.to_le_bytes());
    buf[24..28].copy_from_slice(&((t.payload.len() / 4) as u32).to_le_bytes());
    buf[32] = 1; // publication version
    buf[33] = sid.len() as u8;
    // No extra headers (34-35)
    buf[36..40].copy_from_slice(&(t.payload.len() as u32).to_le_bytes());

    let sid_end = V3_HEADER_SIZE + sid.len();
    buf[V3_HEADER_SIZE..sid_end].copy_from_slice(sid.as_bytes());
    buf[sid_end..].copy_from_slice(&t.payload);

    // CRC field is zero while the checksum is computed
    let crc = crc32c(&buf);
    buf[28..32].copy_from_slice(&crc.to_le_bytes());
    Ok(buf)
}

fn write_padded(dest: &mut [u8], src: &str) {
    let bytes = src.as_bytes();
    for (i, slot) in dest.iter_mut().enumerate() {
        *slot = bytes.get(i).copied().unwrap_or(b' ');
    }
}

/// "BHZ" -> "B_H_Z"; codes that are not three characters long pass through.
fn split_channel(channel: &str) -> String {
    let chars: Vec<char> = channel.chars().collect();
    if chars.len() == 3 {
        format!("{}_{}_{}", chars[0], chars[1], chars[2])
    } else {
        channel.to_string()
    }
}

/// CRC-32C (Castagnoli, reflected polynomial 0x82F63B78).
fn crc32c(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0x82F6_3B78 & mask);
        }
    }
    !crc
}
