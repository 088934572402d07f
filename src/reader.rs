//! Pull-based reader producing [`Record`]s from any byte stream.
//!
//! [`RecordReader`] reads exactly one record at a time and never reads past
//! the end of the record it is decoding, so it is safe on unbounded inputs
//! such as a live stdin pipe. A read that blocks waiting for more bytes is
//! the only suspension point; [`BackgroundReader`] moves that wait onto its
//! own thread so a stop request is seen while the input is quiet.

use std::io::{self, ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::header::{self, Probe};
use crate::record::Record;
use crate::signal::StopSignal;
use crate::{DemuxError, Result};

/// How long a waiting [`BackgroundReader`] blocks before re-checking its
/// stop signal.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Iterator over the records of a miniSEED byte stream.
///
/// Iteration ends with `None` at a clean record boundary. If the stream
/// ends inside a record, the last item is a
/// [`DemuxError::TruncatedRecord`]; a header that cannot be decoded yields
/// [`DemuxError::MalformedRecord`]. Nothing is produced after an error.
///
/// # Example
///
/// ```
/// use msdemux::{encode, RecordReader, RecordTemplate};
///
/// let record = RecordTemplate::new().with_nslc("XX", "TEST", "00", "BHZ");
/// let data = encode(&record).unwrap();
///
/// let records: Vec<_> = RecordReader::new(&data[..])
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].raw, data);
/// ```
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    records: u64,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            records: 0,
            finished: false,
        }
    }

    /// Number of complete records produced so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Number of bytes belonging to complete records produced so far.
    pub fn bytes_read(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        let mut buf = Vec::with_capacity(512);

        let record_length = loop {
            let probe = header::probe_length(&buf).map_err(|source| DemuxError::MalformedRecord {
                offset: self.offset,
                source,
            })?;
            match probe {
                Probe::Length(len) => break len,
                Probe::NeedMore(needed) => {
                    if !self.fill(&mut buf, needed)? {
                        if buf.is_empty() {
                            return Ok(None);
                        }
                        return Err(DemuxError::TruncatedRecord {
                            expected: needed,
                            actual: buf.len(),
                        });
                    }
                }
            }
        };

        if !self.fill(&mut buf, record_length)? {
            return Err(DemuxError::TruncatedRecord {
                expected: record_length,
                actual: buf.len(),
            });
        }

        let header = header::decode_header(&buf).map_err(|source| DemuxError::MalformedRecord {
            offset: self.offset,
            source,
        })?;

        self.offset += record_length as u64;
        self.records += 1;
        Ok(Some(Record::from_parts(header, buf)))
    }

    /// Grow `buf` to `target` bytes from the stream.
    ///
    /// Returns `false` if the stream ended first; `buf` then holds whatever
    /// was received.
    fn fill(&mut self, buf: &mut Vec<u8>, target: usize) -> Result<bool> {
        let mut filled = buf.len();
        if filled >= target {
            return Ok(true);
        }
        buf.resize(target, 0);

        while filled < target {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    buf.truncate(filled);
                    return Ok(false);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    buf.truncate(filled);
                    return Err(e.into());
                }
            }
        }
        Ok(true)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// A [`RecordReader`] running on a dedicated thread.
///
/// Items arrive in input order over a rendezvous channel, so the reader
/// thread holds at most one decoded record the consumer has not taken.
/// Iteration ends when the input ends or as soon as the stop signal is
/// raised, even while the reader thread is still blocked on its source.
/// That thread is then left to finish its read; it exits on its own once
/// the read returns, or with the process.
pub struct BackgroundReader {
    receiver: Receiver<Result<Record>>,
    stop: StopSignal,
}

impl BackgroundReader {
    pub fn spawn<R>(reader: RecordReader<R>, stop: StopSignal) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(0);
        thread::Builder::new()
            .name("msdemux-reader".into())
            .spawn(move || {
                for item in reader {
                    if sender.send(item).is_err() {
                        tracing::debug!("record consumer gone, reader thread exiting");
                        break;
                    }
                }
            })?;
        Ok(Self { receiver, stop })
    }
}

impl Iterator for BackgroundReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.stop.is_requested() {
                return None;
            }
            match self.receiver.recv_timeout(STOP_POLL_INTERVAL) {
                Ok(item) => return Some(item),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
