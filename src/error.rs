//! Error types for reading and demultiplexing miniSEED streams.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemuxError {
    #[error("could not open input file '{}' for reading: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("record truncated: expected {expected} bytes, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },

    #[error("malformed record at byte offset {offset}: {source}")]
    MalformedRecord {
        offset: u64,
        #[source]
        source: HeaderError,
    },

    #[error("cannot write output '{name}': {source}")]
    ResourceWrite {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot close output '{name}': {source}")]
    ResourceClose {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Reasons a record header cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort { expected: usize, actual: usize },

    #[error("invalid v2 fixed header: {0}")]
    InvalidV2Header(String),

    #[error("invalid v3 header: {0}")]
    InvalidV3Header(String),

    #[error("blockette 1000 not found")]
    MissingBlockette1000,

    #[error("unsupported record length: {0} bytes")]
    InvalidRecordLength(usize),
}

pub type Result<T> = std::result::Result<T, DemuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_write_display_names_output() {
        let err = DemuxError::ResourceWrite {
            name: "ANMO.IU..BHZ.D.2024.045.1030".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "cannot write output 'ANMO.IU..BHZ.D.2024.045.1030': denied"
        );
    }

    #[test]
    fn test_source_open_display() {
        let err = DemuxError::SourceOpen {
            path: PathBuf::from("missing.mseed"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "could not open input file 'missing.mseed' for reading: not found"
        );
    }

    #[test]
    fn test_malformed_record_display_includes_cause() {
        let err = DemuxError::MalformedRecord {
            offset: 1024,
            source: HeaderError::MissingBlockette1000,
        };
        assert_eq!(
            err.to_string(),
            "malformed record at byte offset 1024: blockette 1000 not found"
        );
    }

    #[test]
    fn test_truncated_record_display() {
        let err = DemuxError::TruncatedRecord {
            expected: 512,
            actual: 100,
        };
        assert_eq!(err.to_string(), "record truncated: expected 512 bytes, got 100");
    }
}
