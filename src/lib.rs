//! Demultiplex a stream of miniSEED records into per-stream files.
//!
//! Records are read one at a time from any [`std::io::Read`] (a file or a
//! live stdin pipe), and each record's bytes are appended verbatim to an
//! output named after its stream and the minute it starts in:
//! `STA.NET.LOC.CHA.D.YYYY.DDD.HHMM`. Both miniSEED v2 and v3 records are
//! understood; only their headers are decoded.
//!
//! # Demultiplexing in memory
//!
//! ```
//! use msdemux::{encode, MemoryOpener, NanoTime, RecordReader, RecordTemplate, Router};
//!
//! let at = |minute| NanoTime {
//!     year: 2024, day: 45, hour: 10,
//!     minute, second: 0, nanosecond: 0,
//! };
//! let mut data = Vec::new();
//! for minute in [30, 30, 31] {
//!     let record = RecordTemplate::new()
//!         .with_nslc("IU", "ANMO", "", "BHZ")
//!         .with_start_time(at(minute));
//!     data.extend_from_slice(&encode(&record).unwrap());
//! }
//!
//! let opener = MemoryOpener::new();
//! let summary = Router::new(opener.clone())
//!     .process(RecordReader::new(&data[..]), &mut std::io::sink())
//!     .unwrap();
//!
//! assert_eq!(summary.records, 3);
//! assert_eq!(
//!     summary.outputs,
//!     ["ANMO.IU..BHZ.D.2024.045.1030", "ANMO.IU..BHZ.D.2024.045.1031"]
//! );
//! assert_eq!(opener.contents("ANMO.IU..BHZ.D.2024.045.1030").unwrap(), &data[..1024]);
//! ```
//!
//! # Demultiplexing a file
//!
//! ```no_run
//! use msdemux::{run, DemuxConfig, Source, StopSignal};
//!
//! let config = DemuxConfig::new(Source::from_arg("data.mseed"))
//!     .with_output_dir("demuxed")
//!     .with_verbose(true);
//! let summary = run(&config, StopSignal::new(), &mut std::io::stderr()).unwrap();
//! println!("{} records", summary.records);
//! ```

pub mod config;
#[cfg(any(test, feature = "test-util"))]
pub mod encode;
pub mod error;
pub mod header;
pub mod reader;
pub mod record;
pub mod router;
pub mod sid;
pub mod signal;
pub mod sink;
pub mod time;
pub mod types;

pub use error::{DemuxError, HeaderError, Result};
pub use config::{DemuxConfig, Source, run};
#[cfg(any(test, feature = "test-util"))]
pub use encode::{RecordTemplate, encode};
pub use header::{RecordHeader, decode_header};
pub use reader::{BackgroundReader, RecordReader};
pub use record::{Record, StreamId};
pub use router::{Router, RunOutcome, RunSummary};
pub use sid::SourceId;
pub use signal::{StopSignal, install_interrupt_handler};
pub use sink::{FileOpener, MemoryOpener, MemorySink, SinkOpener};
pub use time::{BTime, NanoTime, TimeBucket};
pub use types::{ByteOrder, FormatVersion};
