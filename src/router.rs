//! Route records to one append-only output per stream and minute.
//!
//! The [`Router`] owns the table of open outputs for the whole run. Each
//! output is opened the first time its name is seen and stays open until
//! the run ends, whether by end of input, a stop request, a truncated
//! trailing record or an error. Every path out of [`Router::process`]
//! closes all outputs opened so far.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crate::record::Record;
use crate::signal::StopSignal;
use crate::sink::SinkOpener;
use crate::{DemuxError, Result};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input ended on a record boundary.
    Completed,
    /// A stop was requested before the input ended.
    Interrupted,
    /// The input ended inside a record; that partial record was dropped.
    Truncated,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Truncated => write!(f, "truncated"),
        }
    }
}

/// Statistics of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u64,
    pub bytes: u64,
    /// Output names in the order they were first opened.
    pub outputs: Vec<String>,
    pub outcome: RunOutcome,
}

/// Demultiplexes records into per-output sinks.
///
/// # Example
///
/// ```
/// use msdemux::{encode, MemoryOpener, RecordReader, RecordTemplate, Router};
///
/// let data = encode(&RecordTemplate::new().with_nslc("IU", "ANMO", "", "BHZ")).unwrap();
/// let opener = MemoryOpener::new();
///
/// let summary = Router::new(opener.clone())
///     .process(RecordReader::new(&data[..]), &mut std::io::sink())
///     .unwrap();
///
/// assert_eq!(summary.outputs, ["ANMO.IU..BHZ.D.1970.001.0000"]);
/// assert_eq!(opener.contents(&summary.outputs[0]).unwrap(), data);
/// ```
pub struct Router<O: SinkOpener> {
    opener: O,
    outputs: Vec<(String, O::Sink)>,
    index: HashMap<String, usize>,
    verbose: bool,
    stop: StopSignal,
}

impl<O: SinkOpener> Router<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            outputs: Vec::new(),
            index: HashMap::new(),
            verbose: false,
            stop: StopSignal::new(),
        }
    }

    /// List the generated outputs on the diagnostics writer after the run.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Stop flag checked before each record is pulled from the input and
    /// again when the input ends.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Number of outputs currently open.
    pub fn open_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Consume `records` and write each one to its output.
    ///
    /// A truncated trailing record and a stop request both end the run
    /// normally. Any other input error, and any failure to open or write an
    /// output, aborts the run after closing the outputs already open.
    pub fn process<I, W>(&mut self, records: I, diagnostics: &mut W) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<Record>>,
        W: Write,
    {
        let mut input = records.into_iter();
        let mut record_count = 0u64;
        let mut byte_count = 0u64;

        let outcome = loop {
            if self.stop.is_requested() {
                break RunOutcome::Interrupted;
            }

            let record = match input.next() {
                // A stop-aware source ends early once the stop is raised
                None if self.stop.is_requested() => break RunOutcome::Interrupted,
                None => break RunOutcome::Completed,
                Some(Ok(record)) => record,
                Some(Err(DemuxError::TruncatedRecord { expected, actual })) => {
                    tracing::warn!(
                        expected,
                        actual,
                        records = record_count,
                        "input ended inside a record, dropping the partial record"
                    );
                    break RunOutcome::Truncated;
                }
                Some(Err(e)) => {
                    self.abort();
                    return Err(e);
                }
            };

            if let Err(e) = self.route(&record) {
                self.abort();
                return Err(e);
            }
            record_count += 1;
            byte_count += record.len() as u64;
        };

        let outputs = self.close_all()?;

        tracing::info!(
            records = record_count,
            bytes = byte_count,
            outputs = outputs.len(),
            %outcome,
            "demultiplexing finished"
        );

        if self.verbose {
            if let Err(e) = list_outputs(diagnostics, &outputs) {
                tracing::warn!(error = %e, "cannot print the output listing");
            }
        }

        Ok(RunSummary {
            records: record_count,
            bytes: byte_count,
            outputs,
            outcome,
        })
    }

    /// Append one record to its output, opening the output on first use.
    fn route(&mut self, record: &Record) -> Result<()> {
        let name = record.output_name();

        let slot = match self.index.get(&name) {
            Some(&slot) => slot,
            None => {
                let sink = self
                    .opener
                    .open(&name)
                    .map_err(|source| DemuxError::ResourceWrite {
                        name: name.clone(),
                        source,
                    })?;
                tracing::debug!(output = %name, "opened output");
                self.outputs.push((name.clone(), sink));
                self.index.insert(name, self.outputs.len() - 1);
                self.outputs.len() - 1
            }
        };

        let (name, sink) = &mut self.outputs[slot];
        sink.write_all(&record.raw)
            .map_err(|source| DemuxError::ResourceWrite {
                name: name.clone(),
                source,
            })
    }

    /// Flush and close every output in creation order.
    ///
    /// All outputs are closed even if some fail; the first failure is
    /// returned.
    fn close_all(&mut self) -> Result<Vec<String>> {
        self.index.clear();
        let mut names = Vec::with_capacity(self.outputs.len());
        let mut first_error = None;

        for (name, mut sink) in self.outputs.drain(..) {
            if let Err(source) = sink.flush() {
                tracing::error!(output = %name, error = %source, "failed to close output");
                if first_error.is_none() {
                    first_error = Some(DemuxError::ResourceClose {
                        name: name.clone(),
                        source,
                    });
                }
            }
            drop(sink);
            names.push(name);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(names),
        }
    }

    /// Best-effort close on the error path.
    fn abort(&mut self) {
        if let Err(e) = self.close_all() {
            tracing::warn!(error = %e, "error while closing outputs after failure");
        }
    }
}

fn list_outputs<W: Write>(diagnostics: &mut W, outputs: &[String]) -> std::io::Result<()> {
    writeln!(diagnostics, "Generated output files:")?;
    for name in outputs {
        writeln!(diagnostics, "  {name}")?;
    }
    diagnostics.flush()
}
