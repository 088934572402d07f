//! Run configuration and the top-level demultiplexing entry point.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::reader::{BackgroundReader, RecordReader};
use crate::router::{Router, RunSummary};
use crate::signal::StopSignal;
use crate::sink::FileOpener;
use crate::{DemuxError, Result};

/// Where records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Interpret a command-line argument; `-` means stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, Self::Stdin)
    }

    /// Open the source for reading.
    pub fn open(&self) -> Result<Box<dyn Read + Send>> {
        match self {
            Self::Stdin => Ok(Box::new(io::stdin())),
            Self::File(path) => {
                let file = File::open(path).map_err(|source| DemuxError::SourceOpen {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for one demultiplexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxConfig {
    pub source: Source,
    /// Directory the output files are created in.
    pub output_dir: PathBuf,
    /// List generated outputs on the diagnostics stream when done.
    pub verbose: bool,
}

impl DemuxConfig {
    /// Read from `source`, write into the current directory, quietly.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            output_dir: PathBuf::from("."),
            verbose: false,
        }
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Demultiplex the configured source into files under the output directory.
///
/// Diagnostics (the stdin prompt and the verbose output listing) go to
/// `diagnostics`; the process passes stderr. Records are read on a
/// background thread, so raising `stop` ends the run promptly even while
/// the source has nothing to deliver.
pub fn run<W: Write>(
    config: &DemuxConfig,
    stop: StopSignal,
    diagnostics: &mut W,
) -> Result<RunSummary> {
    let input = config.source.open()?;
    if config.source.is_stdin() {
        writeln!(
            diagnostics,
            "Waiting for miniSEED records on stdin. Use Ctrl + C to interrupt."
        )?;
    }

    tracing::debug!(
        source = %config.source,
        output_dir = %config.output_dir.display(),
        "starting demultiplexer"
    );

    let records = BackgroundReader::spawn(RecordReader::new(input), stop.clone())?;
    Router::new(FileOpener::new(&config.output_dir))
        .with_verbose(config.verbose)
        .with_stop_signal(stop)
        .process(records, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{RecordTemplate, encode};
    use crate::router::RunOutcome;
    use crate::time::NanoTime;

    #[test]
    fn test_source_from_arg() {
        assert_eq!(Source::from_arg("-"), Source::Stdin);
        assert_eq!(
            Source::from_arg("data.mseed"),
            Source::File(PathBuf::from("data.mseed"))
        );
        assert_eq!(Source::Stdin.to_string(), "<stdin>");
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DemuxConfig::new(Source::File(dir.path().join("absent.mseed")))
            .with_output_dir(dir.path());
        let err = run(&config, StopSignal::new(), &mut io::sink()).unwrap_err();
        assert!(matches!(err, DemuxError::SourceOpen { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_writes_files_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let bytes = encode(
            &RecordTemplate::new()
                .with_nslc("GE", "DAV", "10", "HHE")
                .with_start_time(NanoTime {
                    year: 2023,
                    day: 200,
                    hour: 7,
                    minute: 5,
                    second: 0,
                    nanosecond: 0,
                }),
        )
        .unwrap();
        let input = dir.path().join("in.mseed");
        std::fs::write(&input, &bytes).unwrap();

        let config = DemuxConfig::new(Source::File(input))
            .with_output_dir(&out)
            .with_verbose(true);
        let mut diagnostics = Vec::new();
        let summary = run(&config, StopSignal::new(), &mut diagnostics).unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        let written = std::fs::read(out.join("DAV.GE.10.HHE.D.2023.200.0705")).unwrap();
        assert_eq!(written, bytes);
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Generated output files:\n  DAV.GE.10.HHE.D.2023.200.0705\n"
        );
    }
}
