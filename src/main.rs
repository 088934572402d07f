//! msdemux - split a miniSEED record stream into per-stream files
//!
//! # Usage
//!
//! ```bash
//! # Demultiplex a file, listing the files written
//! msdemux -v data.mseed
//!
//! # Demultiplex records arriving on stdin
//! scmssort -u -E data.mseed | msdemux -
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use msdemux::{DemuxConfig, Source, StopSignal, install_interrupt_handler, run};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const EXAMPLES: &str = "\
Examples:
Demultiplex the miniSEED records contained in data.mseed and additionally print the
names of created files to stderr
  msdemux -v data.mseed

Demultiplex the miniSEED records received from stdin
  scmssort -u -E data.mseed | msdemux -";

/// Demultiplex all miniSEED records found in the given source by stream code,
/// writing them into separate files.
#[derive(Parser, Debug)]
#[command(name = "msdemux", version)]
#[command(
    long_about = "Demultiplex all miniSEED records found in the given source by stream code \
writing them into separate files. The source can be a file or stdin. One file per stream \
and minute is generated. File names are derived from stream codes and the begin time of \
the records: STA.NET.LOC.CHA.D.YYYY.DDD.HHMM. Existing files are appended to.",
    after_help = EXAMPLES
)]
struct Cli {
    /// Input file, or `-` to read from stdin
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Print the names of the generated files to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Directory to write output files into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", env = "MSDEMUX_LOG")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> DemuxConfig {
        DemuxConfig::new(Source::from_arg(&self.source))
            .with_output_dir(&self.output_dir)
            .with_verbose(self.verbose)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("msdemux: invalid log level: {e}");
        return ExitCode::from(2);
    }

    let stop = StopSignal::new();
    if let Err(e) = install_interrupt_handler(stop.clone()) {
        tracing::warn!(error = %e, "interrupts will terminate without closing outputs");
    }

    match run(&cli.config(), stop, &mut io::stderr()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("msdemux: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) -> Result<(), tracing_subscriber::filter::ParseError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();

    Ok(())
}
