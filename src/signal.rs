//! Cooperative stop requests.
//!
//! [`StopSignal`] is a shared flag the router checks between records.
//! [`install_interrupt_handler`] wires it to SIGINT/SIGTERM (Ctrl+C on
//! non-unix platforms) through a watcher thread, so the main thread never
//! unwinds out of a half-written record.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Shared stop flag; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop after the record in flight.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Route interrupt signals into `stop`.
///
/// The first signal requests a graceful stop: the run ends after the record
/// in flight, closes its outputs and prints the listing. A second signal
/// exits the process right away with status 0, for the case where an output
/// write itself hangs. Sinks are unbuffered, so every record written so far
/// is already on disk.
pub fn install_interrupt_handler(stop: StopSignal) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;

    // Register before returning so no early signal falls through to the
    // default handler.
    let mut signals = {
        let _guard = runtime.enter();
        Signals::new()?
    };

    thread::Builder::new()
        .name("msdemux-signals".into())
        .spawn(move || {
            runtime.block_on(async move {
                signals.recv().await;
                tracing::info!("interrupt received, closing outputs");
                eprintln!("Interrupted, finishing current record. Press Ctrl + C again to quit now.");
                stop.request();

                signals.recv().await;
                tracing::warn!("second interrupt received, exiting immediately");
                std::process::exit(0);
            });
        })?;
    Ok(())
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => tracing::debug!("received SIGINT"),
            _ = self.terminate.recv() => tracing::debug!("received SIGTERM"),
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn new() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
