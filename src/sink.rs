//! Output resources the router appends records to.
//!
//! The router never opens files itself; it asks a [`SinkOpener`] for a
//! writable sink per output name. [`FileOpener`] is the real filesystem
//! backend, [`MemoryOpener`] keeps everything in memory.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Opens one append-only sink per output name.
pub trait SinkOpener {
    type Sink: Write;

    /// Open the sink for `name`, creating it if absent.
    ///
    /// Existing content must be preserved; writes go to the end.
    fn open(&mut self, name: &str) -> io::Result<Self::Sink>;
}

/// Opens files named after the output inside a directory.
///
/// Files are opened with create + append and are not buffered, so every
/// record written has reached the kernel before the next one is read.
#[derive(Debug, Clone)]
pub struct FileOpener {
    dir: PathBuf,
}

impl FileOpener {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for FileOpener {
    /// The current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl SinkOpener for FileOpener {
    type Sink = File;

    fn open(&mut self, name: &str) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(name))
    }
}

type Buffers = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// Keeps every output in a shared in-memory buffer.
///
/// Reopening a name appends to the existing buffer, matching the file
/// backend. Clones share the same buffers.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    buffers: Buffers,
    failing: Option<String>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make opening `name` fail with a permission error.
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.failing = Some(name.into());
        self
    }

    /// Contents written to `name` so far.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().get(name).cloned()
    }

    /// All output names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SinkOpener for MemoryOpener {
    type Sink = MemorySink;

    fn open(&mut self, name: &str) -> io::Result<MemorySink> {
        if self.failing.as_deref() == Some(name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to open",
            ));
        }
        self.lock().entry(name.to_string()).or_default();
        Ok(MemorySink {
            name: name.to_string(),
            buffers: Arc::clone(&self.buffers),
        })
    }
}

/// Writer handed out by [`MemoryOpener`].
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    buffers: Buffers,
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        buffers
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
