//! Verification log session: open, emit, close.
//!
//! A session buffers every record in an [`OrderedLogStore`] while the decoder
//! runs and writes nothing to the destination until [`VlogSession::close`].
//! At close the buckets are written in [`DRAIN_ORDER`], each ascending by
//! emission key.
//!
//! ```text
//!   Closed ──open(path)──▶ Open ──emit/print──▶ Open
//!     ▲                                          │
//!     └────────────────── close() ───────────────┘
//! ```
//!
//! The session is single-writer: every mutating call takes `&mut self`.
//! Wrap it in a [`SharedSession`] to hand one session to several threads.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::category::{Category, DRAIN_ORDER};
use crate::config::SessionConfig;
use crate::error::{VlogError, VlogResult};
use crate::line::TraceBlock;
use crate::obu::{Obu, SampleTrim};
use crate::record::{LogRecord, Payload};
use crate::serializer;
use crate::store::OrderedLogStore;

/// A session shared between threads; the mutex serializes all calls.
pub type SharedSession = Arc<Mutex<VlogSession>>;

/// Where the log goes once the session closes.
struct Destination {
    /// Path or caller-supplied name, for diagnostics.
    label: String,
    /// Set when bound through [`VlogSession::open`].
    path: Option<PathBuf>,
    writer: Box<dyn Write + Send>,
}

/// Owns the record buffer and the destination of one verification log.
pub struct VlogSession {
    config: SessionConfig,
    store: OrderedLogStore,
    destination: Option<Destination>,
    /// Emission key handed to the next rendered OBU.
    next_key: u64,
}

impl Default for VlogSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl VlogSession {
    /// Create a closed session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            store: OrderedLogStore::new(),
            destination: None,
            next_key: 0,
        }
    }

    /// Move the session behind a mutex for multi-threaded callers.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.destination.is_some() && self.store.is_open()
    }

    /// Label of the bound destination, if open.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_ref().map(|d| d.label.as_str())
    }

    /// Key the next [`emit`](Self::emit) will use.
    pub fn next_key(&self) -> u64 {
        self.next_key
    }

    /// Read-only view of the buffered records.
    pub fn store(&self) -> &OrderedLogStore {
        &self.store
    }

    pub fn pending_records(&self) -> usize {
        self.store.len()
    }

    pub fn pending_bytes(&self) -> usize {
        self.store.pending_bytes()
    }

    /// Bind the session to a log file.
    ///
    /// An existing file at `path` is removed first. Opening the path the
    /// session is already bound to does nothing. Opening any other path
    /// discards everything buffered so far. On failure the session is
    /// left closed.
    pub fn open(&mut self, path: impl AsRef<Path>) -> VlogResult<()> {
        let path = path.as_ref();

        if self.is_open() {
            if self.destination.as_ref().and_then(|d| d.path.as_deref()) == Some(path) {
                debug!(path = %path.display(), "Log already open, keeping buffered records");
                return Ok(());
            }
            self.discard();
        }

        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "Removed previous log"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        self.bind(Destination {
            label: path.display().to_string(),
            path: Some(path.to_path_buf()),
            writer: Box::new(BufWriter::new(file)),
        });
        Ok(())
    }

    /// Bind the session to an arbitrary writer.
    ///
    /// Always rebinds: anything buffered for a previous destination is
    /// discarded.
    pub fn open_writer(&mut self, label: impl Into<String>, writer: impl Write + Send + 'static) {
        if self.is_open() {
            self.discard();
        }
        self.bind(Destination {
            label: label.into(),
            path: None,
            writer: Box::new(writer),
        });
    }

    /// Render `obu` into the record trace under the next emission key.
    ///
    /// Returns the key the record was buffered under. A record that fails
    /// to render or store is dropped; the session stays open.
    pub fn emit(&mut self, obu: &Obu, trim: SampleTrim) -> VlogResult<u64> {
        if !self.is_open() {
            return Err(VlogError::NotOpen);
        }

        let key = self.next_key;
        let text = serializer::render_obu(obu, key, trim, self.config.max_record_bytes)
            .inspect_err(|e| warn!(kind = ?obu.kind(), key, error = %e, "Dropping OBU record"))?;
        self.next_key += 1;

        self.insert(Category::Record, key, &text)?;
        Ok(key)
    }

    /// Buffer pre-rendered block text under an explicit key.
    ///
    /// Used by container and decoder-op producers, which supply their own
    /// keys and markers.
    pub fn print(&mut self, category: Category, key: u64, text: &str) -> VlogResult<()> {
        if !self.is_open() {
            return Err(VlogError::NotOpen);
        }
        if text.len() > self.config.max_record_bytes {
            return Err(VlogError::SerializationOverflow {
                limit: self.config.max_record_bytes,
                attempted: text.len(),
            });
        }
        self.insert(category, key, text)
    }

    /// Start a block bounded by this session's record limit.
    pub fn block(&self, category: Category) -> TraceBlock {
        TraceBlock::new(category, self.config.max_record_bytes)
    }

    /// Finish `block` and buffer it under `key` in the block's category.
    pub fn emit_block(&mut self, key: u64, block: TraceBlock) -> VlogResult<()> {
        if !self.is_open() {
            return Err(VlogError::NotOpen);
        }
        let category = block.category();
        let text = block.finish()?;
        self.insert(category, key, &text)
    }

    /// Write every buffered record and release the destination.
    ///
    /// Buffered memory is released and the session is closed even when
    /// writing fails; the write error is returned afterwards.
    pub fn close(&mut self) -> VlogResult<()> {
        let Some(mut destination) = self.destination.take() else {
            return Err(VlogError::NotOpen);
        };
        debug_assert!(self.store.is_open(), "destination bound to a closed store");

        let records = self.store.drain_all(&DRAIN_ORDER);
        let count = records.len();

        match write_records(destination.writer.as_mut(), records) {
            Ok(bytes) => {
                info!(destination = %destination.label, records = count, bytes, "Closed verification log");
                Ok(())
            }
            Err(e) => {
                warn!(destination = %destination.label, error = %e, "Failed to write verification log");
                Err(e.into())
            }
        }
    }

    /// Abandon the log: drop every buffered record without writing it and
    /// remove the file bound by [`open`](Self::open).
    ///
    /// For runs that fail part way, so that no partial log is left looking
    /// like a complete one. The session is closed afterwards.
    pub fn abort(&mut self) -> VlogResult<()> {
        let Some(Destination {
            label,
            path,
            writer,
        }) = self.destination.take()
        else {
            return Err(VlogError::NotOpen);
        };
        let dropped = self.store.len();
        self.store.drain_all(&[]);
        drop(writer);

        if let Some(path) = path {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(destination = %label, error = %e, "Failed to remove aborted log");
                    return Err(e.into());
                }
            }
        }
        warn!(destination = %label, dropped, "Aborted verification log");
        Ok(())
    }

    fn bind(&mut self, destination: Destination) {
        debug!(destination = %destination.label, "Opened verification log");
        self.store.open();
        self.destination = Some(destination);
    }

    /// Drop buffered records and the destination without writing.
    fn discard(&mut self) {
        let dropped = self.store.len();
        self.store.drain_all(&[]);
        if let Some(old) = self.destination.take() {
            debug!(destination = %old.label, "Rebinding verification log");
        }
        if dropped > 0 {
            warn!(dropped, "Discarding buffered records on reopen");
        }
    }

    fn insert(&mut self, category: Category, key: u64, text: &str) -> VlogResult<()> {
        let payload = Payload::new(text, self.config.inline_capacity).inspect_err(|e| {
            warn!(%category, key, error = %e, "Dropping record body");
        })?;
        self.store.insert(category, key, payload)
    }
}

impl Drop for VlogSession {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                warn!(error = %e, "Failed to flush verification log on drop");
            }
        }
    }
}

/// Write records in order, consuming them. Returns bytes written.
fn write_records(writer: &mut dyn Write, records: Vec<LogRecord>) -> io::Result<usize> {
    let mut bytes = 0;
    for record in records {
        writer.write_all(record.text().as_bytes())?;
        bytes += record.payload.len();
    }
    writer.flush()?;
    Ok(bytes)
}
