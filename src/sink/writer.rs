//! Single-writer persistence task
//!
//! The writer runs on its own OS thread so SQLite and file I/O never block
//! the async workers. Producers hand records over through a bounded channel
//! using a non-blocking send with a short cooperative backoff loop: a
//! momentary sink stall must slow the pool down, not deadlock it. Shutdown
//! pushes a sentinel and joins, guaranteeing every enqueued record is
//! flushed before the process exits.

use crate::config::Heuristics;
use crate::corpus::ExtractedPoem;
use crate::sink::index::PoemIndex;
use crate::sink::{SinkError, SinkResult};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::JoinHandle;
use std::time::Duration;

enum SinkMessage {
    Record(Box<ExtractedPoem>),
    Shutdown,
}

/// Producer-side handle to the sink, cheap to clone into each worker
#[derive(Clone)]
pub struct SinkHandle {
    sender: SyncSender<SinkMessage>,
    retry_delay: Duration,
}

impl SinkHandle {
    /// Enqueues one record, backing off cooperatively while the channel is
    /// full
    pub async fn submit(&self, poem: ExtractedPoem) -> SinkResult<()> {
        let mut message = SinkMessage::Record(Box::new(poem));

        loop {
            match self.sender.try_send(message) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    message = returned;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(TrySendError::Disconnected(_)) => return Err(SinkError::ChannelClosed),
            }
        }
    }
}

/// The sink itself: owns the writer thread for the lifetime of a run
pub struct PoemSink {
    sender: SyncSender<SinkMessage>,
    retry_delay: Duration,
    handle: Option<JoinHandle<SinkResult<u64>>>,
}

impl PoemSink {
    /// Spawns the writer thread over the given record store and index
    ///
    /// # Arguments
    ///
    /// * `records_path` - JSONL file, created or appended to
    /// * `index` - The poem index, moved onto the writer thread
    /// * `heuristics` - Source of channel capacity and backoff delay
    pub fn spawn(
        records_path: &Path,
        index: PoemIndex,
        heuristics: &Heuristics,
    ) -> SinkResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(records_path)?;

        let (sender, receiver) = sync_channel(heuristics.sink_capacity);

        let handle = std::thread::Builder::new()
            .name("poem-sink".to_string())
            .spawn(move || writer_loop(receiver, BufWriter::new(file), index))?;

        Ok(Self {
            sender,
            retry_delay: Duration::from_millis(heuristics.sink_retry_delay_ms),
            handle: Some(handle),
        })
    }

    /// A producer handle for worker tasks
    pub fn handle(&self) -> SinkHandle {
        SinkHandle {
            sender: self.sender.clone(),
            retry_delay: self.retry_delay,
        }
    }

    /// Flushes and stops the writer, returning the number of records written
    ///
    /// Blocks until every record enqueued before the call is durable.
    pub fn shutdown(mut self) -> SinkResult<u64> {
        // A full channel still accepts the sentinel eventually; the writer is
        // draining it
        let _ = self.sender.send(SinkMessage::Shutdown);

        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| SinkError::WriterPanicked)?,
            None => Ok(0),
        }
    }
}

fn writer_loop(
    receiver: Receiver<SinkMessage>,
    mut records: BufWriter<std::fs::File>,
    index: PoemIndex,
) -> SinkResult<u64> {
    let mut written: u64 = 0;

    while let Ok(message) = receiver.recv() {
        match message {
            SinkMessage::Record(poem) => {
                let line = serde_json::to_string(&*poem)?;
                records.write_all(line.as_bytes())?;
                records.write_all(b"\n")?;

                // An index failure must not lose the record line already on
                // disk; log and keep consuming
                if let Err(e) = index.upsert(&poem) {
                    tracing::error!("Failed to index poem {} ({}): {}", poem.title, poem.page_id, e);
                }

                written += 1;
                tracing::debug!("Persisted poem '{}' (page {})", poem.title, poem.page_id);
            }
            SinkMessage::Shutdown => break,
        }
    }

    records.flush()?;
    tracing::info!("Sink flushed, {} records written", written);
    Ok(written)
}
