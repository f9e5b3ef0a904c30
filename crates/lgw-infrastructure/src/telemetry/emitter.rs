//! Non-blocking telemetry emitter

use lgw_domain::TelemetryRecord;
use lgw_domain::ports::TelemetrySink;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Fire-and-forget telemetry front end
///
/// Records go into a bounded channel; a record that does not fit is dropped
/// and counted, so a slow sink never slows down a request.
pub struct TelemetryEmitter {
    sender: Option<mpsc::Sender<TelemetryRecord>>,
    emitted: AtomicU64,
    dropped: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl TelemetryEmitter {
    /// Start a background worker writing into `sink`
    pub fn spawn(sink: Arc<dyn TelemetrySink>, capacity: usize) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(drain(receiver, sink, shutdown.clone()));

        Arc::new(Self {
            sender: Some(sender),
            emitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            worker: Mutex::new(Some(worker)),
            shutdown,
        })
    }

    /// An emitter that discards everything
    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            sender: None,
            emitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            worker: Mutex::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    /// Whether records reach a sink
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue a record without waiting
    pub fn emit(&self, record: TelemetryRecord) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(record) {
            Ok(()) => {
                self.emitted.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_) | TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Records accepted into the channel
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Records dropped because the channel was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting records, drain what is queued and flush the sink
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker
            && let Err(e) = worker.await
        {
            warn!(error = %e, "Telemetry worker did not finish cleanly");
        }
    }
}

async fn drain(
    mut receiver: mpsc::Receiver<TelemetryRecord>,
    sink: Arc<dyn TelemetrySink>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            record = receiver.recv() => match record {
                Some(record) => sink.write(&record),
                None => break,
            },
            () = shutdown.cancelled() => {
                receiver.close();
                while let Some(record) = receiver.recv().await {
                    sink.write(&record);
                }
                break;
            }
        }
    }
    sink.flush();
}
