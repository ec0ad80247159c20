//! Bulk file queue — whole files delivered in order, never dropped.
//!
//! The outbox only holds a weak reference to the queue: once the inbox is
//! gone, enqueueing fails with [`ChannelError::Closed`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{Notify, mpsc};

use homebutler_app::ports::{BulkInbox, BulkOutbox, InboundFile};
use homebutler_domain::error::ChannelError;

type Files = Mutex<VecDeque<InboundFile>>;

fn lock(files: &Files) -> MutexGuard<'_, VecDeque<InboundFile>> {
    files.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected outbox/inbox pair.
#[must_use]
pub fn file_queue() -> (FileOutbox, FileInbox) {
    let files = Arc::new(Files::default());
    let arrivals = Arc::new(Notify::new());
    (
        FileOutbox {
            files: Arc::downgrade(&files),
            arrivals: Arc::clone(&arrivals),
        },
        FileInbox { files, arrivals },
    )
}

/// Sending side, held by the companion.
#[derive(Clone)]
pub struct FileOutbox {
    files: Weak<Files>,
    arrivals: Arc<Notify>,
}

impl BulkOutbox for FileOutbox {
    async fn enqueue(&self, name: &str, payload: Vec<u8>) -> Result<(), ChannelError> {
        let files = self.files.upgrade().ok_or(ChannelError::Closed)?;
        tracing::debug!(file = name, bytes = payload.len(), "file queued");
        lock(&files).push_back(InboundFile {
            name: name.to_string(),
            payload,
        });
        self.arrivals.notify_one();
        Ok(())
    }
}

/// Receiving side, held by the client.
pub struct FileInbox {
    files: Arc<Files>,
    arrivals: Arc<Notify>,
}

impl FileInbox {
    /// Number of files waiting to be taken.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.files).len()
    }

    /// Arrival notifications, to drive an event loop while the inbox
    /// itself belongs to the engine.
    #[must_use]
    pub fn arrivals(&self) -> FileArrivals {
        FileArrivals {
            arrivals: Arc::clone(&self.arrivals),
        }
    }
}

impl BulkInbox for FileInbox {
    fn next_file(&mut self) -> Option<InboundFile> {
        lock(&self.files).pop_front()
    }
}

/// Wakes up when files have been queued.
///
/// Several files queued before a wake-up are reported once; the receiver
/// is expected to drain the inbox.
pub struct FileArrivals {
    arrivals: Arc<Notify>,
}

impl FileArrivals {
    /// Wait until at least one file was queued since the last wake-up.
    pub async fn arrived(&self) {
        self.arrivals.notified().await;
    }

    /// Push one event per wake-up into an event loop until it goes away.
    pub async fn forward<E>(self, events: mpsc::Sender<E>, make: impl Fn() -> E) {
        loop {
            self.arrived().await;
            if events.send(make()).await.is_err() {
                break;
            }
        }
    }
}
