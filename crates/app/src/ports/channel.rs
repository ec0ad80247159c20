//! Transport ports — the live message channel and the bulk file queue.

use std::future::Future;

use homebutler_domain::error::ChannelError;

/// Low-latency, best-effort message channel to the peer.
///
/// Sending never waits for the peer: there is no acknowledgment and no
/// retry, and a message sent while the peer is unreachable is lost.
pub trait LiveChannel<M> {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Disconnected`] when the peer is not reachable.
    fn send(&self, message: &M) -> Result<(), ChannelError>;
}

/// Sending side of the bulk channel: whole files, delivered in order.
pub trait BulkOutbox {
    /// Queue a file for transfer.
    fn enqueue(
        &self,
        name: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

/// A file received on the bulk channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFile {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Receiving side of the bulk channel.
pub trait BulkInbox {
    /// Take the oldest pending file, if any.
    fn next_file(&mut self) -> Option<InboundFile>;
}

impl<M, T: LiveChannel<M>> LiveChannel<M> for std::sync::Arc<T> {
    fn send(&self, message: &M) -> Result<(), ChannelError> {
        (**self).send(message)
    }
}

impl<T: BulkOutbox + Send + Sync> BulkOutbox for std::sync::Arc<T> {
    fn enqueue(
        &self,
        name: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send {
        (**self).enqueue(name, payload)
    }
}
