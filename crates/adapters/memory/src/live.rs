//! Live link — best-effort JSON text messages between the two endpoints.
//!
//! A [`Connection`] models the link itself: it is either open or closed and
//! broadcasts every transition. Messages travel as JSON text frames, one
//! direction per [`Connection::channel`]. Sending while the link is closed
//! fails with [`ChannelError::Disconnected`] and the message is lost.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc};

use homebutler_app::ports::LiveChannel;
use homebutler_domain::error::ChannelError;

/// Transition of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Opened,
    Closed,
}

/// Shared state of the live link. Clones observe the same link.
#[derive(Clone)]
pub struct Connection {
    open: Arc<AtomicBool>,
    events: broadcast::Sender<LinkEvent>,
}

impl Connection {
    /// Create a closed link whose transition channel keeps `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            open: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    /// Subscribe to link transitions happening after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Open the link. Does nothing if it is already open.
    pub fn open(&self) {
        if !self.open.swap(true, Ordering::SeqCst) {
            tracing::info!("live link opened");
            // No subscriber is fine: nobody is waiting for the transition.
            let _ = self.events.send(LinkEvent::Opened);
        }
    }

    /// Close the link. Does nothing if it is already closed.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            tracing::info!("live link closed");
            let _ = self.events.send(LinkEvent::Closed);
        }
    }

    /// Create one direction of the link carrying messages of type `M`.
    #[must_use]
    pub fn channel<M>(&self) -> (LiveSender<M>, LiveReceiver<M>) {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        (
            LiveSender {
                frames: frames_tx,
                connection: self.clone(),
                _message: PhantomData,
            },
            LiveReceiver {
                frames: frames_rx,
                _message: PhantomData,
            },
        )
    }
}

/// Sending half of one link direction.
pub struct LiveSender<M> {
    frames: mpsc::UnboundedSender<String>,
    connection: Connection,
    _message: PhantomData<fn(&M)>,
}

impl<M: Serialize> LiveChannel<M> for LiveSender<M> {
    fn send(&self, message: &M) -> Result<(), ChannelError> {
        if !self.connection.is_open() {
            return Err(ChannelError::Disconnected);
        }
        let frame = serde_json::to_string(message)?;
        self.frames.send(frame).map_err(|_| ChannelError::Closed)
    }
}

/// Receiving half of one link direction.
pub struct LiveReceiver<M> {
    frames: mpsc::UnboundedReceiver<String>,
    _message: PhantomData<fn() -> M>,
}

impl<M: DeserializeOwned> LiveReceiver<M> {
    /// Wait for the next message. Frames that do not decode are logged and
    /// skipped. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<M> {
        while let Some(frame) = self.frames.recv().await {
            if let Some(message) = Self::decode(&frame) {
                return Some(message);
            }
        }
        None
    }

    /// Take the next already delivered message, if any.
    pub fn try_recv(&mut self) -> Option<M> {
        while let Ok(frame) = self.frames.try_recv() {
            if let Some(message) = Self::decode(&frame) {
                return Some(message);
            }
        }
        None
    }

    /// Push every received message into an event loop until either side
    /// goes away.
    pub async fn forward<E>(mut self, events: mpsc::Sender<E>, wrap: impl Fn(M) -> E) {
        while let Some(message) = self.recv().await {
            if events.send(wrap(message)).await.is_err() {
                break;
            }
        }
    }

    fn decode(frame: &str) -> Option<M> {
        serde_json::from_str(frame)
            .inspect_err(|err| tracing::warn!(error = %err, frame, "dropping undecodable live frame"))
            .ok()
    }
}

/// Push link transitions into an event loop until either side goes away.
pub async fn forward_link_events<E>(
    mut link: broadcast::Receiver<LinkEvent>,
    events: mpsc::Sender<E>,
    wrap: impl Fn(LinkEvent) -> E,
) {
    loop {
        match link.recv().await {
            Ok(event) => {
                if events.send(wrap(event)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "missed live link transitions");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homebutler_domain::envelope::{Envelope, ServiceCall};

    #[test]
    fn should_start_closed() {
        let connection = Connection::new(4);
        assert!(!connection.is_open());
    }

    #[test]
    fn should_refuse_to_send_while_closed() {
        let connection = Connection::new(4);
        let (tx, mut rx) = connection.channel::<Envelope>();

        let result = tx.send(&Envelope::Wakeup);

        assert!(matches!(result, Err(ChannelError::Disconnected)));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn should_deliver_messages_in_order_while_open() {
        let connection = Connection::new(4);
        let (tx, mut rx) = connection.channel::<Envelope>();
        connection.open();

        let call = Envelope::Service(ServiceCall::new("light", "turn_on", "light.lamp"));
        tx.send(&Envelope::Wakeup).unwrap();
        tx.send(&call).unwrap();

        assert_eq!(rx.try_recv(), Some(Envelope::Wakeup));
        assert_eq!(rx.try_recv(), Some(call));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn should_report_closed_when_receiver_is_gone() {
        let connection = Connection::new(4);
        let (tx, rx) = connection.channel::<Envelope>();
        connection.open();
        drop(rx);

        assert!(matches!(tx.send(&Envelope::Wakeup), Err(ChannelError::Closed)));
    }

    #[test]
    fn should_skip_undecodable_frames() {
        let connection = Connection::new(4);
        let (tx, mut rx) = connection.channel::<Envelope>();
        connection.open();

        tx.frames.send("not json".to_string()).unwrap();
        tx.send(&Envelope::Wakeup).unwrap();

        assert_eq!(rx.try_recv(), Some(Envelope::Wakeup));
    }

    #[test]
    fn should_decode_unknown_command_as_unknown() {
        let connection = Connection::new(4);
        let (tx, mut rx) = connection.channel::<Envelope>();

        tx.frames.send(r#"{"command":"reboot"}"#.to_string()).unwrap();

        assert_eq!(rx.try_recv(), Some(Envelope::Unknown));
    }

    #[tokio::test]
    async fn should_broadcast_each_transition_once() {
        let connection = Connection::new(4);
        let mut link = connection.subscribe();

        connection.open();
        connection.open();
        connection.close();
        connection.close();

        assert_eq!(link.recv().await.unwrap(), LinkEvent::Opened);
        assert_eq!(link.recv().await.unwrap(), LinkEvent::Closed);
        assert!(link.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_forward_messages_into_event_loop() {
        let connection = Connection::new(4);
        let (tx, rx) = connection.channel::<Envelope>();
        connection.open();
        tx.send(&Envelope::Wakeup).unwrap();
        drop(tx);

        let (events_tx, mut events_rx) = mpsc::channel(4);
        rx.forward(events_tx, |envelope| vec![envelope]).await;

        assert_eq!(events_rx.recv().await, Some(vec![Envelope::Wakeup]));
        assert!(events_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn should_forward_link_events_until_connection_is_dropped() {
        let connection = Connection::new(4);
        let link = connection.subscribe();
        connection.open();
        drop(connection);

        let (events_tx, mut events_rx) = mpsc::channel(4);
        forward_link_events(link, events_tx, |event| event == LinkEvent::Opened).await;

        assert_eq!(events_rx.recv().await, Some(true));
    }
}
