//! Events driving the two endpoint loops.
//!
//! Every callback the host platform would fire (channel open/close, inbound
//! message, new file, settings edit, tap on a card) is turned into one
//! variant of a closed enum and dispatched by a single loop, so engine state
//! is only ever touched by one handler at a time.

use homebutler_domain::envelope::{Envelope, StateUpdate};

/// Events handled by the companion's [`SyncEngine`](crate::services::sync_engine::SyncEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum CompanionEvent {
    /// The live channel to the client opened.
    ChannelOpened,
    /// The live channel to the client closed.
    ChannelClosed,
    /// The live channel reported a transport error.
    ChannelError(String),
    /// A command arrived from the client.
    MessageReceived(Envelope),
    /// The user edited the connection settings.
    SettingsChanged,
}

/// Events handled by the client's [`RenderingEngine`](crate::services::rendering::RenderingEngine).
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The live channel to the companion opened.
    ChannelOpened,
    /// The live channel to the companion closed.
    ChannelClosed,
    /// The live channel reported a transport error.
    ChannelError(String),
    /// A live state update arrived from the companion.
    MessageReceived(StateUpdate),
    /// One or more files are waiting in the bulk inbox.
    FileReceived,
    /// The user tapped the card with this element id.
    CardClicked(String),
}
