//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engines and the outside world:
//! the hub's REST API, the two transports, the settings storage and the
//! UI markup. They live here so that engines and adapters can both depend
//! on them without creating circular dependencies.

pub mod channel;
pub mod document;
pub mod hub;
pub mod settings;

pub use channel::{BulkInbox, BulkOutbox, InboundFile, LiveChannel};
pub use document::{Animation, Document};
pub use hub::HubApi;
pub use settings::SettingsStore;
