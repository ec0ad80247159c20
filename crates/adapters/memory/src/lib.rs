//! # homebutler-adapter-memory
//!
//! In-process implementations of the transport, settings and UI ports, so
//! that the companion and the client can run side by side in one process.
//!
//! | Module | Port(s) |
//! |--------|---------|
//! | [`live`] | `LiveChannel` over a JSON text link with open/close notifications |
//! | [`bulk`] | `BulkOutbox` / `BulkInbox` over an ordered file queue |
//! | [`settings`] | `SettingsStore` with change notifications |
//! | [`document`] | `Document` over an in-memory element tree |
//!
//! ## Dependency rule
//!
//! Depends on `homebutler-app` (port traits) and `homebutler-domain` only.

pub mod bulk;
pub mod document;
pub mod live;
pub mod settings;
