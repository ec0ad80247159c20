//! # homebutler-app
//!
//! Application layer — the engines of both endpoints and their **ports**.
//!
//! ## Responsibilities
//! - Define **port traits** adapters implement:
//!   - `HubApi` — the hub's REST API
//!   - `LiveChannel`, `BulkOutbox`, `BulkInbox` — the two transports
//!   - `SettingsStore` — persisted connection settings
//!   - `Document` — element lookup into the client's UI markup
//! - Define the engines:
//!   - `HubClient` — cached hub inventory with stale-but-available refresh
//!   - `SyncEngine` — companion side: snapshot push and command relay
//!   - `RenderingEngine` — client side: cards, live patches, click commands
//! - Define the event enums each endpoint loop dispatches
//!
//! ## Dependency rule
//! Depends on `homebutler-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event;
pub mod ports;
pub mod services;
