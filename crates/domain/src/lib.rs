//! # homebutler-domain
//!
//! Pure domain model shared by the companion and the client.
//!
//! ## Responsibilities
//! - **Devices**: hub entities identified by `<domain>.<object_id>`
//! - **Snapshots**: bounded, sorted, domain-partitioned device sets
//! - **Enabled domains**: which domains are transferred and how many devices each
//! - **Envelopes**: commands and live state updates carried on the live channel
//! - **Bulk codec**: the UTF-16 file format used to ship a snapshot
//! - **Connection settings**: protocol, host, port and credential of the hub
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod collation;
pub mod device;
pub mod enabled_domains;
pub mod envelope;
pub mod error;
pub mod hub;
pub mod settings;
pub mod snapshot;
pub mod time;
