//! Engines — the use-cases of both endpoints.
//!
//! Each engine accepts port implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete
//! adapters.

pub mod hub_client;
pub mod rendering;
pub mod sync_engine;
