//! Error types shared across the workspace.
//!
//! Each failure class is contained at the component that meets it:
//! transport failures keep the last good state, decode failures fall back
//! to an empty snapshot and protocol mismatches are ignored.

/// The bulk payload could not be turned into a snapshot (or back).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// UTF-16 payloads are made of two-byte code units.
    #[error("snapshot payload has an odd byte length ({0})")]
    OddLength(usize),

    #[error("snapshot payload is not valid UTF-16")]
    Utf16(#[from] std::string::FromUtf16Error),

    #[error("snapshot payload is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// A call to the home-automation hub failed.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The hub could not be reached (DNS, TCP, TLS, timeout, …).
    #[error("hub unreachable")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hub answered with a non-success status code.
    #[error("hub answered with status {0}")]
    Status(u16),

    /// The hub answered but the body was not the expected JSON.
    #[error("failed to decode hub response")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The hub refused the service call.
    #[error("hub rejected {domain}.{service} for {entity_id}")]
    Rejected {
        domain: String,
        service: String,
        entity_id: String,
    },
}

/// A live-channel or bulk-channel operation failed.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The peer is not connected; the message is dropped.
    #[error("peer is not connected")]
    Disconnected,

    /// The channel has been shut down for good.
    #[error("channel closed")]
    Closed,

    #[error("failed to encode channel message")]
    Encode(#[from] serde_json::Error),
}

/// A persisted setting could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("setting `{key}` is not a valid setting item")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
