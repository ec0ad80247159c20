//! Snapshot — the bounded, domain-partitioned device set shipped in bulk.
//!
//! On the wire a snapshot is one file: the compact JSON object
//! `{ "<domain>": [Device, …], … }` written as little-endian UTF-16 code
//! units.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::CodecError;

/// Name under which the snapshot file is queued on the bulk channel.
pub const SNAPSHOT_FILE_NAME: &str = "devices.json";

/// Devices per domain, each list already filtered, capped and sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, Vec<Device>>);

impl Snapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device list of a domain, replacing any previous list.
    pub fn insert(&mut self, domain: impl Into<String>, devices: Vec<Device>) {
        self.0.insert(domain.into(), devices);
    }

    /// Devices of one domain.
    #[must_use]
    pub fn devices(&self, domain: &str) -> Option<&[Device]> {
        self.0.get(domain).map(Vec::as_slice)
    }

    /// Iterate over `(domain, devices)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Device])> {
        self.0.iter().map(|(d, devices)| (d.as_str(), devices.as_slice()))
    }

    /// Whether the snapshot holds no domain at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of devices across all domains.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Encode into the bulk-channel byte format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Json`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let json = serde_json::to_string(self)?;
        Ok(json.encode_utf16().flat_map(u16::to_le_bytes).collect())
    }

    /// Decode a snapshot from the bulk-channel byte format.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when the payload is not an even number of
    /// bytes, not valid UTF-16 or not a JSON snapshot.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() % 2 != 0 {
            return Err(CodecError::OddLength(bytes.len()));
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let json = String::from_utf16(&units)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl FromIterator<(String, Vec<Device>)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Device>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
