//! Enabled domains — which domains are mirrored and how many devices each.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::collation::locale_cmp;
use crate::device::Device;
use crate::snapshot::Snapshot;

/// Maximum device count per mirrored domain, fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledDomains(BTreeMap<String, usize>);

impl Default for EnabledDomains {
    fn default() -> Self {
        [("light", 16), ("switch", 16), ("climate", 4)]
            .into_iter()
            .collect()
    }
}

impl<'a> FromIterator<(&'a str, usize)> for EnabledDomains {
    fn from_iter<I: IntoIterator<Item = (&'a str, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(d, max)| (d.to_string(), max)).collect())
    }
}

impl EnabledDomains {
    /// Maximum device count for `domain`, or `None` when it is not mirrored.
    #[must_use]
    pub fn max_for(&self, domain: &str) -> Option<usize> {
        self.0.get(domain).copied()
    }

    /// Iterate over `(domain, max)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(d, max)| (d.as_str(), *max))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a snapshot from the full hub inventory.
    ///
    /// Per enabled domain: unnamed devices are dropped, repeated ids keep
    /// their first occurrence, the list is capped at the domain maximum and
    /// then sorted by name. The cap applies in hub order, before sorting.
    /// Domains the hub does not report are left out of the snapshot.
    #[must_use]
    pub fn build_snapshot(&self, inventory: &BTreeMap<String, Vec<Device>>) -> Snapshot {
        self.iter()
            .filter_map(|(domain, max)| {
                let devices = inventory.get(domain)?;
                let mut seen = HashSet::new();
                let mut kept: Vec<Device> = devices
                    .iter()
                    .filter(|device| device.friendly_name().is_some())
                    .filter(|device| seen.insert(device.id.clone()))
                    .take(max)
                    .cloned()
                    .collect();
                kept.sort_by(|a, b| {
                    locale_cmp(
                        a.friendly_name().unwrap_or_default(),
                        b.friendly_name().unwrap_or_default(),
                    )
                });
                Some((domain.to_string(), kept))
            })
            .collect()
    }
}
