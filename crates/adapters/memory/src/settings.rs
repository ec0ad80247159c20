//! In-memory settings store with change notifications.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use homebutler_app::ports::SettingsStore;
use homebutler_domain::settings::{
    CREDENTIAL_KEY, ConnectionSettings, HOST_KEY, PORT_KEY, PROTOCOL_KEY,
};

/// Settings kept in a map of raw strings, like the host's local storage.
///
/// Every write is announced to [`subscribe`](Self::subscribe) receivers.
pub struct MemorySettings {
    items: Mutex<HashMap<String, String>>,
    changes: broadcast::Sender<String>,
}

impl Default for MemorySettings {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            items: Mutex::new(HashMap::new()),
            changes,
        }
    }
}

impl MemorySettings {
    /// A store holding `settings` as `{"name": ...}` items.
    #[must_use]
    pub fn seeded(settings: &ConnectionSettings) -> Self {
        let store = Self::default();
        {
            let mut items = store.lock();
            for (key, value) in [
                (PROTOCOL_KEY, &settings.protocol),
                (HOST_KEY, &settings.host),
                (PORT_KEY, &settings.port),
                (CREDENTIAL_KEY, &settings.credential),
            ] {
                items.insert(key.to_string(), setting_item(value));
            }
        }
        store
    }

    /// Store a raw item verbatim.
    pub fn set_item(&self, key: &str, raw: impl Into<String>) {
        self.lock().insert(key.to_string(), raw.into());
        self.announce(key);
    }

    /// Store a value wrapped as `{"name": value}`.
    pub fn set_setting(&self, key: &str, value: &str) {
        self.set_item(key, setting_item(value));
    }

    pub fn remove_item(&self, key: &str) {
        self.lock().remove(key);
        self.announce(key);
    }

    /// Subscribe to the keys of items written after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }

    fn announce(&self, key: &str) {
        tracing::debug!(key, "setting changed");
        // Nobody listening is fine.
        let _ = self.changes.send(key.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn setting_item(value: &str) -> String {
    serde_json::json!({ "name": value }).to_string()
}

impl SettingsStore for MemorySettings {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }
}
