//! Settings port — persisted user settings of the companion.

use std::future::Future;

/// Read access to the raw persisted settings.
pub trait SettingsStore {
    /// Raw value stored under `key`, if any.
    fn get_item(&self, key: &str) -> impl Future<Output = Option<String>> + Send;
}

impl<T: SettingsStore + Send + Sync> SettingsStore for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> impl Future<Output = Option<String>> + Send {
        (**self).get_item(key)
    }
}
