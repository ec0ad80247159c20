//! Sync engine — the companion endpoint.
//!
//! Pulls the hub inventory, turns it into a bounded [`Snapshot`] and pushes
//! it over the bulk channel; relays service calls from the client to the
//! hub and answers with live state updates.

use tokio::sync::mpsc;

use homebutler_domain::device::GROUP_DOMAIN;
use homebutler_domain::enabled_domains::EnabledDomains;
use homebutler_domain::envelope::{Envelope, ServiceCall, StateUpdate};
use homebutler_domain::settings::{
    CREDENTIAL_KEY, ConnectionSettings, HOST_KEY, PORT_KEY, PROTOCOL_KEY, parse_setting_item,
};
use homebutler_domain::snapshot::{SNAPSHOT_FILE_NAME, Snapshot};

use crate::event::CompanionEvent;
use crate::ports::{BulkOutbox, HubApi, LiveChannel, SettingsStore};
use crate::services::hub_client::HubClient;

/// Companion-side engine owning the hub cache and both channel handles.
pub struct SyncEngine<H, L, O, S> {
    hub: HubClient<H>,
    enabled: EnabledDomains,
    live: L,
    outbox: O,
    settings: S,
}

impl<H, L, O, S> SyncEngine<H, L, O, S>
where
    H: HubApi,
    L: LiveChannel<StateUpdate>,
    O: BulkOutbox,
    S: SettingsStore,
{
    /// Create an engine. Call [`reload_settings`](Self::reload_settings)
    /// before the first sync so the hub client knows where to connect.
    pub fn new(api: H, enabled: EnabledDomains, live: L, outbox: O, settings: S) -> Self {
        Self {
            hub: HubClient::new(api),
            enabled,
            live,
            outbox,
            settings,
        }
    }

    /// Read the connection settings, falling back to defaults per key.
    pub async fn load_settings(&self) -> ConnectionSettings {
        let mut settings = ConnectionSettings::default();
        if let Some(protocol) = self.setting(PROTOCOL_KEY).await {
            settings.protocol = protocol;
        }
        if let Some(host) = self.setting(HOST_KEY).await {
            settings.host = host;
        }
        if let Some(port) = self.setting(PORT_KEY).await {
            settings.port = port;
        }
        if let Some(credential) = self.setting(CREDENTIAL_KEY).await {
            settings.credential = credential;
        }
        settings
    }

    async fn setting(&self, key: &'static str) -> Option<String> {
        let raw = self.settings.get_item(key).await;
        match parse_setting_item(key, raw.as_deref()) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed setting");
                None
            }
        }
    }

    /// Re-read the settings and reconfigure the hub client. Does not resync.
    pub async fn reload_settings(&mut self) {
        let settings = self.load_settings().await;
        self.hub.configure(&settings);
    }

    /// Refresh the hub inventory and push a fresh snapshot.
    ///
    /// Returns the snapshot that was queued, or `None` when the hub could
    /// not be read or the file could not be queued.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&mut self) -> Option<Snapshot> {
        if !self.hub.sync().await {
            return None;
        }

        let snapshot = self.enabled.build_snapshot(self.hub.devices());
        let payload = match snapshot.encode() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode snapshot");
                return None;
            }
        };

        let bytes = payload.len();
        match self.outbox.enqueue(SNAPSHOT_FILE_NAME, payload).await {
            Ok(()) => {
                tracing::info!(
                    domains = snapshot.iter().count(),
                    devices = snapshot.device_count(),
                    bytes,
                    "snapshot queued"
                );
                Some(snapshot)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to queue snapshot");
                None
            }
        }
    }

    /// Dispatch a single event.
    #[tracing::instrument(skip(self))]
    pub async fn handle(&mut self, event: CompanionEvent) {
        match event {
            CompanionEvent::ChannelOpened => {
                tracing::debug!("live channel open, pushing snapshot");
                self.sync().await;
            }
            CompanionEvent::ChannelClosed => tracing::debug!("live channel closed"),
            CompanionEvent::ChannelError(message) => {
                tracing::error!(error = %message, "live channel error");
            }
            CompanionEvent::MessageReceived(Envelope::Service(call)) => {
                self.relay_service_call(&call).await;
            }
            CompanionEvent::MessageReceived(Envelope::Wakeup | Envelope::Unknown) => {}
            CompanionEvent::SettingsChanged => self.reload_settings().await,
        }
    }

    /// Forward a call to the hub and push one update per affected device.
    async fn relay_service_call(&self, call: &ServiceCall) {
        let Some(states) = self.hub.call_service(call).await else {
            return;
        };

        let mut sent = 0_usize;
        for state in states {
            let Some(update) = StateUpdate::from_device(state.into_device()) else {
                continue;
            };
            if update.domain == GROUP_DOMAIN {
                continue;
            }
            match self.live.send(&update) {
                Ok(()) => sent += 1,
                Err(err) => tracing::warn!(error = %err, entity_id = %update.id, "dropping state update"),
            }
        }
        tracing::debug!(sent, "state updates pushed");
    }

    /// Run the event loop until every event sender is dropped.
    ///
    /// Each event is handled to completion before the next one is taken.
    pub async fn run(mut self, mut events: mpsc::Receiver<CompanionEvent>) -> Self {
        tracing::info!("companion event loop started");
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("companion event loop stopped");
        self
    }

    /// The hub client and its cache.
    #[must_use]
    pub fn hub(&self) -> &HubClient<H> {
        &self.hub
    }
}
