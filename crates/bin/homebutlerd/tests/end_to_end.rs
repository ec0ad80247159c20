//! End-to-end tests for the companion and the client wired together.
//!
//! Each test builds both engines over the in-memory transports and the
//! virtual hub, then delivers transport events step by step, the way the
//! daemon's feeds would, so every hop can be checked.

use std::sync::Arc;

use tokio::sync::mpsc;

use homebutler_adapter_memory::bulk::{FileInbox, FileOutbox, file_queue};
use homebutler_adapter_memory::document::MemoryDocument;
use homebutler_adapter_memory::live::{Connection, LiveReceiver, LiveSender};
use homebutler_adapter_memory::settings::MemorySettings;
use homebutler_adapter_virtual::VirtualHub;
use homebutler_app::event::{ClientEvent, CompanionEvent};
use homebutler_app::ports::{Document, HubApi};
use homebutler_app::services::rendering::{PLACEHOLDER_TITLE, RenderingEngine};
use homebutler_app::services::sync_engine::SyncEngine;
use homebutler_domain::enabled_domains::EnabledDomains;
use homebutler_domain::envelope::{Envelope, ServiceCall, StateUpdate};
use homebutler_domain::settings::{ConnectionSettings, HOST_KEY};

type Companion = SyncEngine<VirtualHub, LiveSender<StateUpdate>, FileOutbox, Arc<MemorySettings>>;
type Client = RenderingEngine<MemoryDocument, LiveSender<Envelope>, FileInbox>;

struct Harness {
    hub: VirtualHub,
    connection: Connection,
    settings: Arc<MemorySettings>,
    companion: Companion,
    client: Client,
    to_companion: LiveReceiver<Envelope>,
    to_client: LiveReceiver<StateUpdate>,
}

impl Harness {
    async fn new(enabled: EnabledDomains) -> Self {
        let hub = VirtualHub::default();
        let connection = Connection::new(8);
        let (client_live, to_companion) = connection.channel::<Envelope>();
        let (companion_live, to_client) = connection.channel::<StateUpdate>();
        let (outbox, inbox) = file_queue();
        let settings = Arc::new(MemorySettings::seeded(&ConnectionSettings::default()));

        let mut companion = SyncEngine::new(
            hub.clone(),
            enabled.clone(),
            companion_live,
            outbox,
            Arc::clone(&settings),
        );
        companion.reload_settings().await;
        let client = RenderingEngine::new(
            MemoryDocument::with_layout(&enabled),
            client_live,
            inbox,
            enabled,
        );

        Self {
            hub,
            connection,
            settings,
            companion,
            client,
            to_companion,
            to_client,
        }
    }

    /// Open the link, wake the companion up and render the first snapshot.
    async fn handshake(&mut self) {
        self.connection.open();
        self.client.init();
        self.deliver_commands().await;
        self.companion.handle(CompanionEvent::ChannelOpened).await;
        self.client.handle(ClientEvent::FileReceived);
    }

    /// Hand every pending client command to the companion.
    async fn deliver_commands(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(envelope) = self.to_companion.try_recv() {
            self.companion
                .handle(CompanionEvent::MessageReceived(envelope))
                .await;
            delivered += 1;
        }
        delivered
    }

    /// Hand every pending state update to the client.
    fn deliver_updates(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(update) = self.to_client.try_recv() {
            self.client.handle(ClientEvent::MessageReceived(update));
            delivered += 1;
        }
        delivered
    }

    fn document(&self) -> &MemoryDocument {
        self.client.document()
    }
}

// ---------------------------------------------------------------------------
// Snapshot push
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_render_hub_inventory_after_handshake() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;

    let doc = harness.document();
    assert_eq!(doc.visible_cards("light"), vec!["light-0", "light-1", "light-2"]);
    assert_eq!(doc.text("light-0/name").as_deref(), Some("Ceiling"));
    assert_eq!(doc.text("light-1/name").as_deref(), Some("Desk Lamp"));
    assert_eq!(doc.text("light-2/name").as_deref(), Some("Porch"));
    assert_eq!(doc.opacity("light-0/state"), Some(0.0));
    assert_eq!(doc.opacity("light-1/state"), Some(1.0));

    assert_eq!(doc.text("switch-0/name").as_deref(), Some("Coffee Maker"));
    assert_eq!(doc.text("climate-0/name").as_deref(), Some("Hall"));
    assert_eq!(doc.fill("climate-0/background"), Some("#FF5967"));
    assert_eq!(doc.text("climate-0/temperature").as_deref(), Some("21.5\u{b0}"));

    assert!(!doc.is_visible("warning-title"));
    assert_eq!(doc.selected("domain-list"), Some(0));
    assert_eq!(doc.selected("light-list"), Some(0));
}

#[tokio::test]
async fn should_cap_cards_at_enabled_maximum() {
    let enabled = [("light", 2)].into_iter().collect();
    let mut harness = Harness::new(enabled).await;
    harness.handshake().await;

    assert_eq!(
        harness.document().visible_cards("light"),
        vec!["light-0", "light-1"]
    );
    assert!(!harness.document().exists("switch-domain"));
}

#[tokio::test]
async fn should_show_placeholder_when_hub_serves_no_enabled_domain() {
    let enabled = [("fan", 2)].into_iter().collect();
    let mut harness = Harness::new(enabled).await;
    harness.handshake().await;

    let doc = harness.document();
    assert!(doc.is_visible("warning-title"));
    assert_eq!(doc.text("warning-title").as_deref(), Some(PLACEHOLDER_TITLE));
    assert!(!doc.is_visible("fan-domain"));
}

// ---------------------------------------------------------------------------
// Commands and live updates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_switch_light_on_and_patch_its_card() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;

    harness.client.handle(ClientEvent::CardClicked("light-1".to_string()));
    assert_eq!(harness.deliver_commands().await, 1);

    let states = harness.hub.fetch_states().await.unwrap();
    let lamp = states.iter().find(|s| s.entity_id == "light.desk_lamp").unwrap();
    assert_eq!(lamp.state, "on");

    // The light group changed too but is never mirrored.
    assert_eq!(harness.deliver_updates(), 1);
    assert_eq!(harness.document().opacity("light-1/state"), Some(0.0));
    assert_eq!(
        harness.client.bound_device("light-1").unwrap().state,
        "on"
    );
}

#[tokio::test]
async fn should_turn_heating_off_from_climate_card() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;

    harness.client.handle(ClientEvent::CardClicked("climate-0".to_string()));
    harness.deliver_commands().await;
    harness.deliver_updates();

    assert_eq!(harness.document().opacity("climate-0/state"), Some(1.0));
    assert_eq!(
        harness.client.bound_device("climate-0").unwrap().state,
        "off"
    );
}

#[tokio::test]
async fn should_drop_commands_while_link_is_closed() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;
    harness.connection.close();

    harness.client.handle(ClientEvent::CardClicked("light-1".to_string()));

    assert_eq!(harness.deliver_commands().await, 0);
}

// ---------------------------------------------------------------------------
// Failure containment and settings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_keep_last_inventory_when_hub_goes_offline() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;
    let rendered = harness.document().clone();

    harness.hub.set_online(false);
    harness.companion.handle(CompanionEvent::ChannelOpened).await;
    harness.client.handle(ClientEvent::FileReceived);

    assert_eq!(harness.document(), &rendered);
    assert!(harness.companion.hub().devices().contains_key("light"));

    harness.client.handle(ClientEvent::CardClicked("light-1".to_string()));
    assert_eq!(harness.deliver_commands().await, 1);
    assert_eq!(harness.deliver_updates(), 0);
}

#[tokio::test]
async fn should_reconfigure_hub_without_resync_when_settings_change() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    let before = harness.document().clone();

    harness.settings.set_setting(HOST_KEY, "hub.lan");
    harness.companion.handle(CompanionEvent::SettingsChanged).await;
    harness.client.handle(ClientEvent::FileReceived);

    assert_eq!(harness.companion.load_settings().await.host, "hub.lan");
    assert_eq!(harness.document(), &before);
}

#[tokio::test]
async fn should_ignore_relayed_call_rejected_by_hub() {
    let mut harness = Harness::new(EnabledDomains::default()).await;
    harness.handshake().await;

    let call = ServiceCall::new("light", "turn_on", "light.attic");
    harness
        .companion
        .handle(CompanionEvent::MessageReceived(Envelope::Service(call)))
        .await;

    assert_eq!(harness.deliver_updates(), 0);
}

// ---------------------------------------------------------------------------
// Event loops
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_process_events_through_both_loops() {
    let harness = Harness::new(EnabledDomains::default()).await;
    let Harness {
        connection,
        companion,
        client,
        mut to_companion,
        mut to_client,
        ..
    } = harness;
    connection.open();

    let (companion_tx, companion_rx) = mpsc::channel(8);
    companion_tx.send(CompanionEvent::ChannelOpened).await.unwrap();
    drop(companion_tx);
    let companion = companion.run(companion_rx).await;

    let (client_tx, client_rx) = mpsc::channel(8);
    client_tx.send(ClientEvent::FileReceived).await.unwrap();
    client_tx
        .send(ClientEvent::CardClicked("switch-0".to_string()))
        .await
        .unwrap();
    drop(client_tx);
    let client = client.run(client_rx).await;

    let command = to_companion.try_recv().unwrap();
    assert_eq!(
        command,
        Envelope::Service(ServiceCall::new("switch", "turn_on", "switch.coffee_maker"))
    );

    let (companion_tx, companion_rx) = mpsc::channel(8);
    companion_tx
        .send(CompanionEvent::MessageReceived(command))
        .await
        .unwrap();
    drop(companion_tx);
    companion.run(companion_rx).await;

    let update = to_client.try_recv().unwrap();
    assert_eq!(update.id, "switch.coffee_maker");
    assert_eq!(update.state, "on");
    assert_eq!(client.document().text("switch-0/name").as_deref(), Some("Coffee Maker"));
}
