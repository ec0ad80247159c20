//! Rendering engine — the client endpoint.
//!
//! Turns an inbound [`Snapshot`] into domain sections and device cards,
//! patches single cards from live [`StateUpdate`]s and turns taps on cards
//! into service calls sent back to the companion.
//!
//! A card slot only moves forward: once a device has been bound into it,
//! it stays visible with its last content even if a later snapshot no
//! longer fills it.

pub mod card;
pub mod ids;
pub mod registry;

use std::collections::HashMap;

use tokio::sync::mpsc;

use homebutler_domain::device::Device;
use homebutler_domain::enabled_domains::EnabledDomains;
use homebutler_domain::envelope::{Envelope, StateUpdate};
use homebutler_domain::snapshot::Snapshot;

use self::card::ClickIntent;
use self::registry::RendererRegistry;
use crate::event::ClientEvent;
use crate::ports::document::child;
use crate::ports::{BulkInbox, Document, LiveChannel};

pub const PLACEHOLDER_TITLE: &str = "Settings";
pub const PLACEHOLDER_PROMPT: &str =
    "Please configure your Home Assistant settings in the companion app.";

/// Client-side engine owning the UI document and the companion channels.
pub struct RenderingEngine<D, L, I> {
    document: D,
    live: L,
    inbox: I,
    enabled: EnabledDomains,
    renderers: RendererRegistry,
    /// Device currently bound to each card id.
    bound: HashMap<String, Device>,
}

impl<D, L, I> RenderingEngine<D, L, I>
where
    D: Document,
    L: LiveChannel<Envelope>,
    I: BulkInbox,
{
    /// Create an engine with the default renderer registry.
    pub fn new(document: D, live: L, inbox: I, enabled: EnabledDomains) -> Self {
        Self {
            document,
            live,
            inbox,
            enabled,
            renderers: RendererRegistry::default(),
            bound: HashMap::new(),
        }
    }

    /// Replace the renderer registry.
    #[must_use]
    pub fn with_renderers(mut self, renderers: RendererRegistry) -> Self {
        self.renderers = renderers;
        self
    }

    /// Wake the companion up; it answers by opening the channel.
    pub fn init(&self) {
        if let Err(err) = self.live.send(&Envelope::Wakeup) {
            tracing::warn!(error = %err, "failed to send wakeup");
        }
    }

    /// Fully re-render from a snapshot.
    #[tracing::instrument(skip_all, fields(domains = snapshot.iter().count()))]
    pub fn render(&mut self, snapshot: &Snapshot) {
        let mut domains_shown = 0_usize;
        let mut cards_bound = 0_usize;

        for (domain, devices) in snapshot.iter() {
            let section = ids::section(domain);
            if !self.document.exists(&section) {
                tracing::debug!(domain, "no section in markup, skipping domain");
                continue;
            }
            let Some(limit) = self.enabled.max_for(domain) else {
                tracing::debug!(domain, "domain not enabled, skipping");
                continue;
            };
            let mut bound = 0_usize;
            for (index, device) in devices.iter().take(limit).enumerate() {
                if device.domain() != Some(domain) {
                    tracing::debug!(domain, entity_id = %device.id, "device filed under wrong domain");
                    continue;
                }
                let card = ids::card(domain, index);
                if !self.document.exists(&card) {
                    continue;
                }
                self.bind_card(&card, device);
                bound += 1;
            }

            if bound > 0 {
                self.document.set_visible(&section, true);
                self.document.select(&ids::list(domain), 0);
                domains_shown += 1;
                cards_bound += bound;
            }
        }

        if domains_shown == 0 {
            self.document.set_text(ids::WARNING_TITLE, PLACEHOLDER_TITLE);
            self.document.set_text(ids::WARNING_CONTENT, PLACEHOLDER_PROMPT);
            self.document.set_visible(ids::WARNING_TITLE, true);
            self.document.set_visible(ids::WARNING_CONTENT, true);
        } else {
            self.document.set_visible(ids::WARNING_TITLE, false);
            self.document.set_visible(ids::WARNING_CONTENT, false);
            self.document.select(ids::DOMAIN_LIST, 0);
        }

        tracing::info!(domains = domains_shown, cards = cards_bound, "snapshot rendered");
    }

    /// Patch the cards showing the updated device. Never creates a card.
    pub fn apply_update(&mut self, update: &StateUpdate) {
        let Some(name) = update.friendly_name() else {
            return;
        };
        let matching: Vec<String> = self
            .document
            .elements_by_class(&update.domain)
            .into_iter()
            .filter(|card| self.document.text(&child(card, ids::NAME)).as_deref() == Some(name))
            .collect();

        let device = update.to_device();
        for card in &matching {
            self.bind_card(card, &device);
        }
        tracing::debug!(entity_id = %update.id, cards = matching.len(), "live update applied");
    }

    /// Handle a tap on a card: infer the intent and send the service call.
    #[tracing::instrument(skip(self))]
    pub fn click(&self, card: &str) {
        let Some(device) = self.bound.get(card) else {
            tracing::debug!(card, "click on unbound card ignored");
            return;
        };
        // Re-derived on every click: card slots get rebound to other devices.
        let Some(domain) = device.domain() else {
            return;
        };
        let opacity = self.document.opacity(&child(card, ids::STATE));
        let Some(intent) = ClickIntent::from_indicator_opacity(opacity) else {
            tracing::debug!(card, ?opacity, "indicator opacity undecided, click ignored");
            return;
        };

        let call = self.renderers.get(domain).command(domain, &device.id, intent);
        if let Err(err) = self.live.send(&Envelope::Service(call)) {
            tracing::warn!(error = %err, card, "failed to send service call");
        }
    }

    /// Render every pending inbox file, oldest first.
    ///
    /// A file that cannot be decoded renders as an empty snapshot, which
    /// brings up the configuration placeholder.
    pub fn receive_files(&mut self) {
        while let Some(file) = self.inbox.next_file() {
            tracing::debug!(file = %file.name, bytes = file.payload.len(), "received file");
            let snapshot = Snapshot::decode(&file.payload).unwrap_or_else(|err| {
                tracing::error!(file = %file.name, error = %err, "failed to decode snapshot");
                Snapshot::new()
            });
            self.render(&snapshot);
        }
    }

    /// Dispatch a single event.
    pub fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::ChannelOpened => tracing::debug!("live channel open"),
            ClientEvent::ChannelClosed => tracing::debug!("live channel closed"),
            ClientEvent::ChannelError(message) => {
                tracing::error!(error = %message, "live channel error");
            }
            ClientEvent::MessageReceived(update) => self.apply_update(&update),
            ClientEvent::FileReceived => self.receive_files(),
            ClientEvent::CardClicked(card) => self.click(&card),
        }
    }

    /// Run the event loop until every event sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<ClientEvent>) -> Self {
        tracing::info!("client event loop started");
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::info!("client event loop stopped");
        self
    }

    /// The UI document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Device currently bound to a card.
    #[must_use]
    pub fn bound_device(&self, card: &str) -> Option<&Device> {
        self.bound.get(card)
    }

    fn bind_card(&mut self, card: &str, device: &Device) {
        self.document.set_visible(card, true);
        self.document.set_text(
            &child(card, ids::NAME),
            device.friendly_name().unwrap_or_default(),
        );
        let domain = device.domain().unwrap_or_default();
        self.renderers.get(domain).bind(&mut self.document, card, device);
        self.bound.insert(card.to_string(), device.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Animation, InboundFile};
    use homebutler_domain::envelope::ServiceCall;
    use homebutler_domain::error::ChannelError;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Element {
        visible: bool,
        text: String,
        fill: Option<String>,
        opacity: f64,
        selected: Option<usize>,
        class: Option<String>,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct FakeDocument {
        elements: BTreeMap<String, Element>,
    }

    impl FakeDocument {
        fn new() -> Self {
            let mut doc = Self::default();
            doc.add(ids::DOMAIN_LIST, None);
            doc.add(ids::WARNING_TITLE, None);
            doc.add(ids::WARNING_CONTENT, None);
            doc
        }

        fn with_domain(mut self, domain: &str, cards: usize) -> Self {
            self.add(&ids::section(domain), None);
            self.add(&ids::list(domain), None);
            for index in 0..cards {
                let card = ids::card(domain, index);
                self.add(&card, Some(domain));
                for name in ids::CARD_CHILDREN {
                    self.add(&child(&card, name), None);
                }
                self.el(&child(&card, ids::STATE)).opacity = 1.0;
            }
            self
        }

        fn add(&mut self, id: &str, class: Option<&str>) {
            self.elements.insert(
                id.to_string(),
                Element {
                    class: class.map(str::to_string),
                    ..Element::default()
                },
            );
        }

        fn el(&mut self, id: &str) -> &mut Element {
            self.elements.get_mut(id).unwrap()
        }

        fn get(&self, id: &str) -> &Element {
            &self.elements[id]
        }

        fn visible(&self, id: &str) -> bool {
            self.get(id).visible
        }
    }

    impl Document for FakeDocument {
        fn exists(&self, id: &str) -> bool {
            self.elements.contains_key(id)
        }

        fn set_visible(&mut self, id: &str, visible: bool) {
            if let Some(el) = self.elements.get_mut(id) {
                el.visible = visible;
            }
        }

        fn set_text(&mut self, id: &str, text: &str) {
            if let Some(el) = self.elements.get_mut(id) {
                el.text = text.to_string();
            }
        }

        fn text(&self, id: &str) -> Option<String> {
            self.elements.get(id).map(|el| el.text.clone())
        }

        fn set_fill(&mut self, id: &str, color: &str) {
            if let Some(el) = self.elements.get_mut(id) {
                el.fill = Some(color.to_string());
            }
        }

        fn animate(&mut self, id: &str, animation: Animation) {
            let opacity = match animation {
                Animation::Enable => 0.0,
                Animation::Disable => 1.0,
            };
            if let Some(el) = self.elements.get_mut(&child(id, ids::STATE)) {
                el.opacity = opacity;
            }
        }

        fn opacity(&self, id: &str) -> Option<f64> {
            self.elements.get(id).map(|el| el.opacity)
        }

        fn select(&mut self, list_id: &str, index: usize) {
            if let Some(el) = self.elements.get_mut(list_id) {
                el.selected = Some(index);
            }
        }

        fn elements_by_class(&self, class: &str) -> Vec<String> {
            self.elements
                .iter()
                .filter(|(_, el)| el.class.as_deref() == Some(class))
                .map(|(id, _)| id.clone())
                .collect()
        }
    }

    #[derive(Default)]
    struct RecordingLive {
        sent: Mutex<Vec<Envelope>>,
    }

    impl LiveChannel<Envelope> for RecordingLive {
        fn send(&self, message: &Envelope) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeInbox {
        files: VecDeque<InboundFile>,
    }

    impl BulkInbox for FakeInbox {
        fn next_file(&mut self) -> Option<InboundFile> {
            self.files.pop_front()
        }
    }

    type Engine = RenderingEngine<FakeDocument, Arc<RecordingLive>, FakeInbox>;

    fn layout() -> FakeDocument {
        FakeDocument::new()
            .with_domain("light", 3)
            .with_domain("switch", 2)
            .with_domain("climate", 1)
            .with_domain("fan", 1)
    }

    fn engine_with(document: FakeDocument, enabled: EnabledDomains) -> (Engine, Arc<RecordingLive>) {
        let live = Arc::new(RecordingLive::default());
        let engine = RenderingEngine::new(document, Arc::clone(&live), FakeInbox::default(), enabled);
        (engine, live)
    }

    fn engine() -> (Engine, Arc<RecordingLive>) {
        let enabled = [("light", 16), ("switch", 16), ("climate", 4), ("fan", 4)]
            .into_iter()
            .collect();
        engine_with(layout(), enabled)
    }

    fn device(id: &str, name: &str, state: &str) -> Device {
        Device::builder().id(id).friendly_name(name).state(state).build()
    }

    fn snapshot(entries: Vec<(&str, Vec<Device>)>) -> Snapshot {
        entries
            .into_iter()
            .map(|(d, devices)| (d.to_string(), devices))
            .collect()
    }

    fn lamp_snapshot() -> Snapshot {
        snapshot(vec![("light", vec![device("light.lamp", "Lamp", "off")])])
    }

    fn hall(state: &str) -> Device {
        Device::builder()
            .id("climate.hall")
            .friendly_name("Hall")
            .attribute("current_temperature", 21.5)
            .attribute("current_humidity", 40_i64)
            .state(state)
            .build()
    }

    fn encoded(snapshot: &Snapshot) -> InboundFile {
        InboundFile {
            name: "devices.json".to_string(),
            payload: snapshot.encode().unwrap(),
        }
    }

    #[test]
    fn should_render_lamp_as_disabled_card_and_send_turn_on_on_click() {
        let (mut engine, live) = engine();
        engine.render(&lamp_snapshot());

        let doc = engine.document();
        assert!(doc.visible("light-domain"));
        assert!(doc.visible("light-0"));
        assert!(!doc.visible("light-1"));
        assert_eq!(doc.get("light-0/name").text, "Lamp");
        assert!((doc.get("light-0/state").opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(doc.get("light-list").selected, Some(0));
        assert_eq!(doc.get("domain-list").selected, Some(0));
        assert!(!doc.visible("warning-title"));

        engine.click("light-0");
        let sent = live.sent.lock().unwrap();
        assert_eq!(
            serde_json::to_value(&sent[0]).unwrap(),
            serde_json::json!({
                "command": "service",
                "content": {"domain": "light", "service": "turn_on", "payload": {"entity_id": "light.lamp"}}
            })
        );
    }

    #[test]
    fn should_show_placeholder_for_empty_snapshot() {
        let (mut engine, _) = engine();
        engine.render(&Snapshot::new());

        let doc = engine.document();
        assert!(doc.visible("warning-title"));
        assert!(doc.visible("warning-content"));
        assert_eq!(doc.get("warning-title").text, PLACEHOLDER_TITLE);
        assert_eq!(doc.get("warning-content").text, PLACEHOLDER_PROMPT);
        for domain in ["light", "switch", "climate", "fan"] {
            assert!(!doc.visible(&ids::section(domain)));
        }
    }

    #[test]
    fn should_show_placeholder_when_no_domain_binds_a_card() {
        let (mut engine, _) = engine();
        engine.render(&snapshot(vec![
            ("light", Vec::new()),
            ("media_player", vec![device("media_player.tv", "TV", "on")]),
        ]));
        assert!(engine.document().visible("warning-title"));
    }

    #[test]
    fn should_keep_section_hidden_when_domain_has_no_named_device() {
        let (mut engine, _) = engine();
        engine.render(&snapshot(vec![("light", Vec::new())]));

        let doc = engine.document();
        assert!(doc.visible("warning-title"));
        assert!(!doc.visible("light-domain"));
    }

    #[test]
    fn should_color_heating_climate_and_send_off_on_click() {
        let (mut engine, live) = engine();
        engine.render(&snapshot(vec![("climate", vec![hall("heat")])]));

        let doc = engine.document();
        assert_eq!(doc.get("climate-0/background").fill.as_deref(), Some("#FF5967"));
        assert_eq!(doc.get("climate-0/state").opacity, 0.0);
        assert_eq!(doc.get("climate-0/temperature").text, "21.5\u{b0}");
        assert_eq!(doc.get("climate-0/humidity").text, "40%");

        engine.click("climate-0");
        assert_eq!(
            live.sent.lock().unwrap()[0],
            Envelope::Service(
                ServiceCall::new("climate", "set_hvac_mode", "climate.hall").with("hvac_mode", "off")
            )
        );
    }

    #[test]
    fn should_disable_climate_that_is_off_and_send_heat_cool_on_click() {
        let (mut engine, live) = engine();
        engine.render(&snapshot(vec![("climate", vec![hall("off")])]));
        assert!(engine.document().get("climate-0/background").fill.is_none());

        engine.click("climate-0");
        assert_eq!(
            live.sent.lock().unwrap()[0],
            Envelope::Service(
                ServiceCall::new("climate", "set_hvac_mode", "climate.hall")
                    .with("hvac_mode", "heat_cool")
            )
        );
    }

    #[test]
    fn should_use_mode_colors_for_cool_and_heat_cool() {
        let (mut engine, _) = engine();
        engine.render(&snapshot(vec![("climate", vec![hall("cool")])]));
        assert_eq!(
            engine.document().get("climate-0/background").fill.as_deref(),
            Some(card::COOL_COLOR)
        );
        engine.render(&snapshot(vec![("climate", vec![hall("heat_cool")])]));
        assert_eq!(
            engine.document().get("climate-0/background").fill.as_deref(),
            Some(card::HEAT_COOL_COLOR)
        );
    }

    #[test]
    fn should_render_identically_twice() {
        let (mut engine, _) = engine();
        let snap = snapshot(vec![
            ("light", vec![device("light.a", "A", "on"), device("light.b", "B", "off")]),
            ("climate", vec![hall("heat")]),
        ]);
        engine.render(&snap);
        let first = engine.document().clone();
        engine.render(&snap);
        assert_eq!(engine.document(), &first);
    }

    #[test]
    fn should_not_bind_more_cards_than_enabled_maximum() {
        let enabled = [("light", 2)].into_iter().collect();
        let (mut engine, _) = engine_with(layout(), enabled);
        engine.render(&snapshot(vec![(
            "light",
            vec![
                device("light.a", "A", "on"),
                device("light.b", "B", "on"),
                device("light.c", "C", "on"),
            ],
        )]));

        assert_eq!(engine.document().elements_by_class("light").len(), 3);
        assert!(engine.bound_device("light-1").is_some());
        assert!(engine.bound_device("light-2").is_none());
        assert!(!engine.document().visible("light-2"));
    }

    #[test]
    fn should_skip_devices_filed_under_wrong_domain() {
        let (mut engine, _) = engine();
        engine.render(&snapshot(vec![(
            "light",
            vec![device("switch.fan", "Fan", "on")],
        )]));
        assert!(engine.bound_device("light-0").is_none());
    }

    #[test]
    fn should_patch_matching_card_on_update() {
        let (mut engine, live) = engine();
        engine.render(&lamp_snapshot());

        let update = StateUpdate::from_device(device("light.lamp", "Lamp", "on")).unwrap();
        engine.handle(ClientEvent::MessageReceived(update));

        assert_eq!(engine.document().get("light-0/state").opacity, 0.0);
        assert_eq!(engine.bound_device("light-0").unwrap().state, "on");

        engine.click("light-0");
        assert_eq!(
            live.sent.lock().unwrap()[0],
            Envelope::Service(ServiceCall::new("light", "turn_off", "light.lamp"))
        );
    }

    #[test]
    fn should_ignore_update_for_device_without_card() {
        let (mut engine, _) = engine();
        engine.render(&lamp_snapshot());
        let before = engine.document().clone();

        let update = StateUpdate::from_device(device("light.porch", "Porch", "on")).unwrap();
        engine.apply_update(&update);
        let unnamed = StateUpdate::from_device(
            Device::builder().id("light.lamp").state("on").build(),
        )
        .unwrap();
        engine.apply_update(&unnamed);

        assert_eq!(engine.document(), &before);
        assert!(engine.bound_device("light-1").is_none());
    }

    #[test]
    fn should_ignore_click_while_indicator_is_mid_transition() {
        let (mut engine, live) = engine();
        engine.render(&lamp_snapshot());
        engine.document.el("light-0/state").opacity = -0.5;
        engine.click("light-0");
        engine.document.el("light-0/state").opacity = f64::NAN;
        engine.click("light-0");
        assert!(live.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn should_ignore_click_on_unbound_card() {
        let (engine, live) = engine();
        engine.click("light-0");
        engine.click("nowhere");
        assert!(live.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn should_drive_unknown_domains_with_default_card() {
        let (mut engine, live) = engine();
        engine.render(&snapshot(vec![("fan", vec![device("fan.ceiling", "Ceiling", "on")])]));
        assert_eq!(engine.document().get("fan-0/state").opacity, 0.0);

        engine.handle(ClientEvent::CardClicked("fan-0".to_string()));
        assert_eq!(
            live.sent.lock().unwrap()[0],
            Envelope::Service(ServiceCall::new("fan", "turn_off", "fan.ceiling"))
        );
    }

    #[test]
    fn should_keep_stale_cards_when_domain_shrinks() {
        let (mut engine, _) = engine();
        engine.render(&snapshot(vec![(
            "light",
            vec![device("light.a", "A", "on"), device("light.b", "B", "on")],
        )]));
        engine.render(&snapshot(vec![("light", vec![device("light.a", "A", "on")])]));

        assert!(engine.document().visible("light-1"));
        assert_eq!(engine.document().get("light-1/name").text, "B");
    }

    #[test]
    fn should_render_empty_snapshot_when_file_is_corrupt() {
        let (mut engine, _) = engine();
        engine.inbox.files.push_back(InboundFile {
            name: "devices.json".to_string(),
            payload: vec![0x7b],
        });
        engine.handle(ClientEvent::FileReceived);
        assert!(engine.document().visible("warning-title"));
    }

    #[test]
    fn should_drain_all_pending_files_in_order() {
        let (mut engine, _) = engine();
        engine.inbox.files.push_back(encoded(&lamp_snapshot()));
        engine.inbox.files.push_back(encoded(&snapshot(vec![(
            "light",
            vec![device("light.desk", "Desk", "on")],
        )])));

        engine.receive_files();

        assert!(engine.inbox.files.is_empty());
        assert_eq!(engine.document().get("light-0/name").text, "Desk");
    }

    #[test]
    fn should_send_wakeup_on_init() {
        let (engine, live) = engine();
        engine.init();
        assert_eq!(live.sent.lock().unwrap().as_slice(), &[Envelope::Wakeup]);
    }

    #[test]
    fn should_use_registered_renderer_for_domain() {
        let (engine, live) = engine();
        let mut registry = RendererRegistry::default();
        registry.register("fan", card::ClimateCard);
        let mut engine = engine.with_renderers(registry);

        engine.render(&snapshot(vec![("fan", vec![device("fan.ceiling", "Ceiling", "off")])]));
        engine.click("fan-0");
        assert_eq!(
            live.sent.lock().unwrap()[0],
            Envelope::Service(
                ServiceCall::new("fan", "set_hvac_mode", "fan.ceiling").with("hvac_mode", "heat_cool")
            )
        );
    }

    #[tokio::test]
    async fn should_process_events_in_order_until_senders_drop() {
        let (mut engine, _) = engine();
        engine.inbox.files.push_back(encoded(&lamp_snapshot()));
        let (tx, rx) = mpsc::channel(8);
        tx.send(ClientEvent::ChannelOpened).await.unwrap();
        tx.send(ClientEvent::FileReceived).await.unwrap();
        tx.send(ClientEvent::MessageReceived(
            StateUpdate::from_device(device("light.lamp", "Lamp", "on")).unwrap(),
        ))
        .await
        .unwrap();
        drop(tx);

        let engine = engine.run(rx).await;
        assert_eq!(engine.bound_device("light-0").unwrap().state, "on");
    }
}
