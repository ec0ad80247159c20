//! # homebutlerd — homebutler daemon
//!
//! Composition root that runs the companion and the client side by side,
//! connected by the in-process transports.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Install the tracing subscriber
//! - Build the configured hub backend and seed the settings store
//! - Construct both engines, injecting adapters via port traits
//! - Pump transport notifications into each endpoint's event loop
//! - Open the live link, wake the companion up and run until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod hub;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use homebutler_adapter_memory::bulk::file_queue;
use homebutler_adapter_memory::document::MemoryDocument;
use homebutler_adapter_memory::live::{Connection, LinkEvent, forward_link_events};
use homebutler_adapter_memory::settings::MemorySettings;
use homebutler_app::event::{ClientEvent, CompanionEvent};
use homebutler_app::services::rendering::RenderingEngine;
use homebutler_app::services::sync_engine::SyncEngine;
use homebutler_domain::envelope::{Envelope, StateUpdate};

use crate::config::Config;
use crate::hub::Hub;

const EVENT_QUEUE: usize = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.logging.filter)?)
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::info!(backend = ?config.hub.backend, "starting homebutlerd");

    // Transports
    let connection = Connection::new(16);
    let (client_live, companion_messages) = connection.channel::<Envelope>();
    let (companion_live, client_messages) = connection.channel::<StateUpdate>();
    let (outbox, inbox) = file_queue();
    let arrivals = inbox.arrivals();
    let settings = Arc::new(MemorySettings::seeded(
        &config.settings.to_connection_settings(),
    ));

    // Engines
    let hub = Hub::from_config(&config.hub)?;
    let mut companion = SyncEngine::new(
        hub,
        config.domains.clone(),
        companion_live,
        outbox,
        Arc::clone(&settings),
    );
    companion.reload_settings().await;
    let client = RenderingEngine::new(
        MemoryDocument::with_layout(&config.domains),
        client_live,
        inbox,
        config.domains.clone(),
    );

    // Event loops and their feeds
    let (companion_tx, companion_rx) = mpsc::channel(EVENT_QUEUE);
    let (client_tx, client_rx) = mpsc::channel(EVENT_QUEUE);

    let companion_link = forward_link_events(connection.subscribe(), companion_tx.clone(), |event| {
        match event {
            LinkEvent::Opened => CompanionEvent::ChannelOpened,
            LinkEvent::Closed => CompanionEvent::ChannelClosed,
        }
    });
    let client_link = forward_link_events(connection.subscribe(), client_tx.clone(), |event| match event {
        LinkEvent::Opened => ClientEvent::ChannelOpened,
        LinkEvent::Closed => ClientEvent::ChannelClosed,
    });
    let companion_feed = companion_messages.forward(companion_tx.clone(), CompanionEvent::MessageReceived);
    let client_feed = client_messages.forward(client_tx.clone(), ClientEvent::MessageReceived);
    let file_feed = arrivals.forward(client_tx, || ClientEvent::FileReceived);
    let settings_feed = forward_settings_changes(settings.subscribe(), companion_tx);

    connection.open();
    client.init();

    let running = async {
        tokio::join!(
            companion.run(companion_rx),
            client.run(client_rx),
            companion_link,
            client_link,
            companion_feed,
            client_feed,
            file_feed,
            settings_feed,
        );
    };

    tokio::select! {
        () = running => tracing::info!("event loops finished"),
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutting down");
        }
    }

    connection.close();
    Ok(())
}

/// Turn every settings write into a [`CompanionEvent::SettingsChanged`].
async fn forward_settings_changes(
    mut changes: broadcast::Receiver<String>,
    events: mpsc::Sender<CompanionEvent>,
) {
    loop {
        match changes.recv().await {
            Ok(key) => tracing::debug!(key, "settings changed"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "settings changed several times");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
        if events.send(CompanionEvent::SettingsChanged).await.is_err() {
            break;
        }
    }
}
