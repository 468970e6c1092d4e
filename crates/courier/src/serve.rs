// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serve command: wires adapters together and runs the gateway and
//! dispatcher until shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_carrier::CarrierHttpClient;
use courier_config::CourierConfig;
use courier_core::CourierError;
use courier_core::traits::{CarrierClient, StorageAdapter};
use courier_fallback::{CompletionHttpClient, FallbackResponder, NullContextSource};
use courier_gateway::GatewayState;
use courier_media::{ContentStore, MediaIngestor, UrlSigner};
use courier_relay::{Dispatcher, Relay, RelayOptions};
use courier_storage::SqliteStorage;
use tracing::{info, warn};

pub async fn run(config: CourierConfig) -> Result<(), CourierError> {
    let storage: Arc<dyn StorageAdapter> = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let carrier: Arc<dyn CarrierClient> = Arc::new(CarrierHttpClient::new(&config.carrier)?);
    let completions = Arc::new(CompletionHttpClient::new(&config.fallback)?);

    let responder = FallbackResponder::new(
        completions,
        Arc::new(NullContextSource),
        config.relay.name.clone(),
        config.relay.reply_char_budget,
        config.fallback.max_tokens,
        config.context.prompt_history_turns,
    );

    let store = ContentStore::new(config.media.content_root.clone());
    let signer = match UrlSigner::new(&config.media) {
        Ok(signer) => Some(signer),
        Err(error) => {
            warn!(%error, "media retrieval disabled");
            None
        }
    };
    let ingestor = signer
        .clone()
        .map(|signer| MediaIngestor::new(carrier.clone(), store.clone(), signer));

    let relay = Arc::new(Relay::new(
        storage.clone(),
        carrier.clone(),
        responder,
        ingestor,
        RelayOptions::from_config(&config),
    ));

    let dispatcher = Arc::new(Dispatcher::new(storage.clone(), carrier));
    let poll = Duration::from_secs(config.dispatch.poll_interval_secs);
    let dispatch_task = tokio::spawn(dispatcher.run(poll));
    info!(poll_secs = config.dispatch.poll_interval_secs, "outbound dispatcher running");

    let state = GatewayState {
        relay,
        store,
        signer,
        start_time: Instant::now(),
    };
    let result =
        courier_gateway::start_server(&config.gateway.host, config.gateway.port, state).await;

    dispatch_task.abort();
    storage.shutdown().await?;
    result
}
