use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fluster_core::{Server, ServerQuery};

use crate::app_core::{AppStore, DomainEvent};
use crate::async_runtime;
use crate::domain::SessionId;
use crate::error::OperationError;
use crate::ports::{CommandGateway, EventChannel, EventStream};

/// Keeps the live server roster in sync with the backend's discovery channel.
pub struct DiscoveryRoster<G, E> {
    store: AppStore,
    gateway: Arc<G>,
    events: Arc<E>,
    channel: String,
}

/// Handle for one discovery subscription.
///
/// `stop` is idempotent and also runs on drop. Payloads that arrive for a
/// session that is no longer current are ignored by the store.
pub struct DiscoverySession {
    id: SessionId,
    store: AppStore,
    cancel: Option<CancellationToken>,
}

impl<G: CommandGateway, E: EventChannel> DiscoveryRoster<G, E> {
    pub fn new(store: AppStore, gateway: Arc<G>, events: Arc<E>) -> Self {
        Self::with_channel(store, gateway, events, fluster_config::DISCOVERY_CHANNEL)
    }

    pub fn with_channel(
        store: AppStore,
        gateway: Arc<G>,
        events: Arc<E>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            events,
            channel: channel.into(),
        }
    }

    /// Asks the backend to start listening, then opens one subscription.
    ///
    /// A failed "start listening" call is logged and the subscription is still
    /// opened; only a failed subscription fails the start.
    pub async fn start(&self) -> Result<DiscoverySession, OperationError> {
        if let Err(e) = self.gateway.start_listening().await {
            warn!("failed to start server discovery: {e}");
        }

        let stream = self
            .events
            .subscribe(&self.channel)
            .await
            .map_err(OperationError::Subscription)?;

        let id: SessionId = uuid::Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.store.apply(DomainEvent::DiscoveryStarted(id));
        if let Err(e) = async_runtime::spawn(pump(self.store.clone(), id, stream, cancel.clone())) {
            self.store.apply(DomainEvent::DiscoveryStopped(id));
            return Err(OperationError::Runtime(e.to_string()));
        }
        info!(session = %id, channel = %self.channel, "discovery started");

        Ok(DiscoverySession {
            id,
            store: self.store.clone(),
            cancel: Some(cancel),
        })
    }

    pub fn servers(&self) -> Vec<Server> {
        self.store
            .read(|s| s.discovery.roster.servers().to_vec())
    }

    pub fn get(&self, id: &str) -> Option<Server> {
        self.store.read(|s| s.discovery.roster.get(id).cloned())
    }

    pub fn query(&self, query: &ServerQuery) -> Vec<Server> {
        self.store.read(|s| s.discovery.roster.query(query))
    }
}

impl DiscoverySession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// False once stopped or once the backend closed the channel.
    pub fn is_active(&self) -> bool {
        self.cancel.is_some() && self.store.read(|s| s.discovery.session == Some(self.id))
    }

    /// Feeds one raw payload into the roster as if it came from the channel.
    pub fn ingest(&self, payload: &str) -> bool {
        ingest(&self.store, self.id, payload)
    }

    pub fn stop(&mut self) {
        let Some(cancel) = self.cancel.take() else {
            return;
        };
        cancel.cancel();
        self.store.apply(DomainEvent::DiscoveryStopped(self.id));
        info!(session = %self.id, "discovery stopped");
    }
}

impl Drop for DiscoverySession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ingest(store: &AppStore, session: SessionId, payload: &str) -> bool {
    match Server::parse(payload) {
        Ok(server) => {
            store.apply(DomainEvent::ServerSeen { session, server });
            true
        }
        Err(e) => {
            warn!("failed to parse server info: {e}");
            false
        }
    }
}

async fn pump(store: AppStore, session: SessionId, mut stream: EventStream, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.next() => match next {
                Some(payload) => {
                    ingest(&store, session, &payload);
                }
                None => {
                    debug!(session = %session, "discovery channel closed");
                    store.apply(DomainEvent::DiscoveryStopped(session));
                    break;
                }
            },
        }
    }
}
