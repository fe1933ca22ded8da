use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, warn};

use fluster_core::ViewState;

use crate::app_core::{AppCommand, AppStore, DomainEvent};
use crate::discovery::{DiscoveryRoster, DiscoverySession};
use crate::domain::{AppState, CatalogEntry, ServerConnection};
use crate::error::OperationError;
use crate::navigator::ViewNavigator;
use crate::notifications::Notification;
use crate::ports::{CommandGateway, EventChannel, FragmentStore, Notifier};
use crate::versions::VersionStore;

/// Wires the stores to the injected backend and turns failed commands into
/// notifications that carry their own retry.
pub struct FlusterApp<G, E, F, N> {
    pub store: AppStore,
    gateway: Arc<G>,
    versions: VersionStore<G>,
    discovery: DiscoveryRoster<G, E>,
    navigator: ViewNavigator<G, F>,
    notifier: Arc<N>,
    session: Mutex<Option<DiscoverySession>>,
}

impl<G, E, F, N> FlusterApp<G, E, F, N>
where
    G: CommandGateway,
    E: EventChannel,
    F: FragmentStore,
    N: Notifier,
{
    pub fn new(gateway: G, events: E, fragments: F, notifier: N) -> Self {
        Self::with_catalog(gateway, events, fragments, notifier, CatalogEntry::defaults())
    }

    pub fn with_catalog(
        gateway: G,
        events: E,
        fragments: F,
        notifier: N,
        catalog: Vec<CatalogEntry>,
    ) -> Self {
        let store = AppStore::new(AppState::default());
        let gateway = Arc::new(gateway);
        Self {
            versions: VersionStore::new(store.clone(), gateway.clone(), catalog),
            discovery: DiscoveryRoster::new(store.clone(), gateway.clone(), Arc::new(events)),
            navigator: ViewNavigator::new(store.clone(), gateway.clone(), Arc::new(fragments)),
            notifier: Arc::new(notifier),
            session: Mutex::new(None),
            gateway,
            store,
        }
    }

    pub fn versions(&self) -> &VersionStore<G> {
        &self.versions
    }

    pub fn discovery(&self) -> &DiscoveryRoster<G, E> {
        &self.discovery
    }

    pub fn navigator(&self) -> &ViewNavigator<G, F> {
        &self.navigator
    }

    pub fn state(&self) -> AppState {
        self.store.state()
    }

    /// Initial load: catalog, device username, then the startup view.
    pub async fn load_initial_state(&self) {
        self.store.apply(DomainEvent::LoadingStarted);

        if let Err(e) = self.versions.refresh().await {
            error!("Failed to refresh versions: {e}");
            self.notifier
                .notify(Notification::failure(&AppCommand::Refresh, &e));
        }

        match self.gateway.get_device_username().await {
            Ok(name) => self.store.apply(DomainEvent::UsernameLoaded(name)),
            Err(e) => warn!("Failed to load device username: {e}"),
        }

        self.navigator.init().await;
        self.store.apply(DomainEvent::LoadingFinished);
    }

    /// Runs one command. On failure a notification bound to the same command is published.
    pub async fn dispatch(&self, cmd: AppCommand) -> Result<(), OperationError> {
        debug!(command = cmd.name(), "dispatching command");
        let result = self.run(&cmd).await;
        if let Err(e) = &result {
            error!(command = cmd.name(), "command failed: {e}");
            self.notifier.notify(Notification::failure(&cmd, e));
        }
        result
    }

    /// Re-runs whatever a notification's retry action is bound to.
    pub async fn retry(&self, notification: &Notification) -> Option<Result<(), OperationError>> {
        let cmd = notification.retry.clone()?;
        Some(self.dispatch(cmd).await)
    }

    async fn run(&self, cmd: &AppCommand) -> Result<(), OperationError> {
        match cmd {
            AppCommand::Refresh => self.versions.refresh().await,
            AppCommand::Install(id) => self.versions.install(id).await,
            AppCommand::Uninstall(id) => self.versions.uninstall(id).await,
            AppCommand::Launch(id) => self.versions.launch(id).await,

            AppCommand::StartDiscovery => {
                // Replacing an old session closes it first so only one subscription is live.
                self.stop_discovery();
                let session = self.discovery.start().await?;
                *self.session_slot() = Some(session);
                Ok(())
            }
            AppCommand::StopDiscovery => {
                self.stop_discovery();
                Ok(())
            }
            AppCommand::JoinServer { server_id, user_id } => {
                let server = self
                    .discovery
                    .get(server_id)
                    .ok_or_else(|| OperationError::UnknownServer {
                        id: server_id.clone(),
                    })?;
                let conn = ServerConnection {
                    version: server.version.clone(),
                    server_id: server.id.clone(),
                    server_ip: server.host.clone(),
                    server_port: server.port,
                    user_id: *user_id,
                };
                self.gateway.launch_server_connection(&conn).await?;
                Ok(())
            }

            AppCommand::StartSetup => self.navigator.start_setup().await,
            AppCommand::Navigate(view) => {
                self.navigate(*view);
                Ok(())
            }
        }
    }

    pub fn navigate(&self, view: ViewState) {
        self.navigator.navigate_to(view);
    }

    pub fn discovery_active(&self) -> bool {
        self.session_slot().as_ref().is_some_and(|s| s.is_active())
    }

    fn stop_discovery(&self) {
        if let Some(mut session) = self.session_slot().take() {
            session.stop();
        }
    }

    fn session_slot(&self) -> std::sync::MutexGuard<'_, Option<DiscoverySession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
