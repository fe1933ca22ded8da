use std::sync::Arc;

use tracing::{error, info};

use fluster_core::ViewState;

use crate::app_core::{AppStore, DomainEvent};
use crate::error::OperationError;
use crate::ports::{CommandGateway, FragmentStore};

/// Tracks the active screen and mirrors it into the navigation fragment.
pub struct ViewNavigator<G, F> {
    store: AppStore,
    gateway: Arc<G>,
    fragments: Arc<F>,
}

impl<G: CommandGateway, F: FragmentStore> ViewNavigator<G, F> {
    pub fn new(store: AppStore, gateway: Arc<G>, fragments: Arc<F>) -> Self {
        Self {
            store,
            gateway,
            fragments,
        }
    }

    pub fn current(&self) -> ViewState {
        self.store.read(|s| s.view)
    }

    /// Resolves the startup view from the backend's setup status and the stored fragment.
    pub async fn init(&self) -> ViewState {
        match self.gateway.is_fluster_setup().await {
            Ok(true) => {
                let view = ViewState::restore(&self.fragments.fragment());
                self.store.apply(DomainEvent::ViewChanged(view));
            }
            Ok(false) => self.store.apply(DomainEvent::ViewChanged(ViewState::Welcome)),
            Err(e) => error!("failed to check setup status: {e}"),
        }
        self.current()
    }

    pub fn navigate_to(&self, view: ViewState) {
        self.fragments.set_fragment(view.fragment());
        self.store.apply(DomainEvent::ViewChanged(view));
    }

    /// Reflects an external fragment change. Values other than dashboard/discovery are ignored.
    pub fn on_fragment_changed(&self, fragment: &str) -> Option<ViewState> {
        let view = ViewState::from_fragment(fragment)?;
        self.store.apply(DomainEvent::ViewChanged(view));
        Some(view)
    }

    /// Runs hosts-file setup then the main setup routine; enters `setup` only if both succeed.
    pub async fn start_setup(&self) -> Result<(), OperationError> {
        self.gateway.setup_hosts_file().await?;
        self.gateway.fluster_setup().await?;
        info!("setup finished");
        self.navigate_to(ViewState::Setup);
        Ok(())
    }
}
