use std::sync::Arc;

use tracing::{debug, info, warn};

use fluster_core::{Partitions, Version, VersionId, VersionStats};

use crate::app_core::{AppStore, DomainEvent};
use crate::domain::CatalogEntry;
use crate::error::OperationError;
use crate::ports::CommandGateway;

/// Owns the version collection and drives install/uninstall through the gateway.
pub struct VersionStore<G> {
    store: AppStore,
    gateway: Arc<G>,
    catalog: Vec<CatalogEntry>,
}

/// Scoped hold on the store's single install slot. Dropping it releases the slot
/// and clears the optimistic `installing` flag, on every exit path.
struct InstallSlot {
    store: AppStore,
    id: VersionId,
}

impl InstallSlot {
    fn acquire(store: &AppStore, id: &str) -> Option<Self> {
        let acquired = store.apply_if(
            |s| s.install_owner.is_none(),
            DomainEvent::InstallStarted(id.to_string()),
        );
        acquired.then(|| Self {
            store: store.clone(),
            id: id.to_string(),
        })
    }
}

impl Drop for InstallSlot {
    fn drop(&mut self) {
        self.store
            .apply(DomainEvent::InstallReleased(std::mem::take(&mut self.id)));
    }
}

impl<G: CommandGateway> VersionStore<G> {
    pub fn new(store: AppStore, gateway: Arc<G>, catalog: Vec<CatalogEntry>) -> Self {
        Self {
            store,
            gateway,
            catalog,
        }
    }

    pub fn versions(&self) -> Vec<Version> {
        self.store.read(|s| s.versions.clone())
    }

    pub fn partitions(&self) -> Partitions {
        self.store.read(|s| Partitions::of(&s.versions))
    }

    pub fn is_installing(&self) -> bool {
        self.store.read(|s| s.is_installing())
    }

    /// Refetches the whole catalog and swaps it in at once.
    ///
    /// Size and installed-state failures abort the refresh and leave the previous
    /// collection untouched; a stats failure only leaves that entry without stats.
    pub async fn refresh(&self) -> Result<(), OperationError> {
        let mut versions = Vec::with_capacity(self.catalog.len());
        for entry in &self.catalog {
            let size = self.gateway.get_version_size(&entry.id).await?;
            let installed = self.gateway.is_version_installed(&entry.id).await?;
            versions.push(Version {
                id: entry.id.clone(),
                name: entry.name.clone(),
                size,
                installed,
                installing: false,
                stats: None,
            });
        }

        for version in &mut versions {
            version.stats = self.fetch_stats(&version.id).await;
        }

        debug!(count = versions.len(), "version catalog refreshed");
        self.store.apply(DomainEvent::VersionsLoaded(versions));
        Ok(())
    }

    async fn fetch_stats(&self, id: &str) -> Option<VersionStats> {
        let json = match self.gateway.get_version_stats(id).await {
            Ok(json) => json,
            Err(e) => {
                warn!(version = id, "failed to fetch stats: {e}");
                return None;
            }
        };
        match VersionStats::parse(&json) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(version = id, "discarding stats: {e}");
                None
            }
        }
    }

    /// Installs `id`, verifies it on the backend and then refetches everything.
    ///
    /// Only one install runs at a time across the whole store; a second call while
    /// the slot is held fails with [`OperationError::InstallInProgress`].
    pub async fn install(&self, id: &str) -> Result<(), OperationError> {
        let _slot = InstallSlot::acquire(&self.store, id).ok_or(OperationError::InstallInProgress)?;
        info!(version = id, "installing client");

        self.gateway.install_client(id).await?;
        if !self.gateway.is_version_installed(id).await? {
            return Err(OperationError::NotInstalledAfterInstall { id: id.to_string() });
        }

        if let Err(e) = self.refresh().await {
            // The backend already confirmed the install; keep that much.
            warn!(version = id, "refresh after install failed: {e}");
            self.store
                .apply(DomainEvent::InstallConfirmed(id.to_string()));
        }
        info!(version = id, "client installed");
        Ok(())
    }

    /// Uninstalls `id` and flips only its `installed` flag; no refetch.
    pub async fn uninstall(&self, id: &str) -> Result<(), OperationError> {
        let status = self.gateway.uninstall_client(id).await?;
        debug!(version = id, status = %status, "uninstall finished");
        self.store.apply(DomainEvent::Uninstalled(id.to_string()));
        Ok(())
    }

    pub async fn launch(&self, id: &str) -> Result<(), OperationError> {
        if !self.gateway.launch_client(id).await? {
            return Err(OperationError::LaunchRejected { id: id.to_string() });
        }
        info!(version = id, "client launched");
        Ok(())
    }
}
