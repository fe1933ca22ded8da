use serde::Serialize;

use fluster_core::{Roster, Version, VersionId, ViewState};

/// Identity of one discovery subscription.
pub type SessionId = uuid::Uuid;

/// One entry of the client catalog the store fetches on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: VersionId,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<VersionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The catalog shipped with the current deployment.
    pub fn defaults() -> Vec<CatalogEntry> {
        fluster_config::catalog()
            .map(|(id, name)| CatalogEntry::new(id, name))
            .collect()
    }
}

/// Parameter record for `launch_server_connection`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConnection {
    pub version: VersionId,
    pub server_id: String,
    pub server_ip: String,
    pub server_port: u16,
    pub user_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryState {
    pub session: Option<SessionId>,
    pub roster: Roster,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub is_loading: bool,
    pub view: ViewState,
    pub username: String,

    pub versions: Vec<Version>,
    /// Holder of the single install slot.
    pub install_owner: Option<VersionId>,

    pub discovery: DiscoveryState,
}

impl AppState {
    pub fn is_installing(&self) -> bool {
        self.install_owner.is_some()
    }

    pub fn version(&self, id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            is_loading: true,
            view: ViewState::Welcome,
            username: String::new(),
            versions: Vec::new(),
            install_owner: None,
            discovery: DiscoveryState::default(),
        }
    }
}
