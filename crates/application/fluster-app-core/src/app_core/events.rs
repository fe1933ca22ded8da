use fluster_core::{Server, Version, VersionId, ViewState};

use crate::domain::SessionId;

#[derive(Debug, Clone)]
pub enum DomainEvent {
    // Boot
    LoadingStarted,
    LoadingFinished,
    UsernameLoaded(String),

    // Versions
    VersionsLoaded(Vec<Version>),
    InstallStarted(VersionId),
    InstallConfirmed(VersionId),
    InstallReleased(VersionId),
    Uninstalled(VersionId),

    // Discovery
    DiscoveryStarted(SessionId),
    ServerSeen { session: SessionId, server: Server },
    DiscoveryStopped(SessionId),

    // Navigation
    ViewChanged(ViewState),
}
