use tracing::debug;

use crate::domain::{AppState, DiscoveryState};

use super::events::DomainEvent;

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::LoadingStarted => state.is_loading = true,
        DomainEvent::LoadingFinished => state.is_loading = false,
        DomainEvent::UsernameLoaded(name) => state.username = name,

        DomainEvent::VersionsLoaded(mut versions) => {
            // A refresh landing mid-install must not hide the in-flight install.
            if let Some(owner) = state.install_owner.as_deref() {
                for v in versions.iter_mut().filter(|v| v.id == owner) {
                    v.installing = true;
                }
            }
            state.versions = versions;
        }

        DomainEvent::InstallStarted(id) => {
            state.install_owner = Some(id.clone());
            set_flags(&mut state, &id, |v| v.installing = true);
        }

        DomainEvent::InstallConfirmed(id) => {
            set_flags(&mut state, &id, |v| v.installed = true);
        }

        DomainEvent::InstallReleased(id) => {
            if state.install_owner.as_deref() == Some(id.as_str()) {
                state.install_owner = None;
            }
            set_flags(&mut state, &id, |v| v.installing = false);
        }

        DomainEvent::Uninstalled(id) => {
            set_flags(&mut state, &id, |v| v.installed = false);
        }

        DomainEvent::DiscoveryStarted(session) => {
            state.discovery = DiscoveryState {
                session: Some(session),
                ..DiscoveryState::default()
            };
        }

        DomainEvent::ServerSeen { session, server } => {
            if state.discovery.session == Some(session) {
                let id = server.id.clone();
                let outcome = state.discovery.roster.upsert(server);
                debug!(server = %id, ?outcome, "merged discovery event");
            } else {
                debug!(server = %server.id, "dropping event from inactive discovery session");
            }
        }

        DomainEvent::DiscoveryStopped(session) => {
            if state.discovery.session == Some(session) {
                state.discovery.session = None;
            }
        }

        DomainEvent::ViewChanged(view) => state.view = view,
    }
    state
}

fn set_flags(state: &mut AppState, id: &str, f: impl FnOnce(&mut fluster_core::Version)) {
    if let Some(v) = state.versions.iter_mut().find(|v| v.id == id) {
        f(v);
    }
}
