use chrono::{Local, Timelike};

use fluster_core::format::{format_last_played, format_play_time, format_size, greeting};
use fluster_core::{Partitions, Server, ServerQuery, Version, VersionId};

use crate::domain::AppState;

#[derive(Debug, Clone)]
pub struct ClientCardVm {
    pub id: VersionId,
    pub name: String,
    pub size: String,
    /// On-disk footprint reported by the stats record.
    pub disk_usage: Option<String>,
    pub play_time: String,
    pub last_played: String,
    pub running: bool,
}

impl ClientCardVm {
    fn from_version(v: &Version, now: u64) -> Self {
        let (play_time, last_played) = match &v.stats {
            Some(stats) => (
                format_play_time(stats.total_play_time),
                format_last_played(stats.last_played, now),
            ),
            None => ("Never played".to_string(), "Never".to_string()),
        };
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            size: v.size.clone(),
            disk_usage: v
                .stats
                .as_ref()
                .filter(|s| s.size_bytes > 0)
                .map(|s| format_size(s.size_bytes)),
            play_time,
            last_played,
            running: v.is_running(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardVm {
    pub greeting: String,
    pub total_clients: usize,
    pub total_play_time: String,
    pub clients: Vec<ClientCardVm>,
}

/// Dashboard over installed clients. `search` narrows the cards, not the totals.
pub fn dashboard_vm(state: &AppState, search: &str, hour: u32, now: u64) -> DashboardVm {
    let installed = Partitions::of(&state.versions).installed;
    let total_seconds: u64 = installed
        .iter()
        .filter_map(|v| v.stats.as_ref())
        .map(|s| s.total_play_time)
        .sum();

    let needle = search.to_lowercase();
    let clients = installed
        .iter()
        .filter(|v| v.name.to_lowercase().contains(&needle))
        .map(|v| ClientCardVm::from_version(v, now))
        .collect();

    let greeting = if state.username.is_empty() {
        greeting(hour).to_string()
    } else {
        format!("{}, {}", greeting(hour), state.username)
    };

    DashboardVm {
        greeting,
        total_clients: installed.len(),
        total_play_time: format_play_time(total_seconds),
        clients,
    }
}

/// [`dashboard_vm`] at the local wall-clock time.
pub fn dashboard_vm_now(state: &AppState, search: &str) -> DashboardVm {
    let now = Local::now();
    let unix = u64::try_from(now.timestamp()).unwrap_or_default();
    dashboard_vm(state, search, now.hour(), unix)
}

#[derive(Debug, Clone)]
pub struct SetupVm {
    pub partitions: Partitions,
    pub is_installing: bool,
}

pub fn setup_vm(state: &AppState) -> SetupVm {
    SetupVm {
        partitions: Partitions::of(&state.versions),
        is_installing: state.is_installing(),
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryVm {
    pub listening: bool,
    pub server_count: usize,
    pub servers: Vec<Server>,
    /// Set when the filtered list is empty.
    pub empty_message: Option<&'static str>,
}

pub fn discovery_vm(state: &AppState, query: &ServerQuery) -> DiscoveryVm {
    let roster = &state.discovery.roster;
    let servers = roster.query(query);
    let empty_message = servers.is_empty().then(|| {
        if query.is_empty() {
            "Waiting for servers to be discovered..."
        } else {
            "No servers match your search"
        }
    });

    DiscoveryVm {
        listening: state.discovery.session.is_some(),
        server_count: roster.len(),
        servers,
        empty_message,
    }
}
