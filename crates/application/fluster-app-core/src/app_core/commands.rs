use fluster_core::{ServerId, VersionId, ViewState};

/// A user intent. Failed commands are handed back verbatim as their own retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    // Versions
    Refresh,
    Install(VersionId),
    Uninstall(VersionId),
    Launch(VersionId),

    // Discovery
    StartDiscovery,
    StopDiscovery,
    JoinServer { server_id: ServerId, user_id: u64 },

    // Navigation
    StartSetup,
    Navigate(ViewState),
}

impl AppCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AppCommand::Refresh => "refresh",
            AppCommand::Install(_) => "install",
            AppCommand::Uninstall(_) => "uninstall",
            AppCommand::Launch(_) => "launch",
            AppCommand::StartDiscovery => "start_discovery",
            AppCommand::StopDiscovery => "stop_discovery",
            AppCommand::JoinServer { .. } => "join_server",
            AppCommand::StartSetup => "start_setup",
            AppCommand::Navigate(_) => "navigate",
        }
    }
}
