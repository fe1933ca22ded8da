use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use fluster_config::{DEFAULT_NOTICE_DURATION, INSTALL_NOTICE_DURATION, UNINSTALL_NOTICE_DURATION};

use crate::app_core::AppCommand;
use crate::error::OperationError;
use crate::ports::Notifier;

/// A user-visible notice. `retry` re-runs the exact command that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub duration: Duration,
    pub retry: Option<AppCommand>,
}

impl Notification {
    pub fn failure(cmd: &AppCommand, err: &OperationError) -> Self {
        let (title, duration, retryable) = match cmd {
            AppCommand::Install(id) => (
                format!("Something went wrong while installing {id}"),
                INSTALL_NOTICE_DURATION,
                true,
            ),
            AppCommand::Uninstall(id) => (
                format!("Something went wrong while uninstalling {id}"),
                UNINSTALL_NOTICE_DURATION,
                true,
            ),
            AppCommand::Launch(_) => ("An error occurred".to_string(), DEFAULT_NOTICE_DURATION, true),
            AppCommand::JoinServer { server_id, .. } => (
                format!("Failed to join server {server_id}"),
                DEFAULT_NOTICE_DURATION,
                true,
            ),
            AppCommand::StartSetup => ("Failed to setup".to_string(), DEFAULT_NOTICE_DURATION, true),
            AppCommand::StartDiscovery => (
                "Failed to start server discovery".to_string(),
                DEFAULT_NOTICE_DURATION,
                true,
            ),
            AppCommand::Refresh => (
                "Failed to refresh versions.".to_string(),
                DEFAULT_NOTICE_DURATION,
                false,
            ),
            AppCommand::StopDiscovery | AppCommand::Navigate(_) => (
                format!("{} failed", cmd.name()),
                DEFAULT_NOTICE_DURATION,
                false,
            ),
        };

        Self {
            title,
            description: err.to_string(),
            duration,
            retry: retryable.then(|| cmd.clone()),
        }
    }
}

/// Queues notifications for whoever renders them.
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.try_send(notification) {
            warn!("dropping notification: {e}");
        }
    }
}
