use fluster_core::VersionId;

/// Failure of a call across the command gateway or event channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The call never produced an answer (connection, encoding, executor unreachable).
    #[error("transport error: {0}")]
    Transport(String),
    /// The executor answered with a rejection.
    #[error("{command} failed: {message}")]
    Command { command: String, message: String },
}

impl GatewayError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Why a user-initiated operation did not complete.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("installation of {id} completed but the client was not found")]
    NotInstalledAfterInstall { id: VersionId },
    #[error("the backend refused to launch {id}")]
    LaunchRejected { id: VersionId },
    #[error("another installation is already in progress")]
    InstallInProgress,
    #[error("server {id} is not in the discovery roster")]
    UnknownServer { id: String },
    #[error("could not subscribe to discovery events: {0}")]
    Subscription(GatewayError),
    #[error("no async runtime available: {0}")]
    Runtime(String),
}

impl OperationError {
    /// A call that succeeded at transport level but contradicted the expected outcome.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            OperationError::NotInstalledAfterInstall { .. } | OperationError::LaunchRejected { .. }
        )
    }
}
