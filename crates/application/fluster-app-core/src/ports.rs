use futures::stream::BoxStream;

use crate::domain::ServerConnection;
use crate::error::GatewayError;
use crate::notifications::Notification;

/// Lazy, unbounded sequence of raw payloads from one event channel.
pub type EventStream = BoxStream<'static, String>;

/// Request/response bridge to the privileged executor. One method per backend command.
#[async_trait::async_trait]
pub trait CommandGateway: Send + Sync + 'static {
    async fn get_version_size(&self, version: &str) -> Result<String, GatewayError>;
    /// JSON-encoded stats record.
    async fn get_version_stats(&self, version: &str) -> Result<String, GatewayError>;
    async fn is_version_installed(&self, version: &str) -> Result<bool, GatewayError>;
    async fn install_client(&self, version: &str) -> Result<bool, GatewayError>;
    async fn uninstall_client(&self, version: &str) -> Result<String, GatewayError>;
    async fn launch_client(&self, version: &str) -> Result<bool, GatewayError>;
    async fn get_device_username(&self) -> Result<String, GatewayError>;
    async fn is_fluster_setup(&self) -> Result<bool, GatewayError>;
    async fn setup_hosts_file(&self) -> Result<(), GatewayError>;
    async fn fluster_setup(&self) -> Result<(), GatewayError>;
    async fn launch_server_connection(&self, conn: &ServerConnection) -> Result<(), GatewayError>;
    async fn start_listening(&self) -> Result<(), GatewayError>;
}

#[async_trait::async_trait]
pub trait EventChannel: Send + Sync + 'static {
    async fn subscribe(&self, channel: &str) -> Result<EventStream, GatewayError>;
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Where the navigation fragment lives (address bar, file, memory).
pub trait FragmentStore: Send + Sync + 'static {
    fn fragment(&self) -> String;
    fn set_fragment(&self, fragment: &str);
}
