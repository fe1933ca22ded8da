use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use fluster_infra::events::HttpEventSource;
use fluster_infra::net::{HttpInvoker, InvokeError};

use crate::domain::ServerConnection;
use crate::error::GatewayError;
use crate::ports::{CommandGateway, EventChannel, EventStream};

/// Command gateway and event channel backed by an executor reachable over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    invoker: HttpInvoker,
    events: HttpEventSource,
}

impl HttpBackend {
    pub fn connect(base_url: &str) -> anyhow::Result<Self> {
        let client =
            fluster_infra::net::default_http_client().context("Failed to build HTTP client")?;
        Ok(Self {
            invoker: HttpInvoker::new(client.clone(), base_url)?,
            events: HttpEventSource::new(client, base_url)?,
        })
    }

    async fn call<T: DeserializeOwned>(&self, command: &str, params: Value) -> Result<T, GatewayError> {
        let value = self
            .invoker
            .invoke(command, &params)
            .await
            .map_err(|e| into_gateway_error(command, e))?;
        serde_json::from_value(value)
            .map_err(|e| GatewayError::Transport(format!("unexpected {command} result: {e}")))
    }
}

fn into_gateway_error(command: &str, err: InvokeError) -> GatewayError {
    match err {
        InvokeError::Rejected { message, .. } => GatewayError::command(command, message),
        other => GatewayError::Transport(other.to_string()),
    }
}

fn version_params(version: &str) -> Value {
    json!({ "version": version })
}

#[async_trait::async_trait]
impl CommandGateway for HttpBackend {
    async fn get_version_size(&self, version: &str) -> Result<String, GatewayError> {
        self.call("get_version_size", version_params(version)).await
    }

    async fn get_version_stats(&self, version: &str) -> Result<String, GatewayError> {
        self.call("get_version_stats", version_params(version)).await
    }

    async fn is_version_installed(&self, version: &str) -> Result<bool, GatewayError> {
        self.call("is_version_installed", version_params(version)).await
    }

    async fn install_client(&self, version: &str) -> Result<bool, GatewayError> {
        self.call("install_client", version_params(version)).await
    }

    async fn uninstall_client(&self, version: &str) -> Result<String, GatewayError> {
        self.call("uninstall_client", version_params(version)).await
    }

    async fn launch_client(&self, version: &str) -> Result<bool, GatewayError> {
        self.call("launch_client", version_params(version)).await
    }

    async fn get_device_username(&self) -> Result<String, GatewayError> {
        self.call("get_device_username", json!({})).await
    }

    async fn is_fluster_setup(&self) -> Result<bool, GatewayError> {
        self.call("is_fluster_setup", json!({})).await
    }

    async fn setup_hosts_file(&self) -> Result<(), GatewayError> {
        // The executor answers with a status string that carries nothing we act on.
        self.call::<Value>("setup_hosts_file", json!({})).await.map(drop)
    }

    async fn fluster_setup(&self) -> Result<(), GatewayError> {
        self.call::<Value>("fluster_setup", json!({})).await.map(drop)
    }

    async fn launch_server_connection(&self, conn: &ServerConnection) -> Result<(), GatewayError> {
        let params = serde_json::to_value(conn)
            .map_err(|e| GatewayError::Transport(format!("failed to encode parameters: {e}")))?;
        self.call::<Value>("launch_server_connection", params)
            .await
            .map(drop)
    }

    async fn start_listening(&self) -> Result<(), GatewayError> {
        self.call::<Value>("start_listening", json!({})).await.map(drop)
    }
}

#[async_trait::async_trait]
impl EventChannel for HttpBackend {
    async fn subscribe(&self, channel: &str) -> Result<EventStream, GatewayError> {
        self.events
            .subscribe(channel)
            .await
            .map_err(|e| into_gateway_error("subscribe", e))
    }
}
