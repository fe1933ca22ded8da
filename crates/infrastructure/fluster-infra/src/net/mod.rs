use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{command} rejected: {message}")]
    Rejected { command: String, message: String },
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("malformed {command} response: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared client. No overall request timeout, since `install_client` and event
/// streams legitimately stay open for a long time.
pub fn default_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(concat!("fluster/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Parses `base_url` and forces a trailing slash so relative joins keep its path.
pub(crate) fn parse_base(base_url: &str) -> Result<Url, InvokeError> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| InvokeError::Endpoint(format!("{base_url}: {e}")))
}

pub(crate) fn endpoint(base: &Url, kind: &str, name: &str) -> Result<Url, InvokeError> {
    if name.is_empty() || name.contains(['/', '?', '#']) {
        return Err(InvokeError::Endpoint(format!("bad {kind} name {name:?}")));
    }
    base.join(&format!("{kind}/{name}"))
        .map_err(|e| InvokeError::Endpoint(e.to_string()))
}

/// Invokes named commands on the executor: `POST {base}/invoke/{command}`.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: Client,
    base: Url,
}

impl HttpInvoker {
    pub fn new(client: Client, base_url: &str) -> Result<Self, InvokeError> {
        Ok(Self {
            client,
            base: parse_base(base_url)?,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Non-2xx answers become [`InvokeError::Rejected`] carrying the body text.
    /// An empty 2xx body decodes to `Value::Null`.
    pub async fn invoke(&self, command: &str, params: &Value) -> Result<Value, InvokeError> {
        let url = endpoint(&self.base, "invoke", command)?;
        debug!("invoke {}", command);

        let resp = self.client.post(url).json(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(InvokeError::Rejected {
                command: command.to_string(),
                message: rejection_message(status, body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|source| InvokeError::Decode {
            command: command.to_string(),
            source,
        })
    }
}

fn rejection_message(status: StatusCode, body: String) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
