use serde::{Deserialize, Serialize};

use crate::{PayloadError, VersionId};

pub type ServerId = String;

/// A live server announced by the backend's network scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub version: VersionId,
    pub host: String,
    pub port: u16,
}

impl Server {
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(payload).map_err(PayloadError::Server)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Servers keyed by `id`, kept in first-seen order.
///
/// There is no removal path: a roster only grows or has entries replaced in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    servers: Vec<Server>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins: a server with a known `id` replaces every attribute of the old entry.
    pub fn upsert(&mut self, server: Server) -> Upsert {
        if let Some(ix) = self.servers.iter().position(|s| s.id == server.id) {
            self.servers[ix] = server;
            Upsert::Replaced
        } else {
            self.servers.push(server);
            Upsert::Inserted
        }
    }

    pub fn get(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn query(&self, query: &ServerQuery) -> Vec<Server> {
        self.servers
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect()
    }
}

/// Case-insensitive name search ANDed with an optional exact version match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
    pub search: String,
    pub version: Option<VersionId>,
}

impl ServerQuery {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<VersionId>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// True when neither filter narrows the roster.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.version_filter().is_none()
    }

    fn version_filter(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    pub fn matches(&self, server: &Server) -> bool {
        let needle = self.search.to_lowercase();
        let name_ok = server.name.to_lowercase().contains(&needle);
        let version_ok = self.version_filter().is_none_or(|v| server.version == v);
        name_ok && version_ok
    }
}
