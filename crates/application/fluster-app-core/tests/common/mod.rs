#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc;
use futures::StreamExt;

use fluster_app_core::{
    CatalogEntry, CommandGateway, EventChannel, EventStream, FragmentStore, GatewayError,
    ServerConnection,
};

#[derive(Default)]
struct GatewayInner {
    calls: Vec<(String, String)>,
    installed: HashSet<String>,
    stats: HashMap<String, String>,
    /// Remaining forced failures per command.
    failures: HashMap<String, usize>,
    /// Whether `install_client` actually leaves the client on disk.
    install_lands: bool,
    launch_accepted: bool,
    setup_done: bool,
    username: String,
    connections: Vec<ServerConnection>,
}

/// Scriptable in-memory executor that records every call.
#[derive(Clone)]
pub struct FakeGateway {
    inner: Arc<Mutex<GatewayInner>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        let inner = GatewayInner {
            install_lands: true,
            launch_accepted: true,
            setup_done: true,
            username: "builderman".into(),
            ..GatewayInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn with_installed(self, id: &str) -> Self {
        self.inner.lock().unwrap().installed.insert(id.into());
        self
    }

    pub fn with_stats(self, id: &str, json: &str) -> Self {
        self.inner.lock().unwrap().stats.insert(id.into(), json.into());
        self
    }

    pub fn with_setup_done(self, done: bool) -> Self {
        self.inner.lock().unwrap().setup_done = done;
        self
    }

    pub fn install_lands(&self, lands: bool) {
        self.inner.lock().unwrap().install_lands = lands;
    }

    pub fn launch_accepted(&self, accepted: bool) {
        self.inner.lock().unwrap().launch_accepted = accepted;
    }

    /// The next `times` calls to `command` are rejected.
    pub fn fail(&self, command: &str, times: usize) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(command.into(), times);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, command: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(c, _)| c == command)
            .map(|(_, arg)| arg)
            .collect()
    }

    pub fn connections(&self) -> Vec<ServerConnection> {
        self.inner.lock().unwrap().connections.clone()
    }

    fn record(&self, command: &str, arg: &str) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((command.into(), arg.into()));
        match inner.failures.get_mut(command) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(GatewayError::command(command, "scripted failure"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl CommandGateway for FakeGateway {
    async fn get_version_size(&self, version: &str) -> Result<String, GatewayError> {
        self.record("get_version_size", version)?;
        Ok("1.00 GB".into())
    }

    async fn get_version_stats(&self, version: &str) -> Result<String, GatewayError> {
        self.record("get_version_stats", version)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .stats
            .get(version)
            .cloned()
            .unwrap_or_else(|| r#"{"total_play_time":0,"last_played":0,"is_running":false,"size_bytes":0}"#.into()))
    }

    async fn is_version_installed(&self, version: &str) -> Result<bool, GatewayError> {
        self.record("is_version_installed", version)?;
        Ok(self.inner.lock().unwrap().installed.contains(version))
    }

    async fn install_client(&self, version: &str) -> Result<bool, GatewayError> {
        self.record("install_client", version)?;
        // Give a concurrent caller the chance to race for the install slot.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut inner = self.inner.lock().unwrap();
        if inner.install_lands {
            inner.installed.insert(version.into());
        }
        Ok(true)
    }

    async fn uninstall_client(&self, version: &str) -> Result<String, GatewayError> {
        self.record("uninstall_client", version)?;
        self.inner.lock().unwrap().installed.remove(version);
        Ok(format!("{version} removed"))
    }

    async fn launch_client(&self, version: &str) -> Result<bool, GatewayError> {
        self.record("launch_client", version)?;
        Ok(self.inner.lock().unwrap().launch_accepted)
    }

    async fn get_device_username(&self) -> Result<String, GatewayError> {
        self.record("get_device_username", "")?;
        Ok(self.inner.lock().unwrap().username.clone())
    }

    async fn is_fluster_setup(&self) -> Result<bool, GatewayError> {
        self.record("is_fluster_setup", "")?;
        Ok(self.inner.lock().unwrap().setup_done)
    }

    async fn setup_hosts_file(&self) -> Result<(), GatewayError> {
        self.record("setup_hosts_file", "")
    }

    async fn fluster_setup(&self) -> Result<(), GatewayError> {
        self.record("fluster_setup", "")
    }

    async fn launch_server_connection(&self, conn: &ServerConnection) -> Result<(), GatewayError> {
        self.record("launch_server_connection", &conn.server_id)?;
        self.inner.lock().unwrap().connections.push(conn.clone());
        Ok(())
    }

    async fn start_listening(&self) -> Result<(), GatewayError> {
        self.record("start_listening", "")
    }
}

#[derive(Default)]
struct EventsInner {
    senders: Vec<mpsc::UnboundedSender<String>>,
    channels: Vec<String>,
    fail: bool,
}

/// Event channel whose every subscription is fed by the test through [`FakeEvents::sender`].
#[derive(Clone, Default)]
pub struct FakeEvents {
    inner: Arc<Mutex<EventsInner>>,
}

impl FakeEvents {
    pub fn fail_subscriptions(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.lock().unwrap().channels.clone()
    }

    /// Sender for the `index`-th subscription.
    pub fn sender(&self, index: usize) -> mpsc::UnboundedSender<String> {
        self.inner.lock().unwrap().senders[index].clone()
    }

    /// Ends the `index`-th subscription as if the backend hung up.
    pub fn close(&self, index: usize) {
        self.inner.lock().unwrap().senders[index].close_channel();
    }

    pub fn emit(&self, index: usize, payload: &str) {
        self.sender(index).unbounded_send(payload.into()).unwrap();
    }
}

#[async_trait::async_trait]
impl EventChannel for FakeEvents {
    async fn subscribe(&self, channel: &str) -> Result<EventStream, GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            return Err(GatewayError::Transport("event bridge down".into()));
        }
        let (tx, rx) = mpsc::unbounded();
        inner.senders.push(tx);
        inner.channels.push(channel.into());
        Ok(rx.boxed())
    }
}

/// Fragment store the test keeps a handle to after handing it to the app.
#[derive(Clone, Default)]
pub struct SharedFragment(Arc<Mutex<String>>);

impl SharedFragment {
    pub fn new(initial: &str) -> Self {
        Self(Arc::new(Mutex::new(initial.into())))
    }

    pub fn get(&self) -> String {
        self.0.lock().unwrap().clone()
    }
}

impl FragmentStore for SharedFragment {
    fn fragment(&self) -> String {
        self.get()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.0.lock().unwrap() = fragment.into();
    }
}

pub fn catalog(ids: &[&str]) -> Vec<CatalogEntry> {
    ids.iter()
        .map(|id| CatalogEntry::new(*id, format!("Client {id}")))
        .collect()
}

pub fn server_json(id: &str, name: &str, version: &str, port: u16) -> String {
    format!(
        r#"{{"id":"{id}","name":"{name}","version":"{version}","host":"10.0.0.{port_low}","port":{port}}}"#,
        port_low = port % 250
    )
}

/// Polls `cond` until it holds or a second passes.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
