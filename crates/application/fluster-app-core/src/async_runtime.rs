use std::future::Future;
use std::sync::OnceLock;

use anyhow::Result;
use tokio::runtime::{Handle, Runtime};

static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();

/// Fallback runtime for hosts that poll the kernel outside tokio (UI loops, `block_on`).
fn runtime() -> Result<&'static Runtime> {
    match RUNTIME.get_or_init(|| Runtime::new().map_err(|e| e.to_string())) {
        Ok(rt) => Ok(rt),
        Err(message) => Err(anyhow::anyhow!(message.clone())),
    }
}

/// Spawns on the ambient runtime when there is one, otherwise on the crate-owned one.
pub(crate) fn spawn<F>(task: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => {
            runtime()?.spawn(task);
        }
    }
    Ok(())
}
