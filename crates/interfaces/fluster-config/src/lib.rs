//! Central configuration constants for the launcher shell.

use std::time::Duration;

/// Catalog entries offered by the current deployment, as `(id, display name)`.
pub const CATALOG: &[(&str, &str)] = &[("version-997deaae24a8", "Roblox 2008E")];

/// Event channel the backend publishes discovered servers on.
pub const DISCOVERY_CHANNEL: &str = "discovery";

/// How long an install failure notice stays visible.
pub const INSTALL_NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// How long an uninstall failure notice stays visible.
pub const UNINSTALL_NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// Default visibility for every other notice (launch, join, setup).
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(5000);

/// Executor endpoint used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:17420";

/// Capacity of the kernel's notification queue.
pub const EVENT_BUFFER: usize = 100;

/// Fallback user id when joining a server without an explicit account.
pub const DEFAULT_USER_ID: u64 = 1;

/// Convenience iterator over the configured catalog.
pub fn catalog() -> impl Iterator<Item = (&'static str, &'static str)> {
    CATALOG.iter().copied()
}
