pub mod events;
pub mod net;

// Re-exports for convenience
pub use events::HttpEventSource;
pub use net::{default_http_client, HttpInvoker, InvokeError};
