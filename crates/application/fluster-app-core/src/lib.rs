pub mod app;
pub mod app_core;
mod async_runtime;
pub mod backend;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod navigator;
pub mod notifications;
pub mod persistence;
pub mod ports;
pub mod versions;
pub mod viewmodel;

pub use app::FlusterApp;
pub use app_core::*;
pub use discovery::{DiscoveryRoster, DiscoverySession};
pub use domain::{AppState, CatalogEntry, ServerConnection, SessionId};
pub use error::{GatewayError, OperationError};
pub use navigator::ViewNavigator;
pub use notifications::{ChannelNotifier, Notification};
pub use ports::*;
pub use versions::VersionStore;
pub use viewmodel::*;
