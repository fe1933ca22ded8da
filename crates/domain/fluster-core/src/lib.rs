pub mod error;
pub mod format;
pub mod server;
pub mod version;
pub mod view;

pub use error::PayloadError;
pub use server::{Roster, Server, ServerId, ServerQuery, Upsert};
pub use version::{Bucket, Partitions, Version, VersionId, VersionStats};
pub use view::ViewState;
