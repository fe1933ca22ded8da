pub mod commands;

use std::path::PathBuf;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub backend: String,
    /// How many times a failed command is re-run through its notification's retry.
    pub retries: u32,
    /// Overrides the fragment file under the user's config dir.
    pub fragment_path: Option<PathBuf>,
}

impl CliContext {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            retries: 0,
            fragment_path: None,
        }
    }
}
