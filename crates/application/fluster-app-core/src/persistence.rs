use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use crate::ports::FragmentStore;

const QUALIFIER: &str = "is";
const ORG: &str = "fluster";
const APP: &str = "launcher";

/// Navigation fragment kept in a small file under the user's config dir.
pub struct FileFragmentStore {
    path: PathBuf,
}

impl FileFragmentStore {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }
        Ok(Self::at(config_dir.join("fragment")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FragmentStore for FileFragmentStore {
    fn fragment(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim().to_string(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                warn!("Failed to read fragment {}: {e}", self.path.display());
                String::new()
            }
        }
    }

    fn set_fragment(&self, fragment: &str) {
        if let Err(e) = atomic_write(&self.path, fragment.as_bytes()) {
            warn!("Failed to persist fragment: {e:#}");
        }
    }
}

/// In-process fragment, for embedding hosts and tests.
#[derive(Default)]
pub struct MemoryFragmentStore {
    fragment: Mutex<String>,
}

impl MemoryFragmentStore {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            fragment: Mutex::new(initial.into()),
        }
    }
}

impl FragmentStore for MemoryFragmentStore {
    fn fragment(&self) -> String {
        self.fragment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.fragment.lock().unwrap_or_else(PoisonError::into_inner) = fragment.to_string();
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = {
        let mut name = path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    };

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file {}", tmp_path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write temp file {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {}", tmp_path.display()))?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path)
                .with_context(|| format!("Failed to replace destination file {}", path.display()))
        }
        Err(e) => Err(e).with_context(|| {
            format!(
                "Failed to rename temp file {} to {}",
                tmp_path.display(),
                path.display()
            )
        }),
    }
}
