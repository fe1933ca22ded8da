use serde::{Deserialize, Serialize};

use crate::PayloadError;

pub type VersionId = String;

/// Play statistics the backend keeps per installed client.
///
/// The executor encodes these as a JSON string; [`VersionStats::parse`] is the
/// only way they enter the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStats {
    /// Accumulated play time in seconds.
    #[serde(alias = "totalPlayTime")]
    pub total_play_time: u64,
    /// Unix seconds of the last launch, `0` when never played.
    #[serde(alias = "lastPlayed")]
    pub last_played: u64,
    #[serde(alias = "isRunning")]
    pub is_running: bool,
    #[serde(default, alias = "startTime")]
    pub start_time: Option<u64>,
    #[serde(default, alias = "sizeBytes")]
    pub size_bytes: u64,
}

impl VersionStats {
    pub fn parse(json: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(json).map_err(PayloadError::Stats)
    }

    pub fn never_played(&self) -> bool {
        self.last_played == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub name: String,
    pub size: String,
    pub installed: bool,
    pub installing: bool,
    pub stats: Option<VersionStats>,
}

/// The single partition a version belongs to. `installing` dominates `installed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Available,
    Installing,
    Installed,
}

impl Version {
    pub fn bucket(&self) -> Bucket {
        if self.installing {
            Bucket::Installing
        } else if self.installed {
            Bucket::Installed
        } else {
            Bucket::Available
        }
    }

    pub fn is_running(&self) -> bool {
        self.stats.as_ref().is_some_and(|s| s.is_running)
    }
}

/// Read-only split of a version collection into available / installing / installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    pub available: Vec<Version>,
    pub installing: Vec<Version>,
    pub installed: Vec<Version>,
}

impl Partitions {
    pub fn of(versions: &[Version]) -> Self {
        let mut out = Self::default();
        for v in versions {
            match v.bucket() {
                Bucket::Available => out.available.push(v.clone()),
                Bucket::Installing => out.installing.push(v.clone()),
                Bucket::Installed => out.installed.push(v.clone()),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.available.len() + self.installing.len() + self.installed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of partitions that contain `id`.
    pub fn occurrences(&self, id: &str) -> usize {
        [&self.available, &self.installing, &self.installed]
            .into_iter()
            .filter(|bucket| bucket.iter().any(|v| v.id == id))
            .count()
    }
}
