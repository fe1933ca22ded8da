use std::fmt;
use std::str::FromStr;

use crate::PayloadError;

/// Which screen of the shell is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    #[default]
    Welcome,
    Setup,
    Dashboard,
    Discovery,
}

impl ViewState {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewState::Welcome => "welcome",
            ViewState::Setup => "setup",
            ViewState::Dashboard => "dashboard",
            ViewState::Discovery => "discovery",
        }
    }

    /// Only dashboard and discovery survive in navigation history.
    pub fn is_deep_linkable(self) -> bool {
        matches!(self, ViewState::Dashboard | ViewState::Discovery)
    }

    /// The fragment written when this view becomes active; empty for views that clear it.
    pub fn fragment(self) -> &'static str {
        if self.is_deep_linkable() {
            self.as_str()
        } else {
            ""
        }
    }

    /// Parses a URL fragment (with or without the leading `#`). Only deep-linkable views match.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        match fragment.strip_prefix('#').unwrap_or(fragment) {
            "dashboard" => Some(ViewState::Dashboard),
            "discovery" => Some(ViewState::Discovery),
            _ => None,
        }
    }

    /// View to open at startup once setup is known to be complete.
    pub fn restore(fragment: &str) -> Self {
        Self::from_fragment(fragment).unwrap_or(ViewState::Dashboard)
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewState {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "welcome" => Ok(ViewState::Welcome),
            "setup" => Ok(ViewState::Setup),
            "dashboard" => Ok(ViewState::Dashboard),
            "discovery" => Ok(ViewState::Discovery),
            other => Err(PayloadError::UnknownView(other.to_string())),
        }
    }
}
