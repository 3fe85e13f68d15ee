//! Engine configuration.
//!
//! Plain values with defaults; the library reads no files or environment.

use std::time::Duration;

/// Per-class request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Timeouts {
    /// GET and GETNEXT.
    pub read: Duration,
    /// GETBULK. Larger responses take the agent longer to assemble.
    pub bulk: Duration,
    /// SET. Switches may commit configuration before answering.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(2),
            bulk: Duration::from_secs(6),
            write: Duration::from_secs(10),
        }
    }
}

impl Timeouts {
    pub fn for_class(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Read => self.read,
            OperationClass::Bulk => self.bulk,
            OperationClass::Write => self.write,
        }
    }
}

/// Which timeout a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationClass {
    Read,
    Bulk,
    Write,
}

impl OperationClass {
    /// Session intent: only writes use the write community.
    pub fn intent(self) -> crate::profile::Intent {
        match self {
            OperationClass::Read | OperationClass::Bulk => crate::profile::Intent::Read,
            OperationClass::Write => crate::profile::Intent::Write,
        }
    }
}

/// Settings shared by every session a [`Southbound`](crate::Southbound) opens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub timeouts: Timeouts,
    /// Resends after a timeout, per request.
    pub retries: u32,
    /// max-repetitions for GETBULK walks.
    pub max_repetitions: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            retries: 2,
            max_repetitions: 5,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Clamped to at least 1.
    pub fn max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions.max(1);
        self
    }
}
