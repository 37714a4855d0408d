//! JSON ledger scripts.

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{Behavior, InMemoryLedger, LocalError};

/// Scripted ledger behaviour loaded from JSON.
///
/// ```json
/// {
///   "latency_ms": 250,
///   "revert_every": 3,
///   "behaviors": ["confirm", { "revert": "not enough stamina" }, { "reject": "nonce" }]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerScript {
    /// Receipt latency in milliseconds.
    pub latency_ms: u64,
    /// L2 gas amount returned by fee estimates.
    pub l2_gas_estimate: Option<u64>,
    /// Revert every `n`th unscripted submission. Zero disables.
    pub revert_every: u64,
    /// Behaviours of the first submissions, in order.
    pub behaviors: Vec<Behavior>,
}

impl LedgerScript {
    /// Parses a script.
    ///
    /// # Errors
    ///
    /// Returns [`LocalError::Json`] for malformed scripts.
    pub fn from_json(json: &str) -> Result<Self, LocalError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a script from disk.
    ///
    /// # Errors
    ///
    /// Returns [`LocalError::NotFound`] if `path` does not exist, and
    /// [`LocalError::Io`] or [`LocalError::Json`] if it cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LocalError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LocalError::NotFound(path.display().to_string()));
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Builds a ledger that follows this script.
    pub fn into_ledger(self) -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new()
            .with_latency(Duration::from_millis(self.latency_ms))
            .with_revert_every(self.revert_every);
        if let Some(amount) = self.l2_gas_estimate {
            ledger = ledger.with_l2_gas_estimate(amount);
        }
        for behavior in self.behaviors {
            ledger.push_behavior(behavior);
        }
        ledger
    }
}
