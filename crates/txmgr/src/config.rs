//! Transaction manager configuration.

use std::time::Duration;

use courier_primitives::Address;

use crate::bounds::{DEFAULT_L2_GAS_BOOST, DEFAULT_L2_GAS_FLOOR};

/// Transaction manager configuration.
#[derive(Clone, Debug)]
pub struct TxManagerConfig {
    // Confirmation
    /// How long a caller waits for a receipt before getting a pending result (default: 10s).
    /// Zero waits for the receipt with no timeout.
    pub confirmation_timeout: Duration,
    /// Receipt polling interval handed to the ledger client (default: 500ms).
    pub receipt_retry_interval: Duration,

    // Submission
    /// Contract namespace calls are routed through (default: `s1_eternum`).
    pub namespace: String,
    /// Transaction version (default: 3).
    pub tx_version: u8,
    /// Estimate fees and send explicit resource bounds (default: true).
    pub estimate_fees: bool,

    // Resource bounds
    /// L2 gas amounts below this are considered under-reported.
    pub l2_gas_floor: u64,
    /// Replacement L2 gas amount for under-reported estimates.
    pub l2_gas_boost: u64,

    // Randomness
    /// Randomness provider contract, if the deployment has one.
    pub randomness_provider: Option<Address>,
}

impl Default for TxManagerConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(10),
            receipt_retry_interval: Duration::from_millis(500),
            namespace: "s1_eternum".to_string(),
            tx_version: 3,
            estimate_fees: true,
            l2_gas_floor: DEFAULT_L2_GAS_FLOOR,
            l2_gas_boost: DEFAULT_L2_GAS_BOOST,
            randomness_provider: None,
        }
    }
}

impl TxManagerConfig {
    /// Creates a new builder for configuring a transaction manager.
    pub fn builder() -> TxManagerConfigBuilder {
        TxManagerConfigBuilder::default()
    }

    /// Returns `true` when callers should wait for receipts without a timeout.
    pub const fn waits_indefinitely(&self) -> bool {
        self.confirmation_timeout.is_zero()
    }
}

/// Builder for [`TxManagerConfig`].
#[derive(Clone, Debug, Default)]
pub struct TxManagerConfigBuilder {
    config: TxManagerConfig,
}

impl TxManagerConfigBuilder {
    /// Sets the confirmation timeout.
    pub const fn confirmation_timeout(mut self, confirmation_timeout: Duration) -> Self {
        self.config.confirmation_timeout = confirmation_timeout;
        self
    }

    /// Sets the receipt polling interval.
    pub const fn receipt_retry_interval(mut self, receipt_retry_interval: Duration) -> Self {
        self.config.receipt_retry_interval = receipt_retry_interval;
        self
    }

    /// Sets the contract namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Sets the transaction version.
    pub const fn tx_version(mut self, tx_version: u8) -> Self {
        self.config.tx_version = tx_version;
        self
    }

    /// Enables or disables fee estimation before submission.
    pub const fn estimate_fees(mut self, estimate_fees: bool) -> Self {
        self.config.estimate_fees = estimate_fees;
        self
    }

    /// Sets the L2 gas floor.
    pub const fn l2_gas_floor(mut self, l2_gas_floor: u64) -> Self {
        self.config.l2_gas_floor = l2_gas_floor;
        self
    }

    /// Sets the replacement L2 gas amount.
    pub const fn l2_gas_boost(mut self, l2_gas_boost: u64) -> Self {
        self.config.l2_gas_boost = l2_gas_boost;
        self
    }

    /// Sets the randomness provider contract.
    pub const fn randomness_provider(mut self, randomness_provider: Option<Address>) -> Self {
        self.config.randomness_provider = randomness_provider;
        self
    }

    /// Builds the [`TxManagerConfig`].
    pub fn build(self) -> TxManagerConfig {
        self.config
    }
}
