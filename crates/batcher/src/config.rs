//! Queue configuration.

use std::time::Duration;

use crate::CategoryLimits;

/// Batching scheduler configuration.
#[derive(Clone, Debug)]
pub struct QueueConfig {
    // Scheduling
    /// Debounce window before a processing pass starts (default: 0, process
    /// immediately).
    pub batch_delay: Duration,
    /// Hard cap on the number of calls merged into one transaction, and the
    /// queue length that triggers processing without waiting (default: 2).
    pub max_batch_size: usize,

    // Classification
    /// Per-category merge limits (default: HIGH 6, MEDIUM 5, LOW 10).
    pub limits: CategoryLimits,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { batch_delay: Duration::ZERO, max_batch_size: 2, limits: CategoryLimits::default() }
    }
}

impl QueueConfig {
    /// Creates a new builder for configuring a queue.
    pub fn builder() -> QueueConfigBuilder {
        QueueConfigBuilder::default()
    }

    /// Returns the effective merge cap for a chunk whose tightest category
    /// limit is `category_limit`. Never below one.
    pub fn chunk_cap(&self, category_limit: usize) -> usize {
        self.max_batch_size.min(category_limit).max(1)
    }
}

/// Builder for [`QueueConfig`].
#[derive(Clone, Debug)]
pub struct QueueConfigBuilder {
    batch_delay: Duration,
    max_batch_size: usize,
    limits: CategoryLimits,
}

impl Default for QueueConfigBuilder {
    fn default() -> Self {
        let defaults = QueueConfig::default();
        Self {
            batch_delay: defaults.batch_delay,
            max_batch_size: defaults.max_batch_size,
            limits: defaults.limits,
        }
    }
}

impl QueueConfigBuilder {
    /// Sets the debounce window.
    pub const fn batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Sets the hard cap on merged calls.
    pub const fn max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Sets the per-category merge limits.
    pub const fn limits(mut self, limits: CategoryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds the [`QueueConfig`].
    pub const fn build(self) -> QueueConfig {
        QueueConfig {
            batch_delay: self.batch_delay,
            max_batch_size: self.max_batch_size,
            limits: self.limits,
        }
    }
}
