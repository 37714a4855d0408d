//! Resource bound adjustment.
//!
//! Nodes can under-report the L2 gas a transaction needs on some execution
//! paths. Submitting with such an estimate gets the transaction rejected, so
//! estimates below a floor are replaced with a fixed, larger amount before the
//! bounds are attached to a submission.

use courier_primitives::{FeeEstimate, ResourceBounds};

/// Default L2 gas floor.
pub const DEFAULT_L2_GAS_FLOOR: u64 = 100_000_000;

/// Default replacement for L2 gas amounts below the floor.
pub const DEFAULT_L2_GAS_BOOST: u64 = 500_000_000;

/// Raises under-reported L2 gas estimates.
///
/// Only the L2 gas `max_amount` is ever touched and it is never lowered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceBoundAdjuster {
    floor: u64,
    boost: u64,
}

impl Default for ResourceBoundAdjuster {
    fn default() -> Self {
        Self::new(DEFAULT_L2_GAS_FLOOR, DEFAULT_L2_GAS_BOOST)
    }
}

impl ResourceBoundAdjuster {
    /// Creates an adjuster. A `boost` not above `floor` is raised to `floor + 1`.
    ///
    /// `floor` is capped at `u64::MAX - 1` so that a larger boost always exists.
    pub const fn new(floor: u64, boost: u64) -> Self {
        let floor = if floor == u64::MAX { u64::MAX - 1 } else { floor };
        let boost = if boost > floor { boost } else { floor + 1 };
        Self { floor, boost }
    }

    /// Returns the L2 gas floor.
    pub const fn floor(&self) -> u64 {
        self.floor
    }

    /// Returns the replacement amount.
    pub const fn boost(&self) -> u64 {
        self.boost
    }

    /// Returns the bounds to submit with for `estimate`.
    pub const fn adjust(&self, estimate: &FeeEstimate) -> ResourceBounds {
        let mut bounds = estimate.resource_bounds;
        if bounds.l2_gas.max_amount < self.floor {
            bounds.l2_gas.max_amount = self.boost;
        }
        bounds
    }
}
