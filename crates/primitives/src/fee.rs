//! Fee estimate and resource bound types.

/// Cap for one resource dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceBound {
    /// Maximum units of the resource the transaction may consume.
    pub max_amount: u64,
    /// Maximum price paid per unit.
    pub max_price_per_unit: u128,
}

impl ResourceBound {
    /// Creates a bound.
    pub const fn new(max_amount: u64, max_price_per_unit: u128) -> Self {
        Self { max_amount, max_price_per_unit }
    }
}

/// Per-dimension caps attached to a submission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceBounds {
    /// Primary (settlement layer) gas.
    pub l1_gas: ResourceBound,
    /// Execution gas. Estimation can under-report this dimension.
    pub l2_gas: ResourceBound,
    /// Data availability gas.
    pub l1_data_gas: ResourceBound,
}

/// A fee estimate returned by the ledger for a set of calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeEstimate {
    /// Total fee the node expects the transaction to cost.
    pub overall_fee: u128,
    /// Suggested caps per resource dimension.
    pub resource_bounds: ResourceBounds,
}
