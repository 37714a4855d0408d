//! Contract call descriptors.

use alloy_primitives::U256;

use crate::{Address, TransactionKind};

/// One invocation of a contract entrypoint.
///
/// A transaction is one or more descriptors executed atomically by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallDescriptor {
    /// Target contract.
    pub contract_address: Address,
    /// Entrypoint (selector name) to invoke.
    pub entrypoint: String,
    /// Serialized arguments.
    pub calldata: Vec<U256>,
}

impl CallDescriptor {
    /// Creates a call with no arguments.
    pub fn new(contract_address: Address, entrypoint: impl Into<String>) -> Self {
        Self { contract_address, entrypoint: entrypoint.into(), calldata: Vec::new() }
    }

    /// Replaces the argument list.
    #[must_use]
    pub fn with_calldata(mut self, calldata: impl IntoIterator<Item = U256>) -> Self {
        self.calldata = calldata.into_iter().collect();
        self
    }

    /// Appends one argument.
    #[must_use]
    pub fn with_arg(mut self, arg: U256) -> Self {
        self.calldata.push(arg);
        self
    }

    /// Returns the transaction kind named by this call's entrypoint, if any.
    pub fn kind(&self) -> Option<TransactionKind> {
        TransactionKind::from_entrypoint(&self.entrypoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::felt_from_u64;

    #[test]
    fn builder_appends_arguments_in_order() {
        let call = CallDescriptor::new(felt_from_u64(7), "explorer_move")
            .with_arg(U256::from(1))
            .with_arg(U256::from(2));

        assert_eq!(call.contract_address, felt_from_u64(7));
        assert_eq!(call.entrypoint, "explorer_move");
        assert_eq!(call.calldata, vec![U256::from(1), U256::from(2)]);
    }

    #[test]
    fn with_calldata_replaces_arguments() {
        let call = CallDescriptor::new(felt_from_u64(7), "send")
            .with_arg(U256::from(9))
            .with_calldata([U256::from(3), U256::from(4)]);
        assert_eq!(call.calldata, vec![U256::from(3), U256::from(4)]);
    }

    #[test]
    fn kind_follows_entrypoint() {
        assert_eq!(
            CallDescriptor::new(felt_from_u64(1), "create_order").kind(),
            Some(TransactionKind::CreateOrder)
        );
        assert_eq!(CallDescriptor::new(felt_from_u64(1), "not_a_game_call").kind(), None);
    }
}
