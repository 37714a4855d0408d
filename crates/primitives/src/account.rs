//! Signer identity.

use crate::Address;

/// The account a transaction is signed and submitted under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Account {
    /// On-chain address of the account contract.
    pub address: Address,
}

impl Account {
    /// Creates an account handle for the given address.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self::new(address)
    }
}
