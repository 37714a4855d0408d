//! Verifiable randomness requests.

use courier_primitives::{Account, Address, CallDescriptor, U256};

use crate::TxError;

/// Entrypoint on the randomness provider that reserves a random value.
pub const REQUEST_RANDOM_ENTRYPOINT: &str = "request_random";

/// Prepends the randomness request `call` needs.
///
/// The request names the contract that will consume the value
/// (`address_to_call`) and the requesting account, and must execute in the
/// same transaction as `call`.
///
/// # Errors
///
/// Returns [`TxError::Randomness`] if `provider` is unset or zero.
pub fn build_randomness_calls(
    account: &Account,
    call: CallDescriptor,
    provider: Option<Address>,
    address_to_call: Address,
) -> Result<Vec<CallDescriptor>, TxError> {
    let provider = provider
        .filter(|address| !address.is_zero())
        .ok_or_else(|| TxError::Randomness("no randomness provider configured".to_string()))?;

    let request = CallDescriptor::new(provider, REQUEST_RANDOM_ENTRYPOINT).with_calldata([
        U256::from_be_bytes(address_to_call.0),
        U256::ZERO,
        U256::from_be_bytes(account.address.0),
    ]);
    Ok(vec![request, call])
}

#[cfg(test)]
mod tests {
    use courier_primitives::{B256, felt_from_u64};
    use rstest::rstest;

    use super::*;

    #[test]
    fn request_precedes_the_call() {
        let account = Account::new(felt_from_u64(0xa));
        let call = CallDescriptor::new(felt_from_u64(0xc), "explore");

        let calls =
            build_randomness_calls(&account, call.clone(), Some(felt_from_u64(0xf)), felt_from_u64(0xc))
                .unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].contract_address, felt_from_u64(0xf));
        assert_eq!(calls[0].entrypoint, REQUEST_RANDOM_ENTRYPOINT);
        assert_eq!(calls[0].calldata, vec![U256::from(0xc), U256::ZERO, U256::from(0xa)]);
        assert_eq!(calls[1], call);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(B256::ZERO))]
    fn missing_provider_is_an_error(#[case] provider: Option<Address>) {
        let account = Account::new(felt_from_u64(0xa));
        let call = CallDescriptor::new(felt_from_u64(0xc), "explore");
        let err = build_randomness_calls(&account, call, provider, felt_from_u64(0xc)).unwrap_err();
        assert!(matches!(err, TxError::Randomness(_)));
    }
}
