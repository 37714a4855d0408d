#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/courier-rs/courier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod account;
pub use account::Account;

pub mod call;
pub use call::CallDescriptor;

pub mod fee;
pub use fee::{FeeEstimate, ResourceBound, ResourceBounds};

pub mod felt;
pub use felt::{FeltError, felt_from_u64, parse_felt};

pub mod kind;
pub use kind::TransactionKind;

pub mod manifest;
pub use manifest::{ContractEntry, Manifest, ManifestError, WorldEntry};

pub mod receipt;
pub use receipt::{ExecutionStatus, RawReceipt, Receipt, ReceiptError, UNKNOWN_REVERT_REASON};

pub use alloy_primitives::{B256, U256};

/// A deployed contract or account address.
pub type Address = B256;

/// A transaction hash.
pub type TxHash = B256;
