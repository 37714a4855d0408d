#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/courier-rs/courier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod error;
pub use error::LocalError;

pub mod ledger;
pub use ledger::{Behavior, InMemoryLedger, Submission};

pub mod script;
pub use script::LedgerScript;
