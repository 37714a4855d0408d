#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/courier-rs/courier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod bounds;
pub use bounds::{DEFAULT_L2_GAS_BOOST, DEFAULT_L2_GAS_FLOOR, ResourceBoundAdjuster};

pub mod config;
pub use config::{TxManagerConfig, TxManagerConfigBuilder};

pub mod error;
pub use error::{LedgerError, Retryable, TxError};

pub mod events;
pub use events::{
    AsyncObserver, DispatchEvent, DispatchObserver, EventBus, EventKind, LoggingObserver,
    NoopObserver, SubscriptionId, TxMeta,
};

pub mod executor;
pub use executor::TxExecutor;

pub mod heartbeat;
pub use heartbeat::{
    DesyncStatus, Heartbeat, HeartbeatListener, HeartbeatManager, HeartbeatSource,
    SimulatedHeartbeat, StreamActivity, SyncState,
};

pub mod ledger;
pub use ledger::{LedgerClient, SubmitOptions};

pub mod monitor;
pub use monitor::TxMonitor;

pub mod outcome;
pub use outcome::TxOutcome;

pub mod state;
pub use state::SendState;

pub mod submitter;
pub use submitter::TxSubmitter;

pub mod vrf;
pub use vrf::{REQUEST_RANDOM_ENTRYPOINT, build_randomness_calls};
