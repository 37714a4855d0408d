#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/courier-rs/courier/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod classifier;
pub use classifier::{CategoryLimits, CostCategory, classify};

pub mod config;
pub use config::{QueueConfig, QueueConfigBuilder};

pub mod dispatch;
pub use dispatch::Dispatch;

pub mod metrics;
pub use metrics::QueueMetrics;

pub mod pending;
pub use pending::PendingCall;

pub mod queue;
pub use queue::{QueueResult, TxQueue};

pub mod session;
pub use session::{BatchSession, SessionDispatcher};
