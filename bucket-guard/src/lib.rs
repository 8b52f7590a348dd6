pub mod clients;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod mock;
pub mod notify;
pub mod posture;
pub mod types;

pub use config::GuardConfig;
pub use dispatch::{Dispatched, Dispatcher, Disposition};
pub use types::{AccessPosture, InvocationResult, PostureReading, RemediationOutcome};
