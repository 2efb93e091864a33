//! Drives a Pharos lighting controller from a button-automation surface and reflects
//! its live state back as button feedback.

pub mod adapter;
pub mod app_config;
pub mod client;
pub mod definitions;
pub mod dispatcher;
pub mod domain;
pub mod evaluator;
pub mod host;
pub mod inventory;
pub mod supervisor;
#[cfg(test)]
mod testing;

pub use adapter::Adapter;
pub use app_config::{AdapterConfig, ConfigError};
pub use client::{ClientFactory, DeviceClient, DeviceClientError};
pub use host::Host;
pub use supervisor::{SessionError, SessionOutcome};
