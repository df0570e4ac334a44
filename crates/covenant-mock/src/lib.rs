//! Covenant mock: the mock provider service, broker client, and provider
//! verification for consumer-driven contract testing.
//!
//! The heavy lifting (template compilation and rule-aware matching) lives
//! in `covenant-core`; this crate hosts it behind an HTTP boundary, records
//! which interactions actually fired, and talks to the outside world
//! (contract files, the broker, real providers).

pub mod broker;
pub mod config;
pub mod service;

pub use broker::{BrokerClient, BrokerError};
pub use config::MockConfig;
pub use service::{
    Invocation, InvocationOutcome, MockError, MockServer, MockService, VerificationReport,
};
