//! The mock provider service.
//!
//! # Module Structure
//!
//! - `core` - `MockService`: compiled interactions, decision logic, the
//!   invocation log, and post-test verification
//! - `handler` - hyper request handling at the host/matcher boundary
//! - `server` - bind/accept/shutdown lifecycle
//! - `types` - invocations, reports, error envelopes, response helpers

mod core;
mod handler;
mod server;
mod types;

pub use core::MockService;
pub use handler::handle_mock_request;
pub use server::MockServer;
pub use types::{
    build_response, build_response_with_headers, ErrorsBody, Invocation, InvocationOutcome,
    MockAnswer, MockError, VerificationReport,
};

#[cfg(test)]
mod tests;
