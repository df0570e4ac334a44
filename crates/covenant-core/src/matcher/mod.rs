//! Rule-aware request/response matching.
//!
//! Given an actual JSON value, an expected example, and a compiled rule set,
//! the matcher decides match/mismatch and produces per-path diagnostics. A
//! mismatch is data, never an error: the matcher always returns a
//! [`MatchResult`], and a populated mismatch list is a terminal, reported
//! outcome for that request.
//!
//! # Module Structure
//!
//! - `outcome` - `MatchResult`, `Mismatch`, and mismatch reasons
//! - `ruleset` - Pre-compiled rules (regexes compiled once, up front)
//! - `body` - Recursive JSON body walk
//! - `headers` - Flat header key space under `$.headers.`

mod body;
mod headers;
mod outcome;
mod ruleset;

pub use body::match_body;
pub use headers::match_headers;
pub use outcome::{MatchResult, Mismatch, MismatchReason};
pub use ruleset::{CompiledRule, CompiledRuleSet};

/// Knobs for a single match run.
///
/// The default is the permissive mode: unexpected object members and extra
/// array elements in the actual value do not by themselves cause failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Fail on object members and array elements the expectation does not
    /// declare.
    pub strict: bool,
}

impl MatchOptions {
    /// The stricter contract mode: unexpected members are mismatches.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}
