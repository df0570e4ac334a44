//! Covenant core: the compiler/matcher pair for consumer-driven contract testing.
//!
//! A consumer declares the shape of the HTTP interactions it expects from a
//! provider using a declarative body template that mixes literal values,
//! type-only matchers, regex matchers, and array-cardinality matchers. This
//! crate compiles such a template into a canonical, path-indexed rule set plus
//! a concrete example body, and decides at request time whether an actual JSON
//! payload satisfies the expected shape: loosely where matchers apply,
//! exactly everywhere else.
//!
//! # Module Structure
//!
//! - `template` - Template model and fluent builder
//! - `compile` - Template tree -> {example value, rule set}
//! - `rules` - Path-indexed matching rules and their persisted form
//! - `path` - Canonical textual encoding of JSON locations
//! - `kind` - Closed sum over the JSON kinds
//! - `matcher` - Rule-aware request/response matching with per-path diagnostics
//! - `interaction` - One expected request/response pair and its builders
//! - `contract` - Contract document (V2 format), file read/write
//! - `regex_constants` - Named canonical patterns (GUID, date-time)

pub mod compile;
pub mod contract;
pub mod interaction;
pub mod kind;
pub mod matcher;
pub mod path;
pub mod regex_constants;
pub mod rules;
pub mod template;

pub use compile::{compile, Compiled};
pub use contract::{Contract, ContractError, Pacticipant};
pub use interaction::{
    ActualRequest, ActualResponse, CompiledInteraction, Interaction, InteractionBuilder,
    InteractionError, InteractionRequest, InteractionResponse, RequestTemplate, ResponseTemplate,
};
pub use kind::JsonKind;
pub use matcher::{
    CompiledRule, CompiledRuleSet, MatchOptions, MatchResult, Mismatch, MismatchReason,
};
pub use path::{DocPath, PathError, PathRoot, Segment};
pub use rules::{MatcherType, MatchingRule, RuleSet};
pub use template::{
    array, like, like_datetime, like_guid, like_regex, literal, object, ArrayTemplate, Template,
    TemplateError, TemplateKind,
};
