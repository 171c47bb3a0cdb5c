//! # rulegate Rule Engine
//!
//! rulegate intercepts AI-assisted code-generation requests and constrains
//! their output by matching the request and any content snippet against a
//! library of declarative rules. Each rule is a small finite state machine
//! (idle -> detection -> analysis -> constraint -> validation -> complete)
//! executed by one generic interpreter; the rule documents are pure data.
//!
//! ## Architecture
//!
//! Evaluation of one request flows through five components:
//!
//! 1. **Registry** ([`engine::registry`]) - owns the immutable, validated
//!    rule set loaded once at startup; selects candidate rules by keyword.
//! 2. **Matcher** ([`engine::matcher`]) - evaluates a candidate's triggers
//!    (keywords, regexes, anti-pattern phrases) into [`MatchEvidence`].
//! 3. **Executor** ([`engine::executor`]) - deterministically advances the
//!    rule's state machine over the evidence, with an enforced cycle bound.
//! 4. **Orchestrator** ([`engine::orchestrator`]) - runs 1-3 per candidate
//!    with per-rule fault isolation and cancellation, and aggregates
//!    outcomes in rule-id order.
//! 5. **Reporter** ([`report`]) - renders the aggregated result as text or
//!    JSON for the external consumer.
//!
//! Rule definitions live for the whole process and are shared read-only;
//! evidence, outcomes, and results are per-request and discarded. Evaluating
//! a fixed rule against fixed input is a pure function: identical input
//! always yields the identical state path.

pub mod cli;
pub mod engine;
pub mod report;
pub mod rule;
pub mod utils;

pub use engine::{
    CancelToken, Cancellation, Engine, EvaluationResult, MatchEvidence, Registry, RuleOutcome,
};
pub use rule::RuleDefinition;
pub use utils::error::RulegateError;

/// Initialize logging based on verbosity level (`-v` count).
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}
