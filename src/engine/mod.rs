pub mod evidence;
pub mod executor;
pub mod matcher;
pub mod orchestrator;
pub mod registry;

pub use evidence::{MatchEvidence, PatternMatch};
pub use orchestrator::{CancelToken, Cancellation, Engine, EvaluationResult, RuleOutcome};
pub use registry::Registry;
