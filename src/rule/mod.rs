pub mod definition;
pub mod lint;
pub mod source;

pub use definition::{
    COMPLETE_STATE, Condition, Example, INITIAL_STATE, RuleDefinition, Severity, Transition,
    TriggerEvent,
};
pub use source::RuleSource;
