use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulegateError {
    #[error("Parse error in '{source_id}': {message}")]
    Parse { source_id: String, message: String },

    #[error("Validation error in '{source_id}': {message}\nSuggestion: {suggestion}")]
    Validation {
        source_id: String,
        message: String,
        suggestion: String,
    },

    #[error("Cycle detected in rule '{rule_id}': exceeded {steps} transition steps")]
    CycleDetected { rule_id: String, steps: usize },

    #[error("Evaluation cancelled before all candidate rules finished")]
    Cancelled,

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Report format error: {0}")]
    ReportFormat(String),
}

impl RulegateError {
    pub fn parse(source_id: &str, message: impl Into<String>) -> Self {
        RulegateError::Parse {
            source_id: source_id.to_owned(),
            message: message.into(),
        }
    }

    pub fn unknown_state(source_id: &str, state: &str, referenced_in: &str) -> Self {
        RulegateError::Validation {
            source_id: source_id.to_owned(),
            message: format!("{referenced_in} references unknown state '{state}'"),
            suggestion: format!("Add '{state}' to the rule's `states` list or fix the reference"),
        }
    }

    pub fn terminal_transition(source_id: &str, state: &str) -> Self {
        RulegateError::Validation {
            source_id: source_id.to_owned(),
            message: format!("transition originates from terminal state '{state}'"),
            suggestion: "Terminal states must have no outgoing transitions; remove the \
                         transition or drop the state from `terminal_states`"
                .to_owned(),
        }
    }

    pub fn missing_state(source_id: &str, state: &str) -> Self {
        RulegateError::Validation {
            source_id: source_id.to_owned(),
            message: format!("rule does not declare the required state '{state}'"),
            suggestion: format!("Every rule must list '{state}' in its `states`"),
        }
    }

    pub fn invalid_regex(source_id: &str, pattern: &str, detail: &str) -> Self {
        RulegateError::Validation {
            source_id: source_id.to_owned(),
            message: format!("trigger pattern `{pattern}` rejected: {detail}"),
            suggestion: "Rewrite the pattern without nested unbounded quantifiers \
                         (e.g. bound the outer repetition: `(a+){1,8}` instead of `(a+)+`)"
                .to_owned(),
        }
    }
}

/// Derive a stable source identifier from a rule file path.
///
/// Uses the file stem so error messages stay readable regardless of where the
/// rule directory is mounted.
pub fn source_id_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map_or_else(|| path.display().to_string(), str::to_owned)
}
