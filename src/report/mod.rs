pub mod json;
pub mod text;

use crate::engine::EvaluationResult;
use crate::utils::error::RulegateError;

/// Renders an [`EvaluationResult`] for the external consumer. Pure
/// formatting; no business logic.
pub trait ResultReporter {
    fn format(&self, result: &EvaluationResult) -> Result<String, RulegateError>;
}

/// Look up the reporter for a format name.
pub fn get_reporter(format: &str) -> Option<Box<dyn ResultReporter>> {
    match format {
        "text" => Some(Box::new(text::TextReporter)),
        "json" => Some(Box::new(json::JsonReporter)),
        _ => None,
    }
}
