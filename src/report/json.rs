use crate::engine::EvaluationResult;
use crate::report::ResultReporter;
use crate::utils::error::RulegateError;

pub struct JsonReporter;

impl ResultReporter for JsonReporter {
    fn format(&self, result: &EvaluationResult) -> Result<String, RulegateError> {
        serde_json::to_string_pretty(result).map_err(|e| RulegateError::ReportFormat(e.to_string()))
    }
}
