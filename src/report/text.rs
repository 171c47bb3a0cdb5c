use crate::engine::EvaluationResult;
use crate::report::ResultReporter;
use crate::utils::error::RulegateError;
use std::fmt::Write as _;

pub struct TextReporter;

impl ResultReporter for TextReporter {
    fn format(&self, result: &EvaluationResult) -> Result<String, RulegateError> {
        let mut out = String::new();

        if result.results.is_empty() {
            out.push_str("No candidate rules matched this request.\n");
            return Ok(out);
        }

        for outcome in &result.results {
            let marker = if outcome.fired { "FIRED" } else { "     " };
            let _ = writeln!(
                out,
                "[{marker}] {:<30} final_state={} path={}",
                outcome.rule_id,
                outcome.final_state,
                outcome.state_path.join(" -> "),
            );
            if let Some(ref guidance) = outcome.guidance_text {
                let _ = writeln!(out, "        guidance: {guidance}");
            }
            if let Some(ref diagnostic) = outcome.diagnostic {
                let _ = writeln!(out, "        diagnostic: {diagnostic}");
            }
        }

        let _ = writeln!(
            out,
            "\n{} of {} candidate rules fired (any_fired={})",
            result.results.iter().filter(|o| o.fired).count(),
            result.results.len(),
            result.any_fired,
        );

        Ok(out)
    }
}
