//! Trigger matching against an input pair.
//!
//! Produces [`MatchEvidence`] for one rule and one `(request_text,
//! content_snippet)` pair. Matching is pure: no match is empty evidence,
//! never an error. Malformed patterns cannot reach this module; they are
//! rejected when the rule is compiled.

use crate::engine::evidence::{MatchEvidence, PatternMatch};
use crate::rule::definition::RuleDefinition;

/// Evaluate every trigger of `rule` against the input pair.
///
/// Keyword and anti-pattern phrases use case-insensitive substring
/// containment against the request text. Regex triggers run against the
/// content snippet when one is present, otherwise against the request text,
/// and record every match so counting predicates (e.g. "8+ methods") can be
/// derived from the match count.
pub fn evaluate(
    rule: &RuleDefinition,
    request_text: &str,
    content_snippet: Option<&str>,
) -> MatchEvidence {
    let request_lower = request_text.to_lowercase();

    let keyword_hits = phrase_hits(&rule.keywords, &request_lower);
    let anti_pattern_hits = phrase_hits(&rule.anti_patterns, &request_lower);

    let haystack = content_snippet.unwrap_or(request_text);
    let mut pattern_matches = Vec::new();
    for pattern in &rule.patterns {
        for caps in pattern.captures_iter(haystack) {
            let text = caps
                .get(0)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default();
            let captures = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_owned())
                .collect();
            pattern_matches.push(PatternMatch {
                pattern: pattern.as_str().to_owned(),
                text,
                captures,
            });
        }
    }

    MatchEvidence {
        keyword_hits,
        pattern_matches,
        anti_pattern_hits,
    }
}

/// Case-insensitive substring containment, recording the authored phrase.
fn phrase_hits(phrases: &[String], request_lower: &str) -> Vec<String> {
    phrases
        .iter()
        .filter(|phrase| request_lower.contains(&phrase.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::definition::RuleDefinition;
    use crate::rule::source::RuleSource;

    fn method_rule() -> RuleDefinition {
        let doc = r#"
id = "no-god-classes"
states = ["idle", "detection", "complete"]

[triggers]
keywords = ["Class", "service object"]
patterns = ['(?m)^\s*(?:pub\s+)?fn\s+(\w+)\s*\(']
anti_patterns = ["god class"]

[[transitions]]
from = "idle"
to = "detection"
event = "keyword_found"
"#;
        let source = RuleSource::parse("no-god-classes", doc).expect("valid source");
        RuleDefinition::compile("no-god-classes", source).expect("valid rule")
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let rule = method_rule();
        let evidence = evaluate(&rule, "write a user CLASS for me", None);
        // The authored phrase is recorded, not the matched casing.
        assert_eq!(evidence.keyword_hits, vec!["Class"]);
    }

    #[test]
    fn test_regex_prefers_content_snippet() {
        let rule = method_rule();
        let content = "fn a() {}\nfn b() {}\nfn c() {}\n";
        let evidence = evaluate(&rule, "add a class", Some(content));
        assert_eq!(evidence.pattern_matches.len(), 3);
        assert_eq!(evidence.pattern_matches[0].captures, vec!["a"]);
    }

    #[test]
    fn test_regex_falls_back_to_request_text() {
        let rule = method_rule();
        let evidence = evaluate(&rule, "fn login() is too long, split it up", None);
        assert_eq!(evidence.pattern_matches.len(), 1);
        assert_eq!(evidence.pattern_matches[0].captures, vec!["login"]);
    }

    #[test]
    fn test_anti_patterns_recorded_separately() {
        let rule = method_rule();
        let evidence = evaluate(&rule, "this class is a god class already", None);
        assert_eq!(evidence.keyword_hits, vec!["Class"]);
        assert_eq!(evidence.anti_pattern_hits, vec!["god class"]);
    }

    #[test]
    fn test_no_match_is_empty_evidence() {
        let rule = method_rule();
        let evidence = evaluate(&rule, "sort this list", Some("let x = [3, 1, 2];"));
        assert!(evidence.is_empty());
    }
}
