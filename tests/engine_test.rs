// Copyright (c) 2025-2026 the rulegate contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end engine tests: the seed scenarios plus the engine's testable
//! properties (determinism, order invariance, isolation, no false
//! completion).

use rulegate::engine::{Cancellation, Engine, Registry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Rule keyed on "class" that fires only when the snippet declares 8+
/// methods (seed scenarios 1 and 2).
const GOD_CLASS_RULE: &str = r#"
id = "no-god-classes"
states = ["idle", "detection", "analysis", "constraint", "validation", "complete"]
guidance = "This class declares {pattern_matches} methods; split it up."

[triggers]
keywords = ["class"]
patterns = ['(?m)^\s*(?:pub\s+)?fn\s+(\w+)\s*\(']

[[transitions]]
from = "idle"
to = "detection"
event = "keyword_found"

[[transitions]]
from = "detection"
to = "analysis"
event = "pattern_found"

[[transitions]]
from = "analysis"
to = "constraint"
event = "pattern_found"
condition = "min_pattern_matches:8"

[[transitions]]
from = "constraint"
to = "validation"
event = "always"

[[transitions]]
from = "validation"
to = "complete"
event = "always"
"#;

const SQL_RULE: &str = r#"
id = "api-sql-guard"
states = ["idle", "detection", "complete"]
guidance = "Parameterize the query."

[triggers]
keywords = ["api endpoint"]
patterns = ['(?i)(?:select|insert|update|delete)\b[^\n;]*\+']

[[transitions]]
from = "idle"
to = "detection"
event = "keyword_found"

[[transitions]]
from = "detection"
to = "complete"
event = "pattern_found"
"#;

const ASYNC_RULE: &str = r#"
id = "api-async-guard"
states = ["idle", "detection", "complete"]
guidance = "Do not block inside async handlers."

[triggers]
keywords = ["api endpoint"]
patterns = ['\b(?:std::thread::sleep|block_on)\b']

[[transitions]]
from = "idle"
to = "detection"
event = "keyword_found"

[[transitions]]
from = "detection"
to = "complete"
event = "pattern_found"
"#;

/// Well-formed per the load-time invariants, but its transition table
/// cycles between detection and analysis.
const CYCLING_RULE: &str = r#"
id = "cycles-forever"
states = ["idle", "detection", "analysis", "complete"]

[triggers]
keywords = ["class"]

[[transitions]]
from = "idle"
to = "detection"
event = "keyword_found"

[[transitions]]
from = "detection"
to = "analysis"
event = "always"

[[transitions]]
from = "analysis"
to = "detection"
event = "always"
"#;

fn build_engine(sources: &[(&str, &str)]) -> Engine {
    let (registry, errors) = Registry::load(
        sources
            .iter()
            .map(|(id, text)| ((*id).to_owned(), (*text).to_owned())),
    );
    assert!(errors.is_empty(), "fixture rules must load: {errors:?}");
    Engine::new(Arc::new(registry))
}

fn method_snippet(count: usize) -> String {
    (0..count)
        .map(|i| format!("fn method_{i}(&self) {{}}\n"))
        .collect()
}

#[test]
fn test_scenario_1_many_methods_fires() {
    let engine = build_engine(&[("no-god-classes", GOD_CLASS_RULE)]);
    let snippet = method_snippet(12);
    let result = engine.evaluate_request("write a user service class", Some(&snippet));

    assert!(result.any_fired);
    assert_eq!(result.results.len(), 1);
    let outcome = &result.results[0];
    assert!(outcome.fired);
    assert_eq!(outcome.final_state, "complete");
    assert!(outcome.state_path.contains(&"constraint".to_owned()));
    assert_eq!(
        outcome.guidance_text.as_deref(),
        Some("This class declares 12 methods; split it up.")
    );
}

#[test]
fn test_scenario_2_few_methods_does_not_fire() {
    let engine = build_engine(&[("no-god-classes", GOD_CLASS_RULE)]);
    let snippet = method_snippet(3);
    let result = engine.evaluate_request("write a user service class", Some(&snippet));

    assert!(!result.any_fired);
    let outcome = &result.results[0];
    assert!(!outcome.fired);
    // The rule advances through detection/analysis but stalls on the
    // method-count condition; it never completes.
    assert_eq!(outcome.final_state, "analysis");
    assert!(outcome.guidance_text.is_none());
}

#[test]
fn test_scenario_3_missing_to_state_is_validation_error() {
    let broken = GOD_CLASS_RULE.replace("to = \"analysis\"", "to = \"analysiss\"");
    let (registry, errors) = Registry::load(vec![("no-god-classes".to_owned(), broken)]);

    assert!(registry.is_empty());
    assert_eq!(errors.len(), 1);
    let message = errors[0].to_string();
    assert!(message.contains("analysiss"), "got: {message}");
    assert!(message.contains("Validation"), "got: {message}");
}

#[test]
fn test_scenario_4_two_rules_fire_rule_id_ascending() {
    // Loaded intentionally out of id order.
    let engine = build_engine(&[("sql", SQL_RULE), ("async", ASYNC_RULE)]);
    let request = "add an api endpoint";
    let content = "block_on(handler());\nlet q = \"SELECT name FROM users WHERE id = \" + id;\n";
    let result = engine.evaluate_request(request, Some(content));

    assert!(result.any_fired);
    let ids: Vec<_> = result.results.iter().map(|o| o.rule_id.clone()).collect();
    assert_eq!(ids, vec!["api-async-guard", "api-sql-guard"]);
    assert!(result.results.iter().all(|o| o.fired));
}

/// Reports cancelled after a fixed number of checkpoint polls, so the
/// "cancellation fired after rule 1 of 5 completed" scenario is exact.
struct CancelAfterChecks {
    remaining: AtomicUsize,
}

impl Cancellation for CancelAfterChecks {
    fn is_cancelled(&self) -> bool {
        // fetch_update never fails with this closure; treat exhaustion as
        // cancelled either way.
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

#[test]
fn test_scenario_5_cancellation_yields_placeholders() {
    let sources: Vec<(String, String)> = (0..5)
        .map(|i| {
            (
                format!("rule-{i}"),
                SQL_RULE.replace("api-sql-guard", &format!("rule-{i}")),
            )
        })
        .collect();
    let (registry, errors) = Registry::load(sources);
    assert!(errors.is_empty());
    let engine = Engine::new(Arc::new(registry));

    let cancel = CancelAfterChecks {
        remaining: AtomicUsize::new(1),
    };
    let content = "SELECT name FROM users WHERE id = \" + id";
    let result = engine.evaluate_with_cancel("add an api endpoint", Some(content), &cancel);

    assert_eq!(result.results.len(), 5);
    let real: Vec<_> = result.results.iter().filter(|o| o.diagnostic.is_none()).collect();
    assert_eq!(real.len(), 1);
    assert!(real[0].fired);

    let placeholders: Vec<_> = result
        .results
        .iter()
        .filter(|o| o.diagnostic.is_some())
        .collect();
    assert_eq!(placeholders.len(), 4);
    for outcome in placeholders {
        assert!(!outcome.fired);
        assert_eq!(outcome.final_state, "idle");
        assert_eq!(outcome.state_path, vec!["idle"]);
    }
}

#[test]
fn test_property_determinism() {
    let engine = build_engine(&[("no-god-classes", GOD_CLASS_RULE)]);
    let snippet = method_snippet(9);
    let first = engine.evaluate_request("refactor this class", Some(&snippet));
    for _ in 0..20 {
        let again = engine.evaluate_request("refactor this class", Some(&snippet));
        assert_eq!(again.results[0].state_path, first.results[0].state_path);
        assert_eq!(again.results[0].final_state, first.results[0].final_state);
    }
}

#[test]
fn test_property_load_order_invariance() {
    let forward = build_engine(&[("sql", SQL_RULE), ("async", ASYNC_RULE)]);
    let reverse = build_engine(&[("async", ASYNC_RULE), ("sql", SQL_RULE)]);

    let request = "add an api endpoint";
    let content = "block_on(f()); SELECT a FROM b WHERE c = \" + d";
    let a = forward.evaluate_request(request, Some(content));
    let b = reverse.evaluate_request(request, Some(content));

    assert_eq!(a.results.len(), b.results.len());
    for (x, y) in a.results.iter().zip(b.results.iter()) {
        assert_eq!(x.rule_id, y.rule_id);
        assert_eq!(x.fired, y.fired);
        assert_eq!(x.state_path, y.state_path);
    }
}

#[test]
fn test_property_isolation_of_cycling_rule() {
    let engine = build_engine(&[
        ("cycler", CYCLING_RULE),
        ("no-god-classes", GOD_CLASS_RULE),
    ]);
    let snippet = method_snippet(10);
    let result = engine.evaluate_request("write a service class", Some(&snippet));

    assert_eq!(result.results.len(), 2);

    let cycler = result
        .results
        .iter()
        .find(|o| o.rule_id == "cycles-forever")
        .expect("cycler outcome present");
    assert!(!cycler.fired);
    assert_eq!(cycler.final_state, "idle");
    assert!(cycler.diagnostic.as_deref().unwrap().contains("Cycle"));

    // The well-formed rule still fires correctly in the same batch.
    let healthy = result
        .results
        .iter()
        .find(|o| o.rule_id == "no-god-classes")
        .expect("healthy outcome present");
    assert!(healthy.fired);
    assert!(result.any_fired);
}

#[test]
fn test_property_no_false_completion() {
    let engine = build_engine(&[("no-god-classes", GOD_CLASS_RULE)]);
    // Keywords appear nowhere in request or content.
    let result = engine.evaluate_request("sort this list of numbers", Some("let v = vec![1];"));
    assert!(result.results.is_empty());
    assert!(!result.any_fired);
}
