// Copyright (c) 2025-2026 the rulegate contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine orchestration: candidate selection, per-rule evaluation,
//! aggregation.
//!
//! `evaluate_request` is the single public entry point. Evaluation is
//! CPU-bound and synchronous; concurrent requests share only the immutable
//! registry behind an `Arc`, so no locking is needed. A fault in one rule is
//! absorbed into that rule's outcome: the batch always completes and the
//! caller always receives a well-formed result.

use crate::engine::registry::Registry;
use crate::engine::{executor, matcher};
use crate::rule::definition::{INITIAL_STATE, RuleDefinition};
use crate::utils::error::RulegateError;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// External cancellation signal observed between rule evaluations.
///
/// The orchestrator polls this at each per-rule checkpoint; it never
/// interrupts a rule mid-evaluation, so a cancelled request still returns
/// whole outcomes for the rules that finished.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// Cancellation token backed by a shared flag and an optional deadline.
///
/// Cheap to clone; the flag is shared. A token with a deadline reports
/// cancelled once the deadline passes without anyone calling [`cancel`].
///
/// [`cancel`]: CancelToken::cancel
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that trips automatically after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Cancellation for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Outcome of evaluating one rule against one request.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub fired: bool,
    pub final_state: String,
    pub state_path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_text: Option<String>,
    /// Internal diagnostic when this rule's evaluation was isolated
    /// (cycle detected, cancellation placeholder). Not part of the firing
    /// contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl RuleOutcome {
    /// Idle, not-fired outcome used for isolated faults and cancellation
    /// placeholders.
    fn placeholder(rule: &RuleDefinition, diagnostic: String) -> Self {
        Self {
            rule_id: rule.id.clone(),
            fired: false,
            final_state: INITIAL_STATE.to_owned(),
            state_path: vec![INITIAL_STATE.to_owned()],
            guidance_text: None,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Aggregated result for one request, rule-id ascending.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub results: Vec<RuleOutcome>,
    pub any_fired: bool,
}

/// The rule engine. Stateless across requests; shares the registry.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluate one request against every candidate rule.
    pub fn evaluate_request(
        &self,
        request_text: &str,
        content_snippet: Option<&str>,
    ) -> EvaluationResult {
        self.evaluate_with_cancel(request_text, content_snippet, &CancelToken::new())
    }

    /// Evaluate with an external cancellation/timeout signal.
    ///
    /// On cancellation the outcomes already computed are returned as-is and
    /// every remaining candidate gets an idle, not-fired placeholder,
    /// never a torn single-rule outcome. Ordering stays rule-id ascending.
    pub fn evaluate_with_cancel(
        &self,
        request_text: &str,
        content_snippet: Option<&str>,
        cancel: &dyn Cancellation,
    ) -> EvaluationResult {
        let candidates = self.registry.candidates_for(request_text);
        tracing::debug!(
            candidates = candidates.len(),
            total = self.registry.len(),
            "selected candidate rules"
        );

        let mut results = Vec::with_capacity(candidates.len());
        for rule in &candidates {
            if cancel.is_cancelled() {
                results.push(RuleOutcome::placeholder(
                    rule,
                    RulegateError::Cancelled.to_string(),
                ));
                continue;
            }
            results.push(evaluate_rule(rule, request_text, content_snippet));
        }

        let any_fired = results.iter().any(|outcome| outcome.fired);
        EvaluationResult { results, any_fired }
    }
}

/// Run matcher + executor for a single rule, absorbing any fault into the
/// outcome so one misauthored rule never aborts the batch.
fn evaluate_rule(
    rule: &RuleDefinition,
    request_text: &str,
    content_snippet: Option<&str>,
) -> RuleOutcome {
    let evidence = matcher::evaluate(rule, request_text, content_snippet);

    match executor::execute(rule, &evidence) {
        Ok(execution) => {
            if execution.fired {
                tracing::info!(rule = %rule.id, severity = %rule.severity, "rule fired");
            }
            let guidance_text = execution
                .fired
                .then(|| executor::render_guidance(rule, &evidence));
            RuleOutcome {
                rule_id: rule.id.clone(),
                fired: execution.fired,
                final_state: execution.final_state,
                state_path: execution.state_path,
                guidance_text,
                diagnostic: None,
            }
        }
        Err(e) => {
            tracing::warn!(rule = %rule.id, error = %e, "rule evaluation isolated");
            RuleOutcome::placeholder(rule, e.to_string())
        }
    }
}
