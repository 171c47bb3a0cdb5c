// Copyright (c) 2025-2026 the rulegate contributors
// SPDX-License-Identifier: Apache-2.0

//! State machine execution for one rule evaluation.
//!
//! The executor is a pure interpreter over a rule's declared states and
//! transitions: given fixed evidence it always visits the same state path.
//! Transitions are authored data, so the cycle bound is enforced rather
//! than assumed.

use crate::engine::evidence::MatchEvidence;
use crate::rule::definition::{COMPLETE_STATE, INITIAL_STATE, RuleDefinition};
use crate::utils::error::RulegateError;

/// Result of driving one rule's state machine to quiescence.
#[derive(Debug, Clone)]
pub struct Execution {
    /// State the machine stopped in.
    pub final_state: String,
    /// Every state visited, starting at `idle`.
    pub state_path: Vec<String>,
    /// True exactly when `final_state == "complete"`.
    pub fired: bool,
    /// Action identifiers executed on state entries, in execution order.
    pub actions_run: Vec<String>,
}

/// Advance `rule`'s state machine as far as the evidence allows.
///
/// From the current state, the first transition in declaration order whose
/// event is satisfied and whose condition holds is taken. Execution stops
/// when no transition applies or a terminal state is reached. A single
/// evaluation may take at most `rule.max_steps()` transitions; exceeding
/// the bound means the rule's transition table cycles and yields
/// [`RulegateError::CycleDetected`].
pub fn execute(rule: &RuleDefinition, evidence: &MatchEvidence) -> Result<Execution, RulegateError> {
    let mut current = INITIAL_STATE.to_owned();
    let mut state_path = vec![current.clone()];
    let mut actions_run = Vec::new();
    let mut steps = 0usize;

    while !rule.is_terminal(&current) {
        let next = rule
            .transitions
            .iter()
            .find(|t| {
                t.from == current
                    && evidence.satisfies(t.event)
                    && evidence.condition_holds(t.condition)
            })
            .map(|t| t.to.clone());

        let Some(next) = next else { break };

        steps += 1;
        if steps > rule.max_steps() {
            return Err(RulegateError::CycleDetected {
                rule_id: rule.id.clone(),
                steps: rule.max_steps(),
            });
        }

        current = next;
        state_path.push(current.clone());
        for action in rule.actions_for(&current) {
            tracing::debug!(rule = %rule.id, state = %current, %action, "rule action");
            actions_run.push(action.clone());
        }
    }

    let fired = current == COMPLETE_STATE;
    Ok(Execution {
        final_state: current,
        state_path,
        fired,
        actions_run,
    })
}

/// Render the constraint guidance for a fired rule.
///
/// Substitutes evidence into the rule's guidance template. Supported
/// placeholders: `{rule_id}`, `{keywords}`, `{pattern_matches}` (match
/// count), `{captures}`. Rules without a template fall back to a generic
/// message so a fired rule always carries guidance.
pub fn render_guidance(rule: &RuleDefinition, evidence: &MatchEvidence) -> String {
    let template = rule.guidance.as_deref().map_or_else(
        || format!("Rule '{}' applies to this request.", rule.id),
        str::to_owned,
    );

    let captures: Vec<&str> = evidence
        .pattern_matches
        .iter()
        .flat_map(|m| m.captures.iter().map(String::as_str))
        .collect();

    template
        .replace("{rule_id}", &rule.id)
        .replace("{keywords}", &evidence.keyword_hits.join(", "))
        .replace(
            "{pattern_matches}",
            &evidence.pattern_matches.len().to_string(),
        )
        .replace("{captures}", &captures.join(", "))
}
