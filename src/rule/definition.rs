//! Compiled, immutable rule definitions.
//!
//! A [`RuleDefinition`] is the validated form of one rule document: regexes
//! compiled, trigger events and condition predicates resolved to tagged
//! variants, and every structural invariant checked. Definitions are built
//! once at load time and shared read-only across evaluations.

use crate::rule::lint;
use crate::rule::source::{RuleSource, SeveritySource};
use crate::utils::error::RulegateError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Initial state every rule starts in.
pub const INITIAL_STATE: &str = "idle";
/// Terminal state that marks a rule as fired.
pub const COMPLETE_STATE: &str = "complete";

/// Symbolic trigger event referenced by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// At least one keyword phrase matched the request text.
    KeywordFound,
    /// At least one trigger pattern matched the content or request text.
    PatternFound,
    /// At least one anti-pattern phrase matched (inert by default).
    AntiPatternFound,
    /// Unconditionally satisfied.
    Always,
}

impl TriggerEvent {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "keyword_found" => Some(Self::KeywordFound),
            "pattern_found" => Some(Self::PatternFound),
            "anti_pattern_found" => Some(Self::AntiPatternFound),
            "always" => Some(Self::Always),
            _ => None,
        }
    }
}

/// Named boolean predicate evaluated against match evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Always true (the default when a transition names no condition).
    Always,
    /// Total regex matches across all trigger patterns is at least `n`.
    /// This is how counting rules like "8+ methods" are expressed.
    MinPatternMatches(usize),
    /// At least `n` distinct keyword phrases matched.
    MinKeywordHits(usize),
    /// At least `n` capture groups were collected across all matches.
    MinCaptures(usize),
}

impl Condition {
    fn parse(spec: &str) -> Option<Self> {
        if spec == "always" {
            return Some(Self::Always);
        }
        let (name, arg) = spec.split_once(':')?;
        let n: usize = arg.trim().parse().ok()?;
        match name {
            "min_pattern_matches" => Some(Self::MinPatternMatches(n)),
            "min_keyword_hits" => Some(Self::MinKeywordHits(n)),
            "min_captures" => Some(Self::MinCaptures(n)),
            _ => None,
        }
    }
}

/// One guarded state transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub event: TriggerEvent,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl From<SeveritySource> for Severity {
    fn from(source: SeveritySource) -> Self {
        match source {
            SeveritySource::Low => Self::Low,
            SeveritySource::Medium => Self::Medium,
            SeveritySource::High => Self::High,
            SeveritySource::Critical => Self::Critical,
        }
    }
}

/// Bad/good text pair illustrating the rule. Descriptive only.
#[derive(Debug, Clone)]
pub struct Example {
    pub bad: String,
    pub good: String,
}

/// Validated, immutable representation of one rule.
#[derive(Debug)]
pub struct RuleDefinition {
    pub id: String,
    pub states: Vec<String>,
    terminal: BTreeSet<String>,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
    pub anti_patterns: Vec<String>,
    pub transitions: Vec<Transition>,
    pub actions: BTreeMap<String, Vec<String>>,
    pub guidance: Option<String>,
    pub severity: Severity,
    pub category: Option<String>,
    pub examples: Vec<Example>,
}

impl RuleDefinition {
    /// Validate and compile a parsed rule source.
    ///
    /// Enforces the structural invariants: `idle` and `complete` declared,
    /// every transition endpoint known, no transition out of a terminal
    /// state, action keys known, and every trigger pattern passing the
    /// backtracking lint before compilation.
    pub fn compile(source_id: &str, source: RuleSource) -> Result<Self, RulegateError> {
        let states: BTreeSet<&str> = source.states.iter().map(String::as_str).collect();
        if states.len() != source.states.len() {
            return Err(RulegateError::Validation {
                source_id: source_id.to_owned(),
                message: "duplicate state names in `states`".to_owned(),
                suggestion: "State names must be unique within a rule".to_owned(),
            });
        }
        for required in [INITIAL_STATE, COMPLETE_STATE] {
            if !states.contains(required) {
                return Err(RulegateError::missing_state(source_id, required));
            }
        }

        let mut terminal: BTreeSet<String> = BTreeSet::new();
        terminal.insert(COMPLETE_STATE.to_owned());
        for state in &source.terminal_states {
            if !states.contains(state.as_str()) {
                return Err(RulegateError::unknown_state(
                    source_id,
                    state,
                    "`terminal_states`",
                ));
            }
            terminal.insert(state.clone());
        }

        let mut transitions = Vec::with_capacity(source.transitions.len());
        for (i, t) in source.transitions.iter().enumerate() {
            let context = format!("transition {i}");
            for endpoint in [&t.from, &t.to] {
                if !states.contains(endpoint.as_str()) {
                    return Err(RulegateError::unknown_state(source_id, endpoint, &context));
                }
            }
            if terminal.contains(&t.from) {
                return Err(RulegateError::terminal_transition(source_id, &t.from));
            }
            let event = TriggerEvent::parse(&t.event).ok_or_else(|| RulegateError::Validation {
                source_id: source_id.to_owned(),
                message: format!("{context} uses unknown trigger event '{}'", t.event),
                suggestion: "Valid events are: keyword_found, pattern_found, \
                             anti_pattern_found, always"
                    .to_owned(),
            })?;
            let condition = match t.condition.as_deref() {
                None => Condition::Always,
                Some(spec) => Condition::parse(spec).ok_or_else(|| RulegateError::Validation {
                    source_id: source_id.to_owned(),
                    message: format!("{context} uses unknown condition '{spec}'"),
                    suggestion: "Valid conditions are: always, min_pattern_matches:N, \
                                 min_keyword_hits:N, min_captures:N"
                        .to_owned(),
                })?,
            };
            transitions.push(Transition {
                from: t.from.clone(),
                to: t.to.clone(),
                event,
                condition,
            });
        }

        for state in source.actions.keys() {
            if !states.contains(state.as_str()) {
                return Err(RulegateError::unknown_state(source_id, state, "`actions`"));
            }
        }

        let mut patterns = Vec::with_capacity(source.triggers.patterns.len());
        for pattern in &source.triggers.patterns {
            lint::check_pattern(pattern)
                .map_err(|detail| RulegateError::invalid_regex(source_id, pattern, &detail))?;
            let compiled = Regex::new(pattern)
                .map_err(|e| RulegateError::invalid_regex(source_id, pattern, &e.to_string()))?;
            patterns.push(compiled);
        }

        Ok(Self {
            id: source.id,
            states: source.states,
            terminal,
            keywords: source.triggers.keywords,
            patterns,
            anti_patterns: source.triggers.anti_patterns,
            transitions,
            actions: source.actions,
            guidance: source.guidance,
            severity: source.severity.into(),
            category: source.category,
            examples: source
                .examples
                .into_iter()
                .map(|e| Example {
                    bad: e.bad,
                    good: e.good,
                })
                .collect(),
        })
    }

    pub fn is_terminal(&self, state: &str) -> bool {
        self.terminal.contains(state)
    }

    /// Hard bound on transition steps for one evaluation.
    pub fn max_steps(&self) -> usize {
        self.states.len()
    }

    /// Action identifiers to run on entering `state`, in declared order.
    pub fn actions_for(&self, state: &str) -> &[String] {
        self.actions.get(state).map_or(&[], Vec::as_slice)
    }
}
