//! Match evidence collected for one rule evaluation.

use crate::rule::definition::{Condition, TriggerEvent};

/// One regex trigger match, with every capture group that participated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// The pattern source text, for diagnostics and guidance rendering.
    pub pattern: String,
    /// The full matched text.
    pub text: String,
    /// Captured groups, in group order, skipping groups that did not match.
    pub captures: Vec<String>,
}

/// Ephemeral record of which triggers fired for one (rule, input) pair.
///
/// Absence of any match is an empty evidence value, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEvidence {
    /// Keyword phrases that matched the request text, as authored.
    pub keyword_hits: Vec<String>,
    /// Every regex trigger match (not just the first), in scan order.
    pub pattern_matches: Vec<PatternMatch>,
    /// Anti-pattern phrases that matched. Collected but consumed by no
    /// default condition predicate.
    pub anti_pattern_hits: Vec<String>,
}

impl MatchEvidence {
    pub fn is_empty(&self) -> bool {
        self.keyword_hits.is_empty()
            && self.pattern_matches.is_empty()
            && self.anti_pattern_hits.is_empty()
    }

    /// Total captures across all pattern matches.
    pub fn capture_count(&self) -> usize {
        self.pattern_matches.iter().map(|m| m.captures.len()).sum()
    }

    /// Whether a transition's trigger event is satisfied.
    pub fn satisfies(&self, event: TriggerEvent) -> bool {
        match event {
            TriggerEvent::KeywordFound => !self.keyword_hits.is_empty(),
            TriggerEvent::PatternFound => !self.pattern_matches.is_empty(),
            TriggerEvent::AntiPatternFound => !self.anti_pattern_hits.is_empty(),
            TriggerEvent::Always => true,
        }
    }

    /// Whether a transition's condition predicate holds.
    pub fn condition_holds(&self, condition: Condition) -> bool {
        match condition {
            Condition::Always => true,
            Condition::MinPatternMatches(n) => self.pattern_matches.len() >= n,
            Condition::MinKeywordHits(n) => self.keyword_hits.len() >= n,
            Condition::MinCaptures(n) => self.capture_count() >= n,
        }
    }
}
