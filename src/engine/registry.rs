//! Rule registry: load, validate, and index rule definitions.
//!
//! The registry owns the immutable set of validated rules. Loading collects
//! per-source errors instead of aborting, so one malformed rule never takes
//! down the rest of the library; a load with zero valid sources yields an
//! empty registry, which is not an error.

use crate::rule::definition::RuleDefinition;
use crate::rule::source::RuleSource;
use crate::utils::error::{RulegateError, source_id_for};
use std::path::Path;
use std::sync::Arc;

/// Immutable, shared set of validated rules, ordered by rule id.
#[derive(Debug, Default)]
pub struct Registry {
    rules: Vec<Arc<RuleDefinition>>,
}

impl Registry {
    /// Build a registry from `(source_id, document_text)` pairs.
    ///
    /// Errors are collected per offending source and loading continues;
    /// callers decide whether a partially-loaded rule set is acceptable.
    pub fn load<I, S>(sources: I) -> (Self, Vec<RulegateError>)
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut rules: Vec<Arc<RuleDefinition>> = Vec::new();
        let mut errors = Vec::new();

        for (source_id, text) in sources {
            let source_id = source_id.as_ref();
            let parsed = RuleSource::parse(source_id, text.as_ref())
                .and_then(|source| RuleDefinition::compile(source_id, source));
            match parsed {
                Ok(rule) => {
                    if rules.iter().any(|existing| existing.id == rule.id) {
                        errors.push(RulegateError::Validation {
                            source_id: source_id.to_owned(),
                            message: format!("duplicate rule id '{}'", rule.id),
                            suggestion: "Rule ids must be unique across all loaded sources"
                                .to_owned(),
                        });
                        continue;
                    }
                    tracing::debug!(rule = %rule.id, source = source_id, "loaded rule");
                    rules.push(Arc::new(rule));
                }
                Err(e) => {
                    tracing::warn!(source = source_id, error = %e, "skipping rule source");
                    errors.push(e);
                }
            }
        }

        rules.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::info!(
            "Loaded {} rules ({} sources rejected)",
            rules.len(),
            errors.len()
        );
        (Self { rules }, errors)
    }

    /// Load every rule document (`.mdc`, `.md`, `.toml`) in a flat
    /// directory. Unreadable individual files are reported in the error
    /// list; an unreadable directory is fatal.
    pub fn load_dir(dir: &Path) -> Result<(Self, Vec<RulegateError>), RulegateError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("mdc" | "md" | "toml")
                    )
            })
            .collect();
        // read_dir order is platform-dependent; sort for deterministic
        // load order and error reporting.
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        let mut errors = Vec::new();
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(text) => sources.push((source_id_for(&path), text)),
                Err(e) => errors.push(RulegateError::parse(
                    &source_id_for(&path),
                    format!("failed to read file: {e}"),
                )),
            }
        }

        let (registry, mut load_errors) = Self::load(sources);
        errors.append(&mut load_errors);
        Ok((registry, errors))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules, rule-id ascending.
    pub fn rules(&self) -> &[Arc<RuleDefinition>] {
        &self.rules
    }

    pub fn get(&self, rule_id: &str) -> Option<&Arc<RuleDefinition>> {
        self.rules
            .binary_search_by(|rule| rule.id.as_str().cmp(rule_id))
            .ok()
            .and_then(|i| self.rules.get(i))
    }

    /// Rules whose keyword triggers plausibly match the request, rule-id
    /// ascending. A rule with no keywords is always a candidate: it can
    /// still match through its content patterns alone.
    pub fn candidates_for(&self, request_text: &str) -> Vec<Arc<RuleDefinition>> {
        let request_lower = request_text.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| {
                rule.keywords.is_empty()
                    || rule
                        .keywords
                        .iter()
                        .any(|kw| request_lower.contains(&kw.to_lowercase()))
            })
            .map(Arc::clone)
            .collect()
    }
}
