//! Raw rule document parsing.
//!
//! A rule ships as one document per rule: either a plain TOML file or a
//! Markdown/`.mdc` document that embeds the machine-readable fields in a
//! fenced ```toml block. Surrounding prose is ignored, and unknown fields
//! inside the TOML are ignored rather than fatal, so authors can keep
//! descriptive text next to the definition.

use crate::utils::error::RulegateError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Structured fields of one rule document, before compilation.
///
/// Field names match the authoring format one-to-one. Everything except
/// `id` and `states` is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSource {
    /// Unique rule identifier, stable across rule versions.
    pub id: String,
    /// Ordered state names; must include `idle` and `complete`.
    pub states: Vec<String>,
    /// Additional terminal states besides `complete` ("no issue found" exits).
    #[serde(default)]
    pub terminal_states: Vec<String>,
    #[serde(default)]
    pub triggers: TriggerSource,
    #[serde(default)]
    pub transitions: Vec<TransitionSource>,
    /// State name -> ordered action identifiers executed on entry.
    #[serde(default)]
    pub actions: BTreeMap<String, Vec<String>>,
    /// Guidance template rendered when the rule fires.
    pub guidance: Option<String>,
    #[serde(default)]
    pub severity: SeveritySource,
    pub category: Option<String>,
    #[serde(default)]
    pub examples: Vec<ExampleSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerSource {
    /// Case-insensitive substring phrases matched against request text.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions matched against content (or request text).
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Phrases naming the problem itself; recorded as separate evidence.
    #[serde(default)]
    pub anti_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionSource {
    pub from: String,
    pub to: String,
    /// Symbolic trigger event tag, e.g. `pattern_found`.
    pub event: String,
    /// Named condition predicate, e.g. `min_pattern_matches:8`.
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeveritySource {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExampleSource {
    pub bad: String,
    pub good: String,
}

impl RuleSource {
    /// Parse one rule document.
    ///
    /// `.mdc`/Markdown documents carry their definition in a fenced
    /// ```toml block; plain documents are parsed as TOML wholesale.
    pub fn parse(source_id: &str, text: &str) -> Result<Self, RulegateError> {
        let toml_text = extract_toml_fence(text).unwrap_or(text);

        toml::from_str(toml_text).map_err(|e| RulegateError::parse(source_id, e.to_string()))
    }
}

/// Extract the first fenced ```toml block from a Markdown document.
///
/// Returns `None` when the document has no such fence, in which case the
/// caller treats the whole document as TOML.
fn extract_toml_fence(text: &str) -> Option<&str> {
    let fence_start = text.find("```toml")?;
    let body_start = text[fence_start..].find('\n')? + fence_start + 1;
    let body_end = text[body_start..].find("```")? + body_start;
    Some(&text[body_start..body_end])
}
