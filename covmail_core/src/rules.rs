//! Rule engine: evaluates named regex rules against message text.
//!
//! Evaluation is all-or-nothing. The first rule that fails to match stops
//! evaluation and is reported back to the caller; no partial mapping is ever
//! returned.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};

/// A rule bound to the text it is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule<'a> {
    pub field_name: &'a str,
    pub pattern: &'a Regex,
    pub source_text: &'a str,
}

impl<'a> ExtractionRule<'a> {
    #[must_use]
    pub const fn new(field_name: &'a str, pattern: &'a Regex, source_text: &'a str) -> Self {
        Self {
            field_name,
            pattern,
            source_text,
        }
    }

    /// First-occurrence match of this rule's pattern.
    ///
    /// A pattern with one capture group yields that group, otherwise the
    /// whole match is used. A group that did not take part in the match is
    /// no value.
    #[must_use]
    pub fn find(&self) -> Option<&'a str> {
        let caps = self.pattern.captures(self.source_text)?;
        let group = usize::from(self.pattern.captures_len() > 1);
        caps.get(group).map(|m| m.as_str())
    }
}

/// A required field could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("could not extract `{field_name}` from message text")]
pub struct ExtractionFailure {
    pub field_name: String,
    pub source_text: String,
}

/// Compile a field pattern the way the rule engine expects it.
///
/// Patterns are multiline-aware and may carry at most one capture group so
/// the canonical value is never ambiguous.
pub fn compile(field_name: &str, pattern: &str) -> Result<Regex> {
    let regex = RegexBuilder::new(pattern).multi_line(true).build()?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() > 2 {
        return Err(Error::Configuration(format!(
            "pattern for `{field_name}` has {} capture groups, expected at most one",
            regex.captures_len() - 1
        )));
    }

    Ok(regex)
}

/// Evaluate rules in declaration order.
///
/// # Errors
/// Returns the first rule whose pattern does not match; later rules are not
/// evaluated.
pub fn evaluate(
    rules: &[ExtractionRule<'_>],
) -> std::result::Result<BTreeMap<String, String>, ExtractionFailure> {
    let mut extracted = BTreeMap::new();

    for rule in rules {
        let Some(value) = rule.find() else {
            debug!(
                field = rule.field_name,
                "could not extract value, stopping evaluation"
            );
            return Err(ExtractionFailure {
                field_name: rule.field_name.to_string(),
                source_text: rule.source_text.to_string(),
            });
        };
        extracted.insert(rule.field_name.to_string(), value.to_string());
    }

    Ok(extracted)
}
