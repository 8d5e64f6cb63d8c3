//! Message templates.
//!
//! A template pairs an identification predicate (marker patterns over the
//! raw body) with the extraction rules and static fields used to build a
//! record once the template is known to apply.

mod builtin;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::message::{ExtractedRecord, RawMessage};
use crate::rules::{self, ExtractionFailure, ExtractionRule};

pub use builtin::{
    NEGATIVE_LATERAL_FLOW_RESULT, NEGATIVE_PCR_RESULT, POSITIVE_PCR_RESULT, TEST_REGISTRATION,
};

/// Fields every record carries regardless of template.
pub const MESSAGE_FIELDS: [&str; 3] = ["date_email_received", "email_subject", "email_type"];

/// How marker patterns combine into the identification predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Every marker must be present.
    All,
    /// Any one marker is enough (synonymous phrasings).
    Any,
}

impl Combinator {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

/// A named pattern that isolates one field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field_name: &'static str,
    pub pattern: &'static str,
}

/// Uncompiled template definition.
#[derive(Debug, Clone, Copy)]
pub struct TemplateDef {
    pub type_id: &'static str,
    pub markers: &'static [&'static str],
    pub combinator: Combinator,
    pub rules: &'static [FieldRule],
    pub static_fields: &'static [(&'static str, &'static str)],
}

/// The closed set of built-in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    TestRegistration,
    PositivePcrResult,
    NegativeLateralFlowResult,
    NegativePcrResult,
}

impl TemplateKind {
    pub const ALL: [Self; 4] = [
        Self::TestRegistration,
        Self::PositivePcrResult,
        Self::NegativeLateralFlowResult,
        Self::NegativePcrResult,
    ];

    #[must_use]
    pub const fn definition(&self) -> &'static TemplateDef {
        match self {
            Self::TestRegistration => &TEST_REGISTRATION,
            Self::PositivePcrResult => &POSITIVE_PCR_RESULT,
            Self::NegativeLateralFlowResult => &NEGATIVE_LATERAL_FLOW_RESULT,
            Self::NegativePcrResult => &NEGATIVE_PCR_RESULT,
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> &'static str {
        self.definition().type_id
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_id() == s)
            .ok_or_else(|| format!("unknown template: {s}"))
    }
}

/// A compiled, immutable template.
#[derive(Debug, Clone)]
pub struct Template {
    type_id: &'static str,
    markers: Vec<Regex>,
    combinator: Combinator,
    rules: Vec<(&'static str, Regex)>,
    static_fields: &'static [(&'static str, &'static str)],
}

impl Template {
    /// Compile a definition.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] when a pattern does not compile, when
    /// there are no markers, or when two sources would write the same field.
    pub fn compile(def: &TemplateDef) -> Result<Self> {
        if def.markers.is_empty() {
            return Err(Error::Configuration(format!(
                "template {} has no identification markers",
                def.type_id
            )));
        }

        let markers = def
            .markers
            .iter()
            .map(|marker| Regex::new(marker))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let rules = def
            .rules
            .iter()
            .map(|rule| {
                let pattern = rules::compile(rule.field_name, rule.pattern)?;
                Ok((rule.field_name, pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut seen: Vec<&str> = MESSAGE_FIELDS.to_vec();
        let declared = def
            .rules
            .iter()
            .map(|rule| rule.field_name)
            .chain(def.static_fields.iter().map(|(field, _)| *field));
        for field in declared {
            if seen.contains(&field) {
                return Err(Error::Configuration(format!(
                    "template {} declares field `{field}` more than once",
                    def.type_id
                )));
            }
            seen.push(field);
        }

        Ok(Self {
            type_id: def.type_id,
            markers,
            combinator: def.combinator,
            rules,
            static_fields: def.static_fields,
        })
    }

    #[must_use]
    pub const fn type_id(&self) -> &'static str {
        self.type_id
    }

    #[must_use]
    pub const fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(Regex::as_str)
    }

    /// Whether this template applies to `body`.
    #[must_use]
    pub fn identify(&self, body: &str) -> bool {
        match self.combinator {
            Combinator::All => self.markers.iter().all(|marker| marker.is_match(body)),
            Combinator::Any => self.markers.iter().any(|marker| marker.is_match(body)),
        }
    }

    /// This template's rules bound to `text`.
    #[must_use]
    pub fn bind<'a>(&'a self, text: &'a str) -> Vec<ExtractionRule<'a>> {
        self.rules
            .iter()
            .map(|(field, pattern)| ExtractionRule::new(field, pattern, text))
            .collect()
    }

    /// Build a complete record from `message`.
    ///
    /// # Errors
    /// Returns the first field whose pattern did not match the body.
    pub fn extract(
        &self,
        message: &RawMessage,
    ) -> std::result::Result<ExtractedRecord, ExtractionFailure> {
        let mut record = ExtractedRecord::from(rules::evaluate(&self.bind(&message.body))?);

        record.insert("date_email_received", message.received_stamp());
        record.insert("email_subject", message.subject.as_str());
        record.insert("email_type", self.type_id);
        for (field, value) in self.static_fields {
            record.insert(*field, *value);
        }

        Ok(record)
    }

    /// Every field a successful extraction produces, sorted.
    #[must_use]
    pub fn declared_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self
            .rules
            .iter()
            .map(|(field, _)| *field)
            .chain(self.static_fields.iter().map(|(field, _)| *field))
            .chain(MESSAGE_FIELDS)
            .collect();
        fields.sort_unstable();
        fields
    }
}

// Type ids are unique within a registry.
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Template {}
