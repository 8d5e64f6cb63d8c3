//! Per-message orchestration: classify, extract, label, emit or skip.
//!
//! Every failure is a value. One bad message never aborts its batch.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};

use crate::classifier::{ClassificationResult, TemplateRegistry};
use crate::message::{ExtractedRecord, RawMessage};
use crate::rules::ExtractionFailure;

/// Field carrying the batch's context label on every emitted record.
pub const CONTEXT_FIELD: &str = "site_name";

/// Why a message produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoMatch,
    Ambiguous {
        template_ids: Vec<String>,
    },
    ExtractionFailed {
        template_id: String,
        #[serde(flatten)]
        failure: ExtractionFailure,
    },
}

/// Terminal state of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Emitted(ExtractedRecord),
    Skipped(SkipReason),
}

impl Outcome {
    #[must_use]
    pub const fn record(&self) -> Option<&ExtractedRecord> {
        match self {
            Self::Emitted(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    ClassificationNoMatch,
    ClassificationAmbiguous,
    ExtractionFailure,
}

impl DiagnosticKind {
    /// Ambiguity points at overlapping templates, so it outranks data issues.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::ClassificationAmbiguous => Level::ERROR,
            Self::ClassificationNoMatch | Self::ExtractionFailure => Level::WARN,
        }
    }
}

/// Structured description of a skipped message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub subject: String,
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub template_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searched_text: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(reason: &SkipReason, message: &RawMessage, context_label: Option<&str>) -> Self {
        let mut diagnostic = Self {
            kind: DiagnosticKind::ClassificationNoMatch,
            subject: message.subject.clone(),
            received_at: message.received_stamp(),
            context_label: context_label.map(str::to_string),
            template_ids: Vec::new(),
            field_name: None,
            searched_text: None,
        };

        match reason {
            SkipReason::NoMatch => {}
            SkipReason::Ambiguous { template_ids } => {
                diagnostic.kind = DiagnosticKind::ClassificationAmbiguous;
                diagnostic.template_ids.clone_from(template_ids);
            }
            SkipReason::ExtractionFailed {
                template_id,
                failure,
            } => {
                diagnostic.kind = DiagnosticKind::ExtractionFailure;
                diagnostic.template_ids = vec![template_id.clone()];
                diagnostic.field_name = Some(failure.field_name.clone());
                diagnostic.searched_text = Some(failure.source_text.clone());
            }
        }

        diagnostic
    }

    /// Log this diagnostic at its kind's level.
    pub fn emit(&self) {
        let site = self.context_label.as_deref().unwrap_or_default();
        match self.kind {
            DiagnosticKind::ClassificationNoMatch => warn!(
                site,
                subject = %self.subject,
                received_at = %self.received_at,
                "Could not match an email template, skipping email"
            ),
            DiagnosticKind::ClassificationAmbiguous => error!(
                site,
                subject = %self.subject,
                received_at = %self.received_at,
                templates = ?self.template_ids,
                "Two or more templates matched one email, marker patterns overlap"
            ),
            DiagnosticKind::ExtractionFailure => warn!(
                site,
                subject = %self.subject,
                templates = ?self.template_ids,
                field = self.field_name.as_deref().unwrap_or_default(),
                text_used = self.searched_text.as_deref().unwrap_or_default(),
                "Could not extract values from email, skipping email"
            ),
        }
    }
}

/// Result of running one batch of messages.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub context_label: String,
    pub fetched: usize,
    /// Emitted records, in input order.
    pub records: Vec<ExtractedRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.fetched - self.records.len()
    }
}

/// Stateless per-message driver over a template registry.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> Pipeline<'r> {
    #[must_use]
    pub const fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &'r TemplateRegistry {
        self.registry
    }

    /// Classify and extract without attaching a context label.
    #[must_use]
    pub fn evaluate(&self, message: &RawMessage) -> Outcome {
        match self.registry.classify(message) {
            ClassificationResult::NoMatch => Outcome::Skipped(SkipReason::NoMatch),
            ClassificationResult::Ambiguous(ids) => Outcome::Skipped(SkipReason::Ambiguous {
                template_ids: ids.into_iter().map(str::to_string).collect(),
            }),
            ClassificationResult::Matched(template) => match template.extract(message) {
                Ok(record) => Outcome::Emitted(record),
                Err(failure) => Outcome::Skipped(SkipReason::ExtractionFailed {
                    template_id: template.type_id().to_string(),
                    failure,
                }),
            },
        }
    }

    /// Full per-message flow; emitted records carry `context_label`.
    #[must_use]
    pub fn process(&self, message: &RawMessage, context_label: &str) -> Outcome {
        match self.evaluate(message) {
            Outcome::Emitted(mut record) => {
                record.insert(CONTEXT_FIELD, context_label);
                Outcome::Emitted(record)
            }
            skipped @ Outcome::Skipped(_) => skipped,
        }
    }

    /// Process a batch in parallel, keeping input order in the report.
    #[must_use]
    pub fn run_batch(&self, context_label: &str, messages: &[RawMessage]) -> BatchReport {
        info!(
            site = context_label,
            count = messages.len(),
            "Extracting values from emails"
        );

        // indexed collect keeps input order
        let outcomes: Vec<Outcome> = messages
            .par_iter()
            .map(|message| self.process(message, context_label))
            .collect();

        let mut report = BatchReport {
            context_label: context_label.to_string(),
            fetched: messages.len(),
            ..BatchReport::default()
        };

        for (message, outcome) in messages.iter().zip(outcomes) {
            match outcome {
                Outcome::Emitted(record) => {
                    debug!(
                        subject = %message.subject,
                        email_type = record.get("email_type").unwrap_or_default(),
                        "Extracted contents of email"
                    );
                    report.records.push(record);
                }
                Outcome::Skipped(reason) => {
                    let diagnostic = Diagnostic::new(&reason, message, Some(context_label));
                    diagnostic.emit();
                    report.diagnostics.push(diagnostic);
                }
            }
        }

        info!(
            site = context_label,
            extracted = report.records.len(),
            "Successfully extracted values"
        );
        if report.failed() > 0 {
            warn!(
                site = context_label,
                failed = report.failed(),
                "Failed to extract values for some emails"
            );
        }

        report
    }
}
