#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Template classification and field extraction for notification emails.
//!
//! Messages are matched against a closed set of hand-authored templates,
//! then the matched template's extraction rules turn the body into a flat
//! record. Records from every batch are merged into one column-complete
//! [`ResultSet`].

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod rules;
pub mod runner;
pub mod template;

pub use aggregate::{ResultAggregator, ResultSet};
pub use classifier::{ClassificationResult, TemplateRegistry};
pub use error::{Error, Result};
pub use message::{ExtractedRecord, RECEIVED_FORMAT, RawMessage};
pub use pipeline::{BatchReport, Diagnostic, DiagnosticKind, Outcome, Pipeline, SkipReason};
pub use ports::{MessageSource, RecordSink};
pub use rules::{ExtractionFailure, ExtractionRule};
pub use runner::{BatchRunner, BatchSpec};
pub use template::{Combinator, Template, TemplateDef, TemplateKind};
