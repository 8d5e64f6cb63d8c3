use serde_json::json;
use std::path::PathBuf;

use crate::mailbox::read_message;
use covmail_core::{Diagnostic, Outcome};

/// Input parameters for the Classify command strategy.
#[derive(Debug, Clone)]
pub struct ClassifyInput {
    pub file: PathBuf,
    pub site: Option<String>,
}

/// Strategy for triaging a single message.
///
/// Prints every template's identification result and the final outcome as
/// JSON, so an operator can see why a message was skipped.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyStrategy;

impl super::CommandStrategy for ClassifyStrategy {
    type Input = ClassifyInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let message = read_message(&input.file)?;
        let pipeline = super::builtin_pipeline()?;

        let identification: serde_json::Map<String, serde_json::Value> = pipeline
            .registry()
            .identification_results(&message.body)
            .into_iter()
            .map(|(id, matched)| (id.to_string(), json!(matched)))
            .collect();

        let outcome = match &input.site {
            Some(site) => pipeline.process(&message, site),
            None => pipeline.evaluate(&message),
        };

        let diagnostic = match &outcome {
            Outcome::Skipped(reason) => {
                let diagnostic = Diagnostic::new(reason, &message, input.site.as_deref());
                diagnostic.emit();
                Some(diagnostic)
            }
            Outcome::Emitted(_) => None,
        };

        let report = json!({
            "subject": message.subject,
            "identification": identification,
            "outcome": outcome,
            "diagnostic": diagnostic,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
