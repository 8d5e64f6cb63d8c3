//! Integration tests for classification and extraction over the built-in
//! templates.
//!
//! These tests verify that:
//! - one sample per template is claimed by exactly that template
//! - extraction yields exactly the declared field set, or nothing
//! - overlapping markers are surfaced as ambiguity, not resolved

use chrono::DateTime;
use covmail_core::pipeline::CONTEXT_FIELD;
use covmail_core::{
    ClassificationResult, DiagnosticKind, Outcome, Pipeline, RawMessage, SkipReason,
    TemplateKind, TemplateRegistry,
};
use tracing::Level;

const REGISTRATION_BODY: &str = "Jane Doe\r\n\r\n\r\nKit registration confirmed\r\n\r\nTest kit barcode reference: ABC123\r\n\r\nThank you for registering your kit.\r\n";

const POSITIVE_PCR_BODY: &str = "Dear Jane Doe\r\n\r\nTest date: 04 January 2022\r\n\r\nYour recent coronavirus test has come back positive.\r\n";

const POSITIVE_PCR_HELLO_BODY: &str = "Hello Sam Patel\r\n\r\nTest date: 15 February 2022\r\n\r\nYour coronavirus PCR test (or other lab test) result is positive. It’s likely you had the virus when the test was done.\r\n";

const NEGATIVE_LFD_BODY: &str = "Dear John Roe\r\n\r\nTest date: 10 February 2022\r\n\r\nYour coronavirus lateral flow test result is negative. It’s likely you were not infectious when the test was done.\r\n";

const NEGATIVE_PCR_BODY: &str = "Dear Ann Lee\r\n\r\nTest date: 11 March 2022\r\n\r\nYour coronavirus test result is negative. It’s likely you did not have the virus when the test was done.\r\n";

fn registry() -> &'static TemplateRegistry {
    match TemplateRegistry::builtin() {
        Ok(registry) => registry,
        Err(e) => panic!("built-in registry should compile: {e}"),
    }
}

fn message(body: &str) -> RawMessage {
    let Ok(at) = DateTime::parse_from_rfc3339("2022-01-05T09:12:00+00:00") else {
        panic!("valid timestamp should parse");
    };
    RawMessage::new("NHS Test and Trace", body, at)
}

fn corpus() -> [(TemplateKind, &'static str); 5] {
    [
        (TemplateKind::TestRegistration, REGISTRATION_BODY),
        (TemplateKind::PositivePcrResult, POSITIVE_PCR_BODY),
        (TemplateKind::PositivePcrResult, POSITIVE_PCR_HELLO_BODY),
        (TemplateKind::NegativeLateralFlowResult, NEGATIVE_LFD_BODY),
        (TemplateKind::NegativePcrResult, NEGATIVE_PCR_BODY),
    ]
}

#[test]
fn test_each_sample_matches_exactly_one_template() {
    let registry = registry();

    for (kind, body) in corpus() {
        let claimed: Vec<&str> = registry
            .identification_results(body)
            .into_iter()
            .filter_map(|(id, matched)| matched.then_some(id))
            .collect();
        assert_eq!(claimed, vec![kind.type_id()], "sample for {}", kind.type_id());
    }
}

#[test]
fn test_no_false_positives_without_markers() {
    let registry = registry();
    let bodies = [
        "Dear Jane Doe\r\nTest date: 04 January 2022\r\nYour appointment is confirmed.\r\n",
        "Test kit barcode reference: ABC123\r\n",
        "YOUR RECENT CORONAVIRUS TEST HAS COME BACK POSITIVE.",
        "",
    ];

    for body in bodies {
        assert_eq!(
            registry.classify(&message(body)),
            ClassificationResult::NoMatch,
            "body {body:?}"
        );
    }
}

#[test]
fn test_extracted_records_have_exactly_declared_fields() {
    let registry = registry();

    for (kind, body) in corpus() {
        let template = match registry.classify(&message(body)) {
            ClassificationResult::Matched(template) => template,
            other => panic!("{} should match, got {other:?}", kind.type_id()),
        };
        let record = match template.extract(&message(body)) {
            Ok(record) => record,
            Err(e) => panic!("{} should extract: {e}", kind.type_id()),
        };

        let fields: Vec<&str> = record.fields().collect();
        assert_eq!(fields, template.declared_fields());
    }
}

#[test]
fn test_classify_and_extract_is_idempotent() {
    let pipeline = Pipeline::new(registry());

    for (_, body) in corpus() {
        let msg = message(body);
        let first = serde_json::to_string(&pipeline.process(&msg, "Central"));
        let second = serde_json::to_string(&pipeline.process(&msg, "Central"));
        assert!(first.is_ok());
        assert_eq!(first.ok(), second.ok());
    }
}

#[test]
fn test_scenario_a_registration() {
    let msg = message(REGISTRATION_BODY);
    let outcome = Pipeline::new(registry()).evaluate(&msg);

    let Outcome::Emitted(record) = outcome else {
        panic!("registration should extract, got {outcome:?}");
    };
    assert_eq!(record.get("email_type"), Some("TestRegistrationEmail"));
    assert_eq!(record.get("pcr_test_kit_barcode_ref"), Some("ABC123"));
    assert_eq!(record.get("name"), Some("Jane Doe"));
    assert_eq!(record.get("test_type"), Some("PCR"));
    assert_eq!(record.get("date_email_received"), Some("2022-01-05 09:12:00+00:00"));
    assert_eq!(record.get("email_subject"), Some("NHS Test and Trace"));
    assert_eq!(record.get("result"), None);
}

#[test]
fn test_scenario_b_positive_pcr() {
    let outcome = Pipeline::new(registry()).process(&message(POSITIVE_PCR_BODY), "Central");

    let Outcome::Emitted(record) = outcome else {
        panic!("positive result should extract, got {outcome:?}");
    };
    assert_eq!(record.get("email_type"), Some("PositivePCRTestResultEmail"));
    assert_eq!(record.get("name"), Some("Jane Doe"));
    assert_eq!(record.get("test_date"), Some("04 January 2022"));
    assert_eq!(record.get("result"), Some("positive"));
    assert_eq!(record.get(CONTEXT_FIELD), Some("Central"));
}

#[test]
fn test_positive_pcr_accepts_hello_greeting() {
    let outcome = Pipeline::new(registry()).evaluate(&message(POSITIVE_PCR_HELLO_BODY));
    assert_eq!(outcome.record().and_then(|r| r.get("name")), Some("Sam Patel"));
}

#[test]
fn test_hello_greeting_only_counts_for_positive_pcr() {
    let body = NEGATIVE_PCR_BODY.replace("Dear ", "Hello ");
    let outcome = Pipeline::new(registry()).evaluate(&message(&body));

    let Outcome::Skipped(SkipReason::ExtractionFailed { failure, .. }) = outcome else {
        panic!("negative result without Dear should fail, got {outcome:?}");
    };
    assert_eq!(failure.field_name, "name");
}

#[test]
fn test_scenario_c_overlapping_markers_are_ambiguous() {
    let body = format!("{REGISTRATION_BODY}Your recent coronavirus test has come back positive.\r\n");
    let msg = message(&body);

    let ClassificationResult::Ambiguous(ids) = registry().classify(&msg) else {
        panic!("overlapping markers should be ambiguous");
    };
    assert_eq!(ids, vec!["TestRegistrationEmail", "PositivePCRTestResultEmail"]);

    let report = Pipeline::new(registry()).run_batch("Central", &[msg]);
    assert!(report.records.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::ClassificationAmbiguous
    );
    assert_eq!(report.diagnostics[0].kind.level(), Level::ERROR);
}

#[test]
fn test_scenario_d_missing_name_skips_message() {
    let body = "Test date: 10 February 2022\r\n\r\nYour coronavirus lateral flow test result is negative. It’s likely you were not infectious when the test was done.\r\n";
    let msg = message(body);

    assert_eq!(
        registry().classify(&msg).template_id(),
        Some("NegativeLateralFlowTestResultEmail")
    );

    let report = Pipeline::new(registry()).run_batch("Central", &[msg]);
    assert!(report.records.is_empty());
    assert_eq!(report.failed(), 1);

    let diagnostic = &report.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::ExtractionFailure);
    assert_eq!(diagnostic.field_name.as_deref(), Some("name"));
    assert_eq!(diagnostic.searched_text.as_deref(), Some(body));
    assert_eq!(diagnostic.kind.level(), Level::WARN);
}

#[test]
fn test_first_failing_rule_wins_and_nothing_leaks() {
    // name and test_date both missing; name is declared first
    let body = "Your recent coronavirus test has come back negative\r\n";
    let outcome = Pipeline::new(registry()).evaluate(&message(body));

    assert_eq!(outcome.record(), None);
    let Outcome::Skipped(SkipReason::ExtractionFailed {
        template_id,
        failure,
    }) = outcome
    else {
        panic!("extraction should fail");
    };
    assert_eq!(template_id, "NegativePCRTestResultEmail");
    assert_eq!(failure.field_name, "name");
}

#[test]
fn test_missing_test_date_fails_on_test_date() {
    let body = "Dear Ann Lee\r\n\r\nYour recent coronavirus test has come back negative\r\n";
    let outcome = Pipeline::new(registry()).evaluate(&message(body));

    let Outcome::Skipped(SkipReason::ExtractionFailed { failure, .. }) = outcome else {
        panic!("extraction should fail");
    };
    assert_eq!(failure.field_name, "test_date");
}
