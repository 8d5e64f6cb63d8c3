//! The four notification templates.
//!
//! Marker wording is an exact-match contract with the sender's emails,
//! including the typographic apostrophe (’) and CRLF line endings.

use super::{Combinator, FieldRule, TemplateDef};

const RESULT_TEST_DATE: FieldRule = FieldRule {
    field_name: "test_date",
    pattern: r"Test date: (\d\d .* \d\d\d\d)\r\n",
};

const RESULT_NAME: FieldRule = FieldRule {
    field_name: "name",
    pattern: r"Dear (.* .*)\r\n",
};

pub const TEST_REGISTRATION: TemplateDef = TemplateDef {
    type_id: "TestRegistrationEmail",
    markers: &[r"Test kit barcode reference: .*", r"Kit registration confirmed"],
    combinator: Combinator::All,
    rules: &[
        FieldRule {
            field_name: "name",
            pattern: r"(.*)\r\n\r\n\r\nKit registration confirmed",
        },
        FieldRule {
            field_name: "pcr_test_kit_barcode_ref",
            pattern: r"Test kit barcode reference: (.*)\r\n",
        },
    ],
    static_fields: &[("test_type", "PCR")],
};

pub const POSITIVE_PCR_RESULT: TemplateDef = TemplateDef {
    type_id: "PositivePCRTestResultEmail",
    markers: &[
        r"Your recent coronavirus test has come back positive\.",
        r"Your coronavirus PCR test \(or other lab test\) result is positive\. It’s likely you had the virus when the test was done\.",
    ],
    combinator: Combinator::Any,
    rules: &[
        FieldRule {
            field_name: "name",
            pattern: r"(?:Dear |Hello )(.* .*)\r\n",
        },
        RESULT_TEST_DATE,
    ],
    static_fields: &[("result", "positive"), ("test_type", "PCR")],
};

pub const NEGATIVE_LATERAL_FLOW_RESULT: TemplateDef = TemplateDef {
    type_id: "NegativeLateralFlowTestResultEmail",
    markers: &[
        r"Your coronavirus lateral flow test result is negative. It’s likely you were not infectious when the test was done",
    ],
    combinator: Combinator::All,
    rules: &[RESULT_NAME, RESULT_TEST_DATE],
    static_fields: &[("result", "negative"), ("test_type", "Lateral Flow Test")],
};

pub const NEGATIVE_PCR_RESULT: TemplateDef = TemplateDef {
    type_id: "NegativePCRTestResultEmail",
    markers: &[
        r"Your coronavirus test result is negative\. It’s likely you did not have the virus when the test was done",
        r"Your recent coronavirus test has come back negative",
    ],
    combinator: Combinator::Any,
    rules: &[RESULT_NAME, RESULT_TEST_DATE],
    static_fields: &[("result", "negative"), ("test_type", "PCR")],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Template, TemplateKind};

    fn compiled(kind: TemplateKind) -> Template {
        match Template::compile(kind.definition()) {
            Ok(template) => template,
            Err(e) => panic!("{} should compile: {e}", kind.type_id()),
        }
    }

    #[test]
    fn registration_needs_both_markers() {
        let template = compiled(TemplateKind::TestRegistration);
        assert!(template.identify(
            "Test kit barcode reference: ABC123\r\n\r\nKit registration confirmed"
        ));
        assert!(!template.identify("Test kit barcode reference: ABC123\r\n"));
        assert!(!template.identify("Kit registration confirmed"));
    }

    #[test]
    fn positive_pcr_accepts_either_phrasing() {
        let template = compiled(TemplateKind::PositivePcrResult);
        assert!(template.identify("Your recent coronavirus test has come back positive."));
        assert!(template.identify(
            "Your coronavirus PCR test (or other lab test) result is positive. It’s likely you had the virus when the test was done."
        ));
        // straight apostrophe is a different sender wording
        assert!(!template.identify(
            "Your coronavirus PCR test (or other lab test) result is positive. It's likely you had the virus when the test was done."
        ));
    }

    #[test]
    fn negative_pcr_accepts_either_phrasing() {
        let template = compiled(TemplateKind::NegativePcrResult);
        assert!(template.identify("Your recent coronavirus test has come back negative"));
        assert!(template.identify(
            "Your coronavirus test result is negative. It’s likely you did not have the virus when the test was done"
        ));
        assert!(!template.identify("Your recent coronavirus test has come back positive."));
    }

    #[test]
    fn lateral_flow_marker_is_case_sensitive() {
        let template = compiled(TemplateKind::NegativeLateralFlowResult);
        assert!(template.identify(
            "Your coronavirus lateral flow test result is negative. It’s likely you were not infectious when the test was done."
        ));
        assert!(!template.identify(
            "your coronavirus lateral flow test result is negative. It’s likely you were not infectious when the test was done."
        ));
    }

    #[test]
    fn every_builtin_compiles() {
        for def in [
            TEST_REGISTRATION,
            POSITIVE_PCR_RESULT,
            NEGATIVE_LATERAL_FLOW_RESULT,
            NEGATIVE_PCR_RESULT,
        ] {
            assert!(Template::compile(&def).is_ok(), "{} failed", def.type_id);
        }
    }
}
