//! Optional presentation layer over a [`ResultSet`].
//!
//! None of this is part of extraction: it parses the date columns, derives
//! ISO calendar-week columns and swaps field names for human-readable labels.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

use crate::aggregate::ResultSet;
use crate::message::RECEIVED_FORMAT;

/// Format of the extracted `test_date` field.
pub const TEST_DATE_FORMAT: &str = "%d %B %Y";

/// Output format for both date columns.
pub const REPORT_DATE_FORMAT: &str = "%Y/%m/%d";

pub const RECEIVED_WEEK_COLUMN: &str = "email_received_in_week_num";
pub const TEST_WEEK_COLUMN: &str = "test_date_occured_in_week_num";

/// Field name to report label.
pub const COLUMN_LABELS: [(&str, &str); 11] = [
    ("name", "Testee Name"),
    ("pcr_test_kit_barcode_ref", "PCR Test Kit Barcode"),
    ("date_email_received", "Date Email Received"),
    ("email_subject", "Email Subject"),
    ("site_name", "Site Name"),
    ("test_date", "Test Date"),
    ("result", "Test Result"),
    ("email_type", "Email Type"),
    ("test_type", "Test Type"),
    (RECEIVED_WEEK_COLUMN, "Calendar Week Email Was Received In"),
    (TEST_WEEK_COLUMN, "Calendar Week Test Occurred In"),
];

#[must_use]
pub fn parse_test_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, TEST_DATE_FORMAT).ok()
}

#[must_use]
pub fn parse_received(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, RECEIVED_FORMAT).ok()
}

/// Parse every value of `column` with `parse`, returning its ISO week.
fn week_numbers<F>(results: &ResultSet, column: &str, parse: F) -> Vec<Option<String>>
where
    F: Fn(&str) -> Option<NaiveDate>,
{
    results.column(column).map_or_else(
        || vec![None; results.len()],
        |values| {
            values
                .into_iter()
                .map(|value| value.and_then(&parse).map(|d| d.iso_week().week().to_string()))
                .collect()
        },
    )
}

/// Append the two calendar-week columns.
pub fn add_calendar_weeks(results: &mut ResultSet) {
    let received = week_numbers(results, "date_email_received", |v| {
        parse_received(v).map(|dt| dt.date_naive())
    });
    let tested = week_numbers(results, "test_date", parse_test_date);

    results.push_column(RECEIVED_WEEK_COLUMN, received);
    results.push_column(TEST_WEEK_COLUMN, tested);
}

/// Render both date columns as [`REPORT_DATE_FORMAT`]; unparseable values
/// become null.
pub fn format_dates(results: &mut ResultSet) {
    results.map_column("date_email_received", |v| {
        parse_received(v).map(|dt| dt.format(REPORT_DATE_FORMAT).to_string())
    });
    results.map_column("test_date", |v| {
        parse_test_date(v).map(|d| d.format(REPORT_DATE_FORMAT).to_string())
    });
}

pub fn apply_labels(results: &mut ResultSet) {
    for (field, label) in COLUMN_LABELS {
        results.rename_column(field, label);
    }
}

/// Weeks first, since they read the raw date values.
#[must_use]
pub fn post_process(mut results: ResultSet) -> ResultSet {
    add_calendar_weeks(&mut results);
    format_dates(&mut results);
    apply_labels(&mut results);
    results
}
