//! Merging per-batch records into one column-normalized result set.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashSet;
use tracing::info;

use crate::error::{Error, Result};
use crate::message::ExtractedRecord;
use crate::pipeline::BatchReport;
use crate::ports::RecordSink;

/// Collects emitted records across batches.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Vec<ExtractedRecord>,
    batches: usize,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, report: BatchReport) {
        self.batches += 1;
        self.records.extend(report.records);
    }

    pub fn push(&mut self, record: ExtractedRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finalize the run.
    ///
    /// # Errors
    /// Returns [`Error::NothingProcessed`] when no record was emitted.
    pub fn finish(self) -> Result<ResultSet> {
        if self.records.is_empty() {
            return Err(Error::NothingProcessed);
        }

        let results = ResultSet::from_records(&self.records);
        info!(
            batches = self.batches,
            records = results.len(),
            columns = results.columns().len(),
            "Aggregated results"
        );
        Ok(results)
    }
}

/// Ordered rows over the union of every emitted field.
///
/// A field a record does not carry is `None`, never a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    /// Columns appear in the order they are first seen.
    #[must_use]
    pub fn from_records(records: &[ExtractedRecord]) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for field in records.iter().flat_map(ExtractedRecord::fields) {
            if seen.insert(field) {
                columns.push(field.to_string());
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(str::to_string))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Every value of `column`, `None` where absent.
    #[must_use]
    pub fn column(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(column)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(Option::as_deref))
                .collect(),
        )
    }

    /// Rename a column in place. Returns false if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(index) => {
                self.columns[index] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace every present value of `column` with `f(value)`.
    pub fn map_column<F>(&mut self, column: &str, f: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(index) = self.column_index(column) else {
            return;
        };
        for cell in self.rows.iter_mut().filter_map(|row| row.get_mut(index)) {
            if let Some(value) = cell.take() {
                *cell = f(&value);
            }
        }
    }

    /// Append a derived column, one value per row.
    ///
    /// Returns false and leaves the set unchanged when `values` does not
    /// have exactly one entry per row.
    pub fn push_column(
        &mut self,
        column: impl Into<String>,
        values: Vec<Option<String>>,
    ) -> bool {
        if values.len() != self.rows.len() {
            return false;
        }
        self.columns.push(column.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        true
    }

    /// Hand this result set to `sink`.
    ///
    /// # Errors
    /// Returns [`Error::Sink`] when the sink fails.
    pub fn write_to(&self, sink: &mut dyn RecordSink) -> Result<()> {
        sink.write(self).map_err(Error::Sink)
    }
}

/// Serialized as an array of objects with every column present.
impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Row<'a>(&'a [String], &'a [Option<String>]);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (column, value) in self.0.iter().zip(self.1) {
                    map.serialize_entry(column, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Row(&self.columns, row))?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> ExtractedRecord {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_run_reports_nothing_processed() {
        let aggregator = ResultAggregator::new();
        assert!(matches!(aggregator.finish(), Err(Error::NothingProcessed)));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn columns_are_union_with_explicit_nulls() {
        let mut aggregator = ResultAggregator::new();
        aggregator.push(record(&[("name", "A B"), ("pcr_test_kit_barcode_ref", "X1")]));
        aggregator.push(record(&[("name", "C D"), ("test_date", "01 May 2022")]));

        let results = aggregator.finish().expect("two records should aggregate");

        assert_eq!(
            results.columns(),
            &["name", "pcr_test_kit_barcode_ref", "test_date"]
        );
        assert_eq!(results.value(0, "test_date"), None);
        assert_eq!(results.value(1, "pcr_test_kit_barcode_ref"), None);
        assert!(results.rows().iter().all(|row| row.len() == 3));
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn serializes_absent_fields_as_null() {
        let results = ResultSet::from_records(&[
            record(&[("a", "1")]),
            record(&[("b", "2")]),
        ]);
        let json = serde_json::to_string(&results).expect("result set should serialize");
        assert_eq!(json, r#"[{"a":"1","b":null},{"a":null,"b":"2"}]"#);
    }

    #[test]
    fn map_and_rename_columns() {
        let mut results = ResultSet::from_records(&[record(&[("n", "3")])]);
        results.map_column("n", |v| Some(format!("{v}!")));
        assert!(results.rename_column("n", "Number"));
        assert!(!results.rename_column("missing", "x"));
        assert_eq!(results.value(0, "Number"), Some("3!"));
    }

    #[test]
    fn push_column_rejects_wrong_row_count() {
        let mut results =
            ResultSet::from_records(&[record(&[("n", "1")]), record(&[("n", "2")])]);

        assert!(!results.push_column("week", vec![Some("5".to_string())]));
        assert_eq!(results.columns(), &["n"]);
        assert!(results.rows().iter().all(|row| row.len() == 1));
        assert_eq!(results.column("n"), Some(vec![Some("1"), Some("2")]));

        assert!(results.push_column("week", vec![Some("5".to_string()), None]));
        assert_eq!(results.column("week"), Some(vec![Some("5"), None]));
    }
}
