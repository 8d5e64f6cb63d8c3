//! Raw input messages and the flat records extracted from them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendering used for the `date_email_received` field.
pub const RECEIVED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// A notification email as handed over by a message source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub subject: String,
    /// Plain-text body with CRLF line endings.
    pub body: String,
    pub received_at: DateTime<FixedOffset>,
}

impl RawMessage {
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            received_at,
        }
    }

    /// The receive timestamp in [`RECEIVED_FORMAT`].
    #[must_use]
    pub fn received_stamp(&self) -> String {
        self.received_at.format(RECEIVED_FORMAT).to_string()
    }
}

/// Field name to value mapping produced by a successful extraction.
///
/// Keys are kept sorted so two extractions of the same message serialize
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord(BTreeMap<String, String>);

impl ExtractedRecord {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for ExtractedRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for ExtractedRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
