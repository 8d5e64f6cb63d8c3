//! Record sinks for the final result set.

use anyhow::Context;
use covmail_core::{RecordSink, ResultSet};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn sink(self, path: &Path) -> anyhow::Result<Box<dyn RecordSink>> {
        let file = File::create(path)
            .with_context(|| format!("Could not create output file {}", path.display()))?;
        let writer = BufWriter::new(file);
        let sink: Box<dyn RecordSink> = match self {
            Self::Csv => Box::new(CsvSink::new(writer)),
            Self::Json => Box::new(JsonSink::new(writer)),
        };
        Ok(sink)
    }
}

/// RFC 4180 CSV with a header row; absent values are empty cells.
pub struct CsvSink<W> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }

    fn write_row<'a, I>(&mut self, cells: I) -> std::io::Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let line = cells
            .into_iter()
            .map(escape)
            .collect::<Vec<_>>()
            .join(",");
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r\n")
    }
}

fn escape(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, results: &ResultSet) -> anyhow::Result<()> {
        self.write_row(results.columns().iter().map(String::as_str))?;
        for row in results.rows() {
            self.write_row(row.iter().map(|cell| cell.as_deref().unwrap_or_default()))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON array of objects; absent values are `null`.
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write(&mut self, results: &ResultSet) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, results)?;
        self.writer.flush()?;
        Ok(())
    }
}
