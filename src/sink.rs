//! Output sinks for lifecycle records.
//!
//! The generator has no dependency on any concrete sink: it writes through
//! [`RecordSink`]. Provided sinks: in-memory storage (tests, lookups by id),
//! CSV, JSON lines, a SQL insert script and a plain text table.

use std::io::Write;

use thiserror::Error;

use crate::types::{LifecycleRecord, OrderId};

/// Sink write failures. The generator never retries; callers replay instead.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for generated records.
pub trait RecordSink {
    fn write(&mut self, record: &LifecycleRecord) -> Result<(), SinkError>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write(&mut self, record: &LifecycleRecord) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Column order shared by the CSV header and the SQL insert list.
pub const COLUMNS: [&str; 11] = [
    "id",
    "side",
    "instrument",
    "status",
    "px_init",
    "px_fill",
    "volume_init",
    "volume_fill",
    "note",
    "tags",
    "date",
];

/// Keeps every record in memory, in emission order.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Vec<LifecycleRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_all(&self) -> &[LifecycleRecord] {
        &self.records
    }

    /// All records of one order, oldest first.
    pub fn find_by_id(&self, id: OrderId) -> Vec<&LifecycleRecord> {
        self.records.iter().filter(|r| r.id == id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<LifecycleRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &LifecycleRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// CSV with a header row; one row per record.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, record: &LifecycleRecord) -> Result<(), SinkError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write(&mut self, record: &LifecycleRecord) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// `INSERT` statements for loading into a relational table.
pub struct SqlSink<W: Write> {
    writer: W,
    table: String,
}

impl<W: Write> SqlSink<W> {
    pub const DEFAULT_TABLE: &'static str = "order_history";

    pub fn new(writer: W) -> Self {
        Self::with_table(writer, Self::DEFAULT_TABLE)
    }

    pub fn with_table(writer: W, table: impl Into<String>) -> Self {
        Self {
            writer,
            table: table.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl<W: Write> RecordSink for SqlSink<W> {
    fn write(&mut self, r: &LifecycleRecord) -> Result<(), SinkError> {
        writeln!(
            self.writer,
            "INSERT INTO {} ({}) VALUES ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {});",
            self.table,
            COLUMNS.join(", "),
            sql_quote(&r.id.to_hex()),
            sql_quote(r.side.as_str()),
            sql_quote(r.instrument.symbol()),
            sql_quote(r.status.as_str()),
            r.px_init,
            r.px_fill,
            r.volume_init,
            r.volume_fill,
            sql_quote(&r.note.to_string()),
            sql_quote(&r.tags),
            sql_quote(&r.date),
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Fixed-width text table for reading in a terminal.
pub struct TableSink<W: Write> {
    writer: W,
    header_written: bool,
}

const TABLE_WIDTHS: [usize; 11] = [12, 4, 10, 11, 10, 10, 11, 11, 7, 48, 23];

impl<W: Write> TableSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_row(&mut self, cells: [String; 11]) -> std::io::Result<()> {
        let line: Vec<String> = cells
            .iter()
            .zip(TABLE_WIDTHS)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        writeln!(self.writer, "{}", line.join(" | ").trim_end())
    }
}

impl<W: Write> RecordSink for TableSink<W> {
    fn write(&mut self, r: &LifecycleRecord) -> Result<(), SinkError> {
        if !self.header_written {
            self.write_row(COLUMNS.map(str::to_uppercase))?;
            self.header_written = true;
        }
        self.write_row([
            r.id.to_hex(),
            r.side.as_str().to_string(),
            r.instrument.symbol().to_string(),
            r.status.as_str().to_string(),
            r.px_init.to_string(),
            r.px_fill.to_string(),
            r.volume_init.to_string(),
            r.volume_fill.to_string(),
            r.note.to_string(),
            r.tags.clone(),
            r.date.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}
