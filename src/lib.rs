//! # Order History Generator
//!
//! Deterministic synthesis of trade-order lifecycle histories for tests and
//! demos. A handful of LCG seeds fully determine every order attribute and
//! every status record; the same configuration reproduces the same stream
//! bit for bit.
//!
//! ## Entry point
//!
//! Build a [`HistoryGenerator`] from a [`GeneratorConfig`] and iterate it, or
//! drain it into a [`RecordSink`] with [`HistoryGenerator::write_all`].
//!
//! ## Example
//!
//! ```rust
//! use order_history_gen::{GeneratorConfig, HistoryGenerator, RecordStatus};
//!
//! let config = GeneratorConfig { total_orders: 10, ..Default::default() };
//! let records: Vec<_> = HistoryGenerator::new(&config).unwrap().collect();
//! assert_eq!(records.len(), 36);
//! assert_eq!(records[0].id.to_string(), "0x10003");
//! assert_eq!(records[0].status, RecordStatus::InProcess);
//! ```
//!
//! ## Lower-level API
//!
//! [`OrderFactory`] yields orders without lifecycle expansion;
//! [`lifecycle::expand_order`] and [`SegmentPolicy`] expose the expansion rules.

pub mod config;
pub mod engine;
pub mod generators;
pub mod lcg;
pub mod lifecycle;
pub mod segment;
pub mod sink;
pub mod types;

pub use config::{ConfigError, GeneratorConfig, GeneratorParams, LoggingConfig, SegmentPercents};
pub use engine::{HistoryGenerator, OrderFactory};
pub use generators::{round_down_to_1000, Generator};
pub use lcg::{Lcg, LcgParams};
pub use lifecycle::OrderRecordCursor;
pub use segment::{Band, SegmentPolicy};
pub use sink::{CsvSink, JsonLinesSink, MemorySink, RecordSink, SinkError, SqlSink, TableSink};
pub use types::{
    Instrument, LifecycleRecord, Note, Order, OrderId, RecordStatus, Side, Tag, TerminalStatus,
};
