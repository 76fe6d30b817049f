//! Generation facade.
//!
//! [`OrderFactory`] derives one [`Order`] per id step; [`HistoryGenerator`]
//! walks the whole population and yields lifecycle records lazily, order by
//! order and record by record. Everything is a strictly sequential fold over
//! owned generator state.

use log::{debug, info};

use crate::config::{ConfigError, GeneratorConfig, GeneratorParams};
use crate::generators::{
    DateGenerator, Generator, IdGenerator, InstrumentGenerator, NoteGenerator, PxFillGenerator,
    PxInitGenerator, SideGenerator, StatusGenerator, TagGenerator, VolumeFillGenerator,
    VolumeInitGenerator,
};
use crate::lifecycle::{record_at, OrderRecordCursor};
use crate::segment::{Band, SegmentPolicy};
use crate::sink::{RecordSink, SinkError};
use crate::types::{LifecycleRecord, Order};

/// Log a progress line every this many orders.
const PROGRESS_EVERY: u64 = 1000;

/// All id-driven attribute generators, called in a fixed order per order.
#[derive(Clone, Debug)]
pub struct OrderFactory {
    id: IdGenerator,
    side: SideGenerator,
    instrument: InstrumentGenerator,
    status: StatusGenerator,
    px_init: PxInitGenerator,
    px_fill: PxFillGenerator,
    volume_init: VolumeInitGenerator,
    volume_fill: VolumeFillGenerator,
    note: NoteGenerator,
    tags: TagGenerator,
}

impl OrderFactory {
    pub fn new(params: &GeneratorParams) -> Self {
        Self {
            id: IdGenerator::new(params.id),
            side: SideGenerator::new(params.side),
            instrument: InstrumentGenerator::new(params.instrument),
            status: StatusGenerator::new(params.status),
            px_init: PxInitGenerator,
            px_fill: PxFillGenerator::new(params.px_fill),
            volume_init: VolumeInitGenerator::new(params.volume_init),
            volume_fill: VolumeFillGenerator::new(params.volume_fill),
            note: NoteGenerator::new(params.note),
            tags: TagGenerator::new(params.tags),
        }
    }

    /// Advances the id chain one step and derives the next order.
    pub fn next_order(&mut self) -> Order {
        let id = self.id.generate(());
        let seed = id.normalized_seed();
        let side = self.side.generate(seed);
        let instrument = self.instrument.generate(seed);
        let terminal_status = self.status.generate(seed);
        let px_init = self.px_init.generate((side, instrument));
        let px_fill = self.px_fill.generate((seed, px_init, terminal_status));
        let volume_init = self.volume_init.generate(seed);
        let volume_fill = self
            .volume_fill
            .generate((seed, volume_init, terminal_status));
        let note = self.note.generate(seed);
        let tags = self.tags.generate(());
        Order {
            id,
            side,
            instrument,
            terminal_status,
            px_init,
            px_fill,
            volume_init,
            volume_fill,
            note,
            tags,
        }
    }

    /// Returns exactly `n` orders. Advances the factory state.
    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }
}

/// Deterministic lifecycle-record stream for a validated configuration.
///
/// Same config ⇒ same records, so a failed write can be retried by building a
/// fresh generator and replaying.
#[derive(Clone, Debug)]
pub struct HistoryGenerator {
    factory: OrderFactory,
    dates: DateGenerator,
    policy: SegmentPolicy,
    cursor: OrderRecordCursor,
    current: Option<Order>,
    last_band: Option<Band>,
}

impl HistoryGenerator {
    /// Validates `config` and builds the stream. No record is produced on error.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let start = config.start_date()?;
        let params = &config.generators;
        let policy = SegmentPolicy::new(config.total_orders, config.segments);
        info!(
            "history generator ready total_orders={} bands={:?} total_records={}",
            config.total_orders,
            policy.band_sizes(),
            policy.total_records()
        );
        Ok(Self {
            factory: OrderFactory::new(params),
            dates: DateGenerator::new(&params.date, start),
            policy,
            cursor: OrderRecordCursor::new(),
            current: None,
            last_band: None,
        })
    }

    pub fn policy(&self) -> &SegmentPolicy {
        &self.policy
    }

    pub fn orders_generated(&self) -> u64 {
        self.cursor.orders_started()
    }

    pub fn records_emitted(&self) -> u64 {
        self.cursor.records_emitted()
    }

    /// Drains the remaining stream into `sink`. Returns the number of records written.
    pub fn write_all<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<u64, SinkError> {
        let mut written = 0u64;
        for record in self.by_ref() {
            sink.write(&record)?;
            written += 1;
        }
        sink.finish()?;
        info!(
            "generation finished orders={} records={}",
            self.orders_generated(),
            written
        );
        Ok(written)
    }

    fn start_next_order(&mut self) -> bool {
        if self.cursor.orders_started() >= self.policy.total_orders() {
            self.current = None;
            return false;
        }
        let band = self.cursor.begin_order(&self.policy);
        if self.last_band != Some(band) {
            debug!(
                "band change band={:?} order_index={} records_emitted={}",
                band,
                self.cursor.orders_started() - 1,
                self.cursor.records_emitted()
            );
            self.last_band = Some(band);
        }
        let order = self.factory.next_order();
        let started = self.cursor.orders_started();
        if started % PROGRESS_EVERY == 0 {
            debug!(
                "generated orders={} records={}",
                started,
                self.cursor.records_emitted()
            );
        }
        self.current = Some(order);
        true
    }
}

impl Iterator for HistoryGenerator {
    type Item = LifecycleRecord;

    fn next(&mut self) -> Option<LifecycleRecord> {
        loop {
            if let (Some(order), Some((band, offset))) = (&self.current, self.cursor.position()) {
                let record = record_at(order, band, offset, self.dates.generate(()));
                self.cursor.advance();
                return Some(record);
            }
            if !self.start_next_order() {
                return None;
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .policy
            .total_records()
            .saturating_sub(self.cursor.records_emitted());
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::types::{Instrument, OrderId, RecordStatus, Side, TerminalStatus};
    use rust_decimal::Decimal;

    fn init_log() {
        let _ = env_logger::try_init();
    }

    #[test]
    fn first_order_matches_reference_values() {
        let mut factory = OrderFactory::new(&GeneratorParams::default());
        let order = factory.next_order();
        assert_eq!(order.id, OrderId(65539));
        assert_eq!(order.id.to_string(), "0x10003");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.instrument, Instrument::AudJpy);
        assert_eq!(order.terminal_status, TerminalStatus::Fill);
        assert_eq!(order.px_init, Decimal::new(8000315, 5));
        assert_eq!(order.px_fill.to_string(), "80.00349");
        assert_eq!(order.volume_init, 971_000);
        assert_eq!(order.volume_fill, 971_000);
        assert_eq!(order.note.to_string(), "NOTE 9");
        assert_eq!(order.tags, "TRADE, DISTANCE TRADE, SPECIAL TRADE");
    }

    #[test]
    fn later_orders_cover_partial_fill_and_cancel() {
        let mut factory = OrderFactory::new(&GeneratorParams::default());
        let orders = factory.take_orders(5);
        assert_eq!(orders[3].id.to_string(), "0x6c0051");
        assert_eq!(orders[3].side, Side::Buy);
        assert_eq!(orders[3].instrument, Instrument::EurNzd);
        assert_eq!(orders[3].terminal_status, TerminalStatus::PartialFill);
        assert_eq!(orders[3].px_fill.to_string(), "1.68652");
        assert_eq!(orders[3].volume_init, 401_000);
        assert_eq!(orders[3].volume_fill, 61_000);

        assert_eq!(orders[4].terminal_status, TerminalStatus::Cancel);
        assert_eq!(orders[4].px_fill, Decimal::ZERO);
        assert_eq!(orders[4].volume_fill, 0);
    }

    #[test]
    fn stream_emits_expected_record_count() {
        init_log();
        let config = GeneratorConfig::default();
        let generator = HistoryGenerator::new(&config).unwrap();
        assert_eq!(generator.size_hint(), (7200, Some(7200)));
        assert_eq!(generator.count(), 7200);
    }

    #[test]
    fn first_records_follow_first_band_lifecycle() {
        init_log();
        let records: Vec<LifecycleRecord> = HistoryGenerator::new(&GeneratorConfig::default())
            .unwrap()
            .take(4)
            .collect();
        let statuses: Vec<RecordStatus> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RecordStatus::InProcess,
                RecordStatus::Fill,
                RecordStatus::Done,
                RecordStatus::InProcess
            ]
        );
        assert_eq!(records[0].px_fill, Decimal::ZERO);
        assert_eq!(records[1].px_fill.to_string(), "80.00349");
        assert_eq!(records[1].date, "01.02.2021 00:00:03.235");
        assert_eq!(records[3].id.to_string(), "0x60009");
    }

    #[test]
    fn invalid_config_fails_before_generation() {
        let mut config = GeneratorConfig::default();
        config.generators.id.modulus = 0;
        assert!(HistoryGenerator::new(&config).is_err());
    }

    #[test]
    fn oversized_population_fails_before_generation() {
        init_log();
        let config = GeneratorConfig {
            total_orders: u64::MAX / 2,
            ..Default::default()
        };
        assert!(matches!(
            HistoryGenerator::new(&config),
            Err(ConfigError::TooManyOrders { .. })
        ));

        let config = GeneratorConfig {
            total_orders: crate::config::MAX_TOTAL_ORDERS,
            ..Default::default()
        };
        let generator = HistoryGenerator::new(&config).unwrap();
        let (lower, _) = generator.size_hint();
        assert!(lower > 0);
    }

    #[test]
    fn write_all_reports_written_count() {
        init_log();
        let config = GeneratorConfig {
            total_orders: 10,
            ..Default::default()
        };
        let mut generator = HistoryGenerator::new(&config).unwrap();
        let mut sink = MemorySink::new();
        let written = generator.write_all(&mut sink).unwrap();
        // 3 orders x 3 + 6 x 4 + 1 x 3
        assert_eq!(written, 36);
        assert_eq!(sink.len(), 36);
        assert_eq!(generator.orders_generated(), 10);
        assert_eq!(generator.next(), None);
    }
}
