//! Lifecycle expansion: one order becomes 3 or 4 status records.
//!
//! The full lifecycle is `NEW → INPROCESS → <terminal> → DONE`; the first band
//! drops NEW, the third band drops DONE.

use crate::generators::{DateGenerator, Generator};
use crate::segment::{Band, SegmentPolicy};
use crate::types::{LifecycleRecord, Order, RecordStatus, TerminalStatus};

/// Position of a record in the full lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    New,
    InProcess,
    Terminal,
    Done,
}

const PHASES: [Phase; 4] = [Phase::New, Phase::InProcess, Phase::Terminal, Phase::Done];

/// Status of the record at `offset` within an order of `band`.
pub fn status_for(band: Band, offset: usize, terminal: TerminalStatus) -> RecordStatus {
    let skipped = usize::from(band.is_first_segment());
    match PHASES.get(offset + skipped).copied().unwrap_or(Phase::Done) {
        Phase::New => RecordStatus::New,
        Phase::InProcess => RecordStatus::InProcess,
        Phase::Terminal => terminal.into(),
        Phase::Done => RecordStatus::Done,
    }
}

/// Builds the record at `offset`. Fill fields are zeroed for NEW/INPROCESS.
pub fn record_at(order: &Order, band: Band, offset: usize, date: String) -> LifecycleRecord {
    LifecycleRecord::from_order(order, status_for(band, offset, order.terminal_status), date)
}

/// Expands `order` into all records of its band, drawing one date per record.
pub fn expand_order(order: &Order, band: Band, dates: &mut DateGenerator) -> Vec<LifecycleRecord> {
    (0..band.records_per_order())
        .map(|offset| record_at(order, band, offset, dates.generate(())))
        .collect()
}

/// Tracks where the stream is inside the current order. Band selection
/// happens in [`OrderRecordCursor::begin_order`] and holds until the order's
/// records are exhausted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderRecordCursor {
    current: Option<(Band, usize)>,
    records_emitted: u64,
    orders_started: u64,
}

impl OrderRecordCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the next order and fixes its band from the running record count.
    pub fn begin_order(&mut self, policy: &SegmentPolicy) -> Band {
        let band = policy.band_for_records_emitted(self.records_emitted);
        self.current = Some((band, 0));
        self.orders_started += 1;
        band
    }

    /// Band and offset of the next record of the current order, if any remain.
    pub fn position(&self) -> Option<(Band, usize)> {
        self.current
            .filter(|(band, offset)| *offset < band.records_per_order())
    }

    /// Marks one record as emitted.
    pub fn advance(&mut self) {
        if let Some((_, offset)) = self.current.as_mut() {
            *offset += 1;
            self.records_emitted += 1;
        }
    }

    pub fn records_emitted(&self) -> u64 {
        self.records_emitted
    }

    pub fn orders_started(&self) -> u64 {
        self.orders_started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorParams, SegmentPercents, DATE_FORMAT};
    use crate::types::{Instrument, Note, OrderId, Side};
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;

    fn order(terminal: TerminalStatus) -> Order {
        Order {
            id: OrderId(0x10003),
            side: Side::Sell,
            instrument: Instrument::AudJpy,
            terminal_status: terminal,
            px_init: Decimal::new(8000315, 5),
            px_fill: Decimal::new(8000349, 5),
            volume_init: 971_000,
            volume_fill: 971_000,
            note: Note::from_index(9),
            tags: "TRADE".into(),
        }
    }

    fn dates() -> DateGenerator {
        let params = GeneratorParams::default().date;
        let start = NaiveDateTime::parse_from_str(&params.start_date, DATE_FORMAT).unwrap();
        DateGenerator::new(&params, start)
    }

    fn statuses(records: &[LifecycleRecord]) -> Vec<RecordStatus> {
        records.iter().map(|r| r.status).collect()
    }

    #[test]
    fn first_band_drops_new() {
        let records = expand_order(&order(TerminalStatus::Fill), Band::CreatedBeforeRecording, &mut dates());
        assert_eq!(
            statuses(&records),
            vec![RecordStatus::InProcess, RecordStatus::Fill, RecordStatus::Done]
        );
    }

    #[test]
    fn second_band_has_full_lifecycle() {
        let records = expand_order(&order(TerminalStatus::PartialFill), Band::CreatedAndDone, &mut dates());
        assert_eq!(
            statuses(&records),
            vec![
                RecordStatus::New,
                RecordStatus::InProcess,
                RecordStatus::PartialFill,
                RecordStatus::Done
            ]
        );
    }

    #[test]
    fn third_band_drops_done() {
        let records = expand_order(&order(TerminalStatus::Cancel), Band::CompletedAfterRecording, &mut dates());
        assert_eq!(
            statuses(&records),
            vec![RecordStatus::New, RecordStatus::InProcess, RecordStatus::Cancel]
        );
    }

    #[test]
    fn pre_fill_records_are_zeroed_and_order_untouched() {
        let o = order(TerminalStatus::Fill);
        let records = expand_order(&o, Band::CreatedAndDone, &mut dates());
        for r in &records[..2] {
            assert_eq!(r.px_fill, Decimal::ZERO);
            assert_eq!(r.volume_fill, 0);
        }
        for r in &records[2..] {
            assert_eq!(r.px_fill, o.px_fill);
            assert_eq!(r.volume_fill, o.volume_fill);
        }
        assert_eq!(o.volume_fill, 971_000);
    }

    #[test]
    fn one_date_per_record() {
        let records = expand_order(&order(TerminalStatus::Fill), Band::CreatedBeforeRecording, &mut dates());
        let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "01.02.2021 00:00:01.019",
                "01.02.2021 00:00:03.235",
                "01.02.2021 00:00:11.827"
            ]
        );
    }

    #[test]
    fn cursor_keeps_band_until_order_completes() {
        // 1 order in band one (3 records), then band two.
        let policy = SegmentPolicy::new(
            3,
            SegmentPercents {
                created_before_recording: 34,
                created_and_done: 66,
                completed_after_recording: 0,
            },
        );
        let mut cursor = OrderRecordCursor::new();
        assert_eq!(cursor.position(), None);

        let band = cursor.begin_order(&policy);
        assert_eq!(band, Band::CreatedBeforeRecording);
        let mut offsets = Vec::new();
        while let Some((b, offset)) = cursor.position() {
            assert_eq!(b, band);
            offsets.push(offset);
            cursor.advance();
        }
        assert_eq!(offsets, vec![0, 1, 2]);
        assert_eq!(cursor.records_emitted(), 3);

        assert_eq!(cursor.begin_order(&policy), Band::CreatedAndDone);
        assert_eq!(cursor.orders_started(), 2);
    }
}
