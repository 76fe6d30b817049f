//! Segment policy: which observation band an order falls in and how many
//! lifecycle records it expands to.
//!
//! The population is split into three contiguous bands. Selection is driven
//! by the running count of records already emitted; order-index boundaries
//! are converted to record thresholds using each band's record count.

use crate::config::SegmentPercents;

/// Observation band of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    /// Created before recording started: NEW is not observed.
    CreatedBeforeRecording,
    /// Whole lifecycle observed.
    CreatedAndDone,
    /// Completed after recording ended: DONE is not observed.
    CompletedAfterRecording,
}

impl Band {
    pub fn records_per_order(self) -> usize {
        match self {
            Band::CreatedBeforeRecording => 3,
            Band::CreatedAndDone => 4,
            Band::CompletedAfterRecording => 3,
        }
    }

    pub fn is_first_segment(self) -> bool {
        matches!(self, Band::CreatedBeforeRecording)
    }
}

/// Band layout for a fixed population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentPolicy {
    total_orders: u64,
    first_band_orders: u64,
    second_band_orders: u64,
}

impl SegmentPolicy {
    /// `floor(total * percent / 100)` orders for the first two bands; the third
    /// band takes the remainder.
    pub fn new(total_orders: u64, percents: SegmentPercents) -> Self {
        let share = |percent: u64| (total_orders as u128 * percent as u128 / 100) as u64;
        let first_band_orders = share(percents.created_before_recording).min(total_orders);
        let second_band_orders =
            share(percents.created_and_done).min(total_orders - first_band_orders);
        Self {
            total_orders,
            first_band_orders,
            second_band_orders,
        }
    }

    pub fn total_orders(&self) -> u64 {
        self.total_orders
    }

    /// Order counts per band.
    pub fn band_sizes(&self) -> [u64; 3] {
        [
            self.first_band_orders,
            self.second_band_orders,
            self.total_orders - self.first_band_orders - self.second_band_orders,
        ]
    }

    /// Band of order `index` (0-based).
    pub fn band_for_order(&self, index: u64) -> Band {
        if index < self.first_band_orders {
            Band::CreatedBeforeRecording
        } else if index < self.first_band_orders + self.second_band_orders {
            Band::CreatedAndDone
        } else {
            Band::CompletedAfterRecording
        }
    }

    /// Band for the order whose first record comes after `records_emitted`
    /// records. Queried once per order; the order then completes its band's
    /// record count even if the running count crosses a threshold.
    pub fn band_for_records_emitted(&self, records_emitted: u64) -> Band {
        let [first, second] = self.record_thresholds();
        if records_emitted < first {
            Band::CreatedBeforeRecording
        } else if records_emitted < second {
            Band::CreatedAndDone
        } else {
            Band::CompletedAfterRecording
        }
    }

    pub fn records_per_order(&self, records_emitted: u64) -> usize {
        self.band_for_records_emitted(records_emitted).records_per_order()
    }

    pub fn is_first_segment(&self, records_emitted: u64) -> bool {
        self.band_for_records_emitted(records_emitted).is_first_segment()
    }

    /// Cumulative record counts at which the first and second bands end.
    pub fn record_thresholds(&self) -> [u64; 2] {
        let first = self
            .first_band_orders
            .saturating_mul(Band::CreatedBeforeRecording.records_per_order() as u64);
        let second = first.saturating_add(
            self.second_band_orders
                .saturating_mul(Band::CreatedAndDone.records_per_order() as u64),
        );
        [first, second]
    }

    /// Records produced by the whole population. Saturates for populations
    /// above [`MAX_TOTAL_ORDERS`](crate::config::MAX_TOTAL_ORDERS).
    pub fn total_records(&self) -> u64 {
        let [.., second_end] = self.record_thresholds();
        let third = self.band_sizes()[2];
        second_end.saturating_add(
            third.saturating_mul(Band::CompletedAfterRecording.records_per_order() as u64),
        )
    }
}
