//! Attribute generators.
//!
//! One struct per order attribute, each owning its own LCG state. Id-driven
//! generators take the order's normalized id as their per-call seed; Date and
//! Tags advance their own streams. All lookups resolve out-of-range indices to
//! a fixed fallback, so no generator can fail once the config is validated.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{DateParams, SideParams, TagParams, VolumeFillParams, DATE_FORMAT};
use crate::lcg::{FloatLcg, FloatLcgParams, Lcg, LcgParams};
use crate::types::{Instrument, Note, OrderId, Side, Tag, TerminalStatus};

/// Decimal places kept for prices.
pub const PRICE_SCALE: u32 = 5;

/// Fill-price deltas below this are added to the initial price, others subtracted.
pub const SLIPPAGE_THRESHOLD: f64 = 0.0005;

/// Volumes are whole lots of this size.
pub const VOLUME_LOT: u64 = 1000;

/// Rows in the tag matrix (distinct tag sets).
pub const TAG_SETS: usize = 13;

/// Common capability of every attribute generator.
pub trait Generator {
    type Input;
    type Output;

    fn generate(&mut self, input: Self::Input) -> Self::Output;
}

/// Largest multiple of [`VOLUME_LOT`] not above `volume`.
pub fn round_down_to_1000(volume: u64) -> u64 {
    volume / VOLUME_LOT * VOLUME_LOT
}

/// Rounds to [`PRICE_SCALE`] places, half-to-even on the exact binary value.
pub fn round_price_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// [`round_price_decimal`] back in `f64`: the double nearest the rounded decimal.
pub fn round_price(value: f64) -> f64 {
    decimal_to_f64(round_price_decimal(value))
}

/// Nearest `f64` to a decimal with a mantissa below 2^53.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.mantissa() as f64 / 10f64.powi(value.scale() as i32)
}

/// Root of the seed chain: one raw LCG step per order.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    lcg: Lcg,
}

impl IdGenerator {
    pub fn new(params: LcgParams) -> Self {
        Self { lcg: Lcg::new(params) }
    }
}

impl Generator for IdGenerator {
    type Input = ();
    type Output = OrderId;

    fn generate(&mut self, _: ()) -> OrderId {
        OrderId(self.lcg.next())
    }
}

#[derive(Clone, Debug)]
pub struct SideGenerator {
    lcg: Lcg,
    cutoff: u64,
}

impl SideGenerator {
    pub fn new(params: SideParams) -> Self {
        Self {
            lcg: Lcg::new(params.lcg),
            cutoff: params.cutoff(),
        }
    }
}

impl Generator for SideGenerator {
    type Input = u64;
    type Output = Side;

    fn generate(&mut self, seed: u64) -> Side {
        if self.lcg.next_from(seed) <= self.cutoff {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

#[derive(Clone, Debug)]
pub struct InstrumentGenerator {
    lcg: Lcg,
}

impl InstrumentGenerator {
    pub fn new(params: LcgParams) -> Self {
        Self { lcg: Lcg::new(params) }
    }
}

impl Generator for InstrumentGenerator {
    type Input = u64;
    type Output = Instrument;

    fn generate(&mut self, seed: u64) -> Instrument {
        Instrument::from_index(self.lcg.next_from(seed))
    }
}

/// Splits the modulus into equal thirds: FILL, PARTIALFILL, CANCEL.
#[derive(Clone, Debug)]
pub struct StatusGenerator {
    lcg: Lcg,
}

impl StatusGenerator {
    pub fn new(params: LcgParams) -> Self {
        Self { lcg: Lcg::new(params) }
    }
}

impl Generator for StatusGenerator {
    type Input = u64;
    type Output = TerminalStatus;

    fn generate(&mut self, seed: u64) -> TerminalStatus {
        let value = self.lcg.next_from(seed) as u128 * 3;
        let modulus = self.lcg.modulus() as u128;
        if value <= modulus {
            TerminalStatus::Fill
        } else if value <= modulus * 2 {
            TerminalStatus::PartialFill
        } else {
            TerminalStatus::Cancel
        }
    }
}

/// Pure lookup of the instrument's reference price for the side.
#[derive(Clone, Copy, Debug, Default)]
pub struct PxInitGenerator;

impl Generator for PxInitGenerator {
    type Input = (Side, Instrument);
    type Output = Decimal;

    fn generate(&mut self, (side, instrument): (Side, Instrument)) -> Decimal {
        instrument.price_for(side)
    }
}

/// Fill price: initial price shifted by a small rounded delta.
#[derive(Clone, Debug)]
pub struct PxFillGenerator {
    lcg: FloatLcg,
}

impl PxFillGenerator {
    pub fn new(params: FloatLcgParams) -> Self {
        Self {
            lcg: FloatLcg::new(params),
        }
    }
}

impl Generator for PxFillGenerator {
    type Input = (u64, Decimal, TerminalStatus);
    type Output = Decimal;

    fn generate(&mut self, (seed, px_init, status): (u64, Decimal, TerminalStatus)) -> Decimal {
        let delta = round_price(self.lcg.next_from(seed));
        if status == TerminalStatus::Cancel {
            return Decimal::ZERO;
        }
        let init = decimal_to_f64(px_init);
        let fill = if delta < SLIPPAGE_THRESHOLD {
            init + delta
        } else {
            init - delta
        };
        round_price_decimal(fill)
    }
}

#[derive(Clone, Debug)]
pub struct VolumeInitGenerator {
    lcg: Lcg,
}

impl VolumeInitGenerator {
    pub fn new(params: LcgParams) -> Self {
        Self { lcg: Lcg::new(params) }
    }
}

impl Generator for VolumeInitGenerator {
    type Input = u64;
    type Output = u64;

    fn generate(&mut self, seed: u64) -> u64 {
        round_down_to_1000(self.lcg.next_from(seed))
    }
}

/// Filled volume. The modulus is the order's own initial volume.
#[derive(Clone, Debug)]
pub struct VolumeFillGenerator {
    lcg: Lcg,
}

impl VolumeFillGenerator {
    pub fn new(params: VolumeFillParams) -> Self {
        Self {
            lcg: Lcg::new(LcgParams::new(0, params.multiplier, params.increment, 0)),
        }
    }
}

impl Generator for VolumeFillGenerator {
    type Input = (u64, u64, TerminalStatus);
    type Output = u64;

    fn generate(&mut self, (seed, volume_init, status): (u64, u64, TerminalStatus)) -> u64 {
        let unfilled = round_down_to_1000(self.lcg.next_from_mod(seed, volume_init));
        match status {
            TerminalStatus::Fill => volume_init,
            TerminalStatus::PartialFill => volume_init - unfilled,
            TerminalStatus::Cancel => 0,
        }
    }
}

/// Coarse running clock: each call adds the first decimal digit of a fresh
/// LCG value as seconds and appends the value itself as a millisecond suffix.
#[derive(Clone, Debug)]
pub struct DateGenerator {
    lcg: Lcg,
    clock: NaiveDateTime,
}

impl DateGenerator {
    pub fn new(params: &DateParams, start: NaiveDateTime) -> Self {
        Self {
            lcg: Lcg::new(params.lcg),
            clock: start,
        }
    }
}

impl Generator for DateGenerator {
    type Input = ();
    type Output = String;

    fn generate(&mut self, _: ()) -> String {
        let value = self.lcg.next();
        let seconds = value
            .to_string()
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .unwrap_or(0);
        if let Some(next) = self
            .clock
            .checked_add_signed(chrono::Duration::seconds(i64::from(seconds)))
        {
            self.clock = next;
        }
        format!("{}.{:03}", self.clock.format(DATE_FORMAT), value)
    }
}

#[derive(Clone, Debug)]
pub struct NoteGenerator {
    lcg: Lcg,
}

impl NoteGenerator {
    pub fn new(params: LcgParams) -> Self {
        Self { lcg: Lcg::new(params) }
    }
}

impl Generator for NoteGenerator {
    type Input = u64;
    type Output = Note;

    fn generate(&mut self, seed: u64) -> Note {
        Note::from_index(self.lcg.next_from(seed))
    }
}

/// Tag sets: a 13×5 matrix filled once from the tag stream, rows picked per
/// order by the number stream.
#[derive(Clone, Debug)]
pub struct TagGenerator {
    number: Lcg,
    matrix: [[Option<Tag>; 5]; TAG_SETS],
}

impl TagGenerator {
    pub fn new(params: TagParams) -> Self {
        let mut tag_stream = Lcg::new(LcgParams {
            seed: params.seed,
            ..params.tag
        });
        let mut matrix = [[None; 5]; TAG_SETS];
        for row in matrix.iter_mut() {
            for (cell, tag) in row.iter_mut().zip(Tag::ALL) {
                if tag_stream.next() % 2 == 1 {
                    *cell = Some(tag);
                }
            }
        }
        Self {
            number: Lcg::new(LcgParams {
                seed: params.seed,
                ..params.number
            }),
            matrix,
        }
    }

    /// Tags of one matrix row, joined with `", "`.
    pub fn row(&self, index: usize) -> String {
        self.matrix[index % TAG_SETS]
            .iter()
            .flatten()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Generator for TagGenerator {
    type Input = ();
    type Output = String;

    fn generate(&mut self, _: ()) -> String {
        let index = (self.number.next() % TAG_SETS as u64) as usize;
        self.row(index)
    }
}
