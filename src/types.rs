//! Order and lifecycle-record model, plus the fixed lookup tables.
//!
//! Every table is a closed enum; lookups by 1-based generator index go through
//! `from_index`, which resolves out-of-range values to the last entry.

use rust_decimal::Decimal;
use std::fmt;

/// Order identifier. Displayed and persisted as lowercase hex with a `0x` prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Canonical hex form, e.g. `0x10003`.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parses the canonical hex form (the `0x` prefix is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16).ok().map(OrderId)
    }

    /// The numeric seed fed to attribute generators: the id normalized through
    /// its radix-16 string form.
    pub fn normalized_seed(self) -> u64 {
        OrderId::from_hex(&self.to_hex()).map_or(self.0, |id| id.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl serde::Serialize for OrderId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for OrderId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        OrderId::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid order id {s}")))
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Sell,
    Buy,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Sell => "SELL",
            Side::Buy => "BUY",
        }
    }
}

/// Currency pair with fixed buy and sell reference prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    EurGbp,
    EurChf,
    EurCad,
    AudEur,
    EurNzd,
    EurJpy,
    GbpJpy,
    ChfJpy,
    AudJpy,
    GbpCad,
    EurRub,
}

impl Instrument {
    pub const ALL: [Instrument; 11] = [
        Instrument::EurGbp,
        Instrument::EurChf,
        Instrument::EurCad,
        Instrument::AudEur,
        Instrument::EurNzd,
        Instrument::EurJpy,
        Instrument::GbpJpy,
        Instrument::ChfJpy,
        Instrument::AudJpy,
        Instrument::GbpCad,
        Instrument::EurRub,
    ];

    /// Entry used when a generator value falls outside `1..=11`.
    pub const FALLBACK: Instrument = Instrument::EurRub;

    /// Looks up a 1-based generator index.
    pub fn from_index(index: u64) -> Self {
        match index {
            1..=11 => Self::ALL[(index - 1) as usize],
            _ => Self::FALLBACK,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Instrument::EurGbp => "EURGBP",
            Instrument::EurChf => "EURCHF",
            Instrument::EurCad => "EURCAD",
            Instrument::AudEur => "AUDEUR",
            Instrument::EurNzd => "EURNZD",
            Instrument::EurJpy => "EURJPY",
            Instrument::GbpJpy => "GBPJPY",
            Instrument::ChfJpy => "CHFJPY",
            Instrument::AudJpy => "AUDJPY",
            Instrument::GbpCad => "GBPCAD",
            Instrument::EurRub => "EURRUB",
        }
    }

    pub fn buy_price(self) -> Decimal {
        match self {
            Instrument::EurGbp => Decimal::new(88491, 5),
            Instrument::EurChf => Decimal::new(108052, 5),
            Instrument::EurCad => Decimal::new(155111, 5),
            Instrument::AudEur => Decimal::new(629698, 6),
            Instrument::EurNzd => Decimal::new(168618, 5),
            Instrument::EurJpy => Decimal::new(12709323, 5),
            Instrument::GbpJpy => Decimal::new(14351412, 5),
            Instrument::ChfJpy => Decimal::new(1175189, 4),
            Instrument::AudJpy => Decimal::new(8003001, 5),
            Instrument::GbpCad => Decimal::new(175086, 5),
            Instrument::EurRub => Decimal::new(91996, 3),
        }
    }

    pub fn sell_price(self) -> Decimal {
        match self {
            Instrument::EurGbp => Decimal::new(88473, 5),
            Instrument::EurChf => Decimal::new(102197, 5),
            Instrument::EurCad => Decimal::new(141313, 5),
            Instrument::AudEur => Decimal::new(62963, 5),
            Instrument::EurNzd => Decimal::new(168501, 5),
            Instrument::EurJpy => Decimal::new(12488801, 5),
            Instrument::GbpJpy => Decimal::new(14323002, 5),
            Instrument::ChfJpy => Decimal::new(11689021, 5),
            Instrument::AudJpy => Decimal::new(8000315, 5),
            Instrument::GbpCad => Decimal::new(144401, 5),
            Instrument::EurRub => Decimal::new(9131132, 5),
        }
    }

    /// Reference price for an order on `side`.
    pub fn price_for(self, side: Side) -> Decimal {
        match side {
            Side::Buy => self.buy_price(),
            Side::Sell => self.sell_price(),
        }
    }
}

/// Broker-side outcome an order settles into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TerminalStatus {
    Fill,
    PartialFill,
    Cancel,
}

/// Status carried by one lifecycle record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    New,
    InProcess,
    Fill,
    PartialFill,
    Cancel,
    Done,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::New => "NEW",
            RecordStatus::InProcess => "INPROCESS",
            RecordStatus::Fill => "FILL",
            RecordStatus::PartialFill => "PARTIALFILL",
            RecordStatus::Cancel => "CANCEL",
            RecordStatus::Done => "DONE",
        }
    }

    /// NEW and INPROCESS records precede any fill.
    pub fn is_pre_fill(self) -> bool {
        matches!(self, RecordStatus::New | RecordStatus::InProcess)
    }
}

impl From<TerminalStatus> for RecordStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Fill => RecordStatus::Fill,
            TerminalStatus::PartialFill => RecordStatus::PartialFill,
            TerminalStatus::Cancel => RecordStatus::Cancel,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text note attached to an order: `NOTE 1` .. `NOTE 11`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note(u8);

impl Note {
    pub const COUNT: u64 = 11;

    /// Looks up a 1-based generator index; anything outside `1..=11` is `NOTE 11`.
    pub fn from_index(index: u64) -> Self {
        match index {
            1..=Self::COUNT => Note(index as u8),
            _ => Note(Self::COUNT as u8),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NOTE {}", self.0)
    }
}

impl serde::Serialize for Note {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Tag slots, in matrix column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Trade,
    DistanceTrade,
    RegularTrade,
    SpecialTrade,
    Transfer,
}

impl Tag {
    pub const ALL: [Tag; 5] = [
        Tag::Trade,
        Tag::DistanceTrade,
        Tag::RegularTrade,
        Tag::SpecialTrade,
        Tag::Transfer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Trade => "TRADE",
            Tag::DistanceTrade => "DISTANCE TRADE",
            Tag::RegularTrade => "REGULAR TRADE",
            Tag::SpecialTrade => "SPECIAL TRADE",
            Tag::Transfer => "TRANSFER",
        }
    }
}

/// Logical order: every attribute derived once from its id.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub instrument: Instrument,
    pub terminal_status: TerminalStatus,
    pub px_init: Decimal,
    pub px_fill: Decimal,
    pub volume_init: u64,
    pub volume_fill: u64,
    pub note: Note,
    /// Comma-joined tag subset; may be empty.
    pub tags: String,
}

/// One timestamped snapshot of an order's history.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LifecycleRecord {
    pub id: OrderId,
    pub side: Side,
    pub instrument: Instrument,
    pub status: RecordStatus,
    pub px_init: Decimal,
    pub px_fill: Decimal,
    pub volume_init: u64,
    pub volume_fill: u64,
    pub note: Note,
    pub tags: String,
    pub date: String,
}

impl LifecycleRecord {
    /// Builds the record for `order` at `status`. Pre-fill statuses carry zero
    /// fill price and volume; the order itself is untouched.
    pub fn from_order(order: &Order, status: RecordStatus, date: String) -> Self {
        let (px_fill, volume_fill) = if status.is_pre_fill() {
            (Decimal::ZERO, 0)
        } else {
            (order.px_fill, order.volume_fill)
        };
        Self {
            id: order.id,
            side: order.side,
            instrument: order.instrument,
            status,
            px_init: order.px_init,
            px_fill,
            volume_init: order.volume_init,
            volume_fill,
            note: order.note,
            tags: order.tags.clone(),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_hex_round_trip_keeps_value() {
        let id = OrderId(65539);
        assert_eq!(id.to_hex(), "0x10003");
        assert_eq!(OrderId::from_hex("0x10003"), Some(id));
        assert_eq!(OrderId::from_hex("10003"), Some(id));
        assert_eq!(id.normalized_seed(), 65539);
        assert_eq!(OrderId(u64::MAX).normalized_seed(), u64::MAX);
        assert_eq!(OrderId::from_hex("0xzz"), None);
    }

    #[test]
    fn instrument_index_is_one_based_with_last_entry_fallback() {
        assert_eq!(Instrument::from_index(1), Instrument::EurGbp);
        assert_eq!(Instrument::from_index(11), Instrument::EurRub);
        assert_eq!(Instrument::from_index(0), Instrument::EurRub);
        assert_eq!(Instrument::from_index(12), Instrument::EurRub);
        assert_eq!(Instrument::from_index(u64::MAX), Instrument::EurRub);
    }

    #[test]
    fn price_depends_on_side() {
        assert_eq!(Instrument::EurGbp.price_for(Side::Buy), Decimal::new(88491, 5));
        assert_eq!(Instrument::EurGbp.price_for(Side::Sell), Decimal::new(88473, 5));
        assert_eq!(Instrument::AudEur.buy_price().to_string(), "0.629698");
        for instrument in Instrument::ALL {
            assert_ne!(instrument.buy_price(), instrument.sell_price(), "{:?}", instrument);
        }
    }

    #[test]
    fn note_fallback_is_last_entry() {
        assert_eq!(Note::from_index(1).to_string(), "NOTE 1");
        assert_eq!(Note::from_index(11).to_string(), "NOTE 11");
        assert_eq!(Note::from_index(0).to_string(), "NOTE 11");
        assert_eq!(Note::from_index(12).to_string(), "NOTE 11");
    }

    #[test]
    fn pre_fill_record_is_zeroed() {
        let order = Order {
            id: OrderId(1),
            side: Side::Buy,
            instrument: Instrument::EurGbp,
            terminal_status: TerminalStatus::Fill,
            px_init: Decimal::new(88491, 5),
            px_fill: Decimal::new(88431, 5),
            volume_init: 5000,
            volume_fill: 5000,
            note: Note::from_index(3),
            tags: "TRADE".into(),
        };
        let new = LifecycleRecord::from_order(&order, RecordStatus::New, "d".into());
        assert_eq!(new.px_fill, Decimal::ZERO);
        assert_eq!(new.volume_fill, 0);
        let fill = LifecycleRecord::from_order(&order, RecordStatus::Fill, "d".into());
        assert_eq!(fill.px_fill, order.px_fill);
        assert_eq!(fill.volume_fill, 5000);
        assert_eq!(order.volume_fill, 5000);
    }

    #[test]
    fn statuses_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&RecordStatus::InProcess).unwrap(), "\"INPROCESS\"");
        assert_eq!(serde_json::to_string(&RecordStatus::PartialFill).unwrap(), "\"PARTIALFILL\"");
        assert_eq!(serde_json::to_string(&Instrument::EurGbp).unwrap(), "\"EURGBP\"");
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
    }
}
