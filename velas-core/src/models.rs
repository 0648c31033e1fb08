use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Key format of the consolidated table.
pub const KEY_FORMAT: &str = "%H:%M:%S";

/// A validated submission: round, multiplier and base clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub round: u64,
    /// Cleaned multiplier (no `x` suffix, `.` separator), e.g. "1.03".
    pub multiplier_text: String,
    pub multiplier: f64,
    pub time: NaiveTime,
}

impl Submission {
    /// Digits after the decimal separator.
    pub fn fractional_digits(&self) -> &str {
        self.multiplier_text
            .split_once('.')
            .map(|(_, frac)| frac)
            .unwrap_or("")
    }
}

/// Deduplicated set of digits 0-9, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitSet(BTreeSet<u8>);

impl DigitSet {
    pub fn from_text(text: &str) -> Self {
        Self(
            text.chars()
                .filter_map(|c| c.to_digit(10))
                .map(|d| d as u8)
                .collect(),
        )
    }

    pub fn contains(&self, digit: u8) -> bool {
        self.0.contains(&digit)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<u8> for DigitSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self(iter.into_iter().filter(|d| *d <= 9).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingDigits {
    /// At most two digits, ascending.
    pub digits: Vec<u8>,
    pub sum: u32,
}

/// "Resultado R".
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub raw: f64,
    pub formatted: String,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted)
    }
}

/// "Cotação C".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Undefined,
    Value { discounted: u32, original: u32 },
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Undefined => write!(f, "-"),
            Quote::Value { discounted, original } => write!(f, "{} a {}x", discounted, original),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FractionalPosition {
    Before,
    Exact,
    After,
}

impl fmt::Display for FractionalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FractionalPosition::Before => write!(f, "Before"),
            FractionalPosition::Exact => write!(f, "Exact"),
            FractionalPosition::After => write!(f, "After"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfluencePattern {
    /// DD.DD multiplier whose two groups are equal.
    Multiplier,
    /// Minute equals second.
    Clock,
    /// Last two digits of the round are equal.
    Round,
}

impl fmt::Display for ConfluencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfluencePattern::Multiplier => write!(f, "Vela"),
            ConfluencePattern::Clock => write!(f, "Hora"),
            ConfluencePattern::Round => write!(f, "Rodada"),
        }
    }
}

/// What triggered an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginKind {
    /// V / V×10: one missing digit times `factor` minutes.
    Missing { digit: u8, factor: u8 },
    /// VT: sum of the missing digits.
    MissingSum { sum: u32 },
    /// RA: around the digit sum of the multiplier's decimals.
    Fractional { position: FractionalPosition, offset: i64 },
    /// C: confluence on a target minute.
    Confluence { pattern: ConfluencePattern, minute: u32 },
}

impl OriginKind {
    /// Short tag shown in the Origem column.
    pub fn tag(&self) -> &'static str {
        match self {
            OriginKind::Missing { factor: 10, .. } => "V×10",
            OriginKind::Missing { .. } => "V",
            OriginKind::MissingSum { .. } => "VT",
            OriginKind::Fractional { .. } => "RA",
            OriginKind::Confluence { .. } => "C",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            OriginKind::Missing { digit, factor } => {
                format!("V x{} (+{}m)", factor, *digit as u32 * *factor as u32)
            }
            OriginKind::MissingSum { sum } => format!("VT (+{}m)", sum),
            OriginKind::Fractional { position, offset } => format!("RA {} (+{}m)", position, offset),
            OriginKind::Confluence { pattern, minute } => format!("C {} :{:02}", pattern, minute),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub timestamp: NaiveDateTime,
    pub origin: OriginKind,
    pub round: u64,
    pub score: Score,
    pub quote: Quote,
    pub resultant_round: Option<u64>,
}

impl Alert {
    pub fn key(&self) -> String {
        self.timestamp.format(KEY_FORMAT).to_string()
    }
}

/// Priority rank, T1 is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl Rank {
    pub fn outranks(&self, other: &Rank) -> bool {
        self < other
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Rank::T1 => 1,
            Rank::T2 => 2,
            Rank::T3 => 3,
            Rank::T4 => 4,
            Rank::T5 => 5,
        };
        write!(f, "T{}", n)
    }
}

/// Rank per minute-ending digit, plus one "isolated" minute that is always T1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub digit_ranks: [Rank; 10],
    pub isolated_minute: u32,
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            digit_ranks: [
                Rank::T4, // :x0
                Rank::T2, // :x1
                Rank::T5, // :x2
                Rank::T1, // :x3
                Rank::T3, // :x4
                Rank::T2, // :x5
                Rank::T5, // :x6
                Rank::T1, // :x7
                Rank::T3, // :x8
                Rank::T4, // :x9
            ],
            isolated_minute: 44,
        }
    }
}

impl RankTable {
    pub fn rank_for(&self, minute: u32) -> Rank {
        if minute == self.isolated_minute {
            return Rank::T1;
        }
        self.digit_ranks[(minute % 10) as usize]
    }
}

/// One row of the session table per focused time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedRow {
    pub key: String,
    pub timestamp: NaiveDateTime,
    pub rounds: BTreeSet<u64>,
    pub origins: BTreeSet<&'static str>,
    pub details: BTreeSet<String>,
    pub resultant_round: Option<u64>,
    pub signal: Rank,
    pub score: Score,
    pub quote: Quote,
}

impl ConsolidatedRow {
    pub fn rounds_label(&self) -> String {
        join(self.rounds.iter().map(|r| r.to_string()))
    }

    pub fn origins_label(&self) -> String {
        join(self.origins.iter().map(|o| o.to_string()))
    }

    pub fn details_label(&self) -> String {
        self.details.iter().cloned().collect::<Vec<_>>().join(" | ")
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

/// Degenerate result: the submission is valid but some stage produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    NoMissingDigits,
    NoFractionalSum,
    NoConfluence,
    NoAlerts,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoMissingDigits => write!(f, "Nenhum dígito faltante encontrado"),
            Warning::NoFractionalSum => write!(f, "Soma das decimais da vela igual a zero"),
            Warning::NoConfluence => write!(f, "Nenhuma confluência detectada"),
            Warning::NoAlerts => write!(f, "Nenhum alerta gerado para esta entrada"),
        }
    }
}

/// Everything an accepted submission produced.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub submission: Submission,
    pub base: NaiveDateTime,
    pub missing: MissingDigits,
    pub score: Score,
    pub quote: Quote,
    pub alerts: Vec<Alert>,
    /// This submission's alerts after grouping, before the table merge.
    pub batch: Vec<ConsolidatedRow>,
    pub evicted: usize,
    pub warnings: Vec<Warning>,
}
