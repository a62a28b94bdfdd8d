//! Reset cadences, calendar months, and the bucket keys that tie usage to a period.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How often a perk's redemption limit resets.
///
/// Values outside the four known cadences are kept verbatim in
/// [`Cadence::Unrecognized`] and are accounted per calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cadence {
    #[default]
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
    Unrecognized(String),
}

impl Cadence {
    pub const KNOWN: [Cadence; 4] = [
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::SemiAnnually,
        Cadence::Annually,
    ];

    /// Wire name used in persisted records and snapshots.
    pub fn as_str(&self) -> &str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::SemiAnnually => "semi-annually",
            Cadence::Annually => "annually",
            Cadence::Unrecognized(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::SemiAnnually => "Semi-Annually",
            Cadence::Annually => "Annually",
            Cadence::Unrecognized(raw) => raw,
        }
    }

    /// Maps a calendar month (1 = January) onto the reset period that contains it.
    pub fn period_of(&self, month: u32) -> Period {
        match self {
            Cadence::Monthly | Cadence::Unrecognized(_) => Period::Month(month),
            Cadence::Quarterly => Period::Quarter(month.div_ceil(3)),
            Cadence::SemiAnnually => Period::Half(if month <= 6 { 1 } else { 2 }),
            Cadence::Annually => Period::Year,
        }
    }
}

impl From<String> for Cadence {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "monthly" => Cadence::Monthly,
            "quarterly" => Cadence::Quarterly,
            "semi-annually" => Cadence::SemiAnnually,
            "annually" => Cadence::Annually,
            _ => Cadence::Unrecognized(raw),
        }
    }
}

impl From<&str> for Cadence {
    fn from(raw: &str) -> Self {
        Cadence::from(raw.to_string())
    }
}

impl From<Cadence> for String {
    fn from(cadence: Cadence) -> Self {
        match cadence {
            Cadence::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A span of calendar months that share one usage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Month(u32),
    Quarter(u32),
    Half(u32),
    Year,
}

impl Period {
    /// Calendar months covered by this period.
    pub fn months(&self) -> RangeInclusive<u32> {
        match *self {
            Period::Month(month) => month..=month,
            Period::Quarter(quarter) => (quarter * 3 - 2)..=(quarter * 3),
            Period::Half(half) => (half * 6 - 5)..=(half * 6),
            Period::Year => 1..=12,
        }
    }

    pub fn label(&self, year: i32) -> String {
        match *self {
            Period::Month(month) => format!("{year}-{month:02}"),
            Period::Quarter(quarter) => format!("{year} Q{quarter}"),
            Period::Half(half) => format!("{year} H{half}"),
            Period::Year => year.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthError {
    #[error("month must be between 1 and 12, got {0}")]
    OutOfRange(u32),
    #[error("invalid month `{0}` (use YYYY-MM)")]
    Unparseable(String),
}

/// A calendar month with January = 1. The month is range checked on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(MonthError::OutOfRange(month))
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Long form such as `October 2026`.
    pub fn long_label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = MonthError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthError::Unparseable(trimmed.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| MonthError::Unparseable(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthError::Unparseable(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

/// Identifier of a usage bucket: one counter per perk and reset period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey(String);

impl BucketKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the usage bucket for a perk in a given month.
///
/// Key shapes: `{id}-{year}-{month}` (monthly and unrecognized cadences),
/// `{id}-{year}-Q{n}`, `{id}-{year}-H{n}` and `{id}-{year}` (annual). The month
/// is not zero padded so keys stay compatible with existing backups.
pub fn bucket_key(perk_id: &str, cadence: &Cadence, month: CalendarMonth) -> BucketKey {
    let year = month.year();
    let key = match cadence.period_of(month.month()) {
        Period::Month(m) => format!("{perk_id}-{year}-{m}"),
        Period::Quarter(q) => format!("{perk_id}-{year}-Q{q}"),
        Period::Half(h) => format!("{perk_id}-{year}-H{h}"),
        Period::Year => format!("{perk_id}-{year}"),
    };
    BucketKey(key)
}
