//! Wire-format rows and their normalization into canonical records.
//!
//! The backing table stores numeric columns that arrive over JSON as either
//! numbers or strings (Postgres renders `NUMERIC` as text). Normalization
//! coerces everything into exact decimals and a fixed timestamp before any
//! aggregation runs; a row that fails to parse aborts the whole batch rather
//! than silently dropping out of the dashboard.

use crate::core::month::MonthKey;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MalformedRecordError {
    #[error("record {id}: amount is not a valid decimal: {value:?}")]
    Amount { id: i64, value: String },
    #[error("record {id}: unit is not a valid decimal: {value:?}")]
    Unit { id: i64, value: String },
    #[error("record {id}: unparseable timestamp: {value:?}")]
    Timestamp { id: i64, value: String },
    #[error("record {id}: unknown investment type: {value:?}")]
    UnknownType { id: i64, value: String },
    #[error("record {id}: investment name is empty")]
    EmptyName { id: i64 },
}

/// The closed set of investment types the dashboard understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    Cash,
    Bond,
    Stock,
    RealEstate,
    Commodity,
    Crypto,
}

impl InvestmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentType::Cash => "cash",
            InvestmentType::Bond => "bond",
            InvestmentType::Stock => "stock",
            InvestmentType::RealEstate => "real_estate",
            InvestmentType::Commodity => "commodity",
            InvestmentType::Crypto => "crypto",
        }
    }

    /// Display label: uppercased, underscores as spaces.
    pub fn label(&self) -> &'static str {
        match self {
            InvestmentType::Cash => "CASH",
            InvestmentType::Bond => "BOND",
            InvestmentType::Stock => "STOCK",
            InvestmentType::RealEstate => "REAL ESTATE",
            InvestmentType::Commodity => "COMMODITY",
            InvestmentType::Crypto => "CRYPTO",
        }
    }
}

impl Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvestmentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(InvestmentType::Cash),
            "bond" => Ok(InvestmentType::Bond),
            "stock" => Ok(InvestmentType::Stock),
            "real_estate" => Ok(InvestmentType::RealEstate),
            "commodity" => Ok(InvestmentType::Commodity),
            "crypto" => Ok(InvestmentType::Crypto),
            _ => Err(anyhow::anyhow!("Unknown investment type: {s}")),
        }
    }
}

/// A numeric field as it appears on the wire: a JSON number or a string.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawNumber {
    Text(String),
    Number(f64),
}

impl RawNumber {
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            // Shortest round-trip display of an f64 is exact at currency scale.
            RawNumber::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            RawNumber::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.clone(),
        }
    }
}

/// One row as returned by `GET /api/investments/:table`. Unknown columns
/// (such as the legacy owner `name` field) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInvestmentRow {
    pub investment_id: i64,
    pub investment_name: String,
    pub investment_type: String,
    pub provider: String,
    pub amount: RawNumber,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub unit: Option<RawNumber>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
}

/// Canonical in-memory investment record, post-normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentRecord {
    pub id: i64,
    pub name: String,
    pub investment_type: InvestmentType,
    pub provider: String,
    pub amount: Decimal,
    pub currency: String,
    /// Share count or similar. `None` means "no unit", never zero.
    pub unit: Option<Decimal>,
    pub notes: Option<String>,
    /// Effective month of the record, not a mutation audit field.
    pub created_at: NaiveDateTime,
}

impl InvestmentRecord {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::from_datetime(&self.created_at)
    }
}

/// Coerces one wire row into a canonical record. `home_currency` fills in a
/// missing currency column.
pub fn normalize_row(
    raw: &RawInvestmentRow,
    home_currency: &str,
) -> Result<InvestmentRecord, MalformedRecordError> {
    let id = raw.investment_id;

    if raw.investment_name.is_empty() {
        return Err(MalformedRecordError::EmptyName { id });
    }

    let investment_type: InvestmentType = raw.investment_type.parse().map_err(|_| {
        MalformedRecordError::UnknownType {
            id,
            value: raw.investment_type.clone(),
        }
    })?;

    let amount = raw
        .amount
        .to_decimal()
        .ok_or_else(|| MalformedRecordError::Amount {
            id,
            value: raw.amount.raw(),
        })?;

    let unit = match &raw.unit {
        Some(u) => Some(u.to_decimal().ok_or_else(|| MalformedRecordError::Unit {
            id,
            value: u.raw(),
        })?),
        None => None,
    };

    let created_at = parse_effective_timestamp(&raw.created_at).ok_or_else(|| {
        MalformedRecordError::Timestamp {
            id,
            value: raw.created_at.clone(),
        }
    })?;

    let currency = raw
        .currency
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(home_currency)
        .to_string();

    Ok(InvestmentRecord {
        id,
        name: raw.investment_name.clone(),
        investment_type,
        provider: raw.provider.clone(),
        amount,
        currency,
        unit,
        notes: raw.notes.clone().filter(|n| !n.is_empty()),
        created_at,
    })
}

/// Whole-batch normalization: the first malformed row fails the batch so no
/// record can silently vanish from the aggregates.
pub fn normalize_rows(
    rows: &[RawInvestmentRow],
    home_currency: &str,
) -> Result<Vec<InvestmentRecord>, MalformedRecordError> {
    rows.iter()
        .map(|raw| normalize_row(raw, home_currency))
        .collect()
}

/// Parses an ISO-8601-ish timestamp. The calendar month is read from the
/// text as written; a trailing UTC offset designator is stripped, not
/// applied, since the source schema carries no meaningful timezone.
fn parse_effective_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = strip_utc_offset(s.trim());
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

fn strip_utc_offset(s: &str) -> &str {
    if let Some(stripped) = s.strip_suffix('Z') {
        return stripped;
    }
    // "+hh:mm" / "-hh:mm", only meaningful after a time component
    if s.len() > 6 {
        let (head, tail) = s.split_at(s.len() - 6);
        let mut chars = tail.chars();
        if matches!(chars.next(), Some('+') | Some('-'))
            && chars.all(|c| c.is_ascii_digit() || c == ':')
            && (head.contains('T') || head.contains(' '))
        {
            return head;
        }
    }
    s
}
