//! Presentation formatting for aggregate values.
//!
//! Pure string formatting only: the aggregation engine never depends on this
//! module, and swapping the display conventions touches nothing else. The
//! conventions mirror the Swiss locale the dashboard has always used
//! (apostrophe thousands grouping, `CHF 12'345.67`).

use crate::core::month::MonthKey;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Currency string with the code in front and apostrophe grouping, e.g.
/// `CHF 12'345.67`.
pub fn format_currency(value: Decimal, currency: &str) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() { "-" } else { "" };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    format!(
        "{currency} {sign}{}.{:0<2}",
        group_thousands(int_part),
        frac_part
    )
}

/// Compact magnitude for axis labels: `300`, `12K`, `1M`. Zero fraction
/// digits, rounding away from zero at the midpoint.
pub fn format_compact(value: Decimal) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let abs = value.abs();
    let million = Decimal::from(1_000_000);
    let thousand = Decimal::from(1_000);

    if abs >= million {
        format!("{sign}{}M", round_whole(abs / million))
    } else if abs >= thousand {
        format!("{sign}{}K", round_whole(abs / thousand))
    } else {
        format!("{sign}{}", round_whole(abs))
    }
}

/// Human month label, e.g. `January 2024`.
pub fn month_label(key: &MonthKey) -> String {
    first_of_month(key).format("%B %Y").to_string()
}

/// Short month label for series axes, e.g. `Jan 2024`.
pub fn month_label_short(key: &MonthKey) -> String {
    first_of_month(key).format("%b %Y").to_string()
}

fn first_of_month(key: &MonthKey) -> NaiveDate {
    // MonthKey guarantees month is in 1..=12
    NaiveDate::from_ymd_opt(key.year(), key.month(), 1)
        .unwrap_or(NaiveDate::MIN)
}

fn round_whole(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\'');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_currency_swiss_grouping() {
        assert_eq!(format_currency(dec!(12345.67), "CHF"), "CHF 12'345.67");
        assert_eq!(format_currency(dec!(1234567.8), "CHF"), "CHF 1'234'567.80");
        assert_eq!(format_currency(dec!(999), "EUR"), "EUR 999.00");
    }

    #[test]
    fn test_format_currency_rounds_to_two_decimals() {
        assert_eq!(format_currency(dec!(10.005), "CHF"), "CHF 10.01");
        assert_eq!(format_currency(dec!(10.004), "CHF"), "CHF 10.00");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.5), "CHF"), "CHF -1'234.50");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(dec!(300)), "300");
        assert_eq!(format_compact(dec!(300.6)), "301");
        assert_eq!(format_compact(dec!(12345)), "12K");
        assert_eq!(format_compact(dec!(1500000)), "2M");
        assert_eq!(format_compact(dec!(-2500)), "-3K");
        assert_eq!(format_compact(Decimal::ZERO), "0");
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(&key("2024-01")), "January 2024");
        assert_eq!(month_label(&key("2023-12")), "December 2023");
        assert_eq!(month_label_short(&key("2024-01")), "Jan 2024");
    }
}
