//! Monthly aggregation over normalized investment records.
//!
//! Everything here is a pure function of the record list: buckets are rebuilt
//! from scratch on every pass and nothing is retained across calls. The
//! engine never looks at the wall clock; callers that want "this month" pass
//! [`MonthKey::current`] explicitly.

use crate::core::month::MonthKey;
use crate::core::record::{InvestmentRecord, InvestmentType};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// One slice of a breakdown: a category label and its summed amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: Decimal,
}

/// One point of the portfolio trend series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub total: Decimal,
}

/// Per-type totals for one month. Sparse: only types present in that month
/// appear; consumers treat a missing type as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTypeTotals {
    pub month: MonthKey,
    pub totals: Vec<(InvestmentType, Decimal)>,
}

/// Records partitioned by calendar month. The `BTreeMap` keeps keys in
/// chronological order, which is also `YYYY-MM` string order.
#[derive(Debug, Default)]
pub struct MonthBuckets {
    buckets: BTreeMap<MonthKey, Vec<InvestmentRecord>>,
}

impl MonthBuckets {
    /// Partitions records into month buckets keyed by their effective month.
    /// Every record lands in exactly one bucket; an empty input yields an
    /// empty mapping.
    pub fn group(records: &[InvestmentRecord]) -> Self {
        let mut buckets: BTreeMap<MonthKey, Vec<InvestmentRecord>> = BTreeMap::new();
        for record in records {
            buckets
                .entry(record.month_key())
                .or_default()
                .push(record.clone());
        }
        MonthBuckets { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Month keys in chronological ascending order.
    pub fn sorted_keys(&self) -> impl Iterator<Item = &MonthKey> {
        self.buckets.keys()
    }

    /// The latest data-bearing month, or `None` when no records exist.
    pub fn latest_key(&self) -> Option<&MonthKey> {
        self.buckets.keys().next_back()
    }

    /// The second-to-last data-bearing month by chronological position, not
    /// by calendar subtraction. `None` when fewer than two months exist.
    pub fn previous_key(&self) -> Option<&MonthKey> {
        self.buckets.keys().rev().nth(1)
    }

    /// Records for a month; an empty slice for a month with no data.
    pub fn records_for(&self, key: &MonthKey) -> &[InvestmentRecord] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of amounts for a month, zero for a missing key.
    pub fn total_for(&self, key: &MonthKey) -> Decimal {
        self.records_for(key).iter().map(|r| r.amount).sum()
    }

    /// Sum of amounts for a month excluding records whose name exactly
    /// matches an excluded entry. Matching is case-sensitive: an exclusion
    /// list entry with different casing than the stored name silently fails
    /// to exclude.
    pub fn usable_cash(&self, key: &MonthKey, excluded_names: &HashSet<String>) -> Decimal {
        self.records_for(key)
            .iter()
            .filter(|r| !excluded_names.contains(&r.name))
            .map(|r| r.amount)
            .sum()
    }

    /// Per-type totals for a month, descending by amount. Ties keep the
    /// order in which the type was first seen in the bucket.
    pub fn type_breakdown(&self, key: &MonthKey) -> Vec<BreakdownEntry> {
        breakdown(self.records_for(key), |r| r.investment_type.label().to_string())
    }

    /// Per-provider totals for a month, same shape as the type breakdown.
    pub fn provider_breakdown(&self, key: &MonthKey) -> Vec<BreakdownEntry> {
        breakdown(self.records_for(key), |r| r.provider.clone())
    }

    /// `(month, total)` for every bucket, chronological ascending.
    pub fn monthly_totals(&self) -> Vec<MonthTotal> {
        self.buckets
            .keys()
            .map(|key| MonthTotal {
                month: *key,
                total: self.total_for(key),
            })
            .collect()
    }

    /// Per-month per-type totals across all buckets, chronological
    /// ascending, sparse within each month.
    pub fn monthly_type_series(&self) -> Vec<MonthTypeTotals> {
        self.buckets
            .iter()
            .map(|(key, records)| {
                let mut totals: Vec<(InvestmentType, Decimal)> = Vec::new();
                for record in records {
                    match totals
                        .iter_mut()
                        .find(|(t, _)| *t == record.investment_type)
                    {
                        Some((_, value)) => *value += record.amount,
                        None => totals.push((record.investment_type, record.amount)),
                    }
                }
                MonthTypeTotals {
                    month: *key,
                    totals,
                }
            })
            .collect()
    }
}

/// Period-over-period delta in percent. `None` when the previous total is
/// zero: there is no comparison, which is not the same as a 0% change.
pub fn percentage_change(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        None
    } else {
        Some((current - previous) / previous * Decimal::from(100))
    }
}

fn breakdown(
    records: &[InvestmentRecord],
    category: impl Fn(&InvestmentRecord) -> String,
) -> Vec<BreakdownEntry> {
    let mut entries: Vec<BreakdownEntry> = Vec::new();
    for record in records {
        let name = category(record);
        match entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.value += record.amount,
            None => entries.push(BreakdownEntry {
                name,
                value: record.amount,
            }),
        }
    }
    // Stable sort: equal values keep first-encounter order
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn ts(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(
        id: i64,
        name: &str,
        investment_type: InvestmentType,
        provider: &str,
        amount: Decimal,
        date: &str,
    ) -> InvestmentRecord {
        InvestmentRecord {
            id,
            name: name.to_string(),
            investment_type,
            provider: provider.to_string(),
            amount,
            currency: "CHF".to_string(),
            unit: None,
            notes: None,
            created_at: ts(date),
        }
    }

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_month_grouping_and_total() {
        // Scenario: a string amount and a numeric amount in the same month
        let records = vec![
            record(1, "Apple", InvestmentType::Stock, "X", dec!(100.50), "2024-01-15"),
            record(2, "Savings", InvestmentType::Cash, "Y", dec!(200), "2024-01-20"),
        ];
        let buckets = MonthBuckets::group(&records);

        let keys: Vec<String> = buckets.sorted_keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-01"]);
        assert_eq!(buckets.total_for(&key("2024-01")), dec!(300.50));
    }

    #[test]
    fn test_sorted_keys_strictly_ascending_without_duplicates() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(1), "2024-03-01"),
            record(2, "B", InvestmentType::Cash, "X", dec!(1), "2023-11-05"),
            record(3, "C", InvestmentType::Cash, "X", dec!(1), "2024-03-28"),
            record(4, "D", InvestmentType::Cash, "X", dec!(1), "2024-01-10"),
        ];
        let buckets = MonthBuckets::group(&records);
        let keys: Vec<String> = buckets.sorted_keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2023-11", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_partition_property() {
        // Union of buckets equals the input: nothing lost, nothing duplicated
        let records: Vec<InvestmentRecord> = (0..20)
            .map(|i| {
                let month = (i % 4) + 1;
                record(
                    i,
                    &format!("inv-{i}"),
                    InvestmentType::Stock,
                    "X",
                    Decimal::from(i),
                    &format!("2024-{month:02}-10"),
                )
            })
            .collect();

        let buckets = MonthBuckets::group(&records);
        let mut regrouped: Vec<i64> = buckets
            .sorted_keys()
            .flat_map(|k| buckets.records_for(k).iter().map(|r| r.id))
            .collect();
        regrouped.sort_unstable();
        let mut input_ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        input_ids.sort_unstable();
        assert_eq!(regrouped, input_ids);
    }

    #[test]
    fn test_grouping_is_order_independent() {
        let mut records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(10), "2024-01-05"),
            record(2, "B", InvestmentType::Bond, "Y", dec!(20), "2024-02-05"),
            record(3, "C", InvestmentType::Cash, "X", dec!(30), "2024-01-25"),
        ];
        let forward = MonthBuckets::group(&records);
        records.reverse();
        let backward = MonthBuckets::group(&records);

        for k in forward.sorted_keys() {
            assert_eq!(forward.total_for(k), backward.total_for(k));
            let mut a: Vec<i64> = forward.records_for(k).iter().map(|r| r.id).collect();
            let mut b: Vec<i64> = backward.records_for(k).iter().map(|r| r.id).collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_latest_and_previous_keys() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(1), "2023-10-01"),
            record(2, "B", InvestmentType::Cash, "X", dec!(1), "2024-01-01"),
            // A gap: previous is the prior data-bearing month, not calendar math
            record(3, "C", InvestmentType::Cash, "X", dec!(1), "2024-04-01"),
        ];
        let buckets = MonthBuckets::group(&records);
        assert_eq!(buckets.latest_key(), Some(&key("2024-04")));
        assert_eq!(buckets.previous_key(), Some(&key("2024-01")));
    }

    #[test]
    fn test_previous_key_requires_two_months() {
        let records = vec![record(1, "A", InvestmentType::Cash, "X", dec!(1), "2024-01-01")];
        let buckets = MonthBuckets::group(&records);
        assert_eq!(buckets.latest_key(), Some(&key("2024-01")));
        assert_eq!(buckets.previous_key(), None);
    }

    #[test]
    fn test_empty_input_yields_empty_state() {
        let buckets = MonthBuckets::group(&[]);
        assert!(buckets.is_empty());
        assert_eq!(buckets.sorted_keys().count(), 0);
        assert_eq!(buckets.latest_key(), None);
        assert_eq!(buckets.previous_key(), None);
        assert_eq!(buckets.total_for(&key("2024-01")), Decimal::ZERO);
        assert!(buckets.monthly_totals().is_empty());
        assert!(buckets.monthly_type_series().is_empty());
    }

    #[test]
    fn test_percentage_change() {
        let change = percentage_change(dec!(600.00), dec!(300.50)).unwrap();
        assert_eq!(change.round_dp(2), dec!(99.67));

        let drop = percentage_change(dec!(50), dec!(100)).unwrap();
        assert_eq!(drop, dec!(-50));
    }

    #[test]
    fn test_percentage_change_undefined_for_zero_previous() {
        assert_eq!(percentage_change(dec!(100), Decimal::ZERO), None);
        assert_eq!(percentage_change(Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn test_usable_cash_excludes_exact_names() {
        let records = vec![
            record(1, "VIAC - 3A", InvestmentType::Stock, "VIAC", dec!(1000), "2024-01-05"),
            record(2, "Cash", InvestmentType::Cash, "Neon", dec!(500), "2024-01-06"),
        ];
        let buckets = MonthBuckets::group(&records);
        let excluded: HashSet<String> = ["VIAC - 3A".to_string()].into();

        assert_eq!(buckets.usable_cash(&key("2024-01"), &excluded), dec!(500));
        assert_eq!(buckets.total_for(&key("2024-01")), dec!(1500));
    }

    #[test]
    fn test_usable_cash_matching_is_case_sensitive() {
        let records = vec![record(
            1,
            "VIAC - 3A",
            InvestmentType::Stock,
            "VIAC",
            dec!(1000),
            "2024-01-05",
        )];
        let buckets = MonthBuckets::group(&records);
        let excluded: HashSet<String> = ["viac - 3a".to_string()].into();

        // Mismatched casing silently fails to exclude
        assert_eq!(buckets.usable_cash(&key("2024-01"), &excluded), dec!(1000));
    }

    #[test]
    fn test_usable_cash_never_exceeds_total() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(100), "2024-01-05"),
            record(2, "B", InvestmentType::Cash, "X", dec!(200), "2024-01-06"),
        ];
        let buckets = MonthBuckets::group(&records);
        let none: HashSet<String> = HashSet::new();
        let some: HashSet<String> = ["A".to_string()].into();
        let k = key("2024-01");

        // Equality iff nothing in the month matches an excluded name
        assert_eq!(buckets.usable_cash(&k, &none), buckets.total_for(&k));
        assert!(buckets.usable_cash(&k, &some) < buckets.total_for(&k));
    }

    #[test]
    fn test_type_breakdown_descending_with_display_labels() {
        let records = vec![
            record(1, "Cash", InvestmentType::Cash, "X", dec!(100), "2024-01-05"),
            record(2, "Apple", InvestmentType::Stock, "Y", dec!(300), "2024-01-06"),
        ];
        let buckets = MonthBuckets::group(&records);
        let breakdown = buckets.type_breakdown(&key("2024-01"));

        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "STOCK");
        assert_eq!(breakdown[0].value, dec!(300));
        assert_eq!(breakdown[1].name, "CASH");
        assert_eq!(breakdown[1].value, dec!(100));
    }

    #[test]
    fn test_real_estate_label_is_space_normalized() {
        let records = vec![record(
            1,
            "REIT",
            InvestmentType::RealEstate,
            "X",
            dec!(100),
            "2024-01-05",
        )];
        let buckets = MonthBuckets::group(&records);
        assert_eq!(buckets.type_breakdown(&key("2024-01"))[0].name, "REAL ESTATE");
    }

    #[test]
    fn test_breakdown_ties_keep_first_encounter_order() {
        let records = vec![
            record(1, "A", InvestmentType::Bond, "Beta", dec!(100), "2024-01-05"),
            record(2, "B", InvestmentType::Cash, "Alpha", dec!(100), "2024-01-06"),
        ];
        let buckets = MonthBuckets::group(&records);
        let providers = buckets.provider_breakdown(&key("2024-01"));
        assert_eq!(providers[0].name, "Beta");
        assert_eq!(providers[1].name, "Alpha");
    }

    #[test]
    fn test_provider_breakdown_sums_per_provider() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "Neon", dec!(100), "2024-01-05"),
            record(2, "B", InvestmentType::Stock, "Neon", dec!(50), "2024-01-06"),
            record(3, "C", InvestmentType::Stock, "UBS", dec!(400), "2024-01-07"),
        ];
        let buckets = MonthBuckets::group(&records);
        let providers = buckets.provider_breakdown(&key("2024-01"));
        assert_eq!(providers[0].name, "UBS");
        assert_eq!(providers[0].value, dec!(400));
        assert_eq!(providers[1].name, "Neon");
        assert_eq!(providers[1].value, dec!(150));
    }

    #[test]
    fn test_monthly_totals_series_ascending() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(600.00), "2024-02-10"),
            record(2, "B", InvestmentType::Cash, "X", dec!(100.50), "2024-01-10"),
            record(3, "C", InvestmentType::Cash, "X", dec!(200), "2024-01-15"),
        ];
        let buckets = MonthBuckets::group(&records);
        let series = buckets.monthly_totals();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, key("2024-01"));
        assert_eq!(series[0].total, dec!(300.50));
        assert_eq!(series[1].month, key("2024-02"));
        assert_eq!(series[1].total, dec!(600.00));
    }

    #[test]
    fn test_monthly_type_series_is_sparse() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(100), "2024-01-10"),
            record(2, "B", InvestmentType::Stock, "X", dec!(200), "2024-01-15"),
            record(3, "C", InvestmentType::Stock, "X", dec!(250), "2024-02-15"),
        ];
        let buckets = MonthBuckets::group(&records);
        let series = buckets.monthly_type_series();

        assert_eq!(series.len(), 2);
        assert_eq!(
            series[0].totals,
            vec![
                (InvestmentType::Cash, dec!(100)),
                (InvestmentType::Stock, dec!(200)),
            ]
        );
        // February has no cash entry at all, not a zero entry
        assert_eq!(series[1].totals, vec![(InvestmentType::Stock, dec!(250))]);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            record(1, "A", InvestmentType::Cash, "X", dec!(100.10), "2024-01-10"),
            record(2, "B", InvestmentType::Stock, "Y", dec!(200.20), "2024-02-15"),
            record(3, "C", InvestmentType::Bond, "X", dec!(300.30), "2024-02-20"),
        ];
        let first = MonthBuckets::group(&records);
        let second = MonthBuckets::group(&records);

        assert_eq!(first.monthly_totals(), second.monthly_totals());
        assert_eq!(first.monthly_type_series(), second.monthly_type_series());
        for k in first.sorted_keys() {
            assert_eq!(first.type_breakdown(k), second.type_breakdown(k));
            assert_eq!(first.provider_breakdown(k), second.provider_breakdown(k));
        }
    }

    #[test]
    fn test_repeated_sums_do_not_drift() {
        // 0.1 + 0.2 summed many times stays exact under decimal arithmetic
        let records: Vec<InvestmentRecord> = (0..100)
            .map(|i| {
                record(
                    i,
                    &format!("r{i}"),
                    InvestmentType::Cash,
                    "X",
                    if i % 2 == 0 { dec!(0.10) } else { dec!(0.20) },
                    "2024-01-10",
                )
            })
            .collect();
        let buckets = MonthBuckets::group(&records);
        assert_eq!(buckets.total_for(&key("2024-01")), dec!(15.00));
    }
}
