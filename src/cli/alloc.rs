use crate::core::config::AppConfig;
use crate::core::engine::MonthBuckets;
use crate::core::format;
use crate::core::month::MonthKey;
use crate::core::store::RecordStore;
use anyhow::Result;

/// Asset allocation for one month: per-type totals, descending. Defaults to
/// the latest data-bearing month when no month is given.
pub async fn run(
    store: &dyn RecordStore,
    config: &AppConfig,
    month: Option<MonthKey>,
) -> Result<()> {
    let records = super::fetch_records(store, &config.currency).await?;
    let buckets = MonthBuckets::group(&records);

    let Some(key) = month.or_else(|| buckets.latest_key().copied()) else {
        println!("No investments recorded yet.");
        return Ok(());
    };

    let breakdown = buckets.type_breakdown(&key);
    if breakdown.is_empty() {
        println!(
            "No investments recorded for {}.",
            format::month_label(&key)
        );
        return Ok(());
    }

    super::display_breakdown(
        &format!("Asset Allocation: {}", format::month_label(&key)),
        "Type",
        &breakdown,
        buckets.total_for(&key),
        &config.currency,
    );

    Ok(())
}
