use super::ui;
use crate::core::config::AppConfig;
use crate::core::engine::{MonthBuckets, percentage_change};
use crate::core::format;
use crate::core::store::RecordStore;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashSet;

/// Portfolio summary cards: latest-month total and usable cash with their
/// period-over-period deltas, plus investment and provider counts.
pub async fn run(store: &dyn RecordStore, config: &AppConfig) -> Result<()> {
    let records = super::fetch_records(store, &config.currency).await?;
    let buckets = MonthBuckets::group(&records);

    // Metrics follow the latest data-bearing month, not the wall clock
    let Some(latest) = buckets.latest_key().copied() else {
        println!("No investments recorded yet.");
        return Ok(());
    };

    let excluded = config.excluded_name_set();
    let total = buckets.total_for(&latest);
    let usable = buckets.usable_cash(&latest, &excluded);

    let (total_change, usable_change) = match buckets.previous_key().copied() {
        Some(previous) => (
            percentage_change(total, buckets.total_for(&previous)),
            percentage_change(usable, buckets.usable_cash(&previous, &excluded)),
        ),
        None => (None, None),
    };

    let latest_records = buckets.records_for(&latest);
    let provider_count = latest_records
        .iter()
        .map(|r| r.provider.as_str())
        .collect::<HashSet<_>>()
        .len();

    println!(
        "\nPortfolio Summary: {}\n",
        ui::style_text(&format::month_label(&latest), ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metric"),
        ui::header_cell("Value"),
        ui::header_cell("Change"),
    ]);
    table.add_row(vec![
        Cell::new("Total Portfolio Value"),
        ui::value_cell(&format::format_currency(total, &config.currency)),
        ui::change_cell(total_change),
    ]);
    table.add_row(vec![
        Cell::new("Usable Cash"),
        ui::value_cell(&format::format_currency(usable, &config.currency)),
        ui::change_cell(usable_change),
    ]);
    table.add_row(vec![
        Cell::new("Number of Investments"),
        ui::value_cell(&latest_records.len().to_string()),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Number of Providers"),
        ui::value_cell(&provider_count.to_string()),
        Cell::new(""),
    ]);
    println!("{table}");

    if !config.excluded_names.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Usable cash excludes: {} (exact, case-sensitive match)",
                    config.excluded_names.join(", ")
                ),
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}
