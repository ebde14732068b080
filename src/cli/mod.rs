//! Terminal commands and rendering.

pub mod alloc;
pub mod providers;
pub mod records;
pub mod setup;
pub mod summary;
pub mod trend;
pub mod ui;

use crate::core::engine::BreakdownEntry;
use crate::core::format;
use crate::core::record::{InvestmentRecord, normalize_rows};
use crate::core::store::RecordStore;
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;
use tracing::debug;

/// Fetches the full record list and normalizes it. Every command starts
/// here: one refetch per invocation, no local cache.
pub(crate) async fn fetch_records(
    store: &dyn RecordStore,
    home_currency: &str,
) -> Result<Vec<InvestmentRecord>> {
    let pb = ui::new_spinner("Fetching investments...");
    let rows = store.list().await;
    pb.finish_and_clear();

    let records = normalize_rows(&rows?, home_currency)?;
    debug!("Normalized {} records", records.len());
    Ok(records)
}

/// Renders a breakdown (type or provider) as a table with a share column.
pub(crate) fn display_breakdown(
    title: &str,
    category_header: &str,
    entries: &[BreakdownEntry],
    total: Decimal,
    currency: &str,
) {
    println!("\n{}\n", ui::style_text(title, ui::StyleType::Title));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(category_header),
        ui::header_cell(&format!("Value ({currency})")),
        ui::header_cell("Share"),
    ]);

    for entry in entries {
        let share = if total.is_zero() {
            ui::value_cell("n/a")
        } else {
            ui::value_cell(&format!("{:.1}%", entry.value / total * Decimal::from(100)))
        };
        table.add_row(vec![
            Cell::new(&entry.name),
            ui::value_cell(&format::format_currency(entry.value, currency)),
            share,
        ]);
    }
    println!("{table}");

    println!(
        "\nTotal: {}",
        ui::style_text(
            &format::format_currency(total, currency),
            ui::StyleType::TotalValue
        )
    );
}
