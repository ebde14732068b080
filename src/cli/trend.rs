use super::ui;
use crate::core::config::AppConfig;
use crate::core::engine::{MonthBuckets, percentage_change};
use crate::core::format;
use crate::core::record::InvestmentType;
use crate::core::store::RecordStore;
use anyhow::Result;
use comfy_table::{Cell, Color};

/// Portfolio evolution over time: total per month, and per-type totals per
/// month. The table counterparts of the dashboard's trend charts.
pub async fn run(store: &dyn RecordStore, config: &AppConfig) -> Result<()> {
    let records = super::fetch_records(store, &config.currency).await?;
    let buckets = MonthBuckets::group(&records);

    if buckets.is_empty() {
        println!("No investments recorded yet.");
        return Ok(());
    }

    display_totals_series(&buckets, &config.currency);
    ui::print_separator();
    display_type_series(&buckets);

    Ok(())
}

fn display_totals_series(buckets: &MonthBuckets, currency: &str) {
    println!(
        "\n{}\n",
        ui::style_text("Portfolio Evolution", ui::StyleType::Title)
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell(&format!("Total ({currency})")),
        ui::header_cell("Change"),
    ]);

    let mut previous = None;
    for point in buckets.monthly_totals() {
        let change = previous.and_then(|prev| percentage_change(point.total, prev));
        table.add_row(vec![
            Cell::new(format::month_label_short(&point.month)),
            ui::value_cell(&format::format_currency(point.total, currency)),
            ui::change_cell(change),
        ]);
        previous = Some(point.total);
    }
    println!("{table}");
}

fn display_type_series(buckets: &MonthBuckets) {
    println!(
        "\n{}\n",
        ui::style_text("Investment Types Evolution", ui::StyleType::Title)
    );

    let series = buckets.monthly_type_series();

    // Column order: types in order of first appearance across the series
    let mut types: Vec<InvestmentType> = Vec::new();
    for month in &series {
        for (t, _) in &month.totals {
            if !types.contains(t) {
                types.push(*t);
            }
        }
    }

    let mut header = vec![ui::header_cell("Month")];
    for t in &types {
        header.push(ui::header_cell(t.label()));
    }

    let mut table = ui::new_styled_table();
    table.set_header(header);

    for month in &series {
        let mut row = vec![Cell::new(format::month_label_short(&month.month))];
        for t in &types {
            // Sparse series: a type absent from a month is shown empty
            match month.totals.iter().find(|(mt, _)| mt == t) {
                Some((_, value)) => row.push(ui::value_cell(&format::format_compact(*value))),
                None => row.push(Cell::new("–").fg(Color::DarkGrey)),
            }
        }
        table.add_row(row);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::RawInvestmentRow;
    use crate::core::store::{RecordDraft, RecordStore};
    use async_trait::async_trait;

    struct FixedStore;

    #[async_trait]
    impl RecordStore for FixedStore {
        async fn list(&self) -> Result<Vec<RawInvestmentRow>> {
            Ok(serde_json::from_str(
                r#"[
                {"investment_id": 1, "investment_name": "Apple", "investment_type": "stock",
                 "provider": "Swissquote", "amount": "300", "currency": "CHF",
                 "created_at": "2024-01-15T08:00:00.000Z"},
                {"investment_id": 2, "investment_name": "Savings", "investment_type": "cash",
                 "provider": "Neon", "amount": 100, "currency": "CHF",
                 "created_at": "2024-02-20T08:00:00.000Z"}
            ]"#,
            )?)
        }

        async fn create(&self, _draft: &RecordDraft) -> Result<RawInvestmentRow> {
            anyhow::bail!("read-only store")
        }

        async fn update(&self, _id: i64, _draft: &RecordDraft) -> Result<RawInvestmentRow> {
            anyhow::bail!("read-only store")
        }

        async fn delete(&self, _id: i64) -> Result<RawInvestmentRow> {
            anyhow::bail!("read-only store")
        }
    }

    #[tokio::test]
    async fn test_trend_command() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
api:
  base_url: "http://localhost:5000"
currency: "CHF"
"#,
        )
        .unwrap();
        assert!(run(&FixedStore, &config).await.is_ok());
    }
}
