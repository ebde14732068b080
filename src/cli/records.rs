use super::ui;
use crate::core::config::AppConfig;
use crate::core::engine::MonthBuckets;
use crate::core::format;
use crate::core::month::MonthKey;
use crate::core::record::{InvestmentRecord, InvestmentType, normalize_row};
use crate::core::store::{RecordDraft, RecordStore};
use anyhow::{Context, Result, bail};
use comfy_table::Cell;
use rust_decimal::Decimal;
use tracing::info;

/// Fields of a new record, as collected from the command line.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub investment_type: InvestmentType,
    pub provider: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub unit: Option<Decimal>,
    pub notes: Option<String>,
}

/// Partial overrides for an existing record; unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub investment_type: Option<InvestmentType>,
    pub provider: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub unit: Option<Decimal>,
    pub notes: Option<String>,
}

/// Investment tables. With `--month`, just that month; otherwise the current
/// calendar month (which may be empty even when older data exists) followed
/// by the previous calendar month, mirroring the dashboard layout.
pub async fn run(
    store: &dyn RecordStore,
    config: &AppConfig,
    month: Option<MonthKey>,
) -> Result<()> {
    let records = super::fetch_records(store, &config.currency).await?;
    let buckets = MonthBuckets::group(&records);

    match month {
        Some(key) => display_month_table("Investment Details", &key, &buckets, &config.currency),
        None => {
            let current = MonthKey::current();
            display_month_table("Investment Details", &current, &buckets, &config.currency);
            ui::print_separator();
            display_month_table(
                "Previous Month Investment Details",
                &current.pred(),
                &buckets,
                &config.currency,
            );
        }
    }

    Ok(())
}

fn display_month_table(title: &str, key: &MonthKey, buckets: &MonthBuckets, currency: &str) {
    println!(
        "\n{}",
        ui::style_text(
            &format!("{title}: {}", format::month_label(key)),
            ui::StyleType::Title
        )
    );

    let mut records: Vec<&InvestmentRecord> = buckets.records_for(key).iter().collect();
    if records.is_empty() {
        println!(
            "\n{}",
            ui::style_text("No investments recorded for this month.", ui::StyleType::Subtle)
        );
        return;
    }
    // Display order: most recent first
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Type"),
        ui::header_cell("Provider"),
        ui::header_cell("Amount"),
        ui::header_cell("Unit"),
        ui::header_cell("Notes"),
        ui::header_cell("Date"),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(record.id.to_string()),
            Cell::new(&record.name),
            Cell::new(record.investment_type.label()),
            Cell::new(&record.provider),
            ui::value_cell(&format::format_currency(record.amount, &record.currency)),
            ui::value_cell(
                &record
                    .unit
                    .map(|u| u.normalize().to_string())
                    .unwrap_or_else(|| "–".to_string()),
            ),
            Cell::new(record.notes.as_deref().unwrap_or("")),
            Cell::new(record.created_at.format("%Y-%m-%d").to_string()),
        ]);
    }
    println!("\n{table}");

    println!(
        "\nMonth Total ({}): {}",
        ui::style_text(currency, ui::StyleType::TotalLabel),
        ui::style_text(
            &format::format_currency(buckets.total_for(key), currency),
            ui::StyleType::TotalValue
        )
    );
}

/// Creates a record; its effective month is assigned by the store.
pub async fn add(store: &dyn RecordStore, config: &AppConfig, new: NewRecord) -> Result<()> {
    let draft = RecordDraft {
        name: new.name.clone(),
        investment_name: new.name,
        investment_type: new.investment_type.to_string(),
        provider: new.provider,
        amount: new.amount,
        currency: new.currency.unwrap_or_else(|| config.currency.clone()),
        unit: new.unit,
        notes: Some(new.notes.unwrap_or_default()),
    };

    let row = store.create(&draft).await?;
    info!("Created investment {}", row.investment_id);
    println!(
        "Added {} (id {}).",
        draft.investment_name, row.investment_id
    );
    Ok(())
}

/// Applies field overrides to an existing record and stores the result.
pub async fn edit(
    store: &dyn RecordStore,
    config: &AppConfig,
    id: i64,
    patch: RecordPatch,
) -> Result<()> {
    let record = find_record(store, config, id).await?;

    let name = patch.name.unwrap_or(record.name);
    let draft = RecordDraft {
        name: name.clone(),
        investment_name: name,
        investment_type: patch
            .investment_type
            .unwrap_or(record.investment_type)
            .to_string(),
        provider: patch.provider.unwrap_or(record.provider),
        amount: patch.amount.unwrap_or(record.amount),
        currency: patch.currency.unwrap_or(record.currency),
        unit: patch.unit.or(record.unit),
        notes: Some(patch.notes.or(record.notes).unwrap_or_default()),
    };

    store.update(id, &draft).await?;
    info!("Updated investment {id}");
    println!("Updated {} (id {id}).", draft.investment_name);
    Ok(())
}

/// Deletes a record and reports what was removed.
pub async fn delete(store: &dyn RecordStore, id: i64) -> Result<()> {
    let row = store.delete(id).await?;
    info!("Deleted investment {id}");
    println!("Deleted {} (id {id}).", row.investment_name);
    Ok(())
}

/// Copies an existing record into a fresh row; the store assigns the new id
/// and effective date, so this is how a holding is carried into a new month.
pub async fn duplicate(store: &dyn RecordStore, config: &AppConfig, id: i64) -> Result<()> {
    let record = find_record(store, config, id).await?;
    let draft = RecordDraft::from_record(&record);

    let row = store.create(&draft).await?;
    info!("Duplicated investment {id} as {}", row.investment_id);
    println!(
        "Duplicated {} (id {id}) as id {}.",
        draft.investment_name, row.investment_id
    );
    Ok(())
}

async fn find_record(
    store: &dyn RecordStore,
    config: &AppConfig,
    id: i64,
) -> Result<InvestmentRecord> {
    let rows = store.list().await?;
    let Some(raw) = rows.iter().find(|r| r.investment_id == id) else {
        bail!("Investment {id} not found");
    };
    normalize_row(raw, &config.currency).context("Stored record is malformed")
}
