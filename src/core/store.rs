//! Storage abstraction for the record table.
//!
//! The aggregation engine never calls a store: commands fetch the full list,
//! normalize, aggregate, and after a mutation simply refetch.

use crate::core::record::{InvestmentRecord, RawInvestmentRow};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

/// Body of a create/update request, matching the REST API's column names.
/// The legacy `name` column is kept in lockstep with `investment_name`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDraft {
    pub name: String,
    pub investment_name: String,
    pub investment_type: String,
    pub provider: String,
    pub amount: Decimal,
    pub currency: String,
    pub unit: Option<Decimal>,
    pub notes: Option<String>,
}

impl RecordDraft {
    /// Draft copying an existing record, as the dashboard's duplicate action
    /// does: same fields, the store assigns a fresh id and effective date.
    pub fn from_record(record: &InvestmentRecord) -> Self {
        RecordDraft {
            name: record.name.clone(),
            investment_name: record.name.clone(),
            investment_type: record.investment_type.to_string(),
            provider: record.provider.clone(),
            amount: record.amount,
            currency: record.currency.clone(),
            unit: record.unit,
            notes: Some(record.notes.clone().unwrap_or_default()),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows of the configured table.
    async fn list(&self) -> Result<Vec<RawInvestmentRow>>;

    /// Inserts a record and returns the stored row with its assigned id.
    async fn create(&self, draft: &RecordDraft) -> Result<RawInvestmentRow>;

    /// Replaces a record's fields. Fails when the id does not exist.
    async fn update(&self, id: i64, draft: &RecordDraft) -> Result<RawInvestmentRow>;

    /// Deletes a record and returns the removed row. Fails when the id does
    /// not exist.
    async fn delete(&self, id: i64) -> Result<RawInvestmentRow>;
}
