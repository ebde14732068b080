//! Core business logic: normalization, month bucketing, aggregation.

pub mod config;
pub mod engine;
pub mod format;
pub mod log;
pub mod month;
pub mod record;
pub mod store;

// Re-export main types for cleaner imports
pub use engine::{BreakdownEntry, MonthBuckets, MonthTotal, MonthTypeTotals, percentage_change};
pub use month::MonthKey;
pub use record::{InvestmentRecord, InvestmentType, MalformedRecordError, RawInvestmentRow};
pub use store::{RecordDraft, RecordStore};
