pub mod backend;
pub mod cli;
pub mod core;

use crate::backend::RestStore;
use crate::cli::records::{NewRecord, RecordPatch};
use crate::core::config::AppConfig;
use crate::core::month::MonthKey;
use anyhow::Result;
use tracing::{debug, info};

/// A fully parsed top-level command, decoupled from the clap surface.
#[derive(Debug)]
pub enum AppCommand {
    Summary,
    Alloc { month: Option<MonthKey> },
    Providers { month: Option<MonthKey> },
    Trend,
    Records { month: Option<MonthKey> },
    Add(NewRecord),
    Edit { id: i64, patch: RecordPatch },
    Delete { id: i64 },
    Duplicate { id: i64 },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Folio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = RestStore::new(&config.api.base_url, &config.api.table);

    match command {
        AppCommand::Summary => cli::summary::run(&store, &config).await,
        AppCommand::Alloc { month } => cli::alloc::run(&store, &config, month).await,
        AppCommand::Providers { month } => cli::providers::run(&store, &config, month).await,
        AppCommand::Trend => cli::trend::run(&store, &config).await,
        AppCommand::Records { month } => cli::records::run(&store, &config, month).await,
        AppCommand::Add(new) => cli::records::add(&store, &config, new).await,
        AppCommand::Edit { id, patch } => cli::records::edit(&store, &config, id, patch).await,
        AppCommand::Delete { id } => cli::records::delete(&store, id).await,
        AppCommand::Duplicate { id } => cli::records::duplicate(&store, &config, id).await,
    }
}
