use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use folio::cli::records::{NewRecord, RecordPatch};
use folio::core::log::init_logging;
use folio::core::month::MonthKey;
use folio::core::record::InvestmentType;
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio summary for the latest month
    Summary,
    /// Display asset allocation by investment type
    Alloc {
        /// Month to display (YYYY-MM), defaults to the latest month with data
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Display distribution by provider
    Providers {
        /// Month to display (YYYY-MM), defaults to the latest month with data
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Display portfolio evolution across months
    Trend,
    /// List investment records for a month
    Records {
        /// Month to display (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<MonthKey>,
    },
    /// Add a new investment record
    Add(AddArgs),
    /// Edit an existing investment record
    Edit {
        /// Record id
        id: i64,
        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Delete an investment record
    Delete {
        /// Record id
        id: i64,
    },
    /// Duplicate a record into a fresh entry dated today
    Duplicate {
        /// Record id
        id: i64,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Investment name
    name: String,
    /// Investment type (cash, bond, stock, real_estate, commodity, crypto)
    #[arg(short = 't', long = "type")]
    investment_type: InvestmentType,
    /// Provider holding the investment
    #[arg(short, long)]
    provider: String,
    /// Amount in the record currency
    #[arg(short, long)]
    amount: Decimal,
    /// Record currency, defaults to the configured home currency
    #[arg(long)]
    currency: Option<String>,
    /// Unit count (shares, coins)
    #[arg(short, long)]
    unit: Option<Decimal>,
    /// Free-form notes
    #[arg(short, long)]
    notes: Option<String>,
}

#[derive(Args)]
struct PatchArgs {
    /// New investment name
    #[arg(long)]
    name: Option<String>,
    /// New investment type
    #[arg(short = 't', long = "type")]
    investment_type: Option<InvestmentType>,
    /// New provider
    #[arg(short, long)]
    provider: Option<String>,
    /// New amount
    #[arg(short, long)]
    amount: Option<Decimal>,
    /// New currency
    #[arg(long)]
    currency: Option<String>,
    /// New unit count
    #[arg(short, long)]
    unit: Option<Decimal>,
    /// New notes
    #[arg(short, long)]
    notes: Option<String>,
}

impl From<Commands> for folio::AppCommand {
    fn from(cmd: Commands) -> folio::AppCommand {
        match cmd {
            Commands::Summary => folio::AppCommand::Summary,
            Commands::Alloc { month } => folio::AppCommand::Alloc { month },
            Commands::Providers { month } => folio::AppCommand::Providers { month },
            Commands::Trend => folio::AppCommand::Trend,
            Commands::Records { month } => folio::AppCommand::Records { month },
            Commands::Add(args) => folio::AppCommand::Add(NewRecord {
                name: args.name,
                investment_type: args.investment_type,
                provider: args.provider,
                amount: args.amount,
                currency: args.currency,
                unit: args.unit,
                notes: args.notes,
            }),
            Commands::Edit { id, patch } => folio::AppCommand::Edit {
                id,
                patch: RecordPatch {
                    name: patch.name,
                    investment_type: patch.investment_type,
                    provider: patch.provider,
                    amount: patch.amount,
                    currency: patch.currency,
                    unit: patch.unit,
                    notes: patch.notes,
                },
            },
            Commands::Delete { id } => folio::AppCommand::Delete { id },
            Commands::Duplicate { id } => folio::AppCommand::Duplicate { id },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => folio::cli::setup::setup_at_path(path),
            None => folio::cli::setup::setup(),
        },
        Some(cmd) => folio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
