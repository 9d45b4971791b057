mod collect;
mod export;
mod query;
mod schedule;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::export::ExportFormat;

#[derive(Debug, Parser)]
#[command(name = "ytrend")]
#[command(about = "Collect and inspect YouTube trending charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Which charts a collection run sweeps.
#[derive(Debug, Clone, Args)]
pub(crate) struct ScopeArgs {
    /// Region codes to collect (e.g. US,GB); defaults to the full catalog
    #[arg(long, value_delimiter = ',')]
    regions: Vec<String>,

    /// Category ids to collect (e.g. 10,24); defaults to the full catalog
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,

    /// Maximum videos per region/category chart
    #[arg(long, default_value = "50")]
    max_results: u32,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection cycle and persist the results
    Collect {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Print the collection plan without calling the API or writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Show today's quota usage for each configured API key
    Status,
    /// Show recent collection runs
    History {
        /// How many days back to look
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Export stored trending videos to a file
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Only rows collected within this many days
        #[arg(long, default_value = "7")]
        days: u32,

        /// Output path; defaults to `trending_export_<timestamp>.<ext>`
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
    /// List the region codes in the catalog
    ListRegions,
    /// List the category ids in the catalog
    ListCategories,
    /// Run the collection cycle on a cron schedule until interrupted
    Schedule {
        /// Six-field cron expression (sec min hour day month weekday), UTC
        #[arg(long, default_value = "0 0 */6 * * *")]
        cron: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Catalog listings need neither config nor a database.
    match &cli.command {
        Some(Commands::ListRegions) => {
            query::print_regions();
            return Ok(());
        }
        Some(Commands::ListCategories) => {
            query::print_categories();
            return Ok(());
        }
        None => {
            println!("ytrend: run `ytrend --help` for available commands");
            return Ok(());
        }
        _ => {}
    }

    let config = ytrend_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.env.log_ansi())
        .init();
    tracing::debug!(env = %config.env, database_url = %config.database_url, "config loaded");

    // Reject bad scope flags before touching the store.
    let plan = match &cli.command {
        Some(Commands::Collect { scope, .. } | Commands::Schedule { scope, .. }) => {
            Some(collect::resolve_plan(scope)?)
        }
        _ => None,
    };

    if let (Some(Commands::Collect { dry_run: true, .. }), Some(plan)) = (&cli.command, &plan) {
        collect::print_dry_run(&config, plan);
        return Ok(());
    }

    let pool_config = ytrend_db::PoolConfig::from_app_config(&config);
    let pool = ytrend_db::connect_pool(&config.database_url, pool_config).await?;
    ytrend_db::run_migrations(&pool).await?;

    match (cli.command, plan) {
        (Some(Commands::Collect { .. }), Some(plan)) => {
            collect::run_collect(&pool, &config, &plan).await?;
        }
        (Some(Commands::Status), _) => query::run_status(&pool, &config).await?,
        (Some(Commands::History { days }), _) => query::run_history(&pool, days).await?,
        (
            Some(Commands::Export {
                format,
                days,
                output,
            }),
            _,
        ) => export::run_export(&pool, format, days, output).await?,
        (Some(Commands::Schedule { cron, .. }), Some(plan)) => {
            schedule::run_schedule(pool, config, plan, &cron).await?;
        }
        _ => {}
    }

    Ok(())
}
