mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "infludb")]
#[command(about = "Track follower counts of social accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add an account and fetch its follower count immediately
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
        /// instagram, tiktok or twitter
        #[arg(long)]
        platform: String,
    },
    /// Refresh follower counts for every account, or only the given links
    Update {
        #[arg(long = "link")]
        links: Vec<String>,
    },
    /// Stop tracking an account
    Delete {
        #[arg(long)]
        link: String,
    },
    /// Show tracked accounts
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Import accounts from a YAML file (`accounts: [{name, link, platform}]`)
    Import { file: PathBuf },
    /// Write every tracked account to stdout as JSON
    Export,
    /// Refresh all accounts on the configured interval until interrupted
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = infludb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, database_url = %config.database_url, "loaded configuration");

    let pool_config = infludb_db::PoolConfig::from_app_config(&config);
    let pool = infludb_db::connect_pool(&config.database_url, pool_config).await?;
    infludb_db::run_migrations(&pool).await?;
    let store = Arc::new(infludb_db::SqliteAccountStore::new(pool));

    let extractors = infludb_scraper::build_extractors(&config)?;
    let tracker = Arc::new(
        infludb_tracker::Tracker::new(store, extractors)
            .with_max_concurrent(config.max_concurrent_extractions),
    );

    match cli.command {
        Commands::Add {
            name,
            link,
            platform,
        } => commands::run_add(&tracker, &name, &link, &platform).await?,
        Commands::Update { links } => commands::run_update(&tracker, &links).await?,
        Commands::Delete { link } => commands::run_delete(&tracker, &link).await?,
        Commands::List { json } => commands::run_list(&tracker, json).await?,
        Commands::Import { file } => commands::run_import(&tracker, &file).await?,
        Commands::Export => commands::run_export(&tracker).await?,
        Commands::Run => commands::run_scheduler(tracker, &config, shutdown_signal()).await?,
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal");
}
