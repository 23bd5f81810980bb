use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edm_orgs::{
    config::Config,
    database::Database,
    errors::ImportError,
    ingestor::ImportService,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "edm-orgs")]
#[command(version)]
#[command(about = "Loads FactSet EDM entity archives and serves the organisations they describe")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load an EDM archive into a new store
    Import {
        /// Path of the EDM zip archive
        #[arg(env = "FSIMPORT_EDM_PATH")]
        edm_path: PathBuf,

        /// Name of the store to create
        #[arg(env = "FSIMPORT_DB_NAME")]
        db_name: String,
    },
    /// Serve organisations from a loaded store
    Serve {
        /// Name of the store to open
        #[arg(env = "FSIMPORT_DB_NAME")]
        db_name: String,

        /// Listening IP address
        #[arg(short = 'H', long, value_name = "IP")]
        host: Option<String>,

        /// Listening port
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("edm_orgs={},tower_http=trace", cli.log_level)
    } else {
        format!("edm_orgs={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    match cli.command {
        Command::Import { edm_path, db_name } => run_import(config, edm_path, db_name).await,
        Command::Serve {
            db_name,
            host,
            port,
        } => run_server(config, db_name, host, port).await,
    }
}

async fn run_import(config: Config, edm_path: PathBuf, db_name: String) -> Result<()> {
    info!("Importing {} into '{}'", edm_path.display(), db_name);

    if !edm_path.is_file() {
        let err = ImportError::bootstrap(format!("archive {} not found", edm_path.display()));
        error!("{}", err);
        return Err(err.into());
    }

    let database = Database::create(&config.database, &db_name)
        .await
        .map_err(|e| {
            error!("{}", e);
            e
        })?;

    let summary = ImportService::new(database, config.import)
        .run(&edm_path)
        .await
        .map_err(|e| {
            error!("Import failed: {}", e);
            e
        })?;

    for (table, rows) in &summary.tables_loaded {
        info!("{}: {} rows", table, rows);
    }
    info!(
        "Import complete: {} rows, {} identities, {} entries skipped, {:.1}s",
        summary.rows_loaded,
        summary.identities_mapped,
        summary.skipped_entries.len(),
        summary.elapsed.as_secs_f64()
    );

    Ok(())
}

async fn run_server(
    mut config: Config,
    db_name: String,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    let database = Database::open(&config.database, &db_name)
        .await
        .with_context(|| format!("opening store '{}'", db_name))?;
    info!("Store '{}' opened", db_name);

    let web_server = WebServer::new(config, database)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
