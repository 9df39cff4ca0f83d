use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// The main entry point for the Karavan bookkeeping application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from the .env file, if there is one.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let mut config = configuration::load_config()?;
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config.server).await?;
        }
        Commands::Migrate => {
            let db_pool = database::connect().await?;
            database::run_migrations(&db_pool).await?;
            tracing::info!("Database migrations applied.");
        }
    }

    Ok(())
}

/// A small cargo bookkeeping service: clients, consigned items, exchange
/// rates, and revenue analytics over a PostgreSQL store.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Apply database migrations and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides the port from config.toml.
    #[arg(long)]
    port: Option<u16>,
}
