use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nestwell::api::{self, HealthResponse};
use nestwell::config::Config;
use nestwell::db::Database;
use nestwell::mcp;
use nestwell::models::JourneyTrack;

#[derive(Parser)]
#[command(name = "nestwell")]
#[command(about = "Back-office service for surrogacy agencies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides NESTWELL_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (overrides NESTWELL_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Start MCP server via stdio
    Mcp {
        /// SQLite database file (overrides NESTWELL_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Check whether a server is answering
    Status {
        /// Port the server listens on (overrides NESTWELL_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the ordered stages of a journey track
    Stages {
        /// `case` or `milestone`
        track: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; in MCP mode stdout carries the protocol.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "nestwell=debug,nestwell_core=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, db }) => {
            serve(Config::from_env()?.with_overrides(port, db)).await?;
        }
        Some(Commands::Mcp { db }) => {
            let config = Config::from_env()?.with_overrides(None, db);
            let db = open_database(&config)?;

            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Status { port }) => {
            let config = Config::from_env()?.with_overrides(port, None);
            let url = format!("http://{}/api/health", config.listen_addr());

            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    let health: HealthResponse = response.json().await?;
                    println!("Nestwell {} is running at {}", health.version, config.listen_addr());
                }
                Ok(response) => {
                    println!("Server at {} answered with {}", config.listen_addr(), response.status());
                }
                Err(e) => {
                    println!("No server reachable at {}: {}", config.listen_addr(), e);
                }
            }
        }
        Some(Commands::Stages { track }) => {
            let track = JourneyTrack::from_str(&track)
                .with_context(|| format!("unknown track '{}', expected case or milestone", track))?;
            for (i, stage) in track.stages().iter().enumerate() {
                println!("{}. {}", i + 1, stage.label());
            }
        }
        None => {
            serve(Config::from_env()?).await?;
        }
    }

    Ok(())
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = Database::open(&config.db_path)?;
    db.migrate()?;
    Ok(db)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Nestwell server on {}", config.listen_addr());

    let db = open_database(&config)?;
    let app = api::create_router(db, &config.cors);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("Nestwell server listening on http://{}", config.listen_addr());

    axum::serve(listener, app).await?;
    Ok(())
}
