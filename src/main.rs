use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use choreboard::api::{self, AppState};
use choreboard::bot::TelegramBot;
use choreboard::config::Config;
use choreboard::db::Database;
use choreboard::session::{SessionRegistry, SESSION_TTL_SECS};

#[derive(Parser)]
#[command(name = "choreboard")]
#[command(about = "Shared to-do list with a web UI, a JSON API, and a Telegram bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Choreboard web server
    Serve {
        /// Port for the web UI and API
        #[arg(short, long)]
        port: Option<u16>,

        /// Listen host
        #[arg(long)]
        host: Option<String>,
    },
    /// Start the Telegram bot (separate process, same database)
    Bot,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "choreboard=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = match &config.db_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let sessions = SessionRegistry::new();

    // Hourly sweep keeps the registry in step with the cookie lifetime
    let sweep = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let evicted = sweep
                .evict_older_than(chrono::Duration::seconds(SESSION_TTL_SECS))
                .await;
            if evicted > 0 {
                tracing::debug!("Evicted {evicted} expired sessions");
            }
        }
    });

    let state = AppState {
        db,
        sessions,
        admin: Arc::new(config.admin.clone()),
        static_dir: config.static_dir.clone(),
    };
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Choreboard server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port, host }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            serve(config).await
        }
        Some(Commands::Bot) => {
            let token = config.telegram_token.clone().ok_or_else(|| {
                anyhow::anyhow!("CHOREBOARD_TELEGRAM_TOKEN must be set for bot mode")
            })?;
            let db = open_database(&config)?;
            TelegramBot::new(&token, db).run().await
        }
        None => serve(config).await,
    }
}
