//! conFusion REST server.
//!
//! Serves the menu, comment, favorite and account endpoints backed by
//! PostgreSQL, or by an in-memory store with `--in-memory`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use cf_server::{
    api::{self, AppState},
    config::{Overrides, ServerConfig},
    logging, metrics,
};
use confusion::{
    auth::{AuthManager, TokenIssuer},
    db::{Database, MemoryStore, PgStore},
    menu::MenuManager,
};
use pico_args::Arguments;

const HELP: &str = "\
Run the conFusion REST server

USAGE:
  cf_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url        URL      Database connection string  [default: env DATABASE_URL]
  --metrics-bind  IP:PORT  Prometheus listener address [default: env METRICS_BIND, disabled if unset]

FLAGS:
  --in-memory              Keep all data in process memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               Token signing secret, at least 32 characters (required)
  CORS_ALLOWED_ORIGINS     Comma separated origins allowed to call the API
  DB_RUN_MIGRATIONS        Apply embedded migrations at startup [default: true]
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
  (See .env.example for all configuration options)
";

struct Args {
    overrides: Overrides,
    in_memory: bool,
}

fn parse_args() -> Result<Args, Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        in_memory: pargs.contains("--in-memory"),
        overrides: Overrides {
            bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
            database_url: pargs.opt_value_from_str("--db-url")?,
            metrics_bind: pargs.opt_value_from_str::<_, SocketAddr>("--metrics-bind")?,
        },
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    logging::init();

    let config = ServerConfig::from_env(args.overrides)?;
    config.validate()?;
    tracing::info!("Starting conFusion server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        tracing::info!("Prometheus metrics exported on http://{metrics_bind}/metrics");
    }

    let tokens = TokenIssuer::new(&config.security.jwt_secret);

    let (state, database) = if args.in_memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        let store = Arc::new(MemoryStore::new());
        let state = AppState {
            auth_manager: Arc::new(AuthManager::new(store.clone(), tokens)),
            menu_manager: Arc::new(MenuManager::from_store(store)),
        };
        (state, None)
    } else {
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Database connected successfully");

        if config.run_migrations {
            db.migrate().await.context("Failed to apply migrations")?;
            tracing::info!("Database migrations applied");
        }

        let store = Arc::new(PgStore::new(db.pool().clone()));
        let state = AppState {
            auth_manager: Arc::new(AuthManager::new(store.clone(), tokens)),
            menu_manager: Arc::new(MenuManager::from_store(store)),
        };
        (state, Some(db))
    };

    let app = api::create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
}
