use crate::{
    app::App, codegen::ShortCodes, db::PostgresDb, db_pool::DbPool, handler::routes,
    migrations::run_migrations,
};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod codegen;
mod db;
mod db_pool;
mod handler;
mod migrations;
mod models;
mod schema;
mod signals;

#[cfg(not(debug_assertions))]
#[must_use]
pub const fn is_debug() -> bool {
    false
}

#[cfg(debug_assertions)]
#[must_use]
pub const fn is_debug() -> bool {
    true
}

#[derive(Parser, Debug)]
struct Arguments {
    #[arg(long, default_value_t = 8000, help = "Port to listen on", env = "PORT")]
    port: u16,

    #[arg(long, help = "Logging level of the Rust log", env = "RUST_LOG")]
    #[clap(default_value_t = String::from("info,tower_http=debug"))]
    rust_log_level: String,

    #[arg(long, help = "Postgres connection string", env = "DATABASE_URL")]
    db_url: String,

    #[arg(
        long,
        default_value_t = 10,
        help = "DB pool size",
        env = "DB_POOL_SIZE",
        value_parser = parse_pool_size
    )]
    db_pool_size: usize,
}

// an empty pool never hands out a connection
fn parse_pool_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err(String::from("pool size must be at least 1")),
        Ok(size) => Ok(size),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine, the environment may already be set
    let dotenv = dotenvy::dotenv();

    let args = Arguments::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.rust_log_level))
        .with(tracing_subscriber::fmt::layer().with_ansi(is_debug()))
        .init();

    match dotenv {
        Ok(path) => tracing::info!("loaded env from {}", path.display()),
        Err(e) => tracing::debug!("no .env loaded: {e}"),
    }

    tracing::info!(
        sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        branch = option_env!("VERGEN_GIT_BRANCH").unwrap_or("unknown"),
        "starting tinylink"
    );

    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Could not install rustls default crypto provider."))?;

    run_migrations(&args.db_url)?;

    let dbpool = DbPool::build(&args.db_url, args.db_pool_size).await?;

    let app = App::new(
        Arc::new(PostgresDb::new(dbpool)),
        ShortCodes::from_os_rng(),
    );

    let router = routes(app).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    tracing::info!("listening on http://{}", addr);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    signals::create_term_signal_handler(tx);

    let listener = TcpListener::bind(addr).await?;

    let server = axum::serve(listener, router);

    let graceful = server.with_graceful_shutdown(async {
        rx.await.ok();
    });

    if let Err(e) = graceful.await {
        tracing::error!("server error: {}", e);
    }

    tracing::info!("shut down");

    Ok(())
}
