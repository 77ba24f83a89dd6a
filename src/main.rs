use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use careers_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes,
    services::{expiry_service::report_message, scheduler::start_expiry_scheduler},
    utils::time::SystemClock,
    AppState,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(version, about = "Careers backend: vacancies, lookups and the expiry sweep")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API and the daily expiry job
    Serve,
    /// Inactivate every vacancy whose close date has passed, then exit
    SweepExpired,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    init_config().context("Failed to load config")?;
    let config = get_config()?;

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;

    let app_state = AppState::new(pool, config, Arc::new(SystemClock))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::SweepExpired => {
            let inactivated = app_state.expiry().sweep().await?;
            println!("{}", report_message(inactivated));
        }
        Command::Serve => {
            let _scheduler = if config.scheduler_enabled {
                Some(
                    start_expiry_scheduler(
                        app_state.expiry().clone(),
                        &config.expiry_sweep_cron,
                        config.business_utc_offset,
                    )
                    .await?,
                )
            } else {
                info!("Expiry scheduler disabled");
                None
            };

            let app = routes::app_router(app_state)
                .layer(CorsLayer::permissive())
                .layer(TraceLayer::new_for_http());

            let addr: SocketAddr = config.server_address.parse()?;
            info!("Server listening on {}", addr);
            let listener = TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
