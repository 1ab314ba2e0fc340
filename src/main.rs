//! The `hr-engine` HTTP service.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use leave_payroll_engine::api::{AppState, create_router};
use leave_payroll_engine::config::ConfigLoader;
use leave_payroll_engine::directory::{InMemoryAttendance, InMemoryDirectory, SystemClock};
use leave_payroll_engine::store::Store;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite://hr-engine.db";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config_dir =
        std::env::var("HR_ENGINE_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = std::env::var("HR_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let database_url = std::env::var("HR_ENGINE_DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let config = ConfigLoader::load(&config_dir)
        .with_context(|| format!("loading engine configuration from {}", config_dir))?;

    let store = Store::open(&database_url)
        .with_context(|| format!("opening the store at {}", database_url))?;

    let state = AppState::with_store(
        config,
        store,
        Arc::new(InMemoryDirectory::new()),
        Arc::new(InMemoryAttendance::new()),
        Arc::new(SystemClock),
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(addr = %addr, config_dir = %config_dir, "hr-engine listening");

    axum::serve(listener, create_router(state))
        .await
        .context("serving HTTP")?;
    Ok(())
}
