use crate::app::AppState;
use crate::config::AppConfig;
use crate::db::connection::init_db;
use crate::db::seed::seed_demo_data;
use crate::router::respond;
use astra::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod leads;
mod rate_limit;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,buyer_leads=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let state = AppState::new(config);

    if let Err(e) = init_db(&state.db) {
        tracing::error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    if state.config.seed_demo_data {
        if let Err(e) = seed_demo_data(&state.db, chrono::Utc::now()) {
            tracing::error!("seeding demo data failed: {e}");
            std::process::exit(1);
        }
    }

    let addr = state.config.bind_addr;
    tracing::info!(
        %addr,
        workers = state.config.max_workers,
        db = %state.config.database_path,
        "starting server"
    );

    let server = Server::bind(&addr).max_workers(state.config.max_workers);
    let result = server.serve(move |req, _info| respond(req, &state));

    if let Err(e) = result {
        tracing::error!("server ended with error: {e}");
    }

    tracing::info!("server shut down");
}
