mod admin;
mod app;
mod auth;
mod classes;
mod config;
mod db;
mod error;
mod homework;
mod realtime;
mod state;
mod students;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "hifztracker=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;

    // The HTTP surface must stay live while the store is down, so the
    // connect/migrate/seed sequence runs in the background.
    tokio::spawn(db::run_until_connected(state.clone()));

    let app = app::build_app(state);
    app::serve(app).await
}
