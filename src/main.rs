mod app;
mod auth;
mod config;
mod error;
mod site;
mod state;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "authgate=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    if config.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET_KEY not set; signing with the built-in default secret");
    }
    tracing::info!(
        development = config.is_development(),
        static_dir = %config.static_dir.display(),
        "configuration loaded"
    );

    let (host, port) = (config.host.clone(), config.port);
    let app_state = AppState::init(config).await?;
    let app = app::build_app(app_state);

    app::serve(app, &host, port).await
}
