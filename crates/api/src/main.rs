use anyhow::Context;

use gatehouse_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    gatehouse_observability::init(config.log_format);

    if config.session_secret.is_dev_fallback() {
        tracing::warn!("GATEHOUSE_SESSION_SECRET not set; using insecure dev default");
    }
    if config.bootstrap_admin.is_none() {
        tracing::warn!("no bootstrap admin configured; every login will be rejected");
    }

    let state = app::AppState::from_config(&config).await;
    let router = app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        environment = ?config.environment,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, router).await?;
    Ok(())
}
