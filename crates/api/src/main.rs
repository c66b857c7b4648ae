use std::sync::Arc;

use anyhow::Context;

use restock_api::ApiConfig;
use restock_infra::ScheduledCheck;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    restock_observability::init();

    let config = ApiConfig::from_env().context("invalid environment configuration")?;
    if config.api_token.is_none() {
        tracing::warn!("RESTOCK_API_TOKEN not set; the check endpoint is unauthenticated");
    }

    let services = Arc::new(restock_api::app::services::build_services(&config));

    let runner = config.schedule_interval.map(|interval| {
        ScheduledCheck::every(interval)
            .with_notifications(config.notify)
            .spawn("replenishment.scheduled", services.check.clone())
    });

    let app = restock_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(runner) = runner {
        runner.shutdown().await;
    }
    tracing::info!("stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
