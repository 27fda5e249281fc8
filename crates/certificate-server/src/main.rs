// Certificate Server - HTTP and AWS Lambda entry point

use anyhow::Context;
use certificate_server::{create_router, AppState, Config};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Set by the Lambda runtime in every function container.
const LAMBDA_RUNTIME_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let on_lambda = std::env::var_os(LAMBDA_RUNTIME_ENV).is_some();
    init_tracing(on_lambda);

    let config = Config::from_env()?;
    let state = AppState::from_config(&config).await?;
    let app = create_router(state).layer(TraceLayer::new_for_http());

    if config.offline {
        tracing::info!(path = %config.offline_pdf_path.display(), "Offline mode: PDFs are also written locally");
    }

    if on_lambda {
        tracing::info!("Serving as AWS Lambda function");
        lambda_http::run(app)
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime error: {}", e))?;
    } else {
        let listener = tokio::net::TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
        tracing::info!(addr = %config.bind_addr, "Listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    Ok(())
}

fn init_tracing(on_lambda: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // CloudWatch timestamps every line already.
    if on_lambda {
        subscriber.without_time().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
