use anyhow::Context;

use axum_taskboard::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config).context("Failed to initialize application state")?;
    let router = app(state);

    println!("Server running on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}
