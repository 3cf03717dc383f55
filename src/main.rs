use std::sync::Arc;

use booking_console::app::AppState;
use booking_console::config::AppConfig;
use booking_console::navigation::LogNavigator;
use booking_console::server::app_routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    eprintln!("📅 Booking Console v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path);
    eprintln!("   Namespace: {}", config.namespace);
    eprintln!("   State API: http://0.0.0.0:{}/api", config.http_port);
    eprintln!("   Events WS: ws://0.0.0.0:{}/ws\n", config.http_port);

    // ── State ───────────────────────────────────────────────────────────
    let state = AppState::open(&config, Arc::new(LogNavigator)).await?;

    let onboarding = state.onboarding.snapshot().await;
    tracing::info!(
        step = onboarding.current_step.number(),
        completed = onboarding.is_completed(),
        workspaces = state.workspaces.workspaces().await.len(),
        "Restored persisted state"
    );

    // ── HTTP/WS server ──────────────────────────────────────────────────
    let app = app_routes(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port)).await?;
    tracing::info!(port = config.http_port, "Booking console server started");
    axum::serve(listener, app).await?;

    Ok(())
}
