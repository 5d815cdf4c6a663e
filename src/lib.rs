use anyhow::{Context, Result};
use dotenvy::dotenv;

pub mod ai;
pub mod config;
pub mod messages;
pub mod planner;
pub mod render;
mod system_info;
pub mod web;

pub use config::Config;
pub use planner::{ConsultationRequest, PlanOutcome, PlanResult, Planner};
pub use system_info::get_system_info;
pub use web::{router, AppState};

/// Build the router state from configuration.
///
/// Provider clients are created here once and shared by every request.
pub fn app_state(config: &Config) -> AppState {
    let planner = config.ai.as_ref().map(Planner::from_config);
    match &planner {
        Some(planner) => {
            let settings = planner.settings();
            tracing::info!(
                plan_max_tokens = settings.plan_max_tokens,
                plan_temperature = settings.plan_temperature,
                follow_up_max_tokens = settings.follow_up_max_tokens,
                "Planner ready"
            );
        }
        None => tracing::warn!("{}", messages::API_KEYS_MISSING),
    }
    AppState {
        planner,
        footer: get_system_info(),
    }
}

// ──────────────────────────────────────────────────────────────
// Main application setup
// ──────────────────────────────────────────────────────────────

pub async fn run() -> Result<()> {
    // Load .env file if it exists (for local development)
    dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting meal planner...");

    let config = Config::from_env();
    if let Some(ai) = &config.ai {
        tracing::info!(
            claude_model = %ai.claude_model,
            gemini_model = %ai.gemini_model,
            "Provider clients configured"
        );
    }
    let app = router(app_state(&config));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
