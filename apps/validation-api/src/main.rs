//! Validation API Server
//!
//! Serves global validation and auto-fix for a persona's generated
//! marketing assets:
//!
//! - `POST /validate/global` - hard checks, then AI consistency grading
//! - `POST /validate/auto-fix` - regenerate messaging/script when the
//!   grade is below threshold, then validate again
//!
//! Assets are read from SQLite; grading and regeneration go through an
//! OpenAI-compatible chat-completions endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validation_core::RetryPolicy;

mod api;
mod error;
mod generator;
mod llm;
mod state;
mod store;

use api::{handle_auto_fix, handle_health, handle_validate_global};
use llm::ChatClientConfig;
use state::{AppState, PipelineSettings};

/// Command-line arguments for the validation server
#[derive(Parser, Debug)]
#[command(name = "validation-api")]
#[command(about = "Global validation and auto-fix API for persona marketing assets")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:validation.db?mode=rwc")]
    database_url: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// Bearer token for the LLM API
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Model used for grading and regeneration
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    /// Grading deadline in seconds
    #[arg(long, env = "GRADING_TIMEOUT_SECS", default_value = "30")]
    grading_timeout_secs: u64,

    /// Attempts per grading/regeneration call, including the first
    #[arg(long, env = "RETRY_ATTEMPTS", default_value = "2")]
    retry_attempts: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Build the router over an already-wired state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/validate/global", post(handle_validate_global))
        .route("/validate/auto-fix", post(handle_auto_fix))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads env fallbacks
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting validation API on {}:{}", args.host, args.port);

    let grading_timeout = Duration::from_secs(args.grading_timeout_secs);
    let settings = PipelineSettings {
        grading_timeout,
        retry: RetryPolicy::default().with_attempts(args.retry_attempts),
    };
    let llm = ChatClientConfig {
        base_url: args.llm_base_url.clone(),
        api_key: args.llm_api_key.clone(),
        model: args.llm_model.clone(),
        request_timeout: grading_timeout,
    };

    let state = Arc::new(AppState::connect(&args.database_url, llm, settings).await?);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("LLM: {} at {}", args.llm_model, args.llm_base_url);
    info!(
        "Grading timeout: {}s, attempts: {}",
        args.grading_timeout_secs, args.retry_attempts
    );

    axum::serve(listener, app).await?;

    Ok(())
}
