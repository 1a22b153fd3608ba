use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvscan_api::analysis::{KeywordAnalyzer, LlmAnalyzer, ResumeAnalyzer};
use cvscan_api::config::{AnalyzerBackend, Config};
use cvscan_api::llm_client::{self, LlmClient};
use cvscan_api::routes::build_router;
use cvscan_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cvscan_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvscan API v{}", env!("CARGO_PKG_VERSION"));

    let analyzer = build_analyzer(&config)?;
    info!("Analyzer backend: {}", analyzer.backend());

    let state = AppState {
        analyzer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_analyzer(config: &Config) -> Result<Arc<dyn ResumeAnalyzer>> {
    match config.analyzer_backend {
        AnalyzerBackend::Keyword => Ok(Arc::new(KeywordAnalyzer)),
        AnalyzerBackend::Llm => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .context("ANTHROPIC_API_KEY is required for the llm backend")?;
            let llm = LlmClient::new(api_key)?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmAnalyzer(llm)))
        }
    }
}
