mod config;
mod errors;
mod llm_client;
mod models;
mod parser;
mod routes;
mod state;
mod upload;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::parser::prompts::resume_params;
use crate::parser::ResumeParser;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Parser API v{}", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&config.upload_folder).with_context(|| {
        format!(
            "Failed to create upload folder {}",
            config.upload_folder.display()
        )
    })?;
    info!("Upload folder: {}", config.upload_folder.display());

    // Initialize completion client; it owns its credentials
    let llm = LlmClient::new(config.oracle());
    let params = resume_params(&config.resume_engine, config.resume_max_tokens);
    info!(
        "Completion client initialized (engine: {}, max_tokens: {})",
        params.engine, params.max_tokens
    );
    let parser = Arc::new(ResumeParser::new(Arc::new(llm), params));

    let state = AppState {
        config: config.clone(),
        parser,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("RESUME_PARSER_HOST must be an IP address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
