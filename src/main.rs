use std::sync::Arc;

use anyhow::{Context, Result};

use portrait_studio::{
    config::Config,
    logging::init_logging,
    provider::HuggingFaceProvider,
    web::{AppState, build_router},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_logging(&config.log_level);

    if config.hf_token.is_none() {
        tracing::warn!("HF_TOKEN is not set; generation requests will fail until it is configured");
    }

    let provider = HuggingFaceProvider::from_config(&config)
        .context("failed to build Hugging Face client")?;
    tracing::info!(endpoint = %provider.endpoint(), "Using Hugging Face inference endpoint");
    let state = AppState::from_config(&config, Arc::new(provider));
    state
        .uploads
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir().display()))?;
    state
        .generated
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create {}", config.generated_dir().display()))?;

    let router = build_router(state, &config.static_dir, config.max_upload_bytes);
    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    tracing::info!(model = %config.hf_model, "Portrait studio listening on http://{}", bind_address);

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
