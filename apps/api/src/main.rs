mod analysis;
mod config;
mod errors;
mod llm_client;
mod media;
mod routes;
mod rubrics;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::{GeminiClient, ModelClient};
use crate::media::decoder::FfmpegDecoder;
use crate::media::sampler::FrameSampler;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Adlens API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model client
    let model = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    info!("Model client initialized (model: {})", model.model_name());

    // Initialize frame sampler (ffmpeg / ffprobe subprocess decoder)
    let decoder = FfmpegDecoder::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
        config.frame_read_timeout,
    );
    let sampler = Arc::new(FrameSampler::new(Arc::new(decoder)));
    info!(
        "Frame sampler initialized (ffmpeg: {}, ffprobe: {}, default frames: {})",
        config.ffmpeg_path.display(),
        config.ffprobe_path.display(),
        config.default_frame_count
    );

    // Build app state
    let state = AppState {
        model: Arc::new(model),
        sampler,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
