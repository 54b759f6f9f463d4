use crate::config::Config;
use crate::library::PathResolver;
use crate::streaming;
use crate::thumbnails::{
    FfmpegFrameExtractor, FrameExtractor, MimeSniffer, PrefixSniffer, ThumbnailCache,
    ThumbnailService,
};
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod error;
pub mod routes_api;

pub use error::AppError;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub resolver: Arc<PathResolver>,
    pub thumbnails: Arc<ThumbnailService>,
}

impl AppContext {
    /// Build the context with the production sniffer and ffmpeg extractor.
    pub fn from_config(config: Config) -> Result<Self> {
        let extractor = FfmpegFrameExtractor::discover(config.thumbnails.ffmpeg_path.as_deref());
        tracing::debug!(program = %extractor.program().display(), "Using frame extractor");
        let sniffer = PrefixSniffer::new(config.thumbnails.sniff_bytes);
        Self::with_services(config, Arc::new(sniffer), Arc::new(extractor))
    }

    /// Build the context around caller-supplied classification and frame
    /// extraction.
    pub fn with_services(
        config: Config,
        sniffer: Arc<dyn MimeSniffer>,
        extractor: Arc<dyn FrameExtractor>,
    ) -> Result<Self> {
        let resolver = Arc::new(PathResolver::new(config.roots.clone()));
        let cache = Arc::new(ThumbnailCache::new(config.thumbnails.cache_capacity));
        let thumbnails = ThumbnailService::new(
            Arc::clone(&resolver),
            cache,
            sniffer,
            extractor,
            config.thumbnails.clone(),
        )?;

        Ok(Self {
            config: Arc::new(config),
            resolver,
            thumbnails: Arc::new(thumbnails),
        })
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ]);

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", routes_api::api_routes())
        .nest("/media", streaming::media_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Uses SPA fallback: serves index.html for any route that doesn't match a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!("Static directory {:?} does not exist", dir);
        }
    }

    app
}

async fn health_check() -> impl IntoResponse {
    "OK"
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    for (index, root) in config.roots.iter().enumerate() {
        tracing::info!("Serving root [{}] {}", index, root.display());
    }

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::from_config(config)?;
    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
