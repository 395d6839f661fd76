use anyhow::Result;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::settings::{CorsConfig, SettingsConfig};
use crate::config::ServiceConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::providers::food::FoodStore;
use crate::providers::movies::TmdbClient;
use crate::providers::music::SpotifyClient;
use crate::server::handlers;

/// Everything a handler needs. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub movies: TmdbClient,
    pub music: SpotifyClient,
    pub food: FoodStore,
}

impl AppState {
    pub fn new(metrics: &Metrics, movies: TmdbClient, music: SpotifyClient, food: FoodStore) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            movies,
            music,
            food,
        }
    }

    /// Wire providers from config. The food store file is read here.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        let providers = &service_config.providers;
        let metrics = get_metrics().await;
        Ok(Self::new(
            metrics,
            TmdbClient::from_config(&providers.tmdb)?,
            SpotifyClient::from_config(&providers.spotify)?,
            FoodStore::open(&providers.food.path).await?,
        ))
    }
}

pub fn router(state: AppState, settings_config: &SettingsConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/movies/popular", get(handlers::popular_movies))
        .route("/music/recommend", post(handlers::recommend_music))
        .route("/food/recommend", get(handlers::all_foods))
        .route("/food/compare/{item}", get(handlers::compare_food));

    Router::new()
        .merge(routes)
        .merge(state.metrics_state.router(&settings_config.metrics))
        .layer(cors_layer(&settings_config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    if cors.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| warn!("ignoring CORS origin '{}': {}", origin, e))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn start(settings_config: &SettingsConfig, state: AppState) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(state, settings_config);

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    metrics.up.set(0);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
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

    info!("shutdown signal received");
}
