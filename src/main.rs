mod confidence;
mod config;
mod credentials;
mod error;
mod extract;
mod mrz;
mod ocr;
mod preprocess;
mod routes;
#[cfg(test)]
mod testdata;
mod vision;

use std::sync::Arc;

use config::Config;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vision::{VisionClient, VisionConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub vision: Arc<VisionClient>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Startup check only: the token source re-reads the key per mint, so a
    // fixed credentials file works without a restart.
    match credentials::load(&config.credentials_path) {
        Ok(key) => {
            tracing::info!(
                "Google Cloud credentials loaded: {} ({})",
                config.credentials_path,
                key.project_id
            );
        }
        Err(e) => {
            tracing::warn!("Google Cloud credentials not usable: {e}");
            tracing::warn!("OCR endpoints will fail until this is fixed; see .env.example");
        }
    }

    let mut vision_config = VisionConfig::new(config.credentials_path.clone());
    if let Some(endpoint) = &config.vision_endpoint {
        vision_config.endpoint = endpoint.clone();
    }
    let vision = VisionClient::new(&vision_config).expect("failed to build Vision HTTP client");

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        config: Arc::new(config),
        vision: Arc::new(vision),
    };

    let app = routes::api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
