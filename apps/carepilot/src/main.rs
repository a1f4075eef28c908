use std::sync::Arc;
use std::time::Duration;

use carepilot_core::{
    config::AppConfig,
    http::{self, AppState},
    model::{AimlApiProvider, MockModelProvider, ModelProvider},
    places::{MapboxPlaceSearch, PlaceSearch, SyntheticPlaceDirectory},
    profile::{InMemoryProfileStore, PostgresProfileStore, ProfileStore},
    registry::SessionRegistry,
    reminders::LogNotifier,
    session::{SessionConfig, TypingDelay},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let model = build_model_provider(&config);
    let store = build_profile_store(&config).await?;
    let places = build_place_search(&config);

    let session_config = SessionConfig {
        typing: TypingDelay::new(config.typing_delay_min_ms, config.typing_delay_max_ms),
        history_debounce: Duration::from_secs(config.history_debounce_secs),
        search_radius_km: config.search_radius_km,
    };

    let registry = Arc::new(SessionRegistry::new(
        store,
        model,
        places,
        Arc::new(LogNotifier),
        session_config,
    ));

    let app = http::router(AppState { registry });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("CarePilot HTTP API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

fn build_model_provider(config: &AppConfig) -> Arc<dyn ModelProvider> {
    let provider = config.model_provider.to_lowercase();
    match provider.as_str() {
        "aimlapi" => {
            if let Some(api_key) = config.aiml_api_key.clone() {
                info!(model = %config.aiml_model, "using AIML API model provider");
                Arc::new(AimlApiProvider::new(
                    api_key,
                    config.aiml_base_url.clone(),
                    config.aiml_model.clone(),
                ))
            } else {
                warn!("MODEL_PROVIDER=aimlapi but AIML_API_KEY is missing; using mock");
                Arc::new(MockModelProvider)
            }
        }
        "mock" => {
            warn!("MODEL_PROVIDER=mock; using mock model provider");
            Arc::new(MockModelProvider)
        }
        "auto" => {
            if let Some(api_key) = config.aiml_api_key.clone() {
                info!(model = %config.aiml_model, "using AIML API model provider (auto mode)");
                Arc::new(AimlApiProvider::new(
                    api_key,
                    config.aiml_base_url.clone(),
                    config.aiml_model.clone(),
                ))
            } else {
                warn!("No AIML_API_KEY configured; using mock model provider");
                Arc::new(MockModelProvider)
            }
        }
        other => {
            warn!(
                provider = %other,
                "unknown MODEL_PROVIDER value; valid values are auto|aimlapi|mock; falling back to auto"
            );
            if let Some(api_key) = config.aiml_api_key.clone() {
                Arc::new(AimlApiProvider::new(
                    api_key,
                    config.aiml_base_url.clone(),
                    config.aiml_model.clone(),
                ))
            } else {
                Arc::new(MockModelProvider)
            }
        }
    }
}

async fn build_profile_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    if let Some(database_url) = &config.database_url {
        let store = PostgresProfileStore::connect(database_url).await?;
        info!("Connected to Postgres profile store");
        Ok(Arc::new(store))
    } else {
        warn!("DATABASE_URL not set; profiles and chat history are kept in memory");
        Ok(Arc::new(InMemoryProfileStore::default()))
    }
}

fn build_place_search(config: &AppConfig) -> Arc<dyn PlaceSearch> {
    if let Some(token) = config.mapbox_token.clone() {
        info!("using Mapbox provider search");
        Arc::new(MapboxPlaceSearch::new(token))
    } else {
        warn!("MAPBOX_TOKEN not set; nearby search serves the built-in provider directory");
        Arc::new(SyntheticPlaceDirectory)
    }
}
