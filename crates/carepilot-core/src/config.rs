use std::{env, net::SocketAddr};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub model_provider: String,
    pub aiml_api_key: Option<String>,
    pub aiml_base_url: String,
    pub aiml_model: String,
    pub database_url: Option<String>,
    pub mapbox_token: Option<String>,
    pub search_radius_km: f64,
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,
    pub history_debounce_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            model_provider: env::var("MODEL_PROVIDER").unwrap_or_else(|_| "auto".to_owned()),
            aiml_api_key: env::var("AIML_API_KEY").ok(),
            aiml_base_url: env::var("AIML_BASE_URL")
                .unwrap_or_else(|_| "https://api.aimlapi.com/v1".to_owned()),
            aiml_model: env::var("AIML_MODEL").unwrap_or_else(|_| "gpt-4o".to_owned()),
            database_url: env::var("DATABASE_URL").ok(),
            mapbox_token: env::var("MAPBOX_TOKEN").ok(),
            search_radius_km: env_f64("SEARCH_RADIUS_KM", 10.0),
            typing_delay_min_ms: env_u64("TYPING_DELAY_MIN_MS", 500),
            typing_delay_max_ms: env_u64("TYPING_DELAY_MAX_MS", 1_500),
            history_debounce_secs: env_u64("HISTORY_DEBOUNCE_SECS", 5),
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(default)
}
