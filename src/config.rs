use std::env;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub credentials_path: String,
    pub project_id: Option<String>,
    /// Override for the Vision endpoint, mainly for local stubs.
    pub vision_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_else(|_| "./credentials.json".to_string()),
            project_id: env::var("GOOGLE_CLOUD_PROJECT_ID").ok(),
            vision_endpoint: env::var("VISION_ENDPOINT").ok(),
        }
    }
}
