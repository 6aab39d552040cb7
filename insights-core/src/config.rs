use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct InsightsConfig {
    pub service: ServiceConfig,
    pub openai: OpenAiConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    pub chat_model: String,
    pub embedding_model: String,
    pub dimensions: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    pub name: String,
    pub metric: String,
    pub cloud: String,
    pub region: String,
    pub poll_interval_seconds: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: "repo-insights".to_string(),
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            poll_interval_seconds: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8877,
        }
    }
}

impl InsightsConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
