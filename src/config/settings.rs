use serde::Deserialize;
use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub amqp_url: String,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub genai_api_key: String,
    pub genai_model: String,
    pub genai_base_url: String,
    pub transcribe_timeout_secs: u64,
    pub worker_prefetch: u16,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            amqp_url: env::get(EnvKey::AmqpUrl)?,
            minio_url: env::get(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)?,
            minio_access_key: env::get(EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(EnvKey::MinioSecretKey)?,
            genai_api_key: env::get(EnvKey::GenAiApiKey)?,
            genai_model: env::get(EnvKey::GenAiModel)?,
            genai_base_url: env::get_or(
                EnvKey::GenAiBaseUrl,
                "https://generativelanguage.googleapis.com",
            ),
            transcribe_timeout_secs: env::get_parsed(EnvKey::TranscribeTimeoutSecs, 120),
            worker_prefetch: env::get_parsed(EnvKey::WorkerPrefetch, 4),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, 50 * 1024 * 1024),
        })
    }
}
