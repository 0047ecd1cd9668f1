use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    AmqpUrl,
    MinioUrl,
    MinioBucket,
    MinioAccessKey,
    MinioSecretKey,
    GenAiApiKey,
    GenAiModel,
    GenAiBaseUrl,
    TranscribeTimeoutSecs,
    WorkerPrefetch,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::AmqpUrl => "AMQP_URL",
            EnvKey::MinioUrl => "MINIO_ENDPOINT",
            EnvKey::MinioBucket => "MINIO_BUCKET_AUDIO",
            EnvKey::MinioAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::MinioSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::GenAiApiKey => "GENAI_API_KEY",
            EnvKey::GenAiModel => "GENAI_MODEL_NAME",
            EnvKey::GenAiBaseUrl => "GENAI_BASE_URL",
            EnvKey::TranscribeTimeoutSecs => "TRANSCRIBE_TIMEOUT_SECS",
            EnvKey::WorkerPrefetch => "WORKER_PREFETCH",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
