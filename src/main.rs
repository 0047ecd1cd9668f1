use std::time::Duration;

use dotenvy::dotenv;
use tracing::{error, info};

use transcribe_backend::app;
use transcribe_backend::config::settings::AppConfig;
use transcribe_backend::infrastructure::db::pool;
use transcribe_backend::infrastructure::genai::client::GenAiService;
use transcribe_backend::infrastructure::queue::rabbitmq::RabbitMqService;
use transcribe_backend::infrastructure::storage::s3::StorageService;
use transcribe_backend::state::AppState;
use transcribe_backend::workers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting server...");

    let config = AppConfig::new()
        .map_err(|e| anyhow::anyhow!("Missing configuration: {}", e))?;

    let db = pool::connect_to_db(&config.database_url).await?;
    pool::run_migrations(&db).await?;

    let queue = RabbitMqService::new(&config.amqp_url).await?;

    let storage = StorageService::new(
        &config.minio_url,
        &config.minio_bucket,
        &config.minio_access_key,
        &config.minio_secret_key,
    )
    .await;
    storage.ensure_bucket().await?;

    let genai = GenAiService::new(
        &config.genai_base_url,
        &config.genai_api_key,
        &config.genai_model,
        Duration::from_secs(config.transcribe_timeout_secs),
    );

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState::new(config, db, queue, storage, genai);

    let worker_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = workers::processor::start_audio_worker(worker_state).await {
            error!("Audio worker exited: {}", e);
        }
    });

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
