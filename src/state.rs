use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::genai::client::GenAiService;
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::infrastructure::storage::s3::StorageService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub queue: RabbitMqService,
    pub storage: StorageService,
    pub genai: GenAiService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        queue: RabbitMqService,
        storage: StorageService,
        genai: GenAiService,
    ) -> Self {
        Self {
            config,
            db,
            queue,
            storage,
            genai,
        }
    }
}
