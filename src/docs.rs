use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::audio::handler::process_audio,
        crate::modules::audio::handler::get_task_result,
    ),
    components(
        schemas(
            crate::modules::audio::dto::AudioProcessResponse,
            crate::modules::audio::dto::AudioTaskResultResponse,
            crate::modules::audio::model::TaskStatus,
            crate::common::response::ErrorResponse,
        )
    ),
    tags(
        (name = "Audio", description = "Asynchronous audio transcription tasks")
    )
)]
pub struct ApiDoc;
