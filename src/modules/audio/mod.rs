use axum::routing::{get, post};
use axum::Router;
use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod events;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audiofiles/process", post(handler::process_audio))
        .route("/audiofiles/results/{task_id}", get(handler::get_task_result))
}
