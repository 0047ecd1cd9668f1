use std::time::Duration;

use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use transcribe_backend::infrastructure::genai::client::{GenAiError, GenAiService};

async fn start_mock_genai_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/v1beta/models/gemini-test:generateContent",
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

fn service(base_url: &str) -> GenAiService {
    GenAiService::new(base_url, "test-key", "gemini-test", Duration::from_secs(5))
}

#[tokio::test]
async fn given_structured_model_reply_when_transcribing_then_returns_transcript_and_commentary() {
    let body = r#"{
        "candidates": [{
            "content": {
                "parts": [{
                    "text": "{\"transcript\": \"hello world\", \"commentary\": \"greeting\"}"
                }]
            }
        }]
    }"#;
    let (base_url, shutdown_tx) = start_mock_genai_server(200, body).await;

    let result = service(&base_url)
        .transcribe_and_comment(b"fake audio bytes", "audio/mpeg")
        .await;

    let outcome = result.unwrap();
    assert_eq!(outcome.transcript, "hello world");
    assert_eq!(outcome.commentary.as_deref(), Some("greeting"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_plain_text_model_reply_when_transcribing_then_whole_text_is_the_transcript() {
    let body = r#"{
        "candidates": [{
            "content": {
                "parts": [{ "text": "just some prose" }]
            }
        }]
    }"#;
    let (base_url, shutdown_tx) = start_mock_genai_server(200, body).await;

    let result = service(&base_url)
        .transcribe_and_comment(b"fake audio bytes", "audio/wav")
        .await;

    let outcome = result.unwrap();
    assert_eq!(outcome.transcript, "just some prose");
    assert_eq!(outcome.commentary, None);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_api_error_status_when_transcribing_then_returns_api_error_with_status() {
    let body = r#"{"error": {"code": 429, "message": "quota exceeded"}}"#;
    let (base_url, shutdown_tx) = start_mock_genai_server(429, body).await;

    let result = service(&base_url)
        .transcribe_and_comment(b"fake audio bytes", "audio/mpeg")
        .await;

    match result {
        Err(GenAiError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_no_candidates_when_transcribing_then_returns_empty_response_error() {
    let body = r#"{"candidates": []}"#;
    let (base_url, shutdown_tx) = start_mock_genai_server(200, body).await;

    let result = service(&base_url)
        .transcribe_and_comment(b"fake audio bytes", "audio/mpeg")
        .await;

    assert!(matches!(result, Err(GenAiError::EmptyResponse)));
    shutdown_tx.send(()).ok();
}
