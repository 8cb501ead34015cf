//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod feedback;
pub mod health;
pub mod job;
pub mod plan;
pub mod stage;
pub mod system;
pub mod upload;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::Coordinator;

/// Create the main API router with all endpoints
pub fn create_router(coordinator: Arc<Coordinator>, max_upload_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Stage endpoints
        .route("/v1/lyrics.generate", post(stage::generate_lyrics))
        .route("/v1/compose.generate", post(stage::compose))
        .route("/v1/separate.vocals", post(stage::separate_vocals))
        .route("/v1/mix.reintegrate", post(stage::reintegrate))
        // Job endpoints
        .route("/v1/jobs", get(job::list_jobs))
        .route("/v1/jobs/{job_id}/status", get(job::get_job_status))
        // Plan endpoints
        .route("/v1/ai/lyrics", post(plan::plan_lyrics))
        .route("/v1/ai/compose", post(plan::plan_compose))
        .route("/v1/ai/separate", post(plan::plan_separate))
        .route("/v1/ai/reintegrate", post(plan::plan_reintegrate))
        // Feedback
        .route("/v1/feedback", post(feedback::submit_feedback))
        // System and projects
        .route("/v1/system.prompt", get(system::system_prompt))
        .route("/v1/projects/{project_id}", get(system::get_project))
        // Add state and middleware
        .with_state(coordinator)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::engine::Engines;
    use crate::engine::stub::probe_tests::wav_bytes;
    use crate::ledger::Ledger;

    const BOUNDARY: &str = "studio-test-boundary";

    fn coordinator() -> Arc<Coordinator> {
        Arc::new(Coordinator::new(
            Arc::new(Ledger::new(1024)),
            Engines::stub(),
            Duration::from_secs(10),
            2,
        ))
    }

    fn app() -> Router {
        create_router(coordinator(), 8 * 1024 * 1024)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    enum Part<'a> {
        File(&'a str, &'a str, Vec<u8>),
        Text(&'a str, &'a str),
    }

    fn post_multipart(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: audio/wav\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&data);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        send(&app, post_json("/v1/lyrics.generate", json!({}))).await;

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["jobs"], 1);
    }

    #[tokio::test]
    async fn test_lyrics_then_status() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json(
                "/v1/lyrics.generate",
                json!({
                    "genre": "pop",
                    "mood": "joyful",
                    "length": {"verses": 2, "choruses": 1},
                    "prompt": "summer love, joy and nostalgia"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["version"], "1.0");
        assert_eq!(body["result"]["sections"].as_array().unwrap().len(), 3);

        let job_id = body["job_id"].as_str().unwrap();
        let (status, job) = send(&app, get(&format!("/v1/jobs/{job_id}/status"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job["state"], "completed");
        assert_eq!(job["kind"], "lyrics.generate");
        assert_eq!(job["result"], body["result"]);
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        let (status, body) = send(
            &app(),
            post_json(
                "/v1/compose.generate",
                json!({"tempo_bpm": 1000, "duration_sec": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation_error");
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["tempo_bpm", "duration_sec"]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/lyrics.generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation_error");
    }

    #[tokio::test]
    async fn test_unknown_job_is_404() {
        let uri = format!("/v1/jobs/{}/status", uuid::Uuid::new_v4());
        let (status, body) = send(&app(), get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_corrupt_upload_is_engine_failure() {
        let app = app();
        let (status, body) = send(
            &app,
            post_multipart(
                "/v1/separate.vocals",
                vec![Part::File("file", "song.wav", b"garbage bytes".to_vec())],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "engine_failure");

        let job_id = body["job_id"].as_str().unwrap();
        let (_, job) = send(&app, get(&format!("/v1/jobs/{job_id}/status"))).await;
        assert_eq!(job["state"], "failed");
        assert_eq!(job["error"]["kind"], "engine_failure");
    }

    #[tokio::test]
    async fn test_separation_of_wav_upload() {
        let (status, body) = send(
            &app(),
            post_multipart(
                "/v1/separate.vocals",
                vec![Part::File("file", "song.wav", wav_bytes(44_100, 2, 0.25))],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["outputs"]["vocals"], "song_vocals.wav");
        assert_eq!(body["result"]["source"]["sample_rate"], 44_100);
    }

    #[tokio::test]
    async fn test_mix_plan_reads_form_fields() {
        let (status, body) = send(
            &app(),
            post_multipart(
                "/v1/ai/reintegrate",
                vec![
                    Part::File("instrumental", "inst.wav", wav_bytes(44_100, 2, 0.25)),
                    Part::File("vocals", "vox.wav", wav_bytes(44_100, 2, 0.25)),
                    Part::Text("key", "A minor"),
                    Part::Text("tempo_bpm", "96"),
                    Part::Text("preset", "warm-intimate"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let plan = &body["reintegration_plan"];
        assert_eq!(plan["target"]["key"], "A minor");
        assert_eq!(plan["target"]["tempo_bpm"], 96);
        assert_eq!(plan["vocal_bus"]["preset"], "warm-intimate");
        assert!(body.get("job_id").is_none());
    }

    #[tokio::test]
    async fn test_missing_upload_is_rejected() {
        let (status, body) = send(
            &app(),
            post_multipart("/v1/mix.reintegrate", vec![Part::Text("key", "C major")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_multipart_upload_is_rejected() {
        let app = app();
        for uri in ["/v1/separate.vocals", "/v1/ai/reintegrate"] {
            let (status, body) = send(&app, post_json(uri, json!({"file": "song.wav"}))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["kind"], "validation_error");
        }
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let coordinator = coordinator();
        let app = create_router(Arc::clone(&coordinator), 1024);

        let (status, body) = send(
            &app,
            post_multipart(
                "/v1/separate.vocals",
                vec![Part::File("file", "song.wav", vec![0u8; 4096])],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["kind"], "validation_error");
        assert!(coordinator.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_detached_mode_returns_accepted() {
        let app = app();
        let (status, body) = send(
            &app,
            post_json("/v1/compose.generate?mode=detached", json!({"key": "D minor"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["state"], "pending");

        let uri = format!("/v1/jobs/{}/status", body["job_id"].as_str().unwrap());
        let mut job = Value::Null;
        for _ in 0..200 {
            job = send(&app, get(&uri)).await.1;
            if job["state"] == "completed" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(job["state"], "completed");
        assert_eq!(job["result"]["music_spec"]["key"], "D minor");
    }

    #[tokio::test]
    async fn test_unknown_mode_is_rejected() {
        let (status, _) = send(
            &app(),
            post_json("/v1/lyrics.generate?mode=eventually", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_feedback_echoes_entry() {
        let (status, body) = send(
            &app(),
            post_json(
                "/v1/feedback",
                json!({"target": "lyrics", "rating": 5, "reason": "catchy"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["stored"]["rating"], 5);
    }

    #[tokio::test]
    async fn test_system_prompt() {
        let (status, body) = send(&app(), get("/v1/system.prompt")).await;
        assert_eq!(status, StatusCode::OK);
        let prompt = body["prompt"].as_str().unwrap();
        assert!(prompt.contains("lyrics.generate"));
        assert!(prompt.contains("mix.reintegrate"));
    }

    #[tokio::test]
    async fn test_project_summary() {
        let app = app();
        let (status, body) = send(&app, get("/v1/projects/demo-7")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"id": "demo-7", "assets": [], "status": "ok"}));

        let (status, body) = send(&app, get("/v1/projects/%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"][0]["field"], "project_id");
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let app = app();
        send(&app, post_json("/v1/lyrics.generate", json!({}))).await;
        send(&app, post_json("/v1/compose.generate", json!({}))).await;

        let (status, body) = send(&app, get("/v1/jobs")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }
}
