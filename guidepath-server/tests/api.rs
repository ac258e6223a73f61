//! Router tests driven through `tower::ServiceExt::oneshot`

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use guidepath_core::config::GuideConfig;
use guidepath_core::Command;
use guidepath_eye::frame::encode_jpeg;
use guidepath_server::{create_router, ApiState};
use guidepath_spk::{LogEngine, Narrator};
use image::{Rgb, RgbImage};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "guidepathboundary";

fn test_state(config: &GuideConfig) -> ApiState {
    ApiState::new(config, Narrator::new(Arc::new(LogEngine::new())))
}

fn quiet_config() -> GuideConfig {
    let mut config = GuideConfig::default();
    config.server.debug_artifacts = false;
    config
}

fn centered_line_jpeg() -> Vec<u8> {
    let mut frame = RgbImage::from_pixel(320, 240, Rgb([60, 60, 60]));
    for y in 0..240 {
        for x in 80..240 {
            frame.put_pixel(x, y, Rgb([255, 220, 0]));
        }
    }
    encode_jpeg(&frame, 80).unwrap()
}

fn blank_jpeg() -> Vec<u8> {
    encode_jpeg(&RgbImage::new(320, 240), 80).unwrap()
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"frame.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = create_router(test_state(&quiet_config()));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "running"}));
}

#[tokio::test]
async fn test_multipart_centered_line() {
    let app = create_router(test_state(&quiet_config()));
    let (status, body) = send(&app, multipart_request("image", &centered_line_jpeg())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["detection"]["found"], true);
    assert_eq!(body["detection"]["position"], "center");
    assert_eq!(body["detection"]["type"], "line");
    assert!(body["detection"]["confidence"].as_f64().unwrap() > 30.0);
    assert_eq!(body["navigation"]["command"], "straight");
    assert_eq!(body["navigation"]["message"], "Go straight.");
    assert_eq!(body["navigation"]["severity"], "info");
}

#[tokio::test]
async fn test_json_base64_upload() {
    let app = create_router(test_state(&quiet_config()));
    let payload = json!({ "image": STANDARD.encode(centered_line_jpeg()) });
    let (status, body) = send(&app, json_request(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["navigation"]["command"], "straight");
}

#[tokio::test]
async fn test_blank_frame_reports_path_lost() {
    let app = create_router(test_state(&quiet_config()));
    let (status, body) = send(&app, multipart_request("image", &blank_jpeg())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["detection"],
        json!({"found": false, "position": "unknown", "type": "none", "offset": 0.0, "confidence": 0.0})
    );
    assert_eq!(
        body["navigation"],
        json!({"command": "stop", "message": "Path lost.", "severity": "warning"})
    );
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let app = create_router(test_state(&quiet_config()));
    let expected = json!({"success": false, "error": "No image received"});

    let empty = Request::builder().method("POST").uri("/analyze").body(Body::empty()).unwrap();
    assert_eq!(send(&app, empty).await, (StatusCode::BAD_REQUEST, expected.clone()));

    let wrong_field = multipart_request("photo", &centered_line_jpeg());
    assert_eq!(send(&app, wrong_field).await, (StatusCode::BAD_REQUEST, expected.clone()));

    let wrong_key = json_request(json!({"frame": "abc"}));
    assert_eq!(send(&app, wrong_key).await, (StatusCode::BAD_REQUEST, expected));
}

#[tokio::test]
async fn test_undecodable_image_is_bad_request_and_server_keeps_serving() {
    let app = create_router(test_state(&quiet_config()));

    let (status, body) = send(&app, multipart_request("image", b"not a jpeg at all")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, json_request(json!({"image": "***not base64***"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_analysis_fault_is_internal_error_and_server_keeps_serving() {
    // inverted edge thresholds make the classifier panic on any frame with a path
    let mut config = quiet_config();
    config.pattern.canny_low = 200.0;
    config.pattern.canny_high = 100.0;
    let state = test_state(&config);
    let app = create_router(state.clone());

    for _ in 0..2 {
        let (status, body) = send(&app, multipart_request("image", &centered_line_jpeg())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false}));
    }
    assert_eq!(state.spoken.lock().last_spoken_command, None);

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    // frames without a path never reach the classifier
    let (status, body) = send(&app, multipart_request("image", &blank_jpeg())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["navigation"]["command"], "stop");
}

#[tokio::test]
async fn test_shared_debounce_tracks_announcements() {
    let state = test_state(&quiet_config());
    let app = create_router(state.clone());

    send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert_eq!(state.spoken.lock().last_spoken_command, Some(Command::Straight));

    send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert_eq!(state.spoken.lock().last_spoken_command, Some(Command::Straight));

    send(&app, multipart_request("image", &blank_jpeg())).await;
    assert_eq!(state.spoken.lock().last_spoken_command, Some(Command::Stop));
}

#[tokio::test]
async fn test_debug_artifacts_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GuideConfig::default();
    config.server.debug_dir = dir.path().to_path_buf();

    let app = create_router(test_state(&config));
    let (status, _) = send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert_eq!(status, StatusCode::OK);

    assert!(dir.path().join("debug1.jpg").exists());
    assert!(dir.path().join("debug2.jpg").exists());
}

#[tokio::test]
async fn test_unwritable_debug_dir_does_not_fail_request() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GuideConfig::default();
    config.server.debug_dir = dir.path().join("does-not-exist");

    let app = create_router(test_state(&config));
    let (status, body) = send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = quiet_config();
    config.server.max_body_bytes = 256;
    let app = create_router(test_state(&config));

    let (status, _) = send(&app, multipart_request("image", &centered_line_jpeg())).await;
    assert!(status.is_client_error());
}
