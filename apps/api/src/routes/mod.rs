pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/rubrics", get(handlers::handle_list_rubrics))
        .route("/api/v1/analyze/:rubric_id", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_config;
    use crate::llm_client::test_support::ScriptedModel;
    use crate::media::sampler::FrameSampler;
    use crate::media::test_support::{mp4_header, png_bytes, StubDecoder};

    const BOUNDARY: &str = "adlens-test-boundary";

    fn app(model: Arc<ScriptedModel>, decoder: Arc<StubDecoder>) -> Router {
        build_router(AppState {
            model,
            sampler: Arc::new(FrameSampler::new(decoder)),
            config: test_config(),
        })
    }

    fn default_app() -> Router {
        app(
            Arc::new(ScriptedModel::default()),
            Arc::new(StubDecoder::with_frames(100)),
        )
    }

    fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field, filename, bytes)))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = default_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_rubrics() {
        let response = default_app()
            .oneshot(Request::get("/api/v1/rubrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let rubrics = body.as_array().unwrap();
        assert_eq!(rubrics.len(), crate::rubrics::all().len());
        assert_eq!(rubrics[0]["id"], "headline");
        assert_eq!(rubrics[0]["frame_policy"], "first");
    }

    #[tokio::test]
    async fn test_analyze_image_returns_result() {
        let model = Arc::new(ScriptedModel::default());
        let response = app(model.clone(), Arc::new(StubDecoder::with_frames(100)))
            .oneshot(upload_request(
                "/api/v1/analyze/headline?repeat=2",
                "file",
                "ad.png",
                &png_bytes(5),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["rubric_id"], "headline");
        assert_eq!(body["media"]["kind"], "image");
        assert_eq!(body["media"]["filename"], "ad.png");
        assert_eq!(body["analyses"][0]["merged"], "answer #1\n\nanswer #2");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_analyze_video_samples_frames() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/video-hook?frames=4&repeat=1",
                "file",
                "spot.mp4",
                &mp4_header(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["media"]["kind"], "video");
        assert_eq!(
            body["sampled_frame_indices"],
            serde_json::json!([0, 25, 50, 75])
        );
        assert_eq!(body["analyses"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_download_returns_markdown_attachment() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/headline?repeat=1&download=true",
                "file",
                "ad.png",
                &png_bytes(5),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"adlens-headline-"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("# Headline quality"));
    }

    #[tokio::test]
    async fn test_unknown_rubric_is_not_found() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/nope",
                "file",
                "ad.png",
                &png_bytes(5),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_media_upload_is_unsupported() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/headline",
                "file",
                "notes.txt",
                b"just some text",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/headline",
                "attachment",
                "ad.png",
                &png_bytes(5),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_frames_is_bad_request() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/video-hook?frames=0",
                "file",
                "spot.mp4",
                &mp4_header(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_query_uses_error_envelope() {
        let response = default_app()
            .oneshot(upload_request(
                "/api/v1/analyze/video-hook?frames=abc",
                "file",
                "spot.mp4",
                &mp4_header(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("frames"));
    }

    #[tokio::test]
    async fn test_undecodable_video_is_unprocessable() {
        let response = app(
            Arc::new(ScriptedModel::default()),
            Arc::new(StubDecoder::with_frames(0)),
        )
        .oneshot(upload_request(
            "/api/v1/analyze/video-hook",
            "file",
            "broken.mp4",
            &mp4_header(),
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
