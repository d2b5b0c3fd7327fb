mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{
    body_bytes, body_json, multipart_request, router_with, router_with_config, test_config, Part,
    PNG_BYTES,
};
use convert_service::services::prompts::{CSV_PROMPT, EXCEL_PROMPT};
use convert_service::services::providers::mock::MockVisionProvider;
use convert_service::services::providers::ProviderError;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const CONVERT: &str = "/api/convert-image";

#[tokio::test]
async fn test_convert_to_csv() {
    let provider = Arc::new(MockVisionProvider::responding(
        "```csv\nName,Age\nJohn,25\n```",
    ));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::image("image/png", PNG_BYTES), Part::format("csv")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["csv"], "Name,Age\nJohn,25");
    assert_eq!(body["message"], "CSV conversion completed successfully");
    assert!(body.get("excel").is_none());

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, CSV_PROMPT);
    assert_eq!(calls[0].image.mime_type, "image/png");
}

#[tokio::test]
async fn test_convert_to_excel() {
    let provider = Arc::new(MockVisionProvider::responding("Item,Qty\nApple,3"));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::format("excel"), Part::image("image/jpeg", PNG_BYTES)],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["excel"], "Item,Qty\nApple,3");
    assert_eq!(
        body["message"],
        "Excel (Busy) format conversion completed successfully"
    );
    assert!(body.get("csv").is_none());
    assert_eq!(provider.calls()[0].prompt, EXCEL_PROMPT);
}

#[tokio::test]
async fn test_format_defaults_to_csv() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let app = router_with(provider);

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::image("image/webp", PNG_BYTES)],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["csv"], "a,b");
}

#[tokio::test]
async fn test_missing_image_is_rejected() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(multipart_request(CONVERT, &[Part::format("csv")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No image file provided. Please upload an image."
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_file_type_is_rejected() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::image("application/pdf", b"%PDF-1.7"), Part::format("csv")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid file type. Please upload a valid image file (JPEG, PNG, GIF, BMP, WebP)."
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let mut config = test_config();
    config.upload.max_file_size_bytes = 2 * 1024 * 1024;
    let app = router_with_config(provider.clone(), config);

    let big = vec![0u8; 2 * 1024 * 1024 + 1];
    let response = app
        .oneshot(multipart_request(CONVERT, &[Part::image("image/png", &big)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "File too large. Please upload an image smaller than 2MB."
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_body_over_transport_limit_is_reported_as_too_large() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let mut config = test_config();
    config.upload.max_file_size_bytes = 1024 * 1024;
    config.upload.max_request_bytes = Some(4096);
    let app = router_with_config(provider.clone(), config);

    let big = vec![0u8; 64 * 1024];
    let response = app
        .oneshot(multipart_request(CONVERT, &[Part::image("image/png", &big)]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "File too large. Please upload an image smaller than 1MB."
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_format_is_rejected() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let app = router_with(provider.clone());

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::image("image/png", PNG_BYTES), Part::format("pdf")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid format. Please specify either \"csv\" or \"excel\"."
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_rejected() {
    let provider = Arc::new(MockVisionProvider::responding("a,b"));
    let app = router_with(provider);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(CONVERT)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"image":"nope"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid request format. Please ensure you are uploading a valid image file."
    );
}

#[tokio::test]
async fn test_upstream_failures_map_to_statuses() {
    let cases = [
        (
            ProviderError::Timeout(Duration::from_secs(30)),
            StatusCode::REQUEST_TIMEOUT,
            "Request timeout. Please try with a smaller image or try again.",
        ),
        (
            ProviderError::RateLimited,
            StatusCode::TOO_MANY_REQUESTS,
            "Service is temporarily busy. Please try again in a moment.",
        ),
        (
            ProviderError::NotConfigured("no key".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Service configuration error. Please contact support.",
        ),
        (
            ProviderError::ApiError {
                status: 400,
                body: "API key not valid".into(),
            },
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process image. Please try again or contact support if the problem persists.",
        ),
        (
            ProviderError::NetworkError("connection reset".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected error occurred while processing your image. Please try again.",
        ),
    ];

    for (error, status, message) in cases {
        let app = router_with(Arc::new(MockVisionProvider::failing(error)));

        let response = app
            .oneshot(multipart_request(
                CONVERT,
                &[Part::image("image/png", PNG_BYTES)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), status);
        let body = body_json(response).await;
        assert_eq!(body["error"], message);
        assert!(body.get("details").is_none());
    }
}

#[tokio::test]
async fn test_upstream_detail_is_not_leaked() {
    let app = router_with(Arc::new(MockVisionProvider::failing(
        ProviderError::ApiError {
            status: 403,
            body: "secret upstream diagnostics".into(),
        },
    )));

    let response = app
        .oneshot(multipart_request(
            CONVERT,
            &[Part::image("image/png", PNG_BYTES)],
        ))
        .await
        .unwrap();

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(!body.contains("secret upstream diagnostics"));
}

#[tokio::test]
async fn test_empty_model_output_is_unprocessable() {
    for (text, message) in [
        (
            "",
            "No data could be extracted from the image. Please ensure the image contains readable text or data.",
        ),
        (
            "```csv\n\n```",
            "No readable data found in the image. Please try with a clearer image.",
        ),
    ] {
        let app = router_with(Arc::new(MockVisionProvider::responding(text)));

        let response = app
            .oneshot(multipart_request(
                CONVERT,
                &[Part::image("image/png", PNG_BYTES)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], message);
    }
}

#[tokio::test]
async fn test_download_returns_attachment() {
    let app = router_with(Arc::new(MockVisionProvider::responding("```\nA,B\n1,2\n```")));

    let response = app
        .oneshot(multipart_request(
            "/api/convert-image/download",
            &[Part::image("image/png", PNG_BYTES), Part::format("excel")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.ms-excel"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"extracted_data_"));
    assert!(disposition.ends_with(".xlsx\""));

    assert_eq!(body_bytes(response).await, b"A,B\n1,2");
}

#[tokio::test]
async fn test_download_validates_like_convert() {
    let app = router_with(Arc::new(MockVisionProvider::responding("a,b")));

    let response = app
        .oneshot(multipart_request(
            "/api/convert-image/download",
            &[Part::format("csv")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_info() {
    let app = router_with(Arc::new(MockVisionProvider::responding("a,b")));

    let response = app
        .oneshot(Request::builder().uri(CONVERT).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["endpoint"], CONVERT);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["formats"], serde_json::json!(["csv", "excel"]));
    assert_eq!(body["accepted_mime_types"].as_array().unwrap().len(), 6);
    assert_eq!(body["max_file_size_bytes"], 10 * 1024 * 1024);
    assert_eq!(body["timeout_seconds"], 30);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let app = router_with(Arc::new(MockVisionProvider::responding("a,b")));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_readiness_follows_provider_health() {
    let healthy = router_with(Arc::new(MockVisionProvider::responding("a,b")));
    let response = healthy
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let unhealthy = router_with(Arc::new(MockVisionProvider::responding("a,b").unhealthy()));
    let response = unhealthy
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "not_configured");
}
