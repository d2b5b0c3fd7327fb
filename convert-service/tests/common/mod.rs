//! Test helpers for convert-service integration tests.
//!
//! Builds routers backed by the scripted provider and hand-rolled multipart
//! bodies, so no test touches the hosted model.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use convert_service::config::ConvertConfig;
use convert_service::services::providers::mock::MockVisionProvider;
use convert_service::services::providers::GenerationParams;
use convert_service::services::ImageConverter;
use convert_service::startup::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;

pub const BOUNDARY: &str = "----snapsheet-test-boundary";

/// Smallest valid PNG header; the mock never decodes it.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// One part of a multipart/form-data body.
pub struct Part {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn image(content_type: &'static str, data: &[u8]) -> Self {
        Self {
            name: "image",
            file_name: Some("table.png"),
            content_type: Some(content_type),
            data: data.to_vec(),
        }
    }

    pub fn format(value: &str) -> Self {
        Self {
            name: "format",
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());

        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");

        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }

        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn test_config() -> ConvertConfig {
    let mut config = ConvertConfig::default();
    config.common.host = "127.0.0.1".to_string();
    config.common.port = 0;
    config.common.log_level = "error".to_string();
    config
}

pub fn router_with(provider: Arc<MockVisionProvider>) -> Router {
    router_with_config(provider, test_config())
}

pub fn router_with_config(provider: Arc<MockVisionProvider>, config: ConvertConfig) -> Router {
    let converter = ImageConverter::new(provider, GenerationParams::from(config.generation.clone()));
    build_router(AppState { config, converter })
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
