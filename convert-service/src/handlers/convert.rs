//! `/api/convert-image` handlers.

use crate::error::ConvertError;
use crate::models::{ApiInfo, ConvertResponse, ImageUpload, OutputFormat};
use crate::services::validation::{validate_request, ALLOWED_MIME_TYPES};
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

pub const CONVERT_IMAGE_PATH: &str = "/api/convert-image";

/// Convert an uploaded image and return the text inside a JSON envelope.
pub async fn convert_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, AppError> {
    let (image, format) = read_request(&state, multipart).await?;
    let content = state.converter.convert(&image, format).await?;

    Ok(Json(ConvertResponse::new(format, content)))
}

/// Same as [`convert_image`] but answers with a dated file attachment.
pub async fn download_conversion(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let (image, format) = read_request(&state, multipart).await?;
    let content = state.converter.convert(&image, format).await?;

    let file_name = download_file_name(format, chrono::Utc::now().date_naive());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

/// Describe the conversion endpoint and its limits.
pub async fn api_info(State(state): State<AppState>) -> Json<ApiInfo> {
    Json(ApiInfo {
        endpoint: CONVERT_IMAGE_PATH,
        method: "POST",
        formats: OutputFormat::ALL.to_vec(),
        accepted_mime_types: ALLOWED_MIME_TYPES.to_vec(),
        max_file_size_bytes: state.config.upload.max_file_size_bytes,
        timeout_seconds: state.config.gemini.timeout_secs,
    })
}

/// `extracted_data_YYYY-MM-DD.<ext>`
pub fn download_file_name(format: OutputFormat, date: chrono::NaiveDate) -> String {
    format!(
        "extracted_data_{}.{}",
        date.format("%Y-%m-%d"),
        format.file_extension()
    )
}

/// Pull `image` and `format` out of the form and validate them.
///
/// The first `image` and `format` parts win; other parts are ignored.
async fn read_request(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(ImageUpload, OutputFormat), ConvertError> {
    let limit = state.config.upload.max_file_size_bytes;

    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected non-multipart request");
        ConvertError::MalformedRequest(rejection.body_text())
    })?;

    let mut image: Option<ImageUpload> = None;
    let mut format: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some("image") if image.is_none() => {
                let file_name = field.file_name().map(str::to_string);
                let mime_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;

                image = Some(ImageUpload {
                    file_name,
                    mime_type,
                    bytes,
                });
            }
            Some("format") if format.is_none() => {
                let value = field.text().await.map_err(|e| multipart_error(e, limit))?;
                format = Some(value);
            }
            _ => {}
        }
    }

    let result = validate_request(image, format.as_deref(), limit);
    if let Err(e) = &result {
        tracing::info!(reason = ?e, "Upload rejected");
    }

    result
}

fn multipart_error(e: MultipartError, limit_bytes: usize) -> ConvertError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(limit_bytes, "Upload exceeded the request body limit");
        ConvertError::FileTooLarge {
            size_bytes: None,
            limit_bytes,
        }
    } else {
        tracing::warn!(error = %e.body_text(), "Failed to parse multipart body");
        ConvertError::MalformedRequest(e.body_text())
    }
}
