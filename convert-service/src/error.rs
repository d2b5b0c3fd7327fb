//! Conversion failures and their HTTP mapping.
//!
//! `Display` is the message shown to the caller. Upstream details stay in
//! the variant fields and in logs.

use service_core::error::AppError;
use thiserror::Error;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    #[error("No image file provided. Please upload an image.")]
    MissingImage,

    #[error("Invalid file type. Please upload a valid image file (JPEG, PNG, GIF, BMP, WebP).")]
    InvalidFileType { mime_type: String },

    #[error("File too large. Please upload an image smaller than {}.", size_label(.limit_bytes))]
    FileTooLarge {
        /// Unknown when the transport limit cut the upload short.
        size_bytes: Option<usize>,
        limit_bytes: usize,
    },

    #[error("Invalid format. Please specify either \"csv\" or \"excel\".")]
    InvalidFormat(String),

    #[error("Invalid request format. Please ensure you are uploading a valid image file.")]
    MalformedRequest(String),

    #[error("Service configuration error. Please contact support.")]
    NotConfigured,

    #[error("Service is temporarily busy. Please try again in a moment.")]
    UpstreamBusy,

    #[error("Failed to process image. Please try again or contact support if the problem persists.")]
    UpstreamFailed { status: u16 },

    #[error("Request timeout. Please try with a smaller image or try again.")]
    Timeout,

    #[error("No data could be extracted from the image. Please ensure the image contains readable text or data.")]
    NoDataExtracted,

    #[error("No readable data found in the image. Please try with a clearer image.")]
    NoReadableData,

    #[error("An unexpected error occurred while processing your image. Please try again.")]
    Unexpected(String),
}

/// Largest exact unit for a byte limit: `10MB`, `1536KB` or `1000 bytes`.
fn size_label(bytes: &usize) -> String {
    if *bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if *bytes >= KIB && bytes % KIB == 0 {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

impl ConvertError {
    /// Outcome label for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ConvertError::MissingImage
            | ConvertError::InvalidFileType { .. }
            | ConvertError::FileTooLarge { .. }
            | ConvertError::InvalidFormat(_)
            | ConvertError::MalformedRequest(_) => "rejected",
            ConvertError::NotConfigured => "not_configured",
            ConvertError::UpstreamBusy => "rate_limited",
            ConvertError::UpstreamFailed { .. } => "upstream_error",
            ConvertError::Timeout => "timeout",
            ConvertError::NoDataExtracted | ConvertError::NoReadableData => "empty",
            ConvertError::Unexpected(_) => "error",
        }
    }
}

impl From<ConvertError> for AppError {
    fn from(err: ConvertError) -> Self {
        let message = err.to_string();
        match err {
            ConvertError::MissingImage
            | ConvertError::InvalidFileType { .. }
            | ConvertError::FileTooLarge { .. }
            | ConvertError::InvalidFormat(_)
            | ConvertError::MalformedRequest(_) => AppError::BadRequest(anyhow::anyhow!(message)),
            ConvertError::UpstreamBusy => AppError::TooManyRequests(message),
            ConvertError::Timeout => AppError::RequestTimeout(message),
            ConvertError::NoDataExtracted | ConvertError::NoReadableData => {
                AppError::UnprocessableEntity(message)
            }
            ConvertError::NotConfigured
            | ConvertError::UpstreamFailed { .. }
            | ConvertError::Unexpected(_) => AppError::ServiceError(message),
        }
    }
}
