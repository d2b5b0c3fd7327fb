use crate::error::ConvertError;
use crate::models::{ImageUpload, OutputFormat};

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Check an incoming request. Order matters: presence, type, size, format.
pub fn validate_request(
    image: Option<ImageUpload>,
    format: Option<&str>,
    max_file_size_bytes: usize,
) -> Result<(ImageUpload, OutputFormat), ConvertError> {
    let image = match image {
        Some(image) if !image.is_blank() => image,
        _ => return Err(ConvertError::MissingImage),
    };

    if !ALLOWED_MIME_TYPES.contains(&image.mime_type.as_str()) {
        return Err(ConvertError::InvalidFileType {
            mime_type: image.mime_type,
        });
    }

    if image.size() > max_file_size_bytes {
        return Err(ConvertError::FileTooLarge {
            size_bytes: Some(image.size()),
            limit_bytes: max_file_size_bytes,
        });
    }

    let format =
        OutputFormat::from_field(format).map_err(|unknown| ConvertError::InvalidFormat(unknown.0))?;

    Ok((image, format))
}
