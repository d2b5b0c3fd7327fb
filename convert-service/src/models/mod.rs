//! Request and response shapes for the conversion API.

pub mod conversion;

pub use conversion::{ApiInfo, ConvertResponse, ImageUpload, OutputFormat, UnknownFormat};
